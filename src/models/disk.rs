use crate::collectors::layout::Layout;

/// One logical row of `df` output, split into name, optional type and the
/// remaining raw tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    pub name:    String,
    pub fs_type: Option<String>,
    /// Everything after the name (and type column, when present):
    /// sizes or inode counts, percentages, then the mountpoint.
    pub fields:  Vec<String>,
}

impl DeviceRecord {
    /// Build a record from one reassembled token list. Returns None when the
    /// row is too short to hold anything past the name/type columns.
    pub fn from_tokens(tokens: &[&str], layout: Layout) -> Option<Self> {
        let start = layout.numeric_start();
        if tokens.len() <= start { return None; }

        let fs_type = if layout.has_type_column() { Some(tokens[1].to_string()) } else { None };
        Some(DeviceRecord {
            name:    tokens[0].to_string(),
            fs_type,
            fields:  tokens[start..].iter().map(|t| t.to_string()).collect(),
        })
    }

    /// Last column of every supported layout.
    pub fn mountpoint(&self) -> &str {
        self.fields.last().map(String::as_str).unwrap_or(&self.name)
    }
}

/// One mounted filesystem from the OS partition table.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub device:     String,
    pub mountpoint: String,
    pub fs_type:    String,
}

/// Space usage in bytes, as returned by `statvfs`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
    pub total:   u64,
    pub used:    u64,
    pub free:    u64,
    /// Used share in percent, rounded to one decimal. None when the
    /// filesystem reports no blocks at all.
    pub percent: Option<f64>,
}

impl DiskUsage {
    pub fn from_blocks(blocks: u64, blocks_free: u64, blocks_avail: u64, frsize: u64) -> Self {
        let total = blocks.saturating_mul(frsize);
        let used  = blocks.saturating_sub(blocks_free).saturating_mul(frsize);
        let free  = blocks_avail.saturating_mul(frsize);
        let denom = used.saturating_add(free);
        let percent = if denom == 0 {
            None
        } else {
            Some((used as f64 / denom as f64 * 1000.0).round() / 10.0)
        };
        DiskUsage { total, used, free, percent }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InodeStats {
    pub files:      u64,
    pub files_free: u64,
}
