use crate::collectors::layout::{Columns, Layout};
use crate::models::disk::{DeviceRecord, DiskUsage, InodeStats};

/// (metric suffix, value) pairs for one device.
pub type Values = Vec<(&'static str, f64)>;

fn number(record: &DeviceRecord, idx: usize) -> Option<f64> {
    record.fields.get(idx)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// "33%" -> 0.33. None unless the token is digits followed by a percent sign.
pub fn parse_percent(token: &str) -> Option<f64> {
    if token.len() <= 1 { return None; }
    let digits = token.strip_suffix('%')?;
    digits.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v / 100.0)
}

/// Values for an accepted `df` row. Unparseable columns are left out
/// individually instead of failing the row.
pub fn from_record(record: &DeviceRecord, layout: Layout) -> Values {
    let (total, used, free, pct) = match layout.columns() {
        Columns::Direct { total, used, free, pct } => {
            (number(record, total), number(record, used), number(record, free), pct)
        }
        Columns::DerivedTotal { used, free, pct } => {
            let used = number(record, used);
            let free = number(record, free);
            let total = match (used, free) {
                (Some(u), Some(f)) => Some(u + f),
                _                  => None,
            };
            (total, used, free, pct)
        }
    };

    let mut out = Values::new();
    if let Some(v) = total { out.push(("total", v)); }
    if let Some(v) = used  { out.push(("used", v)); }
    if let Some(v) = free  { out.push(("free", v)); }
    if let Some(v) = record.fields.get(pct).and_then(|t| parse_percent(t)) {
        out.push(("in_use", v));
    }
    out
}

/// Space values from `statvfs`, reported in kB for compatibility with the
/// historical kilobyte-based metric names. `in_use` is left out for a
/// filesystem with no capacity.
pub fn from_usage(usage: &DiskUsage) -> Values {
    let mut out = vec![
        ("total", usage.total as f64 / 1024.0),
        ("used",  usage.used as f64 / 1024.0),
        ("free",  usage.free as f64 / 1024.0),
    ];
    if usage.total != 0 {
        if let Some(pct) = usage.percent {
            out.push(("in_use", pct / 100.0));
        }
    }
    out
}

/// Inode values from `statvfs`. Empty when the filesystem reports no inodes.
pub fn from_inodes(stats: &InodeStats) -> Values {
    if stats.files == 0 { return Vec::new(); }
    let total = stats.files as f64;
    let free  = stats.files_free as f64;
    let used  = total - free;
    vec![
        ("total",  total),
        ("free",   free),
        ("used",   used),
        ("in_use", used / total),
    ]
}
