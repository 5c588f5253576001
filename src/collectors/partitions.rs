use crate::error::{CheckError, Result};
use crate::models::disk::{DiskUsage, InodeStats, Partition};
use std::collections::HashSet;
use std::path::PathBuf;

/// Structured view of the host's mounted filesystems.
pub trait PartitionSource {
    /// Mounted partitions. With `all == false` only those backed by a
    /// physical (non-`nodev`) filesystem type are returned.
    fn partitions(&self, all: bool) -> Result<Vec<Partition>>;
    fn disk_usage(&self, mountpoint: &str) -> Result<DiskUsage>;
    fn inode_stats(&self, mountpoint: &str) -> Result<InodeStats>;
}

/// Reads the kernel mount table and calls `statvfs`.
pub struct HostPartitions {
    pub mounts_path:      PathBuf,
    pub filesystems_path: PathBuf,
}

impl Default for HostPartitions {
    fn default() -> Self {
        Self {
            mounts_path:      PathBuf::from("/proc/self/mounts"),
            filesystems_path: PathBuf::from("/proc/filesystems"),
        }
    }
}

impl PartitionSource for HostPartitions {
    fn partitions(&self, all: bool) -> Result<Vec<Partition>> {
        let content = std::fs::read_to_string(&self.mounts_path).map_err(|e| {
            CheckError::acquisition(format!("cannot read {}: {}", self.mounts_path.display(), e))
        })?;
        let parts = parse_mounts(&content);
        if all { return Ok(parts); }

        let fs_list = std::fs::read_to_string(&self.filesystems_path).map_err(|e| {
            CheckError::acquisition(format!("cannot read {}: {}", self.filesystems_path.display(), e))
        })?;
        Ok(physical_only(parts, &physical_fs_types(&fs_list)))
    }

    fn disk_usage(&self, mountpoint: &str) -> Result<DiskUsage> {
        let stat = statvfs(mountpoint)?;
        Ok(DiskUsage::from_blocks(
            stat.blocks() as u64,
            stat.blocks_free() as u64,
            stat.blocks_available() as u64,
            stat.fragment_size() as u64,
        ))
    }

    fn inode_stats(&self, mountpoint: &str) -> Result<InodeStats> {
        let stat = statvfs(mountpoint)?;
        Ok(InodeStats {
            files:      stat.files() as u64,
            files_free: stat.files_free() as u64,
        })
    }
}

fn statvfs(mountpoint: &str) -> Result<nix::sys::statvfs::Statvfs> {
    nix::sys::statvfs::statvfs(mountpoint)
        .map_err(|e| CheckError::acquisition(format!("statvfs {}: {}", mountpoint, e)))
}

/// Parse `/proc/mounts` format: device mountpoint fstype options dump pass.
pub fn parse_mounts(content: &str) -> Vec<Partition> {
    let mut v = Vec::new();
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 { continue; }
        v.push(Partition {
            device:     unescape(fields[0]),
            mountpoint: unescape(fields[1]),
            fs_type:    fields[2].to_string(),
        });
    }
    v
}

/// Filesystem types from `/proc/filesystems` not flagged `nodev`.
pub fn physical_fs_types(content: &str) -> HashSet<String> {
    let mut set = HashSet::new();
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [fs] => { set.insert(fs.to_string()); }
            ["nodev", "zfs"] => { set.insert("zfs".to_string()); }
            _ => {}
        }
    }
    set
}

pub fn physical_only(parts: Vec<Partition>, fs_types: &HashSet<String>) -> Vec<Partition> {
    parts.into_iter()
        .filter(|p| !p.device.is_empty() && p.device != "none")
        .filter(|p| fs_types.contains(&p.fs_type))
        .collect()
}

/// Decode the octal escapes the kernel uses for whitespace in mount paths.
fn unescape(field: &str) -> String {
    if !field.contains('\\') { return field.to_string(); }

    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let oct = &bytes[i + 1..i + 4];
            if oct.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let b = oct.iter().fold(0u16, |acc, d| acc * 8 + u16::from(d - b'0'));
                if let Ok(b) = u8::try_from(b) {
                    out.push(b);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
