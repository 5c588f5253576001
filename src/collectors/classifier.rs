use crate::collectors::df::is_number;
use crate::collectors::layout::Platform;
use crate::config::InstanceConfig;
use crate::error::{CheckError, Result};
use crate::models::disk::DeviceRecord;
use regex::Regex;
use std::collections::HashSet;

/// Pseudo devices never reported when reading the partition table.
pub const PARTITION_FAKE_DEVICES: &[&str] = &["udev", "sysfs", "rpc_pipefs", "proc", "devpts"];

/// Pseudo devices never reported from GNU `df`.
pub const DF_FAKE_DEVICES_LINUX: &[&str] = &["none", "udev", "sysfs", "proc", "devpts", "rpc_pipefs"];

/// Pseudo devices never reported from BSD-style `df`.
pub const DF_FAKE_DEVICES_BSD: &[&str] = &["none", "devfs", "map"];

pub fn df_fake_devices(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::Linux => DF_FAKE_DEVICES_LINUX,
        _               => DF_FAKE_DEVICES_BSD,
    }
}

/// Why a device was left out of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// First numeric column does not parse: header remnant or placeholder mount.
    NotNumeric,
    FakeDevice,
    ExcludedDisk,
    ExcludedDiskPattern,
    ExcludedFilesystem,
}

impl Exclusion {
    pub fn label(&self) -> &'static str {
        match self {
            Exclusion::NotNumeric          => "non-numeric row",
            Exclusion::FakeDevice          => "pseudo device",
            Exclusion::ExcludedDisk        => "excluded_disks",
            Exclusion::ExcludedDiskPattern => "excluded_disk_re",
            Exclusion::ExcludedFilesystem  => "excluded_filesystems",
        }
    }
}

/// Per-cycle device filter built from one instance.
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    pub use_mount:            bool,
    pub tag_by_filesystem:    bool,
    pub excluded_filesystems: HashSet<String>,
    pub excluded_disks:       HashSet<String>,
    pub excluded_disk_re:     Regex,
    fake_devices:             &'static [&'static str],
}

impl ExclusionPolicy {
    pub fn from_instance(instance: &InstanceConfig, fake_devices: &'static [&'static str]) -> Result<Self> {
        // Anchored at the start only, like a prefix match.
        let anchored = format!("^(?:{})", instance.excluded_disk_re);
        let excluded_disk_re = Regex::new(&anchored).map_err(|source| CheckError::InvalidPattern {
            pattern: instance.excluded_disk_re.clone(),
            source,
        })?;

        Ok(ExclusionPolicy {
            use_mount:            instance.use_mount,
            tag_by_filesystem:    instance.tag_by_filesystem,
            excluded_filesystems: instance.excluded_filesystems.iter().cloned().collect(),
            excluded_disks:       instance.excluded_disks.iter().cloned().collect(),
            excluded_disk_re,
            fake_devices,
        })
    }

    /// Name/type rules shared by both collection modes.
    pub fn exclusion(&self, device: &str, fs_type: Option<&str>) -> Option<Exclusion> {
        if self.fake_devices.contains(&device) {
            return Some(Exclusion::FakeDevice);
        }
        if self.excluded_disks.contains(device) {
            return Some(Exclusion::ExcludedDisk);
        }
        if self.excluded_disk_re.is_match(device) {
            return Some(Exclusion::ExcludedDiskPattern);
        }
        if fs_type.is_some_and(|t| self.excluded_filesystems.contains(t)) {
            return Some(Exclusion::ExcludedFilesystem);
        }
        None
    }

    /// Full check for a parsed `df` row.
    pub fn record_exclusion(&self, record: &DeviceRecord) -> Option<Exclusion> {
        if !record.fields.first().is_some_and(|t| is_number(t)) {
            return Some(Exclusion::NotNumeric);
        }
        self.exclusion(&record.name, record.fs_type.as_deref())
    }

    pub fn tags(&self, fs_type: Option<&str>) -> Vec<String> {
        match fs_type {
            Some(t) if self.tag_by_filesystem => vec![t.to_string()],
            _ => Vec::new(),
        }
    }

    pub fn device_name(&self, device: &str, mountpoint: &str) -> String {
        if self.use_mount { mountpoint.to_string() } else { device.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::layout::Layout;

    fn policy() -> ExclusionPolicy {
        let instance = InstanceConfig {
            excluded_filesystems: vec!["aaaaaa".into()],
            excluded_disks:       vec!["bbbbbb".into()],
            excluded_disk_re:     "^tev+$".into(),
            ..InstanceConfig::default()
        };
        ExclusionPolicy::from_instance(&instance, PARTITION_FAKE_DEVICES).unwrap()
    }

    #[test]
    fn test_normal_disk_kept() {
        assert_eq!(policy().exclusion("/dev/sda1", Some("ext4")), None);
    }

    #[test]
    fn test_fake_device_excluded() {
        assert_eq!(policy().exclusion("udev", Some("ext4")), Some(Exclusion::FakeDevice));
        let defaults = ExclusionPolicy::from_instance(&InstanceConfig::default(), PARTITION_FAKE_DEVICES).unwrap();
        assert_eq!(defaults.exclusion("udev", None), Some(Exclusion::FakeDevice));
    }

    #[test]
    fn test_excluded_filesystems() {
        assert_eq!(policy().exclusion("/dev/sda1", Some("aaaaaa")), Some(Exclusion::ExcludedFilesystem));
        assert_eq!(policy().exclusion("/dev/sda1", Some("a")), None);
        assert_eq!(policy().exclusion("/dev/sda1", None), None);
    }

    #[test]
    fn test_excluded_disks() {
        assert_eq!(policy().exclusion("bbbbbb", Some("ext4")), Some(Exclusion::ExcludedDisk));
        assert_eq!(policy().exclusion("b", Some("ext4")), None);
    }

    #[test]
    fn test_excluded_disk_re() {
        assert_eq!(policy().exclusion("tevvv", Some("ext4")), Some(Exclusion::ExcludedDiskPattern));
        assert_eq!(policy().exclusion("tevvs", Some("ext4")), None);
    }

    #[test]
    fn test_pattern_matches_at_start_only() {
        let instance = InstanceConfig { excluded_disk_re: "/dev/loop".into(), ..InstanceConfig::default() };
        let p = ExclusionPolicy::from_instance(&instance, PARTITION_FAKE_DEVICES).unwrap();
        assert_eq!(p.exclusion("/dev/loop3", None), Some(Exclusion::ExcludedDiskPattern));
        assert_eq!(p.exclusion("/mnt/dev/loop3", None), None);
    }

    #[test]
    fn test_default_pattern_matches_nothing_real() {
        let p = ExclusionPolicy::from_instance(&InstanceConfig::default(), PARTITION_FAKE_DEVICES).unwrap();
        assert_eq!(p.exclusion("/dev/sda1", None), None);
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let instance = InstanceConfig { excluded_disk_re: "(".into(), ..InstanceConfig::default() };
        let err = ExclusionPolicy::from_instance(&instance, PARTITION_FAKE_DEVICES).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_record_non_numeric_dropped() {
        let p = ExclusionPolicy::from_instance(&InstanceConfig::default(), DF_FAKE_DEVICES_BSD).unwrap();
        let rec = DeviceRecord::from_tokens(&["map", "-hosts", "0", "0", "0", "100%", "/net"], Layout::PosixSpace).unwrap();
        assert_eq!(p.record_exclusion(&rec), Some(Exclusion::NotNumeric));
    }

    #[test]
    fn test_record_numeric_start_honours_type_column() {
        let p = ExclusionPolicy::from_instance(&InstanceConfig::default(), DF_FAKE_DEVICES_LINUX).unwrap();
        let rec = DeviceRecord::from_tokens(&["/dev/sda1", "ext4", "524288", "171642", "352646", "33%", "/"], Layout::GnuSpace).unwrap();
        assert_eq!(p.record_exclusion(&rec), None);
        let none = DeviceRecord::from_tokens(&["none", "tmpfs", "4", "0", "4", "0%", "/sys/fs/cgroup"], Layout::GnuSpace).unwrap();
        assert_eq!(p.record_exclusion(&none), Some(Exclusion::FakeDevice));
    }

    #[test]
    fn test_record_fs_type_exclusion() {
        let instance = InstanceConfig { excluded_filesystems: vec!["tmpfs".into()], ..InstanceConfig::default() };
        let p = ExclusionPolicy::from_instance(&instance, DF_FAKE_DEVICES_LINUX).unwrap();
        let rec = DeviceRecord::from_tokens(&["tmpfs", "tmpfs", "1629364", "2212", "1627152", "1%", "/run"], Layout::GnuSpace).unwrap();
        assert_eq!(p.record_exclusion(&rec), Some(Exclusion::ExcludedFilesystem));
    }

    #[test]
    fn test_tags_and_device_name() {
        let instance = InstanceConfig { use_mount: true, tag_by_filesystem: true, ..InstanceConfig::default() };
        let p = ExclusionPolicy::from_instance(&instance, PARTITION_FAKE_DEVICES).unwrap();
        assert_eq!(p.tags(Some("ext4")), vec!["ext4".to_string()]);
        assert!(p.tags(None).is_empty());
        assert_eq!(p.device_name("/dev/sda1", "/"), "/");

        let plain = ExclusionPolicy::from_instance(&InstanceConfig::default(), PARTITION_FAKE_DEVICES).unwrap();
        assert!(plain.tags(Some("ext4")).is_empty());
        assert_eq!(plain.device_name("/dev/sda1", "/"), "/dev/sda1");
    }
}
