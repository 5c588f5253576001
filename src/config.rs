use crate::collectors::layout::Platform;
use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Check configuration file: shared `init_config` plus per-instance options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub init_config: InitConfig,

    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitConfig {
    pub mode: CollectionMode,
}

/// Where disk data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionMode {
    /// Mount table plus `statvfs` calls. Linux only.
    Statvfs,
    /// Parse `df` output.
    Df,
}

impl Default for CollectionMode {
    fn default() -> Self {
        Self::for_platform(Platform::current())
    }
}

impl CollectionMode {
    /// `statvfs` where the mount table lives in `/proc`, `df` elsewhere.
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Linux => CollectionMode::Statvfs,
            _               => CollectionMode::Df,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "statvfs" | "psutil" => Some(CollectionMode::Statvfs),
            "df"                 => Some(CollectionMode::Df),
            _                    => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstanceConfig {
    /// Report devices under their mountpoint instead of the device path.
    #[serde(deserialize_with = "affirmative")]
    pub use_mount: bool,
    pub excluded_filesystems: Vec<String>,
    pub excluded_disks: Vec<String>,
    /// Matched against the start of the device name.
    pub excluded_disk_re: String,
    /// Tag every metric with the filesystem type.
    #[serde(deserialize_with = "affirmative")]
    pub tag_by_filesystem: bool,
    /// Include pseudo filesystems in statvfs mode.
    #[serde(deserialize_with = "affirmative")]
    pub all_partitions: bool,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            use_mount:            false,
            excluded_filesystems: Vec::new(),
            excluded_disks:       Vec::new(),
            excluded_disk_re:     "^$".to_string(),
            tag_by_filesystem:    false,
            all_partitions:       true,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Accepts booleans as well as "yes"/"true"/"on"/"1" style strings.
fn affirmative<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
    Ok(match Flag::deserialize(d)? {
        Flag::Bool(b) => b,
        Flag::Int(i)  => i == 1,
        Flag::Text(s) => is_affirmative(&s),
    })
}

pub fn is_affirmative(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "yes" | "true" | "1" | "on")
}

// ── Load ──────────────────────────────────────────────────────────────

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("diskcheck").join("disk.toml"))
    }

    /// Load from `path`, or from the default location when None. A missing
    /// default file yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match Self::config_path() {
                Some(p) if p.exists() => Self::from_file(&p),
                _ => Ok(Config::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Configured instances, or one default instance when none are listed.
    pub fn effective_instances(&self) -> Vec<InstanceConfig> {
        if self.instances.is_empty() {
            vec![InstanceConfig::default()]
        } else {
            self.instances.clone()
        }
    }
}
