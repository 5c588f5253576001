//! Filesystem space and inode metrics for a monitoring agent.
//!
//! Data comes either from the kernel mount table plus `statvfs`, or from
//! parsing `df` output. Both paths share one exclusion policy and emit the
//! same `system.disk.*` / `system.fs.inodes.*` gauges through a [`sink::MetricSink`].

pub mod check;
pub mod collectors;
pub mod config;
pub mod error;
pub mod models;
pub mod sink;

pub use check::{Backend, DiskCheck};
pub use config::{CollectionMode, Config, InstanceConfig};
pub use error::{CheckError, Result};

pub fn init_logging(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
