//! The disk check: one stateless collection cycle per call.
//!
//! A cycle rebuilds the exclusion policy from the instance, reads partitions
//! either from the mount table and `statvfs` or from `df` output, and turns
//! every accepted device into `system.disk.*` and `system.fs.inodes.*` gauges.

use crate::collectors::classifier::{self, ExclusionPolicy};
use crate::collectors::df::{self, DfCommand, DfRunner};
use crate::collectors::extract;
use crate::collectors::layout::{Layout, Platform};
use crate::collectors::partitions::{HostPartitions, PartitionSource};
use crate::config::{CollectionMode, Config, InstanceConfig};
use crate::error::{CheckError, Result};
use crate::models::disk::{DeviceRecord, Partition};
use crate::models::metric::{MetricKind, MetricSample};
use crate::sink::MetricSink;
use log::{debug, warn};

/// Data source for a check.
pub enum Backend {
    Statvfs(Box<dyn PartitionSource>),
    Df(Box<dyn DfRunner>),
}

impl Backend {
    /// Host backend for `mode`. The mount table is read from `/proc`, so
    /// `statvfs` mode is refused off Linux.
    pub fn for_mode(mode: CollectionMode, platform: Platform) -> Result<Self> {
        match mode {
            CollectionMode::Statvfs if platform != Platform::Linux => Err(CheckError::config(
                "statvfs mode reads /proc and is only supported on Linux; use mode = \"df\"",
            )),
            CollectionMode::Statvfs => Ok(Backend::Statvfs(Box::new(HostPartitions::default()))),
            CollectionMode::Df      => Ok(Backend::Df(Box::new(DfCommand::default()))),
        }
    }
}

pub struct DiskCheck {
    backend:  Backend,
    platform: Platform,
}

impl DiskCheck {
    /// Build a check against the local host from a loaded config.
    pub fn new(config: &Config) -> Result<Self> {
        let platform = Platform::current();
        Self::with_backend(
            &config.instances,
            Backend::for_mode(config.init_config.mode, platform)?,
            platform,
        )
    }

    /// Only one instance is supported; more is a configuration error.
    pub fn with_backend(instances: &[InstanceConfig], backend: Backend, platform: Platform) -> Result<Self> {
        if instances.len() > 1 {
            return Err(CheckError::config(format!(
                "disk check only supports one configured instance, got {}",
                instances.len()
            )));
        }
        Ok(DiskCheck { backend, platform })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Run one cycle and emit every gauge into `sink`. Nothing is emitted
    /// when the cycle fails.
    pub fn check(&self, instance: &InstanceConfig, sink: &mut dyn MetricSink) -> Result<()> {
        for s in self.collect(instance)? {
            sink.gauge(&s.name, s.value, &s.tags, &s.device_name);
        }
        Ok(())
    }

    /// Run one cycle and return its metrics.
    pub fn collect(&self, instance: &InstanceConfig) -> Result<Vec<MetricSample>> {
        match &self.backend {
            Backend::Statvfs(source) => collect_partitions(source.as_ref(), instance),
            Backend::Df(runner)      => collect_df(runner.as_ref(), self.platform, instance),
        }
    }
}

fn push_samples(
    out:         &mut Vec<MetricSample>,
    kind:        MetricKind,
    values:      extract::Values,
    tags:        &[String],
    device_name: &str,
) {
    for (suffix, value) in values {
        out.push(MetricSample {
            name:        kind.metric_name(suffix),
            value,
            tags:        tags.to_vec(),
            device_name: device_name.to_string(),
        });
    }
}

// ── statvfs mode ──────────────────────────────────────────────────────

fn collect_partitions(source: &dyn PartitionSource, instance: &InstanceConfig) -> Result<Vec<MetricSample>> {
    let policy = ExclusionPolicy::from_instance(instance, classifier::PARTITION_FAKE_DEVICES)?;
    let mut out = Vec::new();

    for part in source.partitions(instance.all_partitions)? {
        if let Some(why) = policy.exclusion(&part.device, Some(&part.fs_type)) {
            debug!("Excluded {} on {}: {}", part.device, part.mountpoint, why.label());
            continue;
        }

        // An unreadable mountpoint is skipped, not fatal.
        let (space, inodes) = match read_partition(source, &part) {
            Ok(v)  => v,
            Err(e) => {
                warn!("Skipping {}: {}", part.mountpoint, e);
                continue;
            }
        };

        let tags = policy.tags(Some(&part.fs_type));
        let device_name = policy.device_name(&part.device, &part.mountpoint);
        push_samples(&mut out, MetricKind::Space, space, &tags, &device_name);
        push_samples(&mut out, MetricKind::Inodes, inodes, &tags, &device_name);
    }
    Ok(out)
}

fn read_partition(source: &dyn PartitionSource, part: &Partition) -> Result<(extract::Values, extract::Values)> {
    let usage  = source.disk_usage(&part.mountpoint)?;
    let inodes = source.inode_stats(&part.mountpoint)?;
    Ok((extract::from_usage(&usage), extract::from_inodes(&inodes)))
}

// ── df mode ───────────────────────────────────────────────────────────

fn collect_df(runner: &dyn DfRunner, platform: Platform, instance: &InstanceConfig) -> Result<Vec<MetricSample>> {
    let policy = ExclusionPolicy::from_instance(instance, classifier::df_fake_devices(platform))?;
    let mut out = Vec::new();

    for kind in [MetricKind::Space, MetricKind::Inodes] {
        let Some(layout) = Layout::select(platform, kind) else { continue };
        let output = runner.run(layout.df_args())?;
        debug!("df {}:\n{}", layout.df_args().join(" "), output);

        for tokens in df::parse_rows(&output, layout) {
            let Some(record) = DeviceRecord::from_tokens(&tokens, layout) else { continue };
            if let Some(why) = policy.record_exclusion(&record) {
                debug!("Excluded {}: {}", record.name, why.label());
                continue;
            }
            debug!("Passed: {:?}", record);

            let tags = policy.tags(record.fs_type.as_deref());
            let device_name = policy.device_name(&record.name, record.mountpoint());
            push_samples(&mut out, kind, extract::from_record(&record, layout), &tags, &device_name);
        }
    }
    Ok(out)
}
