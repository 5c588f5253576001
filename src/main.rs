use anyhow::{Context, Result};
use clap::Parser;
use diskcheck::config::{CollectionMode, Config};
use diskcheck::models::metric::MetricSample;
use diskcheck::sink::Aggregator;
use diskcheck::{DiskCheck, InstanceConfig};
use log::{error, info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "diskcheck", about = "Filesystem space and inode metrics", version = "0.1")]
struct Cli {
    /// Path to the check config (TOML). Defaults to the user config dir.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the collection mode: statvfs or df
    #[arg(short, long)]
    mode: Option<String>,

    /// Print a JSON snapshot instead of one metric per line
    #[arg(long)]
    json: bool,

    /// Repeat the check every N milliseconds (minimum 500) instead of running once
    #[arg(short, long)]
    interval: Option<u64>,

    /// Debug logging (RUST_LOG still applies)
    #[arg(short, long)]
    verbose: bool,
}

const MIN_INTERVAL_MS: u64 = 500;

fn main() -> Result<()> {
    let cli = Cli::parse();
    diskcheck::init_logging(cli.verbose);

    let mut cfg = Config::load(cli.config.as_deref()).context("loading check config")?;
    if let Some(name) = &cli.mode {
        cfg.init_config.mode = CollectionMode::from_name(name)
            .with_context(|| format!("unknown mode {:?} (expected statvfs or df)", name))?;
    }

    let check = DiskCheck::new(&cfg).context("configuring disk check")?;
    let instance = cfg.effective_instances().remove(0);

    match cli.interval {
        None     => run_once(&check, &instance, cli.json),
        Some(ms) => run_daemon(&check, &instance, cli.json, ms),
    }
}

fn run_once(check: &DiskCheck, instance: &InstanceConfig, json: bool) -> Result<()> {
    let mut agg = Aggregator::new();
    check.check(instance, &mut agg).context("disk check failed")?;
    print_samples(&agg.flush(), json)
}

fn run_daemon(check: &DiskCheck, instance: &InstanceConfig, json: bool, interval_ms: u64) -> Result<()> {
    let interval_ms = effective_interval(interval_ms);
    info!("diskcheck starting (interval {}ms, platform {:?})", interval_ms, check.platform());
    let tick = std::time::Duration::from_millis(interval_ms);
    let mut agg = Aggregator::new();

    loop {
        // A failed cycle reports nothing and the next one runs as usual.
        match check.check(instance, &mut agg) {
            Ok(()) => print_samples(&agg.flush(), json)?,
            Err(e) => {
                if e.is_config() { return Err(e.into()); }
                error!("disk check cycle failed: {}", e);
            }
        }
        std::thread::sleep(tick);
    }
}

fn print_samples(samples: &[MetricSample], json: bool) -> Result<()> {
    if json {
        let snapshot = serde_json::json!({
            "timestamp": chrono::Local::now().to_rfc3339(),
            "metrics":   samples,
        });
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    for s in samples {
        let tags = if s.tags.is_empty() { String::new() } else { format!(" [{}]", s.tags.join(",")) };
        println!("{:<26} {:>16.3}  {}{}", s.name, s.value, s.device_name, tags);
    }
    Ok(())
}

fn effective_interval(requested_ms: u64) -> u64 {
    if requested_ms < MIN_INTERVAL_MS {
        warn!("interval {}ms is below the {}ms minimum, using {}ms", requested_ms, MIN_INTERVAL_MS, MIN_INTERVAL_MS);
        return MIN_INTERVAL_MS;
    }
    requested_ms
}
