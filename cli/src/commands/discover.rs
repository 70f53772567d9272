use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;

use seekr_common::config::Config;
use seekr_common::network::device::Device;
use seekr_core::coordinator::ScanCoordinator;

use crate::commands::{self, DiscoveryArgs};
use crate::sprint;
use crate::terminal::{colors, format, print};

pub async fn discover(args: DiscoveryArgs) -> anyhow::Result<()> {
    let mut config = Config::default();
    args.apply(&mut config);
    let mut coordinator = commands::coordinator(config)?;

    let start_time = Instant::now();
    let devices = run_discovery(&mut coordinator, &args).await?;
    discovery_ends(&devices, start_time.elapsed());
    Ok(())
}

/// Identifies the local network, then sweeps either it or the requested block.
pub async fn run_discovery(
    coordinator: &mut ScanCoordinator,
    args: &DiscoveryArgs,
) -> anyhow::Result<Vec<Device>> {
    let ctx = coordinator
        .identify()
        .context("failed to resolve the local network identity")?;

    let devices = match &args.range {
        Some(range) => coordinator
            .discover_range(range)
            .await
            .with_context(|| format!("discovery of {range} failed"))?,
        None => coordinator
            .discover()
            .await
            .with_context(|| format!("discovery of {} failed", ctx.cidr_range))?,
    };
    Ok(devices)
}

fn discovery_ends(devices: &[Device], total_time: Duration) {
    if devices.is_empty() {
        print::header("zero hosts detected");
        print::no_results("hosts");
        return;
    }

    print::header("network discovery");
    print_devices(devices);
    print_summary(devices.len(), total_time);
}

pub fn print_devices(devices: &[Device]) {
    for (idx, device) in devices.iter().enumerate() {
        print::tree_head(idx, &device.ip.to_string());
        print::as_tree_one_level(format::device_to_details(device));
        if idx + 1 != devices.len() {
            sprint!();
        }
    }
}

fn print_summary(count: usize, total_time: Duration) {
    let active_hosts: ColoredString = format!("{count} active hosts").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output = format!("Discovery Complete: {active_hosts} identified in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    print::fat_separator();
    print::centerln(&output);
}
