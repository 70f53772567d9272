use std::net::Ipv4Addr;

use anyhow::Context;
use colored::*;

use seekr_common::analysis::{PortAnalysis, PortScanReport};
use seekr_common::config::Config;
use seekr_common::warn;
use seekr_core::coordinator::ScanCoordinator;

use crate::commands::{self, ScanArgs};
use crate::sprint;
use crate::terminal::{colors, format, print};

pub async fn scan(target: Ipv4Addr, args: ScanArgs) -> anyhow::Result<()> {
    let mut config = Config::default();
    args.apply(&mut config);
    let mut coordinator = commands::coordinator(config)?;
    coordinator
        .identify()
        .context("failed to resolve the local network identity")?;

    let (report, analyses) = scan_one(&mut coordinator, target, args.no_analysis).await?;

    print::header(&format!("host {target}"));
    print_host(&report, analyses.as_deref());
    Ok(())
}

/// Scans one host and, unless disabled, analyses its open ports.
pub async fn scan_one(
    coordinator: &mut ScanCoordinator,
    target: Ipv4Addr,
    no_analysis: bool,
) -> anyhow::Result<(PortScanReport, Option<Vec<PortAnalysis>>)> {
    let report = coordinator
        .scan_host(target, None)
        .await
        .with_context(|| format!("port scan of {target} failed"))?;

    if let Some(degraded) = &report.degraded {
        warn!("{target}: results may be incomplete ({degraded})");
    }

    if no_analysis {
        return Ok((report, None));
    }

    let analyses = coordinator
        .analyze_host(target, &report.open_ports)
        .await
        .with_context(|| format!("service analysis of {target} failed"))?;
    Ok((report, Some(analyses)))
}

pub fn print_host(report: &PortScanReport, analyses: Option<&[PortAnalysis]>) {
    if report.open_ports.is_empty() {
        print::no_results("open ports");
        return;
    }

    match analyses {
        Some(analyses) => {
            for (idx, analysis) in analyses.iter().enumerate() {
                print::tree_head(idx, &format::port_title(analysis));
                let details = format::analysis_to_details(analysis);
                if !details.is_empty() {
                    print::as_tree_one_level(details);
                }
            }
        }
        None => {
            let ports: Vec<String> = report
                .open_ports
                .iter()
                .map(|p| p.to_string().color(colors::PORT).to_string())
                .collect();
            print::tree_head(0, &format!("{} open ports", ports.len()));
            sprint!(&format!(" {}", ports.join(", ")));
        }
    }
}
