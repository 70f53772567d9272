use anyhow::Context;

use seekr_common::config::Config;
use seekr_common::success;

use crate::commands::discover::{print_devices, run_discovery};
use crate::commands::scan::{print_host, scan_one};
use crate::commands::{self, DiscoveryArgs, ScanArgs};
use crate::sprint;
use crate::terminal::print;

pub async fn sweep(discovery: DiscoveryArgs, scan: ScanArgs) -> anyhow::Result<()> {
    let mut config = Config::default();
    discovery.apply(&mut config);
    scan.apply(&mut config);
    let mut coordinator = commands::coordinator(config)?;

    let devices = run_discovery(&mut coordinator, &discovery).await?;
    if devices.is_empty() {
        print::header("zero hosts detected");
        print::no_results("hosts");
        return Ok(());
    }

    print::header("network discovery");
    print_devices(&devices);

    for device in &devices {
        let (report, analyses) = scan_one(&mut coordinator, device.ip, scan.no_analysis)
            .await
            .with_context(|| format!("sweep stopped at {}", device.ip))?;

        sprint!();
        print::header(&format!("host {}", device.ip));
        print_host(&report, analyses.as_deref());
    }

    sprint!();
    success!("Swept {} hosts", devices.len());
    Ok(())
}
