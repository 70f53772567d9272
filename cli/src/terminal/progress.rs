//! Renders core events as progress bars.
//!
//! Each stage gets its own span; `tracing-indicatif` draws a bar for every
//! live span and removes it once the span is dropped.

use std::sync::Mutex;

use indicatif::ProgressStyle;
use tracing::{Span, debug, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use seekr_common::event::{EventSink, ScanEvent};

const SWEEP_TEMPLATE: &str = "{spinner:.blue} {msg}";
const BAR_TEMPLATE: &str = "{spinner:.blue} {msg} [{bar:30.green/white}] {pos}/{len}";
const TICKS: &[&str] = &[
    "▁▁▁▁▁", "▁▂▂▂▁", "▁▄▂▄▁", "▂▄▆▄▂", "▄▆█▆▄", "▂▄▆▄▂", "▁▄▂▄▁", "▁▂▂▂▁",
];

#[derive(Default)]
pub struct TerminalSink {
    sweep: Mutex<Option<Span>>,
    scan: Mutex<Option<Span>>,
    analysis: Mutex<Option<Span>>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::default()
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(TICKS)
}

fn replace(slot: &Mutex<Option<Span>>, span: Option<Span>) {
    if let Ok(mut guard) = slot.lock() {
        *guard = span;
    }
}

fn with_span(slot: &Mutex<Option<Span>>, f: impl FnOnce(&Span)) {
    if let Ok(guard) = slot.lock() {
        if let Some(span) = guard.as_ref() {
            f(span);
        }
    }
}

impl EventSink for TerminalSink {
    fn emit(&self, event: ScanEvent) {
        match event {
            ScanEvent::IdentityResolved(ctx) => debug!("Identity resolved: {ctx}"),
            ScanEvent::SweepStarted { range, targets } => {
                let span = info_span!("sweep", indicatif.pb_show = true);
                span.pb_set_style(&style(SWEEP_TEMPLATE));
                span.pb_set_message(&format!("Sweeping {range} ({targets} addresses)"));
                span.pb_start();
                replace(&self.sweep, Some(span));
            }
            ScanEvent::DeviceFound(device) => {
                debug!("Reply from {device}");
                with_span(&self.sweep, |span| {
                    span.pb_set_message(&format!("Last reply from {}", device.ip));
                });
            }
            ScanEvent::SweepFinished { devices } => {
                debug!("Sweep finished with {devices} devices");
                replace(&self.sweep, None);
            }
            ScanEvent::PortScanStarted { ip, total } => {
                let span = info_span!("port_scan", indicatif.pb_show = true);
                span.pb_set_style(&style(BAR_TEMPLATE));
                span.pb_set_length(total as u64);
                span.pb_set_message(&format!("Scanning {ip}"));
                span.pb_start();
                replace(&self.scan, Some(span));
            }
            ScanEvent::PortScanProgress { completed, .. } => {
                with_span(&self.scan, |span| span.pb_set_position(completed as u64));
            }
            ScanEvent::PortScanFinished { ip, open } => {
                debug!("{ip}: {open} open ports");
                replace(&self.scan, None);
            }
            ScanEvent::AnalysisStarted { ip, ports } => {
                let span = info_span!("analysis", indicatif.pb_show = true);
                span.pb_set_style(&style(BAR_TEMPLATE));
                span.pb_set_length(ports as u64);
                span.pb_set_message(&format!("Analysing {ip}"));
                span.pb_start();
                replace(&self.analysis, Some(span));
            }
            ScanEvent::PortAnalyzed { ip, analysis } => {
                debug!("{ip}:{} classified as {}", analysis.port, analysis.service);
                with_span(&self.analysis, |span| span.pb_inc(1));
            }
            ScanEvent::AnalysisFinished { .. } => replace(&self.analysis, None),
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
