//! # Port Analyzer
//!
//! Classifies open ports by their conventional service name and, for web
//! services, reads the TLS certificate and the HTTP response headers.
//!
//! Probes run on their own, smaller [`WorkerPool`]. A failed probe is stored
//! on its port and never affects the other ports.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use seekr_common::analysis::PortAnalysis;
use seekr_common::config::{self, Config, MAX_ANALYSIS_CONCURRENCY};
use seekr_common::error::ScanError;
use seekr_common::event::{EventSink, ScanEvent};
use seekr_protocols::services;
use tracing::debug;

use crate::network::ServiceProber;
use crate::pool::WorkerPool;

pub struct PortAnalyzer {
    prober: Arc<dyn ServiceProber>,
    sink: Arc<dyn EventSink>,
    concurrency: usize,
    probe_timeout: Duration,
}

impl PortAnalyzer {
    pub fn new(
        prober: Arc<dyn ServiceProber>,
        sink: Arc<dyn EventSink>,
        concurrency: usize,
        probe_timeout: Duration,
    ) -> Result<Self, ScanError> {
        config::check_pool("analysis_concurrency", concurrency, MAX_ANALYSIS_CONCURRENCY)?;
        config::check_timeout("probe_timeout", probe_timeout)?;
        Ok(Self {
            prober,
            sink,
            concurrency,
            probe_timeout,
        })
    }

    pub fn from_config(
        config: &Config,
        prober: Arc<dyn ServiceProber>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ScanError> {
        Self::new(prober, sink, config.analysis_concurrency, config.probe_timeout)
    }

    /// Conventional service name of a TCP port, `"unknown"` when unlisted.
    pub fn classify(port: u16) -> &'static str {
        services::classify(port)
    }

    /// Analyses every port in `ports` and returns the results sorted by port.
    pub async fn analyze(&self, ip: Ipv4Addr, ports: &BTreeSet<u16>) -> Result<Vec<PortAnalysis>, ScanError> {
        self.sink.emit(ScanEvent::AnalysisStarted { ip, ports: ports.len() });

        let prober = Arc::clone(&self.prober);
        let probe_timeout = self.probe_timeout;
        let work = move |port: u16| {
            let prober = Arc::clone(&prober);
            async move { analyze_port(prober.as_ref(), ip, port, probe_timeout).await }
        };

        let mut analyses: Vec<PortAnalysis> = Vec::with_capacity(ports.len());
        WorkerPool::new("probe", self.concurrency)
            .run(ports.iter().copied().collect(), work, |analysis: PortAnalysis| {
                self.sink.emit(ScanEvent::PortAnalyzed {
                    ip,
                    analysis: analysis.clone(),
                });
                analyses.push(analysis);
            })
            .await?;

        analyses.sort_by_key(|a| a.port);
        self.sink.emit(ScanEvent::AnalysisFinished { ip });
        Ok(analyses)
    }
}

async fn analyze_port(prober: &dyn ServiceProber, ip: Ipv4Addr, port: u16, timeout: Duration) -> PortAnalysis {
    let service = services::classify(port);
    let mut analysis = PortAnalysis::new(port, service);

    if services::is_tls_bearing(service) {
        let result = prober.probe_tls(ip, port, timeout).await;
        if let Err(e) = &result {
            debug!("{ip}:{port} {e}");
        }
        analysis.tls = Some(result);
    }

    if services::is_http_bearing(service) {
        let result = prober.probe_http(ip, port, timeout).await;
        if let Err(e) = &result {
            debug!("{ip}:{port} {e}");
        }
        analysis.http = Some(result);
    }

    analysis
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSink, ScriptedProber, http_info, tls_info};
    use seekr_common::error::{HttpError, TlsError};
    use seekr_common::event::NullSink;

    const HOST: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 20);
    const TIMEOUT: Duration = Duration::from_secs(3);

    fn analyzer(prober: Arc<ScriptedProber>) -> PortAnalyzer {
        PortAnalyzer::new(prober, Arc::new(NullSink), 10, TIMEOUT).unwrap()
    }

    #[test]
    fn classify_uses_the_service_table() {
        assert_eq!(PortAnalyzer::classify(22), "ssh");
        assert_eq!(PortAnalyzer::classify(443), "https");
        assert_eq!(PortAnalyzer::classify(40000), "unknown");
    }

    #[tokio::test]
    async fn ssh_http_https_get_the_right_probes() {
        let prober = Arc::new(
            ScriptedProber::default()
                .tls(443, Ok(tls_info("router.lan")))
                .http(80, Ok(http_info("lighttpd")))
                .http(443, Ok(http_info("nginx"))),
        );
        let analyses = analyzer(Arc::clone(&prober))
            .analyze(HOST, &BTreeSet::from([443, 22, 80]))
            .await
            .unwrap();

        let ports: Vec<u16> = analyses.iter().map(|a| a.port).collect();
        assert_eq!(ports, vec![22, 80, 443]);

        let ssh = &analyses[0];
        assert_eq!(ssh.service, "ssh");
        assert!(ssh.tls.is_none() && ssh.http.is_none());

        let http = &analyses[1];
        assert_eq!(http.service, "http");
        assert!(http.tls.is_none());
        assert_eq!(http.http, Some(Ok(http_info("lighttpd"))));

        let https = &analyses[2];
        assert_eq!(https.service, "https");
        assert_eq!(https.tls, Some(Ok(tls_info("router.lan"))));
        assert_eq!(https.http, Some(Ok(http_info("nginx"))));

        assert_eq!(prober.calls(), vec![("http", 80), ("http", 443), ("tls", 443)]);
    }

    #[tokio::test]
    async fn probe_failures_stay_on_their_port() {
        let prober = Arc::new(
            ScriptedProber::default()
                .tls(443, Err(TlsError::new("handshake failed: unexpected EOF")))
                .http(443, Ok(http_info("nginx")))
                .http(80, Err(HttpError::new("GET timed out"))),
        );
        let analyses = analyzer(prober)
            .analyze(HOST, &BTreeSet::from([22, 80, 443]))
            .await
            .unwrap();

        assert_eq!(analyses.len(), 3);
        assert!(matches!(analyses[1].http, Some(Err(_))));
        assert!(matches!(analyses[2].tls, Some(Err(_))));
        assert_eq!(analyses[2].http, Some(Ok(http_info("nginx"))));
    }

    #[tokio::test]
    async fn unknown_services_are_listed_without_probes() {
        let prober = Arc::new(ScriptedProber::default());
        let analyses = analyzer(Arc::clone(&prober))
            .analyze(HOST, &BTreeSet::from([31337]))
            .await
            .unwrap();

        assert_eq!(analyses, vec![PortAnalysis::new(31337, "unknown")]);
        assert!(prober.calls().is_empty());
    }

    #[tokio::test]
    async fn no_ports_means_no_work() {
        let sink = Arc::new(RecordingSink::default());
        let analyzer = PortAnalyzer::new(
            Arc::new(ScriptedProber::default()),
            Arc::clone(&sink) as Arc<dyn EventSink>,
            10,
            TIMEOUT,
        )
        .unwrap();

        let analyses = analyzer.analyze(HOST, &BTreeSet::new()).await.unwrap();
        assert!(analyses.is_empty());
        assert_eq!(
            sink.events(),
            vec![
                ScanEvent::AnalysisStarted { ip: HOST, ports: 0 },
                ScanEvent::AnalysisFinished { ip: HOST },
            ]
        );
    }

    #[test]
    fn pool_bounds_are_checked() {
        let prober = Arc::new(ScriptedProber::default());
        assert!(matches!(
            PortAnalyzer::new(prober.clone(), Arc::new(NullSink), 0, TIMEOUT),
            Err(ScanError::Configuration(_))
        ));
        assert!(matches!(
            PortAnalyzer::new(prober, Arc::new(NullSink), 257, TIMEOUT),
            Err(ScanError::Configuration(_))
        ));
    }
}
