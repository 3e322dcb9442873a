//! The scan engine: bounded-parallel probing with inline correlation.

use crate::correlate::{system_correlator, Correlator};
use crate::error::{ProbeError, SessionError};
use crate::scanner::result::{Aggregator, PortResult, ScanResult};
use crate::scanner::session::ScanSession;
use crate::scanner::tcp::TcpConnectProber;
use crate::scanner::traits::{Prober, ScanObserver};
use crate::scanner::ScanConfig;
use crate::types::PortRange;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Probes every port of a range on loopback and correlates the open ones.
///
/// At most `config.concurrency()` probes are in flight at once. Correlation
/// for an open port runs on the slot that found it, before the slot is
/// released. The engine holds no state between scans and may be reused.
#[derive(Clone)]
pub struct ScanEngine {
    config: ScanConfig,
    prober: Arc<dyn Prober>,
    correlator: Arc<dyn Correlator>,
}

impl ScanEngine {
    /// An engine probing `127.0.0.1` and correlating through the host tables.
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            prober: Arc::new(TcpConnectProber::loopback()),
            correlator: Arc::new(system_correlator()),
        }
    }

    /// Replace the prober.
    pub fn with_prober(mut self, prober: impl Prober + 'static) -> Self {
        self.prober = Arc::new(prober);
        self
    }

    /// Replace the correlator.
    pub fn with_correlator(mut self, correlator: impl Correlator + 'static) -> Self {
        self.correlator = Arc::new(correlator);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan `range` and return the aggregated result.
    ///
    /// Never fails once started: probe and correlation errors end up as
    /// closed ports or missing process details.
    pub async fn scan(&self, range: PortRange, observer: Option<&dyn ScanObserver>) -> ScanResult {
        let total = range.len();
        let started = Instant::now();
        info!(
            %range,
            concurrency = self.config.concurrency(),
            timeout_ms = self.config.timeout().as_millis() as u64,
            "scan started"
        );

        let mut aggregator = Aggregator::new(range);
        let mut results = stream::iter(range.iter())
            .map(|port| self.check_port(port))
            .buffer_unordered(self.config.concurrency());

        while let Some(result) = results.next().await {
            aggregator.record(result);
            if let Some(observer) = observer {
                observer.on_progress(aggregator.completed(), total);
            }
        }

        let result = aggregator.finish(started.elapsed());
        info!(
            %range,
            open = result.open_ports().len(),
            closed = result.closed_ports().len(),
            elapsed_ms = result.duration().as_millis() as u64,
            "scan finished"
        );
        result
    }

    /// Scan `range`, reporting progress into `session` and keeping the result
    /// there. Fails only when the session already has a scan running.
    pub async fn scan_with_session(
        &self,
        range: PortRange,
        session: &ScanSession,
        observer: Option<&dyn ScanObserver>,
    ) -> Result<Arc<ScanResult>, SessionError> {
        let guard = session.begin(range.len())?;
        let relay = |completed: usize, total: usize| {
            session.on_progress(completed, total);
            if let Some(observer) = observer {
                observer.on_progress(completed, total);
            }
        };

        let result = self.scan(range, Some(&relay)).await;
        Ok(guard.finish(result))
    }

    /// Probe one port and, when open, resolve its owner.
    async fn check_port(&self, port: u16) -> PortResult {
        let outcome = match timeout(self.config.timeout(), self.prober.probe(port)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProbeError::Timeout),
        };

        if let Err(e) = outcome {
            debug!(port, reason = %e, "closed");
            return PortResult::closed(port);
        }

        debug!(port, "open");
        let correlator = Arc::clone(&self.correlator);
        // Reading /proc is blocking file I/O.
        let process = match tokio::task::spawn_blocking(move || correlator.correlate(port)).await
        {
            Ok(process) => process,
            Err(e) => {
                warn!(port, error = %e, "correlation task failed");
                None
            }
        };

        PortResult::open(port, process)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::NoCorrelation;
    use crate::error::ProbeResult;
    use crate::types::{Pid, ProcessInfo};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Reports a fixed set of ports as open.
    struct FixedProber(HashSet<u16>);

    #[async_trait]
    impl Prober for FixedProber {
        async fn probe(&self, port: u16) -> ProbeResult<()> {
            if self.0.contains(&port) {
                Ok(())
            } else {
                Err(ProbeError::ConnectionRefused)
            }
        }
    }

    /// Never answers.
    struct HangingProber;

    #[async_trait]
    impl Prober for HangingProber {
        async fn probe(&self, _port: u16) -> ProbeResult<()> {
            std::future::pending().await
        }
    }

    struct OwnerOf(u16, Pid);

    impl Correlator for OwnerOf {
        fn correlate(&self, port: u16) -> Option<ProcessInfo> {
            (port == self.0).then(|| ProcessInfo::degraded(self.1))
        }
    }

    fn engine(concurrency: usize) -> ScanEngine {
        ScanEngine::new(ScanConfig::new(Duration::from_millis(200), concurrency).unwrap())
    }

    #[tokio::test]
    async fn test_partitions_range() {
        let engine = engine(4)
            .with_prober(FixedProber([3, 7].into()))
            .with_correlator(OwnerOf(7, Pid::new(99)));
        let range = PortRange::new(1, 10).unwrap();

        let result = engine.scan(range, None).await;

        assert_eq!(result.total_scanned(), 10);
        assert_eq!(result.open_ports().keys().copied().collect::<Vec<_>>(), vec![3, 7]);
        assert!(result.process_for(3).is_none());
        assert_eq!(result.process_for(7).unwrap().pid, Pid::new(99));

        let closed: HashSet<u16> = result.closed_ports().iter().copied().collect();
        assert_eq!(closed, HashSet::from([1, 2, 4, 5, 6, 8, 9, 10]));
        assert_eq!(closed.len(), result.closed_ports().len());
    }

    #[tokio::test]
    async fn test_timeout_counts_as_closed() {
        let engine = ScanEngine::new(ScanConfig::new(Duration::from_millis(20), 8).unwrap())
            .with_prober(HangingProber)
            .with_correlator(NoCorrelation);

        let result = engine.scan(PortRange::new(100, 115).unwrap(), None).await;

        assert!(result.open_ports().is_empty());
        assert_eq!(result.closed_ports().len(), 16);
    }

    #[tokio::test]
    async fn test_progress_reports_every_probe() {
        let engine = engine(3)
            .with_prober(FixedProber(HashSet::new()))
            .with_correlator(NoCorrelation);
        let seen = Mutex::new(Vec::new());
        let observer = |completed: usize, total: usize| seen.lock().unwrap().push((completed, total));

        engine.scan(PortRange::new(50, 54).unwrap(), Some(&observer)).await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]
        );
    }

    #[tokio::test]
    async fn test_session_keeps_result() {
        let engine = engine(2)
            .with_prober(FixedProber([5].into()))
            .with_correlator(NoCorrelation);
        let session = ScanSession::new();

        let result = engine
            .scan_with_session(PortRange::new(1, 8).unwrap(), &session, None)
            .await
            .unwrap();

        assert_eq!(session.state(), crate::scanner::SessionState::Finished);
        assert_eq!(session.progress().completed, 8);
        assert!(Arc::ptr_eq(&result, &session.last_result().unwrap()));
    }
}
