//! Scanner module - probes local ports concurrently.
//!
//! The [`ScanEngine`] drives a bounded number of TCP connect probes against
//! the loopback address, runs process correlation inline for every open
//! port, and folds the per-port outcomes into a single [`ScanResult`].

mod engine;
mod result;
mod session;
mod tcp;
mod traits;

pub use engine::ScanEngine;
pub use result::{PortResult, ScanResult};
pub use session::{Progress, ScanSession, SessionState};
pub use tcp::TcpConnectProber;
pub use traits::{Prober, ScanObserver};

use crate::error::{EngineResult, ScanError};
use crate::types::PortRange;
use std::time::Duration;

/// Per-scan tuning, fixed for the lifetime of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    timeout: Duration,
    concurrency: usize,
}

impl ScanConfig {
    /// Default per-probe timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);
    /// Default number of simultaneous probes.
    pub const DEFAULT_CONCURRENCY: usize = 100;

    /// Validate and build a configuration.
    ///
    /// Both values must be positive; neither is clamped.
    pub fn new(timeout: Duration, concurrency: usize) -> EngineResult<Self> {
        if timeout.is_zero() {
            return Err(ScanError::InvalidConfig("timeout must be positive".into()));
        }
        if concurrency == 0 {
            return Err(ScanError::InvalidConfig(
                "concurrency must be at least 1".into(),
            ));
        }
        Ok(Self {
            timeout,
            concurrency,
        })
    }

    /// Per-probe connection timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Maximum probes in flight.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            concurrency: Self::DEFAULT_CONCURRENCY,
        }
    }
}

/// Scan `range` on loopback with the default prober and the host correlator.
///
/// # Example
///
/// ```no_run
/// use portwarden::scanner::{scan, ScanConfig};
/// use portwarden::types::PortRange;
///
/// # async fn run() -> Result<(), portwarden::ScanError> {
/// let range = PortRange::new(1, 1024)?;
/// let result = scan(range, ScanConfig::default(), None).await;
/// for (port, owner) in result.open_ports() {
///     println!("{port}: {:?}", owner.as_ref().map(|p| p.pid));
/// }
/// # Ok(())
/// # }
/// ```
pub async fn scan(
    range: PortRange,
    config: ScanConfig,
    on_progress: Option<&dyn ScanObserver>,
) -> ScanResult {
    ScanEngine::new(config).scan(range, on_progress).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(ScanConfig::new(Duration::from_millis(1), 1).is_ok());
        assert!(matches!(
            ScanConfig::new(Duration::ZERO, 10),
            Err(ScanError::InvalidConfig(_))
        ));
        assert!(matches!(
            ScanConfig::new(Duration::from_secs(1), 0),
            Err(ScanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(500));
        assert_eq!(config.concurrency(), 100);
    }
}
