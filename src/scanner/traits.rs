//! Scanner trait abstractions.
//!
//! [`Prober`] is the seam between the engine and the network, so tests can
//! swap in deterministic probes. [`ScanObserver`] is the optional progress
//! side channel.

use crate::error::ProbeResult;
use async_trait::async_trait;

/// Performs a single connection probe.
///
/// # Example
///
/// ```ignore
/// use portwarden::scanner::{Prober, TcpConnectProber};
///
/// async fn is_open<P: Prober>(prober: &P, port: u16) -> bool {
///     prober.probe(port).await.is_ok()
/// }
/// ```
#[async_trait]
pub trait Prober: Send + Sync {
    /// Try to establish a connection to `port`.
    ///
    /// `Ok` means the port accepted the connection. The engine bounds every
    /// call with the configured timeout, so implementations need not.
    async fn probe(&self, port: u16) -> ProbeResult<()>;
}

/// Receives `(completed, total)` after every finished probe.
///
/// Invocations follow completion order. They are a UI side channel only and
/// carry no guarantee about when the matching result becomes visible.
pub trait ScanObserver: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize);
}

impl<F> ScanObserver for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}

impl ScanObserver for indicatif::ProgressBar {
    fn on_progress(&self, completed: usize, total: usize) {
        self.set_length(total as u64);
        self.set_position(completed as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_observer() {
        let seen = Mutex::new(Vec::new());
        let observer = |completed: usize, total: usize| seen.lock().unwrap().push((completed, total));
        observer.on_progress(1, 3);
        observer.on_progress(2, 3);
        assert_eq!(*seen.lock().unwrap(), vec![(1, 3), (2, 3)]);
    }

    #[test]
    fn test_progress_bar_observer() {
        let bar = indicatif::ProgressBar::hidden();
        bar.on_progress(5, 10);
        assert_eq!(bar.position(), 5);
        assert_eq!(bar.length(), Some(10));
    }
}
