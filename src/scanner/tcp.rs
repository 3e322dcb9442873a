//! TCP connect prober.
//!
//! Performs standard TCP connect probes using the operating system's
//! socket API. The socket belongs to the probe alone and is closed as soon
//! as the handshake result is known.

use crate::error::{ProbeError, ProbeResult};
use crate::scanner::traits::Prober;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::TcpStream;

/// Connects to ports on a fixed local address.
///
/// Does not require elevated privileges.
#[derive(Debug, Clone, Copy)]
pub struct TcpConnectProber {
    target: IpAddr,
}

impl TcpConnectProber {
    /// A prober for `127.0.0.1`, the only address portwarden scans.
    pub fn loopback() -> Self {
        Self {
            target: IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }

    pub fn target(&self) -> IpAddr {
        self.target
    }
}

impl Default for TcpConnectProber {
    fn default() -> Self {
        Self::loopback()
    }
}

fn classify(err: io::Error) -> ProbeError {
    if err.kind() == io::ErrorKind::ConnectionRefused {
        return ProbeError::ConnectionRefused;
    }
    if err.to_string().to_lowercase().contains("unreachable") {
        return ProbeError::Unreachable(err.to_string());
    }
    ProbeError::Io(err)
}

#[async_trait]
impl Prober for TcpConnectProber {
    async fn probe(&self, port: u16) -> ProbeResult<()> {
        let addr = SocketAddr::new(self.target, port);
        let stream = TcpStream::connect(addr).await.map_err(classify)?;
        drop(stream);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_prober_targets_loopback() {
        assert_eq!(
            TcpConnectProber::default().target(),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
    }

    #[tokio::test]
    async fn test_probe_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(TcpConnectProber::loopback().probe(port).await.is_ok());
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = TcpConnectProber::loopback().probe(port).await;
        assert!(matches!(result, Err(ProbeError::ConnectionRefused)));
    }
}
