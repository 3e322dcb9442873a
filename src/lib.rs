//! # portwarden - local port scanner and process manager
//!
//! portwarden probes TCP ports on the loopback interface, works out which
//! process owns each open port, and can pause, resume or terminate those
//! processes.
//!
//! ## Features
//!
//! - **Bounded concurrency**: at most `concurrency` probes in flight, each
//!   bounded by a timeout
//! - **Process correlation**: open ports joined to their owners through the
//!   connection and process tables, tolerating permission denials and
//!   processes that vanish mid-scan
//! - **Lifecycle actions**: pause, resume and terminate with a plain
//!   success/message result
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portwarden::scanner::{scan, ScanConfig};
//! use portwarden::types::PortRange;
//!
//! #[tokio::main]
//! async fn main() {
//!     let range = PortRange::new(1, 1024).unwrap();
//!     let result = scan(range, ScanConfig::default(), None).await;
//!
//!     for (port, process) in result.open_ports() {
//!         println!("{} -> {:?}", port, process.as_ref().map(|p| p.pid));
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Validated newtypes for ports, ranges and processes
//! - [`scanner`] - The scan engine, probers, results and scan sessions
//! - [`correlate`] - Port to process correlation
//! - [`process`] - Pause, resume and terminate
//! - [`config`] - Persisted settings
//! - [`output`] - Output formatting utilities
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod correlate;
pub mod error;
pub mod output;
pub mod process;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{ActionError, CliError, ScanError};
pub use process::ActionOutcome;
pub use scanner::{scan, PortResult, ScanConfig, ScanEngine, ScanResult, ScanSession};
pub use types::{Pid, PortRange, PortSpec, ProcessInfo, ProcessStatus, ScanId};
