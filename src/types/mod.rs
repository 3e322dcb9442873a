//! Core type definitions using newtype patterns for type safety.
//!
//! These types prevent common logic errors by making invalid states unrepresentable
//! at compile time.

mod port;
mod process;
mod scan_id;

pub use port::{Port, PortError, PortRange, PortSpec, COMMON_PORTS};
pub use process::{Pid, ProcessInfo, ProcessStatus};
pub use scan_id::ScanId;
