//! Error types for portwarden.
//!
//! Uses `thiserror` for ergonomic error definitions. Only [`ScanError`] and
//! [`ActionError`] ever reach a library caller; probe and correlation errors
//! are classified here but absorbed by the engine.

use std::path::PathBuf;
use thiserror::Error;

/// Validation errors raised before any probing starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("invalid port range {start}-{end}: expected 1 <= start <= end <= 65535")]
    InvalidRange { start: u32, end: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for scan setup.
pub type EngineResult<T> = Result<T, ScanError>;

/// Why a single probe failed. Every variant classifies the port as closed.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("connection timed out")]
    Timeout,

    #[error("connection refused")]
    ConnectionRefused,

    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProbeResult<T> = Result<T, ProbeError>;

/// Failure while reading the connection or process tables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    /// The process is gone (or never existed).
    #[error("process not found")]
    NotFound,

    #[error("access denied")]
    AccessDenied,

    /// Anything else the OS reported, including unsupported platforms.
    #[error("table unavailable: {0}")]
    Unavailable(String),
}

pub type CorrelationResult<T> = Result<T, CorrelationError>;

/// Failure of a lifecycle action (pause, resume, terminate).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("{0} is not a valid process id")]
    InvalidPid(i64),

    #[error("no such process")]
    NoSuchProcess,

    #[error("operation not permitted")]
    PermissionDenied,

    #[error("process signals are not supported on this platform")]
    Unsupported,

    #[error("OS error: {0}")]
    Os(String),
}

pub type ActionResult<T> = Result<T, ActionError>;

/// Errors from a caller-held scan session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("scan already in progress")]
    AlreadyRunning,
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Port(#[from] crate::types::PortError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("{0}")]
    ActionFailed(String),

    #[error("{0}")]
    Other(String),
}

pub type CliResult<T> = Result<T, CliError>;
