//! Configuration management for portwarden.
//!
//! Provides XDG-compliant storage of application settings.

mod settings;

pub use settings::{AppSettings, Paths};
