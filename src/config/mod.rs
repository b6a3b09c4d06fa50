//! Configuration management for Sounder.
//!
//! Provides XDG-compliant storage for persisted default settings.

mod settings;

pub use settings::{AppSettings, Paths};
