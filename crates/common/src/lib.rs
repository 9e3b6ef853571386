//! Shared configuration and error handling for SiteDesk
//!
//! This crate provides common functionality used across the workspace:
//! - Runtime configuration following 12-factor principles
//! - The shared error type and its user-facing messages

pub mod config;
pub mod error;

pub use config::{Config, LogFormat};
pub use error::{Error, Result};
