//! mailconf Common - Shared types and configuration
//!
//! This crate provides the configuration, error type and endpoint
//! descriptors shared by the mailconf API and server crates.

pub mod config;
pub mod error;
pub mod types;
pub mod webmail;

pub use config::{Config, MailConfig};
pub use error::{Error, Result};
