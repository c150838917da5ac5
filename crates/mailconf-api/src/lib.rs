//! mailconf API - mail client auto-configuration endpoints
//!
//! This crate serves Mozilla autoconfig and Microsoft Autodiscover
//! documents describing the IMAP/SMTP servers of a single mail host.

pub mod error;
pub mod handlers;
pub mod resolve;
pub mod routes;
pub mod templates;
pub mod xml;

use mailconf_common::MailConfig;

pub use error::ApiError;
pub use routes::create_router;
pub use templates::Templates;

/// Application state shared across handlers
pub struct AppState {
    /// Hostname and fallback domain advertised to clients
    pub mail: MailConfig,
    /// Compiled response templates
    pub templates: Templates,
}

impl AppState {
    /// Create the state, compiling all templates up front
    pub fn new(mail: MailConfig) -> mailconf_common::Result<Self> {
        Ok(Self {
            mail,
            templates: Templates::new()?,
        })
    }
}
