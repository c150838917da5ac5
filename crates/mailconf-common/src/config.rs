//! Configuration for mailconf

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::webmail::WebmailConfig;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_VAR: &str = "MAILCONF_CONFIG";

/// Prefix for structured environment overrides (`MAILCONF_MAIL__HOSTNAME`)
pub const ENV_PREFIX: &str = "MAILCONF";

/// Deployment variable carrying the mail server FQDN
pub const LEGACY_HOSTNAME_VAR: &str = "HOSTNAME";

/// Deployment variable carrying the fallback mail domain
pub const LEGACY_DOMAIN_VAR: &str = "FIRST_MAIL_DOMAIN";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Mail settings advertised to clients
    pub mail: MailConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Webmail override file
    #[serde(default)]
    pub webmail: WebmailConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

/// Mail settings shared by the autoconfig and autodiscover handlers.
///
/// Immutable once loaded; handlers only ever see it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailConfig {
    /// FQDN of the IMAP/SMTP server
    pub hostname: String,

    /// Domain used when none can be derived from a request
    pub fallback_domain: String,
}

impl MailConfig {
    /// Create mail settings from a hostname and fallback domain
    pub fn new(hostname: impl Into<String>, fallback_domain: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            fallback_domain: fallback_domain.into(),
        }
    }

    /// Login name used when a client sent no address at all
    pub fn fallback_email(&self) -> String {
        format!("user@{}", self.fallback_domain)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Find the configuration file to use, if any
    pub fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
            return Some(PathBuf::from(path));
        }

        [
            PathBuf::from("./mailconf.toml"),
            PathBuf::from("/etc/mailconf/config.toml"),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Layer the deployment variables, an optional file and `MAILCONF_*`
    /// overrides, in increasing priority.
    ///
    /// `vars` replaces the process environment when given.
    pub fn load_with(
        path: Option<&Path>,
        vars: Option<::config::Map<String, String>>,
    ) -> crate::Result<Self> {
        let legacy = |name: &str| {
            match &vars {
                Some(vars) => vars.get(name).cloned(),
                None => std::env::var(name).ok(),
            }
            .filter(|value| !value.trim().is_empty())
        };
        let legacy_hostname = legacy(LEGACY_HOSTNAME_VAR);
        let legacy_domain = legacy(LEGACY_DOMAIN_VAR);

        let mut builder = ::config::Config::builder();
        if let Some(hostname) = legacy_hostname {
            builder = builder.set_default("mail.hostname", hostname)?;
        }
        if let Some(domain) = legacy_domain {
            builder = builder.set_default("mail.fallback_domain", domain)?;
        }

        if let Some(path) = path {
            builder = builder
                .add_source(::config::File::from(path).format(::config::FileFormat::Toml));
        }

        let environment = ::config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("webmail.plugins")
            .with_list_parse_key("webmail.proxy_whitelist")
            .try_parsing(true)
            .source(vars);

        let config: Config = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every response useless
    pub fn validate(&self) -> crate::Result<()> {
        if self.mail.hostname.trim().is_empty() {
            return Err(crate::Error::Config(
                "mail.hostname must not be empty".to_string(),
            ));
        }
        if self.mail.fallback_domain.trim().is_empty() {
            return Err(crate::Error::Config(
                "mail.fallback_domain must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
