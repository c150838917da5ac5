//! Webmail override settings
//!
//! Options written into the include file the webmail application reads
//! after its main configuration. The file is rendered once at startup;
//! nothing here is consulted while serving requests.

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Webmail override configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebmailConfig {
    /// Where to write the rendered include file; nothing is written when unset
    pub output_path: Option<PathBuf>,

    /// Reverse proxies trusted to set forwarding headers
    #[serde(default = "default_proxy_whitelist")]
    pub proxy_whitelist: Vec<IpNet>,

    /// Bind sessions to the client IP
    pub ip_check: Option<bool>,

    /// Name shown in the webmail UI
    pub product_name: Option<String>,

    /// Plugins appended to the application's base plugin list
    #[serde(default)]
    pub plugins: Vec<String>,
}

impl Default for WebmailConfig {
    fn default() -> Self {
        Self {
            output_path: None,
            proxy_whitelist: default_proxy_whitelist(),
            ip_check: None,
            product_name: None,
            plugins: Vec::new(),
        }
    }
}

/// Docker and RFC 1918 private networks
fn default_proxy_whitelist() -> Vec<IpNet> {
    ["172.16.0.0/12", "10.0.0.0/8", "192.168.0.0/16"]
        .iter()
        .filter_map(|net| net.parse().ok())
        .collect()
}

impl WebmailConfig {
    /// Plugin identifiers with blanks and duplicates removed, order kept
    pub fn plugins(&self) -> Vec<&str> {
        let mut seen = Vec::with_capacity(self.plugins.len());
        for plugin in self.plugins.iter().map(|p| p.trim()) {
            if !plugin.is_empty() && !seen.contains(&plugin) {
                seen.push(plugin);
            }
        }
        seen
    }
}
