//! Endpoint descriptors advertised to mail clients

use serde::Serialize;
use std::fmt;

/// Mail protocol of an advertised server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Imap,
    Smtp,
}

impl Protocol {
    /// Value of the autoconfig `type` attribute
    pub fn autoconfig_type(&self) -> &'static str {
        match self {
            Protocol::Imap => "imap",
            Protocol::Smtp => "smtp",
        }
    }

    /// Autoconfig element the server is listed under
    pub fn autoconfig_element(&self) -> &'static str {
        match self {
            Protocol::Imap => "incomingServer",
            Protocol::Smtp => "outgoingServer",
        }
    }

    /// Value of the Autodiscover `<Type>` element
    pub fn autodiscover_type(&self) -> &'static str {
        match self {
            Protocol::Imap => "IMAP",
            Protocol::Smtp => "SMTP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.autodiscover_type())
    }
}

/// Transport security of an advertised server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SocketType {
    /// TLS from the first byte
    #[serde(rename = "SSL")]
    Ssl,
    /// Plaintext upgraded in-band
    #[serde(rename = "STARTTLS")]
    StartTls,
}

impl SocketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocketType::Ssl => "SSL",
            SocketType::StartTls => "STARTTLS",
        }
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication method advertised to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AuthMethod {
    #[serde(rename = "password-cleartext")]
    PasswordCleartext,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::PasswordCleartext => "password-cleartext",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single server a client may connect to.
///
/// The host is not part of the descriptor; every endpoint points at the
/// configured mail hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub protocol: Protocol,
    pub port: u16,
    pub socket_type: SocketType,
    pub auth: AuthMethod,
}

impl Endpoint {
    pub const fn new(protocol: Protocol, port: u16, socket_type: SocketType) -> Self {
        Self {
            protocol,
            port,
            socket_type,
            auth: AuthMethod::PasswordCleartext,
        }
    }
}

/// Username token the client replaces with the address being configured
pub const AUTOCONFIG_USERNAME: &str = "%EMAILADDRESS%";

/// Servers listed in an autoconfig document, in preference order
pub const AUTOCONFIG_ENDPOINTS: [Endpoint; 4] = [
    Endpoint::new(Protocol::Imap, 993, SocketType::Ssl),
    Endpoint::new(Protocol::Imap, 143, SocketType::StartTls),
    Endpoint::new(Protocol::Smtp, 587, SocketType::StartTls),
    Endpoint::new(Protocol::Smtp, 465, SocketType::Ssl),
];

/// IMAP server listed in an Autodiscover response
pub const AUTODISCOVER_IMAP: Endpoint = Endpoint::new(Protocol::Imap, 993, SocketType::Ssl);

/// SMTP server listed in an Autodiscover response
pub const AUTODISCOVER_SMTP: Endpoint = Endpoint::new(Protocol::Smtp, 587, SocketType::StartTls);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autoconfig_endpoint_order() {
        let listed: Vec<(&str, u16, &str)> = AUTOCONFIG_ENDPOINTS
            .iter()
            .map(|e| (e.protocol.autoconfig_type(), e.port, e.socket_type.as_str()))
            .collect();

        assert_eq!(
            listed,
            vec![
                ("imap", 993, "SSL"),
                ("imap", 143, "STARTTLS"),
                ("smtp", 587, "STARTTLS"),
                ("smtp", 465, "SSL"),
            ]
        );
    }

    #[test]
    fn test_all_endpoints_use_cleartext_password() {
        assert!(AUTOCONFIG_ENDPOINTS
            .iter()
            .chain([&AUTODISCOVER_IMAP, &AUTODISCOVER_SMTP])
            .all(|e| e.auth.to_string() == "password-cleartext"));
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_value(AUTODISCOVER_SMTP).unwrap();
        assert_eq!(json["protocol"], "smtp");
        assert_eq!(json["socket_type"], "STARTTLS");
        assert_eq!(json["auth"], "password-cleartext");
    }

    #[test]
    fn test_protocol_elements() {
        assert_eq!(Protocol::Imap.autoconfig_element(), "incomingServer");
        assert_eq!(Protocol::Smtp.autoconfig_element(), "outgoingServer");
        assert_eq!(Protocol::Smtp.to_string(), "SMTP");
    }
}
