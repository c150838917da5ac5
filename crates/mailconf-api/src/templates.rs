//! Template Engine
//!
//! Renders the XML responses and the webmail override file using minijinja.
//! Auto-escaping is off; templates escape explicitly with the `xml` and `php`
//! filters.

use mailconf_common::types::{
    Endpoint, Protocol, SocketType, AUTOCONFIG_ENDPOINTS, AUTOCONFIG_USERNAME, AUTODISCOVER_IMAP,
    AUTODISCOVER_SMTP,
};
use mailconf_common::webmail::WebmailConfig;
use mailconf_common::{Error, Result};
use minijinja::{context, AutoEscape, Environment, Value};
use serde::Serialize;

use crate::xml;

const AUTOCONFIG_TEMPLATE: &str = "autoconfig.xml";
const AUTODISCOVER_TEMPLATE: &str = "autodiscover.xml";
const WEBMAIL_TEMPLATE: &str = "webmail.inc.php";

/// Template manager
pub struct Templates {
    env: Environment<'static>,
}

/// Server entry as seen by the templates
#[derive(Debug, Serialize)]
struct ServerView {
    /// Autoconfig element name
    element: &'static str,
    /// Autoconfig `type` attribute
    kind: &'static str,
    /// Autodiscover `<Type>` value
    name: &'static str,
    port: u16,
    socket_type: &'static str,
    authentication: &'static str,
    starttls: bool,
    outgoing: bool,
}

impl From<&Endpoint> for ServerView {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            element: endpoint.protocol.autoconfig_element(),
            kind: endpoint.protocol.autoconfig_type(),
            name: endpoint.protocol.autodiscover_type(),
            port: endpoint.port,
            socket_type: endpoint.socket_type.as_str(),
            authentication: endpoint.auth.as_str(),
            starttls: endpoint.socket_type == SocketType::StartTls,
            outgoing: endpoint.protocol == Protocol::Smtp,
        }
    }
}

impl Templates {
    /// Compile all templates
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_filter("xml", xml_filter);
        env.add_filter("php", php_filter);

        env.add_template(AUTOCONFIG_TEMPLATE, include_str!("../templates/autoconfig.xml"))
            .map_err(template_error)?;
        env.add_template(
            AUTODISCOVER_TEMPLATE,
            include_str!("../templates/autodiscover.xml"),
        )
        .map_err(template_error)?;
        env.add_template(WEBMAIL_TEMPLATE, include_str!("../templates/webmail.inc.php"))
            .map_err(template_error)?;

        Ok(Self { env })
    }

    /// Mozilla autoconfig document for `domain`
    pub fn render_autoconfig(&self, domain: &str, hostname: &str) -> Result<String> {
        let servers: Vec<ServerView> = AUTOCONFIG_ENDPOINTS.iter().map(ServerView::from).collect();
        self.render(
            AUTOCONFIG_TEMPLATE,
            context! {
                domain,
                hostname,
                username => AUTOCONFIG_USERNAME,
                servers,
            },
        )
    }

    /// Exchange Autodiscover response for `email`
    pub fn render_autodiscover(&self, email: &str, hostname: &str) -> Result<String> {
        let servers: Vec<ServerView> = [AUTODISCOVER_IMAP, AUTODISCOVER_SMTP]
            .iter()
            .map(ServerView::from)
            .collect();
        self.render(
            AUTODISCOVER_TEMPLATE,
            context! {
                email,
                hostname,
                servers,
            },
        )
    }

    /// PHP include carrying the webmail overrides
    pub fn render_webmail(&self, webmail: &WebmailConfig) -> Result<String> {
        let proxy_whitelist: Vec<String> = webmail
            .proxy_whitelist
            .iter()
            .map(ToString::to_string)
            .collect();
        self.render(
            WEBMAIL_TEMPLATE,
            context! {
                proxy_whitelist,
                ip_check => webmail.ip_check,
                product_name => webmail.product_name,
                plugins => webmail.plugins(),
            },
        )
    }

    fn render(&self, name: &str, ctx: Value) -> Result<String> {
        let template = self.env.get_template(name).map_err(template_error)?;
        template.render(ctx).map_err(template_error)
    }
}

fn template_error(err: minijinja::Error) -> Error {
    Error::Template(err.to_string())
}

fn xml_filter(value: String) -> String {
    xml::escape(&value).into_owned()
}

/// Escape for a single-quoted PHP string literal
fn php_filter(value: String) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_autoconfig_document() {
        let templates = Templates::new().unwrap();
        let xml = templates
            .render_autoconfig("example.com", "mail.example.net")
            .unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<clientConfig version=\"1.1\">"));
        assert!(xml.contains("<emailProvider id=\"example.com\">"));
        assert!(xml.contains("<domain>example.com</domain>"));
        assert!(xml.contains("<displayName>example.com Mail</displayName>"));
        assert!(xml.contains("<displayShortName>example.com</displayShortName>"));
        assert_eq!(xml.matches("<hostname>mail.example.net</hostname>").count(), 4);
        assert_eq!(xml.matches("<username>%EMAILADDRESS%</username>").count(), 4);
        assert_eq!(xml.matches("<incomingServer type=\"imap\">").count(), 2);
        assert_eq!(xml.matches("<outgoingServer type=\"smtp\">").count(), 2);
        assert_eq!(
            xml.matches("<authentication>password-cleartext</authentication>")
                .count(),
            4
        );
    }

    #[test]
    fn test_autoconfig_server_block() {
        let templates = Templates::new().unwrap();
        let xml = templates
            .render_autoconfig("example.com", "mail.example.net")
            .unwrap();

        let expected = r#"    <outgoingServer type="smtp">
      <hostname>mail.example.net</hostname>
      <port>587</port>
      <socketType>STARTTLS</socketType>
      <authentication>password-cleartext</authentication>
      <username>%EMAILADDRESS%</username>
    </outgoingServer>
"#;
        assert!(xml.contains(expected), "{}", xml);

        let ports: Vec<usize> = ["993", "143", "587", "465"]
            .iter()
            .map(|port| xml.find(&format!("<port>{}</port>", port)).unwrap())
            .collect();
        assert!(ports.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_autoconfig_escapes_domain_and_hostname() {
        let templates = Templates::new().unwrap();
        let xml = templates
            .render_autoconfig("a&b\"<c>'", "mail&co")
            .unwrap();

        assert!(xml.contains("<emailProvider id=\"a&amp;b&quot;&lt;c&gt;&apos;\">"));
        assert!(xml.contains("<hostname>mail&amp;co</hostname>"));
        assert!(!xml.contains("a&b"));
    }

    #[test]
    fn test_autodiscover_document() {
        let templates = Templates::new().unwrap();
        let xml = templates
            .render_autodiscover("alice@example.com", "mail.example.net")
            .unwrap();

        let expected = r#"<?xml version="1.0" encoding="utf-8"?>
<Autodiscover xmlns="http://schemas.microsoft.com/exchange/autodiscover/responseschema/2006">
  <Response xmlns="http://schemas.microsoft.com/exchange/autodiscover/outlook/responseschema/2006a">
    <Account>
      <AccountType>email</AccountType>
      <Action>settings</Action>
      <Protocol>
        <Type>IMAP</Type>
        <Server>mail.example.net</Server>
        <Port>993</Port>
        <DomainRequired>off</DomainRequired>
        <LoginName>alice@example.com</LoginName>
        <SPA>off</SPA>
        <SSL>on</SSL>
        <AuthRequired>on</AuthRequired>
      </Protocol>
      <Protocol>
        <Type>SMTP</Type>
        <Server>mail.example.net</Server>
        <Port>587</Port>
        <DomainRequired>off</DomainRequired>
        <LoginName>alice@example.com</LoginName>
        <SPA>off</SPA>
        <Encryption>TLS</Encryption>
        <AuthRequired>on</AuthRequired>
        <UsePOPAuth>on</UsePOPAuth>
        <SMTPLast>off</SMTPLast>
      </Protocol>
    </Account>
  </Response>
</Autodiscover>"#;
        assert_eq!(xml.trim_end(), expected);
    }

    #[test]
    fn test_autodiscover_escapes_login_name() {
        let templates = Templates::new().unwrap();
        let xml = templates
            .render_autodiscover("<o'brien>&co@example.com", "mail.example.net")
            .unwrap();

        assert_eq!(
            xml.matches("<LoginName>&lt;o&apos;brien&gt;&amp;co@example.com</LoginName>")
                .count(),
            2
        );
    }

    #[test]
    fn test_webmail_defaults() {
        let templates = Templates::new().unwrap();
        let php = templates.render_webmail(&WebmailConfig::default()).unwrap();

        assert!(php.starts_with("<?php\n"));
        assert!(php.contains(
            "$config['proxy_whitelist'] = array(\n    '172.16.0.0/12',\n    '10.0.0.0/8',\n    '192.168.0.0/16',\n);"
        ));
        assert!(php.contains("// $config['ip_check'] = false;"));
        assert!(php.contains("// $config['product_name'] = 'My Webmail';"));
        assert!(!php.contains("\n$config['plugins']"));
    }

    #[test]
    fn test_webmail_overrides() {
        let templates = Templates::new().unwrap();
        let webmail = WebmailConfig {
            proxy_whitelist: vec!["10.0.0.0/8".parse().unwrap()],
            ip_check: Some(false),
            product_name: Some("Bob's Mail".to_string()),
            plugins: vec!["managesieve".to_string(), "password".to_string()],
            ..Default::default()
        };
        let php = templates.render_webmail(&webmail).unwrap();

        assert!(php.contains("$config['proxy_whitelist'] = array(\n    '10.0.0.0/8',\n);"));
        assert!(php.contains("\n$config['ip_check'] = false;"));
        assert!(php.contains("\n$config['product_name'] = 'Bob\\'s Mail';"));
        assert!(php.contains(
            "$config['plugins'] = array_merge($config['plugins'], array(\n    'managesieve',\n    'password',\n));"
        ));
    }
}
