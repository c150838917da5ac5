//! Resolution of the domain or address a client is configuring.
//!
//! Each request kind has an ordered list of sources. Sources are tried in
//! order and the first one producing a non-empty value wins; when none does,
//! the configured fallback is used.

use mailconf_common::MailConfig;

use crate::xml;

/// Inputs an autoconfig request may carry
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoconfigInputs<'a> {
    /// `emailaddress` query parameter
    pub emailaddress: Option<&'a str>,
    /// Host the request was addressed to
    pub host: Option<&'a str>,
    /// `email` query parameter
    pub email: Option<&'a str>,
}

/// Inputs an Autodiscover request may carry
#[derive(Debug, Clone, Copy, Default)]
pub struct AutodiscoverInputs<'a> {
    /// Raw request body
    pub body: &'a [u8],
    /// `email` query parameter
    pub email: Option<&'a str>,
}

/// Where an autoconfig domain was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainSource {
    EmailAddressParam,
    HostHeader,
    EmailParam,
}

impl DomainSource {
    /// Sources in the order they are consulted
    pub const ORDER: [DomainSource; 3] = [
        DomainSource::EmailAddressParam,
        DomainSource::HostHeader,
        DomainSource::EmailParam,
    ];

    /// Domain this source yields for `inputs`, if any
    pub fn resolve(&self, inputs: &AutoconfigInputs<'_>) -> Option<String> {
        match self {
            DomainSource::EmailAddressParam => inputs.emailaddress.and_then(domain_of_address),
            DomainSource::HostHeader => inputs.host.and_then(domain_of_host),
            DomainSource::EmailParam => inputs.email.and_then(domain_of_address),
        }
    }
}

/// Where an Autodiscover login name was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailSource {
    RequestBody,
    EmailParam,
}

impl EmailSource {
    /// Sources in the order they are consulted
    pub const ORDER: [EmailSource; 2] = [EmailSource::RequestBody, EmailSource::EmailParam];

    /// Non-empty login name this source yields for `inputs`, if any
    pub fn resolve(&self, inputs: &AutodiscoverInputs<'_>) -> Option<String> {
        let email = match self {
            EmailSource::RequestBody if inputs.body.is_empty() => None,
            EmailSource::RequestBody => xml::extract_email_address(inputs.body),
            EmailSource::EmailParam => inputs.email.map(str::to_string),
        };
        email.filter(|email| !email.is_empty())
    }
}

/// A resolved value and the source it came from; `source` is `None` for the
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<S> {
    pub value: String,
    pub source: Option<S>,
}

impl<S> Resolved<S> {
    pub fn is_fallback(&self) -> bool {
        self.source.is_none()
    }
}

/// Resolve the domain an autoconfig document is generated for
pub fn resolve_domain(inputs: &AutoconfigInputs<'_>, mail: &MailConfig) -> Resolved<DomainSource> {
    first_match(
        &DomainSource::ORDER,
        |source| source.resolve(inputs),
        || mail.fallback_domain.clone(),
    )
}

/// Resolve the login name an Autodiscover document is generated for
pub fn resolve_email(inputs: &AutodiscoverInputs<'_>, mail: &MailConfig) -> Resolved<EmailSource> {
    first_match(
        &EmailSource::ORDER,
        |source| source.resolve(inputs),
        || mail.fallback_email(),
    )
}

fn first_match<S: Copy>(
    order: &[S],
    resolve: impl Fn(S) -> Option<String>,
    fallback: impl FnOnce() -> String,
) -> Resolved<S> {
    order
        .iter()
        .find_map(|&source| {
            resolve(source).map(|value| Resolved {
                value,
                source: Some(source),
            })
        })
        .unwrap_or_else(|| Resolved {
            value: fallback(),
            source: None,
        })
}

/// Everything after the first `@`, trimmed and lowercased
fn domain_of_address(address: &str) -> Option<String> {
    let (_, domain) = address.split_once('@')?;
    let domain = domain.trim().to_lowercase();
    (!domain.is_empty()).then_some(domain)
}

/// `<domain>` from a host of the form `autoconfig.<domain>[:port]`
fn domain_of_host(host: &str) -> Option<String> {
    let host = host.to_lowercase();
    strip_port(&host)
        .strip_prefix("autoconfig.")
        .filter(|domain| !domain.is_empty())
        .map(str::to_string)
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}
