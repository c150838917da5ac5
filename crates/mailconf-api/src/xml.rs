//! XML helpers: output escaping and Autodiscover request parsing

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use std::borrow::Cow;
use thiserror::Error;
use tracing::debug;

/// Namespace of Outlook Autodiscover request documents
pub const REQUEST_SCHEMA_NS: &str =
    "http://schemas.microsoft.com/exchange/autodiscover/outlook/requestschema/2006";

const EMAIL_ADDRESS_ELEMENT: &[u8] = b"EMailAddress";

/// Escape `&`, `<`, `>`, `"` and `'` for element or attribute content
pub fn escape(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(raw)
}

/// Reasons a request body is not a usable XML document
#[derive(Debug, Error)]
enum MalformedXml {
    #[error("body is not UTF-8")]
    Encoding(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Syntax(#[from] quick_xml::Error),

    #[error("document has no root element")]
    NoRoot,

    #[error("element left open at end of document")]
    Unclosed,

    #[error("content outside the root element")]
    OutsideRoot,
}

/// Text of the first `EMailAddress` element in the request schema namespace.
///
/// Returns `None` when the body is not a well-formed document or has no such
/// element. An element without text yields `Some("")`.
pub fn extract_email_address(body: &[u8]) -> Option<String> {
    match find_email_address(body) {
        Ok(found) => found,
        Err(err) => {
            debug!(error = %err, "Ignoring malformed autodiscover request body");
            None
        }
    }
}

fn find_email_address(body: &[u8]) -> Result<Option<String>, MalformedXml> {
    let text = std::str::from_utf8(body)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = NsReader::from_str(text);
    let mut depth = 0usize;
    let mut root_closed = false;
    // Depth of the element whose text is being collected
    let mut capture: Option<usize> = None;
    let mut found: Option<String> = None;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let in_request_ns = matches!(
            ns,
            ResolveResult::Bound(Namespace(ns)) if ns == REQUEST_SCHEMA_NS.as_bytes()
        );

        match event {
            Event::Start(start) => {
                if root_closed {
                    return Err(MalformedXml::OutsideRoot);
                }
                depth += 1;
                if found.is_none()
                    && in_request_ns
                    && start.local_name().as_ref() == EMAIL_ADDRESS_ELEMENT
                {
                    found = Some(String::new());
                    capture = Some(depth);
                }
            }
            Event::Empty(start) => {
                if root_closed {
                    return Err(MalformedXml::OutsideRoot);
                }
                if depth == 0 {
                    root_closed = true;
                }
                if found.is_none()
                    && in_request_ns
                    && start.local_name().as_ref() == EMAIL_ADDRESS_ELEMENT
                {
                    found = Some(String::new());
                }
            }
            Event::End(_) => {
                if capture == Some(depth) {
                    capture = None;
                }
                depth = depth.checked_sub(1).ok_or(MalformedXml::OutsideRoot)?;
                if depth == 0 {
                    root_closed = true;
                }
            }
            Event::Text(content) => {
                if depth == 0 {
                    if !content.iter().all(u8::is_ascii_whitespace) {
                        return Err(MalformedXml::OutsideRoot);
                    }
                } else if capture == Some(depth) {
                    if let Some(value) = found.as_mut() {
                        value.push_str(&content.unescape()?);
                    }
                }
            }
            Event::CData(content) => {
                if depth == 0 {
                    return Err(MalformedXml::OutsideRoot);
                }
                if capture == Some(depth) {
                    if let Some(value) = found.as_mut() {
                        value.push_str(&String::from_utf8_lossy(&content.into_inner()));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(MalformedXml::Unclosed);
    }
    if !root_closed {
        return Err(MalformedXml::NoRoot);
    }
    Ok(found)
}
