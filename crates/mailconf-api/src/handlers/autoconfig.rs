//! Mozilla autoconfig handler

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, Uri},
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::xml_response;
use crate::resolve::{resolve_domain, AutoconfigInputs};
use crate::{ApiError, AppState};

/// Serve a `clientConfig` document for the domain the client asked about.
///
/// Query parsing keeps the last value of repeated keys and never rejects
/// the request.
pub async fn autoconfig(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ApiError> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.authority().map(|authority| authority.as_str()));

    let inputs = AutoconfigInputs {
        emailaddress: params.get("emailaddress").map(String::as_str),
        host,
        email: params.get("email").map(String::as_str),
    };
    let resolved = resolve_domain(&inputs, &state.mail);
    debug!(
        domain = %resolved.value,
        source = ?resolved.source,
        "Resolved autoconfig domain"
    );

    let document = state
        .templates
        .render_autoconfig(&resolved.value, &state.mail.hostname)?;
    Ok(xml_response(document))
}
