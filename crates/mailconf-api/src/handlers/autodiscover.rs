//! Microsoft Autodiscover handler

use axum::{
    body::{self, Body, Bytes},
    extract::{Query, State},
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::xml_response;
use crate::resolve::{resolve_email, AutodiscoverInputs};
use crate::{ApiError, AppState};

/// Largest request body read looking for an address
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Serve an Autodiscover response for the address in the request body or
/// `email` parameter. Unparseable, unreadable and oversized bodies count as
/// carrying no address.
pub async fn autodiscover(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    body: Body,
) -> Result<Response, ApiError> {
    let body = read_body(body).await;
    let inputs = AutodiscoverInputs {
        body: &body,
        email: params.get("email").map(String::as_str),
    };
    let resolved = resolve_email(&inputs, &state.mail);
    debug!(
        email = %resolved.value,
        source = ?resolved.source,
        body_len = body.len(),
        "Resolved autodiscover login name"
    );

    let document = state
        .templates
        .render_autodiscover(&resolved.value, &state.mail.hostname)?;
    Ok(xml_response(document))
}

async fn read_body(body: Body) -> Bytes {
    match body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "Ignoring autodiscover request body");
            Bytes::new()
        }
    }
}
