//! HTTP mapping of mailconf errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mailconf_common::Error;

/// Error returned from handlers
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(code = self.0.code(), "Request failed: {}", self.0);

        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.0.code()).into_response()
    }
}
