//! HTTP request handlers

pub mod autoconfig;
pub mod autodiscover;
pub mod health;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

/// Content type of every configuration document
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Wrap a rendered document in a 200 response
pub(crate) fn xml_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body).into_response()
}
