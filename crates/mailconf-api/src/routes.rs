//! API routes

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::handlers::{autoconfig, autodiscover, health};
use crate::AppState;

/// Paths answering with a Mozilla autoconfig document
pub const AUTOCONFIG_PATHS: [&str; 4] = [
    "/autodiscover/autoconfig.php",
    "/autoconfig.php",
    "/mail/config-v1.1.xml",
    "/.well-known/autoconfig/mail/config-v1.1.xml",
];

/// Paths answering with an Autodiscover response
pub const AUTODISCOVER_PATHS: [&str; 4] = [
    "/autodiscover/autodiscover.php",
    "/autodiscover.php",
    "/autodiscover/autodiscover.xml",
    "/Autodiscover/Autodiscover.xml",
];

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness));

    let router = AUTOCONFIG_PATHS.iter().fold(router, |router, path| {
        router.route(path, get(autoconfig::autoconfig))
    });

    let router = AUTODISCOVER_PATHS.iter().fold(router, |router, path| {
        router.route(
            path,
            get(autodiscover::autodiscover)
                .post(autodiscover::autodiscover)
                .layer(DefaultBodyLimit::max(autodiscover::MAX_BODY_BYTES)),
        )
    });

    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new()),
    )
}
