//! mailconf - Mail client auto-configuration server

use anyhow::{Context, Result};
use mailconf_api::{create_router, AppState};
use mailconf_common::config::{Config, LogFormat, LoggingConfig};
use mailconf_common::webmail::WebmailConfig;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration before logging so the log settings apply
    let config_path = Config::locate();
    let config = Config::load_with(config_path.as_deref(), None)?;

    init_logging(&config.logging);

    match &config_path {
        Some(path) => info!(path = %path.display(), "Loaded configuration file"),
        None => info!("No configuration file found, configured from environment"),
    }

    let state = Arc::new(AppState::new(config.mail.clone())?);

    write_webmail_overrides(&state, &config.webmail).await?;

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;

    info!(
        address = %config.server.bind_address,
        hostname = %config.mail.hostname,
        fallback_domain = %config.mail.fallback_domain,
        "mailconf server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("mailconf server shutdown complete");

    Ok(())
}

/// Render the webmail include file, if a destination is configured
async fn write_webmail_overrides(state: &AppState, webmail: &WebmailConfig) -> Result<()> {
    let Some(path) = &webmail.output_path else {
        return Ok(());
    };

    let rendered = state.templates.render_webmail(webmail)?;
    tokio::fs::write(path, rendered)
        .await
        .with_context(|| format!("Failed to write webmail overrides to {}", path.display()))?;

    info!(
        path = %path.display(),
        plugins = webmail.plugins().len(),
        "Webmail overrides written"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_level(true))
            .init(),
    }
}
