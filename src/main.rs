use std::sync::Arc;

use ortto_country_enrichment::config::Config;
use ortto_country_enrichment::handlers::{self, AppState};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - Outbound HTTP clients (OpenRouter, Ortto).
/// - HTTP routes and middleware (CORS, tracing, body limit).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ortto_country_enrichment=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let addr = format!("0.0.0.0:{}", config.port);

    let app_state = Arc::new(AppState::new(config)?);
    tracing::info!(
        "✓ Outbound clients initialized (timeout {}s)",
        app_state.config.http_timeout_secs
    );

    let app = handlers::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
