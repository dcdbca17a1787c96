use axum::{
    http::StatusCode,
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::Config;
use crate::field_resolver::FieldResolver;
use crate::obs::{TracingObserver, WebhookObserver};
use crate::openrouter::OpenRouterClient;
use crate::ortto::OrttoClient;
use crate::validation::RequiredFields;
use crate::webhook_handler;

/// Largest webhook body accepted (1 MiB).
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state injected into handlers.
///
/// Built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Alias lists and payload shapes used to pull fields out of a delivery.
    pub resolver: FieldResolver,
    /// Required-field policy for real deliveries.
    pub required_fields: RequiredFields,
    /// Country-code lookup via OpenRouter.
    pub openrouter: OpenRouterClient,
    /// Ortto person merge (optional).
    pub ortto: OrttoClient,
    /// Receives pipeline events for logging.
    pub observer: Arc<dyn WebhookObserver>,
}

impl AppState {
    /// Builds the state, sharing one HTTP client (with the configured timeout)
    /// between both outbound integrations.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            resolver: FieldResolver::default(),
            required_fields: config.required_fields(),
            openrouter: OpenRouterClient::new(client.clone(), &config),
            ortto: OrttoClient::new(client, &config),
            observer: Arc::new(TracingObserver {
                model: config.openrouter_model.clone(),
            }),
            config,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn WebhookObserver>) -> Self {
        self.observer = observer;
        self
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Application routes.
///
/// The webhook answers on `/` and `/api/ortto` for every method so that
/// probes and non-POST calls get the documented responses.
pub fn router(state: Arc<AppState>) -> Router {
    let webhook_routes = Router::new()
        .route("/", any(webhook_handler::ortto_webhook))
        .route("/api/ortto", any(webhook_handler::ortto_webhook))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)));

    Router::new()
        .route("/health", get(health))
        .merge(webhook_routes)
        .with_state(state)
}
