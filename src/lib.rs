//! Ortto Country Enrichment Library
//!
//! Webhook that receives Ortto contact events, resolves the country-of-residence
//! code to a country name through OpenRouter, and merges the name back into the
//! Ortto person record.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `obs`: Observability and logging.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `field_resolver`: Field lookup across payload shapes.
//! - `handlers`: Application state, router and health check.
//! - `openrouter`: OpenRouter chat completions client.
//! - `ortto`: Ortto person merge client.
//! - `payload`: Inbound body decoding.
//! - `validation`: Required-field policy.
//! - `webhook_handler`: Ortto webhook handler.
//! - `webhook_models`: Webhook payload and wire models.

pub mod api;
pub mod core;
pub mod integrations;
pub mod obs;

// Re-export primary modules for shared use in tests and other binaries
pub mod config;
pub mod errors;
pub mod field_resolver;
pub mod handlers;
pub mod openrouter;
pub mod ortto;
pub mod payload;
pub mod validation;
pub mod webhook_handler;
pub mod webhook_models;
