//! Observability hooks for the webhook pipeline.
//!
//! The orchestration in [`crate::webhook_handler`] reports what happens at a
//! fixed set of points and does not log itself. [`TracingObserver`] turns those
//! events into `tracing` records; tests plug in their own observer.

use crate::openrouter::LookupError;
use crate::payload::DecodeOutcome;
use crate::validation::Classification;
use crate::webhook_models::MergeResult;

/// Request metadata captured before the body is touched.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub method: String,
    pub content_type: Option<String>,
    pub content_length: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundCall {
    CountryLookup,
    ContactMerge,
}

pub trait WebhookObserver: Send + Sync {
    fn request_received(&self, _meta: &RequestMeta) {}
    fn payload_decoded(&self, _outcome: &DecodeOutcome) {}
    fn request_classified(&self, _classification: &Classification) {}
    fn outbound_started(&self, _call: OutboundCall) {}
    fn country_lookup_finished(&self, _result: &Result<String, LookupError>) {}
    fn contact_merge_finished(&self, _result: &MergeResult) {}
}

/// Logs pipeline events with `tracing`. Never logs credentials or full bodies.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    pub model: String,
}

impl WebhookObserver for TracingObserver {
    fn request_received(&self, meta: &RequestMeta) {
        tracing::info!(
            method = %meta.method,
            content_type = ?meta.content_type,
            content_length = ?meta.content_length,
            user_agent = ?meta.user_agent,
            "Ortto webhook received"
        );
    }

    fn payload_decoded(&self, outcome: &DecodeOutcome) {
        match outcome {
            DecodeOutcome::Decoded(map) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                tracing::debug!("Ortto payload keys: {:?}", keys);
            }
            DecodeOutcome::Empty => tracing::info!("Empty body - treating as connection test"),
            DecodeOutcome::Malformed(reason) => {
                tracing::warn!("Unreadable body ({}) - treating as connection test", reason)
            }
        }
    }

    fn request_classified(&self, classification: &Classification) {
        match classification {
            Classification::EmptyTest => {
                tracing::info!("Test POST detected (no fields). Returning 200.")
            }
            Classification::Missing(fields) => tracing::warn!(
                missing = ?fields.missing,
                required = ?fields.required,
                "Missing required fields"
            ),
            Classification::Valid(fields) => tracing::info!(
                country_code = %fields.country_code,
                has_prompt = fields.prompt.is_some(),
                contact_id = ?fields.contact_id,
                "Webhook fields resolved"
            ),
        }
    }

    fn outbound_started(&self, call: OutboundCall) {
        match call {
            OutboundCall::CountryLookup => {
                tracing::info!(model = %self.model, "Calling OpenRouter")
            }
            OutboundCall::ContactMerge => tracing::info!("Updating Ortto contact"),
        }
    }

    fn country_lookup_finished(&self, result: &Result<String, LookupError>) {
        match result {
            Ok(name) => tracing::info!("✓ OpenRouter resolved country: {}", name),
            Err(e) => tracing::error!("OpenRouter lookup failed: {}", e),
        }
    }

    fn contact_merge_finished(&self, result: &MergeResult) {
        if result.success {
            tracing::info!("✓ Ortto contact updated (status {:?})", result.status);
        } else if result.skipped {
            tracing::info!("Ortto update skipped: {}", result.error.as_deref().unwrap_or(""));
        } else {
            tracing::error!(
                status = ?result.status,
                "Ortto update failed: {}",
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
