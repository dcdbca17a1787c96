use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::handlers::AppState;
use crate::obs::{OutboundCall, RequestMeta};
use crate::openrouter::LookupError;
use crate::payload::{decode_body, RawBody};
use crate::validation::{classify, Classification};
use crate::webhook_models::{CountryResolvedResponse, StatusResponse};

/// Successful webhook outcomes.
#[derive(Debug)]
pub enum WebhookReply {
    /// GET/HEAD connectivity probe.
    Probe { head: bool },
    /// Empty or unreadable POST, answered like a probe.
    TestDelivery,
    Resolved(CountryResolvedResponse),
}

impl IntoResponse for WebhookReply {
    fn into_response(self) -> Response {
        let allow = [(header::ALLOW, "POST")];
        match self {
            WebhookReply::Probe { head: true } => (StatusCode::OK, allow).into_response(),
            WebhookReply::Probe { head: false } => {
                (StatusCode::OK, allow, Json(StatusResponse::ok())).into_response()
            }
            WebhookReply::TestDelivery => {
                (StatusCode::OK, Json(StatusResponse::ok())).into_response()
            }
            WebhookReply::Resolved(body) => (StatusCode::OK, Json(body)).into_response(),
        }
    }
}

/// Ortto webhook handler
///
/// Flow:
/// 1. GET/HEAD → connectivity probe, other non-POST methods → 405.
/// 2. Decode the body (JSON, URL-encoded form); unusable bodies are test deliveries.
/// 3. Resolve country code, prompt, contact id and email across payload shapes.
/// 4. Apply the required-field policy.
/// 5. Resolve the country name via OpenRouter.
/// 6. Merge the name into the Ortto contact (if a contact id was sent).
///
/// A failed Ortto merge is reported in `ortto_update` and never hides the
/// resolved country name.
pub async fn ortto_webhook(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("ortto_webhook", %request_id);

    async move {
        state.observer.request_received(&request_meta(&method, &headers));

        let raw = if body.is_empty() {
            RawBody::Absent
        } else {
            RawBody::Bytes(body)
        };

        let mut response = match process_webhook(&state, &method, raw).await {
            Ok(reply) => reply.into_response(),
            Err(e) => e.into_response(),
        };

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert("x-request-id", value);
        }
        response
    }
    .instrument(span)
    .await
}

/// Runs one webhook delivery through the pipeline.
///
/// Independent of axum extractors so that pre-decoded bodies
/// ([`RawBody::Structured`]) can be processed directly.
pub async fn process_webhook(
    state: &AppState,
    method: &Method,
    raw: RawBody,
) -> Result<WebhookReply, AppError> {
    if *method == Method::GET || *method == Method::HEAD {
        return Ok(WebhookReply::Probe {
            head: *method == Method::HEAD,
        });
    }
    if *method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    let outcome = decode_body(raw);
    state.observer.payload_decoded(&outcome);
    let Some(payload) = outcome.into_payload() else {
        return Ok(WebhookReply::TestDelivery);
    };

    let classification = classify(state.resolver.extract(&payload), &state.required_fields);
    state.observer.request_classified(&classification);

    let fields = match classification {
        Classification::EmptyTest => return Ok(WebhookReply::TestDelivery),
        Classification::Missing(missing) => return Err(AppError::MissingFields(missing)),
        Classification::Valid(fields) => fields,
    };

    // Fail fast, before announcing an outbound call
    if !state.openrouter.is_configured() {
        return Err(LookupError::MissingApiKey.into());
    }

    state.observer.outbound_started(OutboundCall::CountryLookup);
    let lookup = state
        .openrouter
        .resolve_country_name(&fields.country_code, fields.prompt.as_deref())
        .await;
    state.observer.country_lookup_finished(&lookup);
    let country_name = lookup?;

    let ortto_update = match fields.contact_id.as_deref() {
        Some(contact_id) => {
            if state.ortto.is_configured() {
                state.observer.outbound_started(OutboundCall::ContactMerge);
            }
            let result = state
                .ortto
                .update_contact(contact_id, &country_name, fields.email.as_deref())
                .await;
            state.observer.contact_merge_finished(&result);
            Some(result)
        }
        None => None,
    };

    Ok(WebhookReply::Resolved(CountryResolvedResponse {
        country_name,
        contact_id: fields.contact_id,
        ortto_update,
    }))
}

fn request_meta(method: &Method, headers: &HeaderMap) -> RequestMeta {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };

    RequestMeta {
        method: method.to_string(),
        content_type: header_str(header::CONTENT_TYPE),
        content_length: header_str(header::CONTENT_LENGTH),
        user_agent: header_str(header::USER_AGENT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::validation::RequiredFields;
    use serde_json::json;

    fn state() -> AppState {
        AppState::new(Config::from_lookup(|_| None).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_get_and_head_are_probes() {
        let reply = process_webhook(&state(), &Method::GET, RawBody::Absent).await.unwrap();
        assert!(matches!(reply, WebhookReply::Probe { head: false }));

        let reply = process_webhook(&state(), &Method::HEAD, RawBody::Absent).await.unwrap();
        assert!(matches!(reply, WebhookReply::Probe { head: true }));
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let err = process_webhook(&state(), &Method::PUT, RawBody::Absent)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MethodNotAllowed));
    }

    #[tokio::test]
    async fn test_structured_body_without_fields_is_test_delivery() {
        let raw = RawBody::Structured(json!({"event": "ping"}));
        let reply = process_webhook(&state(), &Method::POST, raw).await.unwrap();
        assert!(matches!(reply, WebhookReply::TestDelivery));
    }

    #[tokio::test]
    async fn test_missing_fields_follow_policy() {
        let mut state = state();
        state.required_fields = RequiredFields {
            require_prompt: true,
            require_contact_id: false,
        };
        let raw = RawBody::Structured(json!({"contact_id": "42", "country": "SE"}));
        let err = process_webhook(&state, &Method::POST, raw).await.unwrap_err();
        match err {
            AppError::MissingFields(fields) => {
                assert_eq!(fields.missing, vec!["str:cm:prompt"]);
            }
            other => panic!("Expected missing fields, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_is_configuration_error() {
        let raw = RawBody::Structured(json!({"country_code": "SE"}));
        let err = process_webhook(&state(), &Method::POST, raw).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
