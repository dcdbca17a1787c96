use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use std::fmt;

use crate::openrouter::LookupError;
use crate::validation::MissingFields;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Payload carried some fields but not all the required ones.
    MissingFields(MissingFields),
    /// Method other than POST (GET/HEAD are handled as probes).
    MethodNotAllowed,
    /// Server misconfiguration (e.g. missing API key).
    Configuration(String),
    /// A remote dependency answered with an error or no usable content.
    Upstream {
        message: String,
        status: Option<u16>,
        details: Option<String>,
    },
    /// Internal server error.
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingFields(fields) => {
                write!(f, "Missing required fields: {}", fields.missing.join(", "))
            }
            AppError::MethodNotAllowed => write!(f, "Method not allowed"),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Upstream {
                message, status, ..
            } => match status {
                Some(status) => write!(f, "{} ({})", message, status),
                None => write!(f, "{}", message),
            },
            AppError::Internal { message, details } => match details {
                Some(details) => write!(f, "{}: {}", message, details),
                None => write!(f, "{}", message),
            },
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFields(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Configuration(_) | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn body(&self) -> Value {
        match self {
            AppError::MissingFields(fields) => json!({
                "error": "Missing required fields",
                "required": fields.required,
                "missing": fields.missing,
            }),
            AppError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            AppError::Configuration(msg) => json!({ "error": msg }),
            AppError::Upstream {
                message,
                status,
                details,
            } => {
                let mut body = Map::new();
                body.insert("error".to_string(), json!(message));
                if let Some(status) = status {
                    body.insert("status".to_string(), json!(status));
                }
                if let Some(details) = details {
                    body.insert("details".to_string(), json!(details));
                }
                Value::Object(body)
            }
            AppError::Internal { message, details } => match details {
                Some(details) => json!({ "error": message, "details": details }),
                None => json!({ "error": message }),
            },
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON body.
    /// Logs errors appropriately based on their severity.
    fn into_response(self) -> Response {
        match &self {
            AppError::MissingFields(fields) => {
                tracing::warn!("Missing required fields: {:?}", fields.missing)
            }
            AppError::MethodNotAllowed => tracing::debug!("Rejected non-POST webhook request"),
            AppError::Configuration(msg) => tracing::error!("Configuration error: {}", msg),
            AppError::Upstream { .. } => tracing::error!("Upstream error: {}", self),
            AppError::Internal { .. } => tracing::error!("Internal error: {}", self),
        }

        let status = self.status_code();
        let body = Json(self.body());

        if matches!(self, AppError::MethodNotAllowed) {
            return (status, [(header::ALLOW, "POST")], body).into_response();
        }

        (status, body).into_response()
    }
}

impl From<LookupError> for AppError {
    /// Converts an OpenRouter lookup failure into an `AppError`.
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::MissingApiKey => {
                AppError::Configuration("OPENROUTER_API_KEY is not configured".to_string())
            }
            LookupError::Status { status, body } => AppError::Upstream {
                message: "OpenRouter request failed".to_string(),
                status: Some(status),
                details: Some(body),
            },
            LookupError::EmptyContent => AppError::Upstream {
                message: "OpenRouter returned no content".to_string(),
                status: None,
                details: None,
            },
            LookupError::Transport(details) => AppError::Internal {
                message: "Unexpected error calling OpenRouter".to_string(),
                details: Some(details),
            },
        }
    }
}
