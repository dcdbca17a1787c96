use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::field_resolver::COUNTRY_NAME_FIELD;

/// Fields extracted from an inbound Ortto payload.
///
/// Every present value is a non-empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFields {
    pub country_code: Option<String>,
    pub prompt: Option<String>,
    pub contact_id: Option<String>,
    pub email: Option<String>,
}

impl ResolvedFields {
    /// True when none of the fields that mark a real event are present.
    pub fn has_no_signal(&self) -> bool {
        self.country_code.is_none() && self.prompt.is_none() && self.contact_id.is_none()
    }
}

/// Fields that passed the required-field policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFields {
    pub country_code: String,
    pub prompt: Option<String>,
    pub contact_id: Option<String>,
    pub email: Option<String>,
}

/// `{"status": "ok"}` for connectivity probes and empty test deliveries.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Successful lookup, echoed back to Ortto.
#[derive(Debug, Serialize, Deserialize)]
pub struct CountryResolvedResponse {
    #[serde(rename = "str:cm:country-of-residence")]
    pub country_name: String,
    pub contact_id: Option<String>,
    pub ortto_update: Option<MergeResult>,
}

/// OpenRouter chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Ortto person merge request
#[derive(Debug, Clone, Serialize)]
pub struct MergeRequest {
    pub merge_by: String,
    pub people: Vec<MergePerson>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergePerson {
    pub person_id: String,
    pub fields: Map<String, Value>,
}

impl MergeRequest {
    pub const EMAIL_FIELDS: [&'static str; 2] = ["str::email", "str:cm:email-secondary"];

    pub fn country_update(contact_id: &str, country_name: &str, email: Option<&str>) -> Self {
        let mut fields = Map::new();
        fields.insert(
            COUNTRY_NAME_FIELD.to_string(),
            Value::String(country_name.to_string()),
        );
        if let Some(email) = email {
            for key in Self::EMAIL_FIELDS {
                fields.insert(key.to_string(), Value::String(email.to_string()));
            }
        }

        Self {
            merge_by: "person_id".to_string(),
            people: vec![MergePerson {
                person_id: contact_id.to_string(),
                fields,
            }],
        }
    }
}

/// Outcome of the Ortto merge call. Always reported, never raised.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MergeResult {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            skipped: true,
            error: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn succeeded(status: u16, body: String) -> Self {
        Self {
            success: true,
            status: Some(status),
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn rejected(status: u16, body: String) -> Self {
        Self {
            status: Some(status),
            error: Some(format!("Ortto update failed ({})", status)),
            body: Some(body),
            ..Self::default()
        }
    }

    /// Ortto answered but its response body could not be read.
    pub fn unreadable_body(status: u16, error: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}
