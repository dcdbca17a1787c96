use reqwest::Client;
use serde_json::Value;
use std::fmt;

use crate::config::Config;
use crate::webhook_models::{ChatCompletionRequest, ChatMessage};

/// System instruction used when the payload carries no prompt of its own.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You receive a country code. \
    Interpret the country code and return only the final country name.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// `OPENROUTER_API_KEY` is not set; no request was sent.
    MissingApiKey,
    Status { status: u16, body: String },
    EmptyContent,
    Transport(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::MissingApiKey => write!(f, "OPENROUTER_API_KEY is not configured"),
            LookupError::Status { status, body } => {
                write!(f, "OpenRouter returned {}: {}", status, body)
            }
            LookupError::EmptyContent => write!(f, "OpenRouter returned no content"),
            LookupError::Transport(e) => write!(f, "OpenRouter request failed: {}", e),
        }
    }
}

impl std::error::Error for LookupError {}

/// Client for the OpenRouter chat completions API.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenRouterClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.openrouter_base_url.clone(),
            api_key: config.openrouter_api_key.clone(),
            model: config.openrouter_model.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Builds the chat request for a country code.
    ///
    /// A caller-supplied prompt replaces the default system instruction; the
    /// code always goes in the user turn.
    pub fn build_request(&self, country_code: &str, prompt: Option<&str>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(prompt.unwrap_or(DEFAULT_SYSTEM_PROMPT)),
                ChatMessage::user(format!("Country code: {}", country_code)),
            ],
        }
    }

    /// Asks the model for the country name behind `country_code`.
    ///
    /// # Returns
    ///
    /// * `Result<String, LookupError>` - The trimmed model answer.
    pub async fn resolve_country_name(
        &self,
        country_code: &str,
        prompt: Option<&str>,
    ) -> Result<String, LookupError> {
        let api_key = self.api_key.as_deref().ok_or(LookupError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request(country_code, prompt);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LookupError::Status { status, body });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| LookupError::Transport(format!("invalid response body: {}", e)))?;

        extract_content(&data).ok_or(LookupError::EmptyContent)
    }
}

/// `choices[0].message.content`, trimmed; `None` when missing or blank.
pub fn extract_content(data: &Value) -> Option<String> {
    data.get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(String::from)
}
