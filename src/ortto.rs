use reqwest::{Client, StatusCode};
use std::fmt::Display;

use crate::config::Config;
use crate::webhook_models::{MergeRequest, MergeResult};

/// Client for the Ortto person merge endpoint.
///
/// Optional infrastructure: without an update URL and API key every call is
/// reported as skipped.
#[derive(Clone)]
pub struct OrttoClient {
    client: Client,
    update_url: Option<String>,
    api_key: Option<String>,
}

impl OrttoClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            update_url: config.ortto_update_url.clone(),
            api_key: config.ortto_api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.update_url.is_some() && self.api_key.is_some()
    }

    /// Writes the resolved country name onto the Ortto person.
    ///
    /// Never fails: every outcome, including transport errors, is captured in
    /// the returned [`MergeResult`].
    pub async fn update_contact(
        &self,
        contact_id: &str,
        country_name: &str,
        email: Option<&str>,
    ) -> MergeResult {
        let (Some(url), Some(api_key)) = (self.update_url.as_deref(), self.api_key.as_deref())
        else {
            return MergeResult::skipped("missing ORTTO_UPDATE_URL or ORTTO_API_KEY");
        };

        let body = MergeRequest::country_update(contact_id, country_name, email);

        let response = match self
            .client
            .post(url)
            .header("X-Api-Key", api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return MergeResult::transport_failure(format!("Ortto request failed: {}", e)),
        };

        let status = response.status();
        merge_outcome(status, response.text().await)
    }
}

fn merge_outcome<E: Display>(status: StatusCode, body: Result<String, E>) -> MergeResult {
    match body {
        Ok(text) if status.is_success() => MergeResult::succeeded(status.as_u16(), text),
        Ok(text) => MergeResult::rejected(status.as_u16(), text),
        Err(e) => MergeResult::unreadable_body(
            status.as_u16(),
            format!("Failed to read Ortto response body: {}", e),
        ),
    }
}
