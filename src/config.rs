use crate::validation::RequiredFields;

pub const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Optional at startup; a request that needs it fails with a configuration error.
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub openrouter_base_url: String,
    /// Ortto merge is skipped unless both the key and the URL are set.
    pub ortto_api_key: Option<String>,
    pub ortto_update_url: Option<String>,
    pub http_timeout_secs: u64,
    pub require_prompt: bool,
    pub require_contact_id: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("OpenRouter base URL: {}", config.openrouter_base_url);
        tracing::debug!("OpenRouter model: {}", config.openrouter_model);
        if config.openrouter_api_key.is_none() {
            tracing::warn!("OPENROUTER_API_KEY not set - webhook requests will fail with 500");
        }
        match (&config.ortto_update_url, &config.ortto_api_key) {
            (Some(url), Some(_)) => tracing::info!("Ortto update URL configured: {}", url),
            _ => {
                tracing::warn!("Ortto update disabled (missing ORTTO_UPDATE_URL or ORTTO_API_KEY)")
            }
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            port: var("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            openrouter_api_key: var("OPENROUTER_API_KEY"),
            openrouter_model: var("OPENROUTER_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string()),
            openrouter_base_url: var("OPENROUTER_BASE_URL")
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("OPENROUTER_BASE_URL must start with http:// or https://");
                    }
                    Ok(url.trim_end_matches('/').to_string())
                })
                .transpose()?
                .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
            ortto_api_key: var("ORTTO_API_KEY"),
            ortto_update_url: var("ORTTO_UPDATE_URL")
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("ORTTO_UPDATE_URL must start with http:// or https://");
                    }
                    Ok(url)
                })
                .transpose()?,
            http_timeout_secs: var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse::<u64>()
                .ok()
                .filter(|secs| (1..=300).contains(secs))
                .ok_or_else(|| {
                    anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a number between 1-300")
                })?,
            require_prompt: parse_flag("REQUIRE_PROMPT", var("REQUIRE_PROMPT"))?,
            require_contact_id: parse_flag("REQUIRE_CONTACT_ID", var("REQUIRE_CONTACT_ID"))?,
        })
    }

    pub fn required_fields(&self) -> RequiredFields {
        RequiredFields {
            require_prompt: self.require_prompt,
            require_contact_id: self.require_contact_id,
        }
    }
}

fn parse_flag(name: &str, value: Option<String>) -> anyhow::Result<bool> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(_) => anyhow::bail!("{} must be true or false", name),
    }
}
