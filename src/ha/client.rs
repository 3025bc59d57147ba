use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::config::Config;
use crate::error::{Result, WattsonError};
use crate::logging::get_logger;

/// Home Assistant REST API client
pub struct HaClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
    logger: crate::logging::StructuredLogger,
}

impl HaClient {
    /// Create a new client for the given instance URL and access token
    pub fn new(base_url: String, token: String) -> Result<Self> {
        let logger = get_logger("ha");
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
            logger,
        })
    }

    /// Build a client from the application configuration, resolving the token
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config.resolve_token()?;
        Self::new(config.home_assistant.url.clone(), token)
    }

    /// GET a Home Assistant API endpoint and decode the JSON body
    pub async fn get_json(&self, endpoint: &str) -> Result<serde_json::Value> {
        let url = format!("{}/api/{}", self.base_url, endpoint);
        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token.trim()))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            self.logger
                .error(&format!("Home Assistant API error: {} ({})", status, endpoint));
            return Err(WattsonError::api(format!(
                "Home Assistant API returned {}",
                status
            )));
        }

        Ok(resp.json().await?)
    }

    /// Fetch the state object of a single entity
    pub async fn get_state(&self, entity_id: &str) -> Result<serde_json::Value> {
        self.get_json(&format!("states/{}", entity_id)).await
    }

    /// Fetch all entity states
    pub async fn get_states(&self) -> Result<serde_json::Value> {
        self.get_json("states").await
    }
}
