//! Best-effort forwarding of NLP replies to a downstream endpoint

use std::time::Duration;

use reqwest::Client;

use crate::core::error::{HomeError, Result};
use crate::nlp::result::NlpResponse;

const FORWARD_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts every NLP reply, as JSON, to a configured endpoint
///
/// Failures are logged and swallowed; forwarding never changes the outcome
/// of a command.
pub struct CommandForwarder {
    client: Client,
    url: String,
}

impl CommandForwarder {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(FORWARD_TIMEOUT)
            .build()
            .map_err(|e| HomeError::NlpError(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Forward a reply; returns whether the endpoint accepted it
    pub async fn forward(&self, response: &NlpResponse) -> bool {
        let result = self
            .client
            .post(&self.url)
            .json(&response.to_wire())
            .send()
            .await;

        match result {
            Ok(r) if r.status().is_success() => {
                tracing::info!("Forwarded command to {}", self.url);
                true
            }
            Ok(r) => {
                tracing::warn!("Command forward to {} rejected: {}", self.url, r.status());
                false
            }
            Err(e) => {
                tracing::warn!("Error forwarding command to {}: {}", self.url, e);
                false
            }
        }
    }
}
