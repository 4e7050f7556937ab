//! Gateway to the external NLP service
//!
//! The NLP service is a black box reached over HTTP. It takes either raw
//! audio or text plus a settings bag and answers with a transcription and an
//! NLU result. Transport errors, timeouts and non-2xx replies never escape
//! this module: they are folded into [`NlpResponse::failure`]. Requests are
//! bounded by a timeout and are not retried.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Serialize;

use crate::core::config::NlpConfig;
use crate::core::error::{HomeError, Result};
use crate::core::types::SettingsMap;
use crate::nlp::result::NlpResponse;

/// Contract with the NLP collaborator
///
/// Every method is infallible at the type level; failures come back as typed
/// failure responses (or `false` for the health probe).
#[allow(async_fn_in_trait)]
pub trait NlpGateway {
    /// Transcribe and interpret an audio clip
    async fn process_audio(&self, audio: &[u8], file_name: &str, settings: &SettingsMap)
        -> NlpResponse;

    /// Interpret a typed command
    async fn process_text(&self, text: &str, settings: &SettingsMap) -> NlpResponse;

    /// Whether the service is reachable and healthy
    async fn health_check(&self) -> bool;
}

/// HTTP client for the NLP service
pub struct HttpNlpGateway {
    client: Client,
    base_url: String,
    health_timeout: Duration,
}

impl HttpNlpGateway {
    /// Create a gateway for the service at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration, health_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HomeError::NlpError(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            health_timeout,
        })
    }

    pub fn from_config(config: &NlpConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.health_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send_audio(
        &self,
        audio: &[u8],
        file_name: &str,
        settings: &SettingsMap,
    ) -> Result<NlpResponse> {
        let url = self.endpoint("process_audio");
        let settings_json = serde_json::to_string(settings)?;
        let form = Form::new()
            .part(
                "audio_file",
                Part::bytes(audio.to_vec()).file_name(file_name.to_string()),
            )
            .text("settings_json", settings_json);

        tracing::info!(
            "Sending audio processing request to: {}, file: {}, size: {} bytes",
            url,
            file_name,
            audio.len()
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| HomeError::NlpError(e.to_string()))?;

        Self::read_response(response).await
    }

    async fn send_text(&self, text: &str, settings: &SettingsMap) -> Result<NlpResponse> {
        let url = self.endpoint("process_text");
        let request = TextRequest {
            text_input: text,
            settings,
        };

        tracing::info!("Sending text processing request to: {}, text: {}", url, text);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| HomeError::NlpError(e.to_string()))?;

        Self::read_response(response).await
    }

    async fn read_response(response: reqwest::Response) -> Result<NlpResponse> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HomeError::NlpError(format!(
                "NLP service returned {}: {}",
                status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| HomeError::NlpError(e.to_string()))?;
        NlpResponse::parse(&body)
    }
}

impl NlpGateway for HttpNlpGateway {
    async fn process_audio(
        &self,
        audio: &[u8],
        file_name: &str,
        settings: &SettingsMap,
    ) -> NlpResponse {
        match self.send_audio(audio, file_name, settings).await {
            Ok(response) => {
                tracing::info!("Audio request processed by NLP service");
                response
            }
            Err(e) => {
                tracing::error!("Failed to call NLP service audio processing API: {}", e);
                NlpResponse::failure(format!("Failed to call NLP service: {}", e), "")
            }
        }
    }

    async fn process_text(&self, text: &str, settings: &SettingsMap) -> NlpResponse {
        match self.send_text(text, settings).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to call NLP service text processing API: {}", e);
                NlpResponse::failure(format!("Failed to call NLP service: {}", e), text)
            }
        }
    }

    async fn health_check(&self) -> bool {
        let url = self.endpoint("health");
        match self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::error!("NLP service health check failed: {}", e);
                false
            }
        }
    }
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text_input: &'a str,
    settings: &'a SettingsMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_creation_trims_slash() {
        let gateway = HttpNlpGateway::new(
            "http://localhost:8010/",
            Duration::from_secs(5),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:8010");
        assert_eq!(gateway.endpoint("health"), "http://localhost:8010/health");
    }

    #[test]
    fn test_from_config() {
        let config = NlpConfig::default();
        let gateway = HttpNlpGateway::from_config(&config).unwrap();
        assert_eq!(gateway.base_url(), config.base_url);
    }

    #[tokio::test]
    async fn test_unreachable_service_becomes_failure() {
        // Port 9 (discard) is not expected to run an HTTP server.
        let gateway = HttpNlpGateway::new(
            "http://127.0.0.1:9",
            Duration::from_millis(500),
            Duration::from_millis(500),
        )
        .unwrap();

        let response = gateway.process_text("打开灯", &SettingsMap::new()).await;
        assert!(response.is_error());
        assert_eq!(response.transcribed_text.as_deref(), Some("打开灯"));
        assert!(response.nlu_result.unwrap().is_empty());
        assert!(!gateway.health_check().await);
    }
}
