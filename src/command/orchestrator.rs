//! Command orchestration - one command from raw input to final response
//!
//! Pipeline per command:
//!
//! ```text
//! validate -> health check -> call NLP -> forward -> resolve -> respond
//! ```
//!
//! An unhealthy collaborator short-circuits with an apology and no NLP call.
//! An error reply that still carries an NLU result is resolved anyway and
//! reported as unsuccessful; an error reply without one fails immediately.
//! A missing device is feedback, not a failure.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::command::forward::CommandForwarder;
use crate::command::resolver::{DeviceResolver, Resolution};
use crate::command::response::{CommandResponse, NluDisplay};
use crate::core::error::{HomeError, Result};
use crate::core::types::SettingsMap;
use crate::device::labels::Labels;
use crate::device::registry::DeviceRegistry;
use crate::nlp::gateway::NlpGateway;
use crate::nlp::result::{NlpResponse, NluResult};

/// Drives commands through the NLP collaborator and onto devices
pub struct CommandOrchestrator<G> {
    gateway: G,
    registry: Arc<DeviceRegistry>,
    forwarder: Option<CommandForwarder>,
    labels: Labels,
}

impl<G: NlpGateway> CommandOrchestrator<G> {
    pub fn new(gateway: G, registry: Arc<DeviceRegistry>, labels: Labels) -> Self {
        Self {
            gateway,
            registry,
            forwarder: None,
            labels,
        }
    }

    /// Hand every NLP reply to `forwarder` as well
    pub fn with_forwarder(mut self, forwarder: CommandForwarder) -> Self {
        self.forwarder = Some(forwarder);
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    /// Process a typed command
    pub async fn orchestrate_text(&self, text: &str, settings: &SettingsMap) -> CommandResponse {
        let span = tracing::info_span!("command", id = %Uuid::new_v4(), input = "text");
        match self.run_text(text, settings).instrument(span).await {
            Ok(response) => response,
            Err(e) => self.internal_failure(e, Some(text.to_string())),
        }
    }

    /// Process a recorded voice command
    pub async fn orchestrate_audio(
        &self,
        audio: &[u8],
        file_name: &str,
        settings: &SettingsMap,
    ) -> CommandResponse {
        let span = tracing::info_span!("command", id = %Uuid::new_v4(), input = "audio");
        match self.run_audio(audio, file_name, settings).instrument(span).await {
            Ok(response) => response,
            Err(e) => self.internal_failure(e, None),
        }
    }

    async fn run_text(&self, text: &str, settings: &SettingsMap) -> Result<CommandResponse> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(self.rejected());
        }
        tracing::info!("Text command: {}", text);

        if !self.gateway.health_check().await {
            return Ok(self.unavailable(Some(text.to_string())));
        }

        let reply = self.gateway.process_text(text, settings).await;
        self.handle_reply(reply, Some(text.to_string())).await
    }

    async fn run_audio(
        &self,
        audio: &[u8],
        file_name: &str,
        settings: &SettingsMap,
    ) -> Result<CommandResponse> {
        if audio.is_empty() {
            return Ok(self.rejected());
        }
        tracing::info!("Audio command: {} ({} bytes)", file_name, audio.len());

        if !self.gateway.health_check().await {
            return Ok(self.unavailable(None));
        }

        let reply = self.gateway.process_audio(audio, file_name, settings).await;
        self.handle_reply(reply, None).await
    }

    async fn handle_reply(
        &self,
        reply: NlpResponse,
        input_text: Option<String>,
    ) -> Result<CommandResponse> {
        if let Some(forwarder) = &self.forwarder {
            forwarder.forward(&reply).await;
        }

        let stt_text = reply
            .transcribed_text
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or(input_text);
        let tts_fallback = reply
            .response_message_for_tts
            .clone()
            .unwrap_or_else(|| self.labels.apology().to_string());

        if let Some(error) = reply.error_message.clone() {
            tracing::error!("NLP service reported an error: {}", error);
            return match reply.nlu_result.clone() {
                Some(nlu) => {
                    let mut response = self.resolved(&reply, nlu, stt_text).await?;
                    response.command_success = false;
                    response.error_message = Some(error);
                    response.response_message_for_tts = Some(tts_fallback);
                    Ok(response)
                }
                None => Ok(CommandResponse::failure(error)
                    .with_stt_text(stt_text)
                    .with_tts_message(tts_fallback)),
            };
        }

        match reply.nlu_result.clone() {
            Some(nlu) => self.resolved(&reply, nlu, stt_text).await,
            None => {
                tracing::warn!("NLP reply carried no NLU result");
                Ok(CommandResponse::failure(self.labels.no_nlu_result())
                    .with_stt_text(stt_text)
                    .with_tts_message(tts_fallback))
            }
        }
    }

    async fn resolved(
        &self,
        reply: &NlpResponse,
        nlu: NluResult,
        stt_text: Option<String>,
    ) -> Result<CommandResponse> {
        let display = NluDisplay::from(&nlu);
        let resolution = self.resolve(nlu).await?;
        tracing::info!("Device feedback: {}", resolution.feedback);

        Ok(CommandResponse {
            stt_text: None,
            nlu_result: Some(display),
            device_action_feedback: Some(resolution.feedback),
            command_success: true,
            error_message: None,
            response_message_for_tts: reply.response_message_for_tts.clone(),
            tts_output_reference: reply.tts_output_reference.clone(),
        }
        .with_stt_text(stt_text))
    }

    /// Resolution takes device locks, so it runs off the async workers
    async fn resolve(&self, nlu: NluResult) -> Result<Resolution> {
        let registry = Arc::clone(&self.registry);
        let labels = self.labels;
        tokio::task::spawn_blocking(move || DeviceResolver::new(&registry, labels).resolve(&nlu))
            .await
            .map_err(|e| HomeError::Internal(format!("device resolution aborted: {}", e)))
    }

    fn rejected(&self) -> CommandResponse {
        tracing::warn!("Rejected empty command");
        CommandResponse::failure(self.labels.empty_command()).with_tts_message(self.labels.apology())
    }

    fn unavailable(&self, stt_text: Option<String>) -> CommandResponse {
        tracing::error!("NLP service is unavailable");
        CommandResponse::failure(self.labels.nlp_unavailable())
            .with_stt_text(stt_text)
            .with_tts_message(self.labels.apology())
    }

    fn internal_failure(&self, error: HomeError, stt_text: Option<String>) -> CommandResponse {
        tracing::error!("Command failed unexpectedly: {}", error);
        CommandResponse::failure(self.labels.internal_error(&error.to_string()))
            .with_stt_text(stt_text)
            .with_tts_message(self.labels.apology())
    }
}
