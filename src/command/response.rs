//! The response handed back to whoever issued the command

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::nlp::result::NluResult;

/// NLU result simplified for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NluDisplay {
    pub action: String,
    pub entity: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Value>,
    pub confidence: f64,
}

impl From<&NluResult> for NluDisplay {
    fn from(nlu: &NluResult) -> Self {
        Self {
            action: nlu.action.clone(),
            entity: nlu.entity.clone(),
            location: nlu.location.clone().unwrap_or_default(),
            device_id: nlu.device_id.clone(),
            parameter: (!nlu.parameter.is_absent()).then(|| nlu.parameter.to_json()),
            confidence: nlu.confidence,
        }
    }
}

/// Final outcome of one command
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    /// Transcribed (audio) or echoed (text) input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nlu_result: Option<NluDisplay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_action_feedback: Option<String>,
    pub command_success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Sentence the caller may speak back to the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_message_for_tts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts_output_reference: Option<String>,
}

impl CommandResponse {
    /// A failed command carrying only an error message
    pub fn failure(error_message: impl Into<String>) -> Self {
        Self {
            command_success: false,
            error_message: Some(error_message.into()),
            ..Self::default()
        }
    }

    pub fn with_stt_text(mut self, text: Option<String>) -> Self {
        self.stt_text = text.filter(|t| !t.is_empty());
        self
    }

    pub fn with_tts_message(mut self, message: impl Into<String>) -> Self {
        self.response_message_for_tts = Some(message.into());
        self
    }

    /// Multi-line human readable rendering
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();
        if let Some(text) = &self.stt_text {
            lines.push(format!("  Heard: {}", text));
        }
        if let Some(nlu) = &self.nlu_result {
            lines.push(format!(
                "  Intent: action={} entity={} location={} device={} parameter={} ({:.0}%)",
                nlu.action,
                nlu.entity,
                if nlu.location.is_empty() { "-" } else { nlu.location.as_str() },
                nlu.device_id.as_deref().unwrap_or("-"),
                nlu.parameter
                    .as_ref()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                nlu.confidence * 100.0
            ));
        }
        if let Some(feedback) = &self.device_action_feedback {
            lines.push(format!("  Result: {}", feedback));
        }
        lines.push(format!(
            "  Success: {}",
            if self.command_success { "yes" } else { "no" }
        ));
        if let Some(error) = &self.error_message {
            lines.push(format!("  Error: {}", error));
        }
        if let Some(tts) = &self.response_message_for_tts {
            lines.push(format!("  Say: {}", tts));
        }
        if let Some(reference) = &self.tts_output_reference {
            lines.push(format!("  Audio: {}", reference));
        }
        lines.join("\n")
    }
}
