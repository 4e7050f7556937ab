//! Structured results returned by the NLP service
//!
//! The wire format is loose (field names differ between the success and the
//! failure shape, `device_id` may be a string or a number, `parameter` may be
//! anything). It is narrowed here, once, into [`NlpResponse`] and
//! [`NluResult`] so nothing downstream has to guess.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::error::{HomeError, Result};
use crate::core::types::Parameter;

/// Structured interpretation of one command
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NluResult {
    /// Command verb in NLU vocabulary (`TURN_ON`, `SET_VOLUME`, ...)
    pub action: String,
    /// Target device type
    pub entity: String,
    /// Room tag, `None` when the command names no room
    pub location: Option<String>,
    /// Explicit device id; `None` when absent, empty or `"0"`
    pub device_id: Option<String>,
    pub parameter: Parameter,
    /// Interpreter confidence (0.0 - 1.0)
    pub confidence: f64,
}

impl NluResult {
    /// The empty-defaulted result used on failure paths
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.action.is_empty() && self.entity.is_empty()
    }

    /// Wire representation, as the NLP service would send it
    pub fn to_wire(&self) -> Value {
        json!({
            "action": self.action,
            "entity": self.entity,
            "location": self.location.clone().unwrap_or_default(),
            "device_id": self.device_id.clone().unwrap_or_else(|| "0".to_string()),
            "parameter": self.parameter.to_json(),
            "confidence": self.confidence,
        })
    }
}

/// Reply from the NLP service for one command
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NlpResponse {
    pub transcribed_text: Option<String>,
    /// `None` means the service sent no NLU result at all
    pub nlu_result: Option<NluResult>,
    pub tts_output_reference: Option<String>,
    pub response_message_for_tts: Option<String>,
    /// Set when the service (or the gateway) flagged the command as failed
    pub error_message: Option<String>,
}

impl NlpResponse {
    /// A successful reply
    pub fn success(transcribed_text: impl Into<String>, nlu_result: NluResult) -> Self {
        Self {
            transcribed_text: Some(transcribed_text.into()),
            nlu_result: Some(nlu_result),
            ..Self::default()
        }
    }

    /// Typed failure carrying an empty-defaulted NLU result
    pub fn failure(message: impl Into<String>, stt_text: impl Into<String>) -> Self {
        Self {
            transcribed_text: Some(stt_text.into()),
            nlu_result: Some(NluResult::empty()),
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }

    /// Decode a response body from the NLP service
    pub fn from_json(value: Value) -> Result<Self> {
        let wire: WireResponse = serde_json::from_value(value)?;
        Ok(wire.into())
    }

    /// Decode a response body given as text
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body).map_err(|e| {
            HomeError::NlpError(format!("Invalid NLP response: {} - Body: {}", e, body))
        })?;
        Self::from_json(value)
    }

    /// Wire representation, in the success or failure shape
    pub fn to_wire(&self) -> Value {
        let nlu = self.nlu_result.as_ref().map(NluResult::to_wire);
        match &self.error_message {
            Some(message) => json!({
                "error": true,
                "errorMessage": message,
                "sttText": self.transcribed_text.clone().unwrap_or_default(),
                "nluResult": nlu,
            }),
            None => {
                let mut body = json!({
                    "transcribed_text": self.transcribed_text,
                    "nlu_result": nlu,
                });
                if let Some(tts) = &self.tts_output_reference {
                    body["tts_output_reference"] = json!(tts);
                }
                if let Some(msg) = &self.response_message_for_tts {
                    body["response_message_for_tts"] = json!(msg);
                }
                body
            }
        }
    }
}

const DEFAULT_ERROR_MESSAGE: &str = "NLP service reported an error";

#[derive(Deserialize, Default)]
struct WireResponse {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default, rename = "errorMessage", alias = "error_message")]
    error_message: Option<String>,
    #[serde(default, alias = "sttText")]
    transcribed_text: Option<String>,
    #[serde(default, alias = "nluResult")]
    nlu_result: Option<WireNluResult>,
    #[serde(default)]
    tts_output_reference: Option<String>,
    #[serde(default)]
    response_message_for_tts: Option<String>,
}

#[derive(Deserialize, Default)]
struct WireNluResult {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    entity: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default, alias = "deviceId")]
    device_id: Option<Value>,
    #[serde(default)]
    parameter: Parameter,
    #[serde(default)]
    confidence: Option<f64>,
}

impl From<WireResponse> for NlpResponse {
    fn from(wire: WireResponse) -> Self {
        let flagged = match &wire.error {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.is_empty(),
            _ => false,
        };
        let error_message = if flagged {
            let from_flag = match &wire.error {
                Some(Value::String(s)) => Some(s.clone()),
                _ => None,
            };
            Some(
                wire.error_message
                    .or(from_flag)
                    .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
            )
        } else {
            None
        };

        Self {
            transcribed_text: wire.transcribed_text,
            nlu_result: wire.nlu_result.map(NluResult::from),
            tts_output_reference: non_blank(wire.tts_output_reference),
            response_message_for_tts: non_blank(wire.response_message_for_tts),
            error_message,
        }
    }
}

impl From<WireNluResult> for NluResult {
    fn from(wire: WireNluResult) -> Self {
        let confidence = wire
            .confidence
            .filter(|c| c.is_finite())
            .map(|c| c.clamp(0.0, 1.0))
            .unwrap_or(0.0);

        Self {
            action: wire.action.unwrap_or_default().trim().to_string(),
            entity: wire.entity.unwrap_or_default().trim().to_string(),
            location: non_blank(wire.location),
            device_id: wire.device_id.as_ref().and_then(device_id_from_json),
            parameter: wire.parameter,
            confidence,
        }
    }
}

/// `""`, `"0"` and `0` all mean "no explicit device"
fn device_id_from_json(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if id.is_empty() || id == "0" {
        None
    } else {
        Some(id)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let body = json!({
            "transcribed_text": "打开客厅的灯",
            "nlu_result": {
                "action": "TURN_ON",
                "entity": "light",
                "location": "living_room",
                "device_id": "0",
                "parameter": null,
                "confidence": 0.93
            },
            "tts_output_reference": "/tts/abc.wav"
        });
        let response = NlpResponse::from_json(body).unwrap();
        assert!(!response.is_error());
        assert_eq!(response.transcribed_text.as_deref(), Some("打开客厅的灯"));
        assert_eq!(response.tts_output_reference.as_deref(), Some("/tts/abc.wav"));

        let nlu = response.nlu_result.unwrap();
        assert_eq!(nlu.action, "TURN_ON");
        assert_eq!(nlu.location.as_deref(), Some("living_room"));
        assert_eq!(nlu.device_id, None);
        assert_eq!(nlu.parameter, Parameter::Absent);
        assert!((nlu.confidence - 0.93).abs() < 1e-9);
    }

    #[test]
    fn test_failure_shape() {
        let body = json!({
            "error": true,
            "errorMessage": "STT failed",
            "sttText": "",
            "nluResult": {"action": "", "entity": "", "location": "", "device_id": "0", "parameter": null}
        });
        let response = NlpResponse::from_json(body).unwrap();
        assert_eq!(response.error_message.as_deref(), Some("STT failed"));
        let nlu = response.nlu_result.unwrap();
        assert!(nlu.is_empty());
        assert_eq!(nlu.location, None);
        assert_eq!(nlu.confidence, 0.0);
    }

    #[test]
    fn test_error_without_message_or_result() {
        let response = NlpResponse::from_json(json!({"error": true})).unwrap();
        assert_eq!(response.error_message.as_deref(), Some(DEFAULT_ERROR_MESSAGE));
        assert!(response.nlu_result.is_none());
    }

    #[test]
    fn test_numeric_device_id() {
        let response = NlpResponse::from_json(json!({
            "nlu_result": {"action": "TURN_ON", "entity": "light", "device_id": 3}
        }))
        .unwrap();
        assert_eq!(response.nlu_result.unwrap().device_id.as_deref(), Some("3"));

        let zero = NlpResponse::from_json(json!({
            "nlu_result": {"action": "TURN_ON", "entity": "light", "device_id": 0}
        }))
        .unwrap();
        assert_eq!(zero.nlu_result.unwrap().device_id, None);
    }

    #[test]
    fn test_confidence_clamped() {
        let response = NlpResponse::from_json(json!({
            "nlu_result": {"action": "TURN_ON", "entity": "light", "confidence": 3.5}
        }))
        .unwrap();
        assert_eq!(response.nlu_result.unwrap().confidence, 1.0);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(NlpResponse::parse("<html>bad gateway</html>").is_err());
    }

    #[test]
    fn test_failure_wire_shape() {
        let wire = NlpResponse::failure("boom", "hello").to_wire();
        assert_eq!(wire["error"], json!(true));
        assert_eq!(wire["sttText"], json!("hello"));
        assert_eq!(wire["nluResult"]["device_id"], json!("0"));
        assert_eq!(wire["nluResult"]["parameter"], json!(null));
    }
}
