//! NLP Gateway Contract Tests
//!
//! Verify the HTTP contract with the NLP service: request shape per route,
//! decoding of the success and failure bodies, and that transport problems
//! come back as typed failures instead of errors.

use std::time::Duration;

use homevoice::command::CommandForwarder;
use homevoice::core::types::{Parameter, SettingsMap};
use homevoice::nlp::{HttpNlpGateway, NlpGateway, NlpResponse, NluResult};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> HttpNlpGateway {
    HttpNlpGateway::new(server.uri(), Duration::from_secs(2), Duration::from_secs(1)).unwrap()
}

fn settings() -> SettingsMap {
    let mut settings = SettingsMap::new();
    settings.insert("stt".into(), json!({"engine": "dolphin"}));
    settings
}

// ────────────────────────────────────────────────────────────────────────────
// Request format
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_text_request_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/process_text"))
        .and(body_partial_json(json!({
            "text_input": "打开客厅的灯",
            "settings": {"stt": {"engine": "dolphin"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transcribed_text": "打开客厅的灯",
            "nlu_result": {
                "action": "TURN_ON",
                "entity": "light",
                "location": "living_room",
                "device_id": "0",
                "parameter": null,
                "confidence": 0.93
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = gateway(&server).process_text("打开客厅的灯", &settings()).await;

    assert!(!response.is_error());
    let nlu = response.nlu_result.unwrap();
    assert_eq!(nlu.action, "TURN_ON");
    assert_eq!(nlu.location.as_deref(), Some("living_room"));
    assert_eq!(nlu.device_id, None);
    assert_eq!(nlu.parameter, Parameter::Absent);
}

#[tokio::test]
async fn test_audio_request_is_multipart() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/process_audio"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"audio_file\""))
        .and(body_string_contains("filename=\"cmd.wav\""))
        .and(body_string_contains("name=\"settings_json\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transcribed_text": "把空调调到24度",
            "nlu_result": {
                "action": "SET_TEMPERATURE",
                "entity": "ac",
                "location": "",
                "device_id": "ac_1",
                "parameter": 24.0,
                "confidence": 0.8
            },
            "tts_output_reference": "/tts/42.wav"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = gateway(&server)
        .process_audio(b"RIFF....WAVE", "cmd.wav", &settings())
        .await;

    assert!(!response.is_error());
    assert_eq!(response.tts_output_reference.as_deref(), Some("/tts/42.wav"));
    let nlu = response.nlu_result.unwrap();
    assert_eq!(nlu.device_id.as_deref(), Some("ac_1"));
    assert_eq!(nlu.location, None);
    assert_eq!(nlu.parameter, Parameter::Integer(24));
}

// ────────────────────────────────────────────────────────────────────────────
// Failures
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_failure_body_is_decoded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/process_text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": true,
            "errorMessage": "STT engine crashed",
            "sttText": "",
            "nluResult": {"action": "", "entity": "", "location": "", "device_id": "0",
                          "parameter": null, "confidence": 0.0}
        })))
        .mount(&server)
        .await;

    let response = gateway(&server).process_text("hello", &settings()).await;

    assert_eq!(response.error_message.as_deref(), Some("STT engine crashed"));
    assert!(response.nlu_result.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_error_becomes_typed_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/process_text"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let response = gateway(&server).process_text("关灯", &settings()).await;

    assert!(response.is_error());
    assert!(response
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("Failed to call NLP service"));
    assert_eq!(response.transcribed_text.as_deref(), Some("关灯"));
    assert_eq!(response.nlu_result, Some(NluResult::empty()));
}

#[tokio::test]
async fn test_garbage_body_becomes_typed_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/process_audio"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let response = gateway(&server).process_audio(b"RIFF", "a.wav", &settings()).await;
    assert!(response.is_error());
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/process_text"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let gateway =
        HttpNlpGateway::new(server.uri(), Duration::from_millis(300), Duration::from_millis(300))
            .unwrap();
    let response = gateway.process_text("turn on", &settings()).await;
    assert!(response.is_error());
}

// ────────────────────────────────────────────────────────────────────────────
// Health probe
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    assert!(!gateway(&server).health_check().await);

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;
    assert!(gateway(&server).health_check().await);
}

// ────────────────────────────────────────────────────────────────────────────
// Forwarding
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_forwarder_posts_wire_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/base/command"))
        .and(body_partial_json(json!({
            "transcribed_text": "开灯",
            "nlu_result": {"action": "TURN_ON", "entity": "light", "device_id": "0"}
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let forwarder = CommandForwarder::new(format!("{}/base/command", server.uri())).unwrap();
    let reply = NlpResponse::success(
        "开灯",
        NluResult {
            action: "TURN_ON".into(),
            entity: "light".into(),
            ..NluResult::default()
        },
    );
    assert!(forwarder.forward(&reply).await);
}

#[tokio::test]
async fn test_forwarder_rejection_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let forwarder = CommandForwarder::new(server.uri()).unwrap();
    assert!(!forwarder.forward(&NlpResponse::failure("x", "")).await);
}
