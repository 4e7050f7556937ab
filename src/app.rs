//! The assistant as a whole: every piece of process-wide state, built once

use std::sync::Arc;

use crate::command::forward::CommandForwarder;
use crate::command::orchestrator::CommandOrchestrator;
use crate::command::response::CommandResponse;
use crate::core::config::AppConfig;
use crate::core::error::{HomeError, Result};
use crate::core::types::Parameter;
use crate::device::control::{self, ControlAction, ControlOutcome};
use crate::device::labels::Labels;
use crate::device::model::Device;
use crate::device::registry::DeviceRegistry;
use crate::device::seed;
use crate::nlp::gateway::{HttpNlpGateway, NlpGateway};
use crate::settings::SettingsStore;
use crate::voice::backend::VoiceBackend;
use crate::voice::VoiceCapture;

/// State holder for the assistant
///
/// Owns the device registry, the voice settings and the listening state, and
/// hands them to the orchestrator by reference. Nothing here is global.
pub struct HomeAssistant<G = HttpNlpGateway> {
    registry: Arc<DeviceRegistry>,
    settings: SettingsStore,
    voice: VoiceCapture,
    orchestrator: CommandOrchestrator<G>,
    labels: Labels,
}

impl HomeAssistant<HttpNlpGateway> {
    /// Build the assistant against the HTTP NLP service named in `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate().map_err(HomeError::InvalidConfig)?;
        let gateway = HttpNlpGateway::from_config(&config.nlp)?;
        Self::with_gateway(config, gateway)
    }
}

impl<G: NlpGateway> HomeAssistant<G> {
    /// Build the assistant around any NLP gateway
    pub fn with_gateway(config: &AppConfig, gateway: G) -> Result<Self> {
        let devices = if config.devices.is_empty() {
            seed::default_devices()
        } else {
            config.devices.clone()
        };
        let registry = Arc::new(DeviceRegistry::with_devices(devices));
        let labels = Labels::new(config.language);

        let mut orchestrator = CommandOrchestrator::new(gateway, Arc::clone(&registry), labels);
        if let Some(url) = &config.forward.url {
            tracing::info!("Forwarding NLP replies to {}", url);
            orchestrator = orchestrator.with_forwarder(CommandForwarder::new(url.clone())?);
        }

        tracing::info!(
            "Assistant ready: {} devices, language {}, {:?} voice backend",
            registry.len(),
            config.language,
            config.voice.backend
        );

        Ok(Self {
            registry,
            settings: SettingsStore::new(),
            voice: VoiceCapture::new(VoiceBackend::from_config(&config.voice)),
            orchestrator,
            labels,
        })
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn voice(&self) -> &VoiceCapture {
        &self.voice
    }

    pub fn orchestrator(&self) -> &CommandOrchestrator<G> {
        &self.orchestrator
    }

    pub fn labels(&self) -> Labels {
        self.labels
    }

    /// Run a typed command with the current settings
    pub async fn handle_text(&self, text: &str) -> CommandResponse {
        let settings = self.settings.current();
        self.orchestrator.orchestrate_text(text, &settings).await
    }

    /// Run a recorded command with the current settings
    pub async fn handle_audio(&self, audio: &[u8], file_name: &str) -> CommandResponse {
        let settings = self.settings.current();
        self.orchestrator
            .orchestrate_audio(audio, file_name, &settings)
            .await
    }

    pub fn device(&self, id: &str) -> Result<Device> {
        self.registry
            .get(id)
            .ok_or_else(|| HomeError::DeviceNotFound(id.to_string()))
    }

    /// Apply one action to one device, bypassing NLP and resolution
    pub fn control_device(&self, id: &str, action: &str, parameter: Parameter) -> Result<Device> {
        let action = ControlAction::parse(action);
        let (outcome, device) = self
            .registry
            .update(id, |device| {
                let outcome = control::apply(device, &action, &parameter);
                (outcome, device.clone())
            })
            .ok_or_else(|| HomeError::DeviceNotFound(id.to_string()))?;

        if outcome != ControlOutcome::Applied {
            tracing::info!("{} on {}: {:?}", action, id, outcome);
        }
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Language, SettingsMap};
    use crate::nlp::result::{NlpResponse, NluResult};
    use std::sync::Mutex;

    /// Records the settings bag it was given
    #[derive(Default)]
    struct EchoGateway {
        seen: Mutex<Option<SettingsMap>>,
    }

    impl NlpGateway for EchoGateway {
        async fn process_audio(&self, _: &[u8], _: &str, s: &SettingsMap) -> NlpResponse {
            *self.seen.lock().unwrap() = Some(s.clone());
            NlpResponse::success("", NluResult::empty())
        }

        async fn process_text(&self, text: &str, s: &SettingsMap) -> NlpResponse {
            *self.seen.lock().unwrap() = Some(s.clone());
            NlpResponse::success(
                text,
                NluResult {
                    action: "TURN_OFF".into(),
                    entity: "tv".into(),
                    ..NluResult::default()
                },
            )
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    fn assistant() -> HomeAssistant<EchoGateway> {
        let config = AppConfig {
            language: Language::En,
            ..AppConfig::default()
        };
        HomeAssistant::with_gateway(&config, EchoGateway::default()).unwrap()
    }

    #[test]
    fn test_seeds_default_devices() {
        let app = assistant();
        assert_eq!(app.registry().len(), seed::default_devices().len());
    }

    #[test]
    fn test_control_device() {
        let app = assistant();
        let device = app
            .control_device("light_2", "set_brightness", Parameter::Integer(40))
            .unwrap();
        assert_eq!(device.brightness, Some(40));
        assert_eq!(app.device("light_2").unwrap().brightness, Some(40));
    }

    #[test]
    fn test_control_unknown_device() {
        let app = assistant();
        let err = app
            .control_device("toaster_9", "turn_on", Parameter::Absent)
            .unwrap_err();
        assert!(matches!(err, HomeError::DeviceNotFound(id) if id == "toaster_9"));
    }

    #[tokio::test]
    async fn test_text_command_carries_current_settings() {
        let app = assistant();
        app.settings()
            .update_from_json(r#"{"stt": {"engine": "whisper"}}"#)
            .unwrap();
        let response = app.handle_text("turn off the tv").await;

        assert!(response.command_success);
        assert_eq!(app.device("tv_1").unwrap().status, "off");
        let seen = app.orchestrator().gateway().seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen["stt"]["engine"], "whisper");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AppConfig::default();
        config.nlp.base_url = "localhost".into();
        assert!(matches!(
            HomeAssistant::from_config(&config),
            Err(HomeError::InvalidConfig(_))
        ));
    }
}
