//! Application configuration
//!
//! Loaded from a TOML file (see `config/homevoice.toml`), then overridden by
//! environment variables, then validated once at startup. Every field has a
//! default so an empty file (or no file at all) is a working configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::error::{HomeError, Result};
use crate::core::types::Language;
use crate::device::model::Device;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Language used for feedback sentences
    pub language: Language,

    /// Where the NLP service lives and how long we wait for it
    pub nlp: NlpConfig,

    /// Optional downstream endpoint that receives every NLP reply
    pub forward: ForwardConfig,

    /// Voice-capture backend selection
    pub voice: VoiceConfig,

    /// Seed devices; the built-in set is used when this is empty
    ///
    /// New device types are added here - the type tag is free-form.
    pub devices: Vec<Device>,
}

/// NLP service connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NlpConfig {
    /// Base URL, without the route (`/process_text` etc. are appended)
    pub base_url: String,

    /// Upper bound for one processing request, in seconds
    ///
    /// There is no retry: a voice command answered late is worse than one
    /// that fails fast.
    pub timeout_secs: u64,

    /// Upper bound for the pre-flight health probe, in seconds
    ///
    /// Should stay well below `timeout_secs`; the probe runs before every
    /// command.
    pub health_timeout_secs: u64,
}

/// Command forwarding settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardConfig {
    /// Endpoint receiving the raw NLP reply; forwarding is off when unset
    pub url: Option<String>,
}

/// Which voice-capture backend to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceBackendKind {
    /// Produces random but plausible recognized commands
    #[default]
    Simulated,
    /// Runs an external recognizer program per clip
    External,
}

impl FromStr for VoiceBackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simulated" | "sim" => Ok(Self::Simulated),
            "external" | "real" => Ok(Self::External),
            other => Err(format!("unknown voice backend: {}", other)),
        }
    }
}

/// Voice-capture backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub backend: VoiceBackendKind,

    /// Program run by the external backend
    pub program: String,

    /// Arguments for `program`; `{audio}` is replaced by the clip's path
    pub args: Vec<String>,

    /// Working directory for `program`
    pub working_dir: Option<PathBuf>,

    /// Passed to the external program as `VOICE_STT_ENGINE`
    pub stt_engine: String,

    /// Passed to the external program as `VOICE_NLU_ENGINE`
    pub nlu_engine: String,

    /// Seed for the simulated backend; random when unset
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: Language::Zh,
            nlp: NlpConfig::default(),
            forward: ForwardConfig::default(),
            voice: VoiceConfig::default(),
            devices: Vec::new(),
        }
    }
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8010".to_string(),
            timeout_secs: 10,
            health_timeout_secs: 3,
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            backend: VoiceBackendKind::Simulated,
            program: "python".to_string(),
            args: vec!["-m".to_string(), "voice_module".to_string(), "{audio}".to_string()],
            working_dir: None,
            stt_engine: "whisper".to_string(),
            nlu_engine: "bert".to_string(),
            seed: None,
        }
    }
}

impl AppConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            HomeError::InvalidConfig(format!("{}: {}", path.display(), e))
        })
    }

    /// Apply overrides from the process environment
    ///
    /// `NLP_SERVICE_URL`, `COMMAND_FORWARD_URL`, `HOMEVOICE_LANGUAGE`
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("NLP_SERVICE_URL") {
            self.nlp.base_url = url;
        }
        if let Some(url) = lookup("COMMAND_FORWARD_URL") {
            self.forward.url = if url.trim().is_empty() { None } else { Some(url) };
        }
        if let Some(lang) = lookup("HOMEVOICE_LANGUAGE") {
            match lang.parse() {
                Ok(language) => self.language = language,
                Err(e) => tracing::warn!("Ignoring HOMEVOICE_LANGUAGE: {}", e),
            }
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !is_http_url(&self.nlp.base_url) {
            return Err(format!(
                "nlp.base_url ({}) must be an http(s) URL",
                self.nlp.base_url
            ));
        }

        if self.nlp.timeout_secs == 0 || self.nlp.health_timeout_secs == 0 {
            return Err("NLP timeouts must be positive".into());
        }

        if self.nlp.health_timeout_secs > self.nlp.timeout_secs {
            return Err(format!(
                "nlp.health_timeout_secs ({}) should be <= nlp.timeout_secs ({})",
                self.nlp.health_timeout_secs, self.nlp.timeout_secs
            ));
        }

        if let Some(url) = &self.forward.url {
            if !is_http_url(url) {
                return Err(format!("forward.url ({}) must be an http(s) URL", url));
            }
        }

        if self.voice.backend == VoiceBackendKind::External && self.voice.program.trim().is_empty()
        {
            return Err("voice.program is required for the external backend".into());
        }

        let mut seen = std::collections::HashSet::new();
        for device in &self.devices {
            if device.id.trim().is_empty() {
                return Err(format!("device '{}' has an empty id", device.name));
            }
            if !seen.insert(device.id.as_str()) {
                return Err(format!("duplicate device id: {}", device.id));
            }
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            language = "en"

            [nlp]
            base_url = "http://nlp.local:9000"

            [[devices]]
            id = "heater_1"
            name = "Bathroom heater"
            type = "heater"
            location = "bathroom"
            "#,
        )
        .unwrap();
        assert_eq!(config.language, Language::En);
        assert_eq!(config.nlp.base_url, "http://nlp.local:9000");
        assert_eq!(config.nlp.timeout_secs, 10);
        assert_eq!(config.devices.len(), 1);
        assert_eq!(config.devices[0].device_type, "heater");
        assert_eq!(config.devices[0].status, "off");
    }

    #[test]
    fn test_bundled_sample_parses() {
        let config = AppConfig::from_toml_str(include_str!("../../config/homevoice.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.devices.is_empty());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("NLP_SERVICE_URL", "http://10.0.0.2:8010"),
            ("COMMAND_FORWARD_URL", "http://127.0.0.1:8005/base/command"),
            ("HOMEVOICE_LANGUAGE", "en-US"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.nlp.base_url, "http://10.0.0.2:8010");
        assert_eq!(
            config.forward.url.as_deref(),
            Some("http://127.0.0.1:8005/base/command")
        );
        assert_eq!(config.language, Language::En);
    }

    #[test]
    fn test_validate_rejects_bad_timeouts() {
        let mut config = AppConfig::default();
        config.nlp.health_timeout_secs = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_devices() {
        let mut config = AppConfig::default();
        config.devices = vec![
            Device::new("a", "A", "light", "bedroom"),
            Device::new("a", "B", "light", "kitchen"),
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_voice_backend_kind_parsing() {
        assert_eq!("real".parse::<VoiceBackendKind>().unwrap(), VoiceBackendKind::External);
        assert!("magic".parse::<VoiceBackendKind>().is_err());
    }
}
