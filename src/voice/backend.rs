//! Voice-capture backends
//!
//! A backend turns one recorded clip into a recognized command. The simulated
//! backend makes one up; the external backend hands the clip to a recognizer
//! program and reads its JSON verdict from stdout.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::process::Command;
use uuid::Uuid;

use crate::core::config::{VoiceBackendKind, VoiceConfig};
use crate::core::error::{HomeError, Result};

const SIM_INTENTS: &[&str] = &[
    "turn_on",
    "turn_off",
    "set_temperature",
    "set_volume",
    "open_curtain",
    "close_curtain",
];

const SIM_DEVICES: &[&str] = &["客厅灯", "卧室空调", "阳台窗帘", "客厅电视", "加湿器", "风扇"];

/// Placeholder in external program arguments replaced by the clip path
pub const AUDIO_PLACEHOLDER: &str = "{audio}";

/// A recognized voice command
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VoiceCommand {
    #[serde(alias = "transcription", default)]
    pub text: String,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub entities: Map<String, Value>,
    #[serde(default)]
    pub confidence: f64,
}

/// How recorded clips are recognized
pub enum VoiceBackend {
    Simulated(SimulatedRecognizer),
    External(ExternalRecognizer),
}

impl VoiceBackend {
    pub fn from_config(config: &VoiceConfig) -> Self {
        match config.backend {
            VoiceBackendKind::Simulated => {
                Self::Simulated(SimulatedRecognizer::new(config.seed))
            }
            VoiceBackendKind::External => Self::External(ExternalRecognizer::from_config(config)),
        }
    }

    pub fn kind(&self) -> VoiceBackendKind {
        match self {
            Self::Simulated(_) => VoiceBackendKind::Simulated,
            Self::External(_) => VoiceBackendKind::External,
        }
    }

    /// Recognize one clip
    pub async fn process(&self, audio: &[u8], file_name: &str) -> Result<VoiceCommand> {
        tracing::info!("Processing voice clip {} ({} bytes)", file_name, audio.len());
        match self {
            Self::Simulated(sim) => Ok(sim.recognize()),
            Self::External(ext) => ext.recognize(audio).await,
        }
    }
}

/// Produces random but plausible commands
pub struct SimulatedRecognizer {
    rng: Mutex<StdRng>,
}

impl SimulatedRecognizer {
    /// Seeded for reproducible output, otherwise from entropy
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    pub fn recognize(&self) -> VoiceCommand {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        let spoken = SIM_DEVICES.choose(&mut *rng).copied().unwrap_or_default();
        let intent = SIM_INTENTS.choose(&mut *rng).copied().unwrap_or_default();
        let device = SIM_DEVICES.choose(&mut *rng).copied().unwrap_or_default();

        let mut entities = Map::new();
        entities.insert("device".into(), json!(device));
        match intent {
            "set_temperature" => {
                entities.insert("temperature".into(), json!(rng.gen_range(20..30)));
            }
            "set_volume" => {
                entities.insert("volume".into(), json!(rng.gen_range(5..20)));
            }
            _ => {}
        }

        VoiceCommand {
            text: format!("打开{}", spoken),
            intent: intent.to_string(),
            entities,
            confidence: 0.85 + rng.gen::<f64>() * 0.15,
        }
    }
}

/// Runs a recognizer program once per clip
pub struct ExternalRecognizer {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    stt_engine: String,
    nlu_engine: String,
}

impl ExternalRecognizer {
    pub fn from_config(config: &VoiceConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            working_dir: config.working_dir.clone(),
            stt_engine: config.stt_engine.clone(),
            nlu_engine: config.nlu_engine.clone(),
        }
    }

    pub async fn recognize(&self, audio: &[u8]) -> Result<VoiceCommand> {
        let clip = std::env::temp_dir().join(format!("voice_{}.wav", Uuid::new_v4()));
        tokio::fs::write(&clip, audio).await?;

        let result = self.run(&clip).await;

        if let Err(e) = tokio::fs::remove_file(&clip).await {
            tracing::debug!("Could not remove {}: {}", clip.display(), e);
        }
        result
    }

    async fn run(&self, clip: &Path) -> Result<VoiceCommand> {
        let clip_path = clip.to_string_lossy();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(AUDIO_PLACEHOLDER, &clip_path))
            .collect();

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .env("VOICE_STT_ENGINE", &self.stt_engine)
            .env("VOICE_NLU_ENGINE", &self.nlu_engine)
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let output = command.output().await.map_err(|e| {
            HomeError::VoiceBackendError(format!("failed to run {}: {}", self.program, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!("{} exited with {}: {}", self.program, output.status, stderr.trim());
            return Err(HomeError::VoiceBackendError(format!(
                "voice processing failed with {}",
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(stdout.trim()).map_err(|e| {
            HomeError::VoiceBackendError(format!("unreadable recognizer output: {}", e))
        })
    }
}
