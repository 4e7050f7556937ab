//! Voice settings bag sent along with every command

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{json, Value};

use crate::core::error::{HomeError, Result};
use crate::core::types::SettingsMap;

/// Factory settings
pub fn default_settings() -> SettingsMap {
    let value = json!({
        "stt": {"engine": "dolphin", "language": "zh-CN"},
        "nlu": {"engine": "nlu_orchestrator", "confidence_threshold": 300},
        "tts": {
            "enabled": true,
            "engine": "pyttsx3",
            "voice": "female",
            "speed": 1.0,
            "pitch": 1.0,
            "volume": 1.0
        },
        "ui": {"theme": "light", "showFeedback": true}
    });
    match value {
        Value::Object(map) => map,
        _ => SettingsMap::new(),
    }
}

/// Current voice settings, shared by every command
#[derive(Debug)]
pub struct SettingsStore {
    current: RwLock<SettingsMap>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(default_settings()),
        }
    }

    /// Snapshot of the current settings
    pub fn current(&self) -> SettingsMap {
        self.read().clone()
    }

    /// Shallow merge: each top-level key in `changes` replaces the stored one
    pub fn update(&self, changes: SettingsMap) {
        let mut current = self.write();
        for (key, value) in changes {
            tracing::debug!("Setting {} = {}", key, value);
            current.insert(key, value);
        }
    }

    /// Merge settings given as a JSON object literal
    pub fn update_from_json(&self, body: &str) -> Result<()> {
        match serde_json::from_str::<Value>(body)? {
            Value::Object(changes) => {
                self.update(changes);
                Ok(())
            }
            other => Err(HomeError::InvalidConfig(format!(
                "settings must be a JSON object, got {}",
                other
            ))),
        }
    }

    pub fn reset(&self) {
        *self.write() = default_settings();
        tracing::info!("Voice settings reset to defaults");
    }

    fn read(&self) -> RwLockReadGuard<'_, SettingsMap> {
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SettingsMap> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}
