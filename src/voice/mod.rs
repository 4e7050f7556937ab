//! Voice capture: listening state plus clip recognition

pub mod backend;
pub mod listening;

pub use backend::{VoiceBackend, VoiceCommand};
pub use listening::{ListeningState, ListeningStatus};

use crate::core::error::Result;

/// Listening state machine paired with a recognition backend
pub struct VoiceCapture {
    backend: VoiceBackend,
    state: ListeningState,
}

impl VoiceCapture {
    pub fn new(backend: VoiceBackend) -> Self {
        Self {
            backend,
            state: ListeningState::new(),
        }
    }

    pub fn backend(&self) -> &VoiceBackend {
        &self.backend
    }

    pub fn start_listening(&self) -> bool {
        self.state.start()
    }

    pub fn stop_listening(&self) -> bool {
        self.state.stop()
    }

    pub fn is_listening(&self) -> bool {
        self.state.is_listening()
    }

    pub fn status(&self) -> ListeningStatus {
        self.state.status()
    }

    /// Recognize a clip, whether or not the listening flag is set
    pub async fn process(&self, audio: &[u8], file_name: &str) -> Result<VoiceCommand> {
        self.backend.process(audio, file_name).await
    }
}
