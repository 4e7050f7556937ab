//! Listening state - whether the assistant is currently capturing voice

use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListeningStatus {
    #[default]
    Idle,
    Listening,
}

/// Process-wide listening flag
///
/// Purely caller driven: no timers, no automatic transitions. `start` and
/// `stop` are idempotent and report whether they changed anything.
#[derive(Debug, Default)]
pub struct ListeningState {
    status: Mutex<ListeningStatus>,
}

impl ListeningState {
    pub fn new() -> Self {
        Self::default()
    }

    /// IDLE -> LISTENING
    pub fn start(&self) -> bool {
        self.transition(ListeningStatus::Listening)
    }

    /// LISTENING -> IDLE
    pub fn stop(&self) -> bool {
        self.transition(ListeningStatus::Idle)
    }

    pub fn is_listening(&self) -> bool {
        self.status() == ListeningStatus::Listening
    }

    pub fn status(&self) -> ListeningStatus {
        *self.lock()
    }

    fn transition(&self, to: ListeningStatus) -> bool {
        let mut status = self.lock();
        if *status == to {
            return false;
        }
        tracing::info!("Listening state {:?} -> {:?}", *status, to);
        *status = to;
        true
    }

    fn lock(&self) -> MutexGuard<'_, ListeningStatus> {
        self.status.lock().unwrap_or_else(|e| e.into_inner())
    }
}
