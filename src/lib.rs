//! Homevoice - voice and text command orchestration for a smart home
//!
//! A command (recorded audio or typed text) is interpreted by an external
//! NLP service, resolved against the device registry and applied; the caller
//! gets back a response with localized feedback.

pub mod app;
pub mod command;
pub mod core;
pub mod device;
pub mod nlp;
pub mod settings;
pub mod voice;

pub use app::HomeAssistant;
