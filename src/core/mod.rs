pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{HomeError, Result};
pub use types::{Language, Parameter, SettingsMap};
