//! Command pipeline
//!
//! Raw input -> NlpGateway -> NluResult -> DeviceResolver -> CommandResponse

pub mod forward;
pub mod orchestrator;
pub mod resolver;
pub mod response;

pub use forward::CommandForwarder;
pub use orchestrator::CommandOrchestrator;
pub use resolver::{DeviceResolver, Resolution, ResolutionOutcome};
pub use response::{CommandResponse, NluDisplay};
