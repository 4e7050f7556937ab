//! Home devices: records, registry, control unit and display labels

pub mod control;
pub mod labels;
pub mod model;
pub mod registry;
pub mod seed;

pub use control::{ControlAction, ControlOutcome};
pub use labels::{Labels, StatusPhrase};
pub use model::Device;
pub use registry::DeviceRegistry;
