//! NLP collaborator: result types and the HTTP gateway

pub mod gateway;
pub mod result;

pub use gateway::{HttpNlpGateway, NlpGateway};
pub use result::{NluResult, NlpResponse};
