//! Intent resolution - maps an NluResult onto concrete devices and applies it
//!
//! Target selection:
//! 1. an explicit device id that exists wins outright, whatever the type and
//!    location say;
//! 2. otherwise every device whose type matches, restricted to the location
//!    when one was given.
//!
//! The action fans out to every target, but the feedback sentence is built
//! from the first target only (targets are ordered by id).

use crate::device::control::{self, ControlAction};
use crate::device::labels::{Labels, StatusPhrase};
use crate::device::model::Device;
use crate::device::registry::DeviceRegistry;
use crate::nlp::result::NluResult;

/// How an intent was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Entity type or action was empty; nothing looked up
    MissingTypeOrAction,
    /// No device matched
    NotFound,
    /// The action was handed to the control unit for these devices
    Applied {
        device_ids: Vec<String>,
        /// The verb was not one the control unit knows
        unsupported: bool,
    },
}

/// Result of resolving one intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: ResolutionOutcome,
    /// Localized sentence for the user
    pub feedback: String,
}

impl Resolution {
    pub fn affected_devices(&self) -> &[String] {
        match &self.outcome {
            ResolutionOutcome::Applied { device_ids, .. } => device_ids,
            _ => &[],
        }
    }
}

/// Resolves NLU results against the device registry
pub struct DeviceResolver<'a> {
    registry: &'a DeviceRegistry,
    labels: Labels,
}

impl<'a> DeviceResolver<'a> {
    pub fn new(registry: &'a DeviceRegistry, labels: Labels) -> Self {
        Self { registry, labels }
    }

    /// Resolve an intent, apply it and describe what happened
    pub fn resolve(&self, intent: &NluResult) -> Resolution {
        let entity_type = intent.entity.trim();
        let action = intent.action.trim();

        if entity_type.is_empty() || action.is_empty() {
            tracing::debug!("Cannot resolve intent without type and action: {:?}", intent);
            return Resolution {
                outcome: ResolutionOutcome::MissingTypeOrAction,
                feedback: self.labels.missing_type_or_action().to_string(),
            };
        }

        let location = intent
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty());

        let targets = self.select_targets(entity_type, location, intent.device_id.as_deref());

        let Some(first) = targets.first() else {
            tracing::info!(
                "No {} found in {}",
                entity_type,
                location.unwrap_or("any location")
            );
            return Resolution {
                outcome: ResolutionOutcome::NotFound,
                feedback: self.labels.not_found(location, entity_type),
            };
        };

        let control_action = ControlAction::from_nlu(action);
        let mut device_ids = Vec::with_capacity(targets.len());
        for target in &targets {
            let outcome = self.registry.update(&target.id, |device| {
                control::apply(device, &control_action, &intent.parameter)
            });
            match outcome {
                Some(_) => device_ids.push(target.id.clone()),
                None => tracing::warn!("Device {} disappeared during resolution", target.id),
            }
        }

        let phrase = status_phrase(&control_action);
        let feedback = self
            .labels
            .applied(&first.location, &first.device_type, phrase);

        tracing::debug!(
            "Applied {} to {} device(s): {:?}",
            control_action,
            device_ids.len(),
            device_ids
        );

        Resolution {
            outcome: ResolutionOutcome::Applied {
                device_ids,
                unsupported: !control_action.is_supported(),
            },
            feedback,
        }
    }

    fn select_targets(
        &self,
        entity_type: &str,
        location: Option<&str>,
        device_id: Option<&str>,
    ) -> Vec<Device> {
        if let Some(device) = device_id.and_then(|id| self.registry.get(id)) {
            tracing::debug!("Resolved by explicit device id {}", device.id);
            return vec![device];
        }

        match location {
            Some(location) => self.registry.find_by_type_and_location(entity_type, location),
            None => self.registry.find_by_type(entity_type),
        }
    }
}

fn status_phrase(action: &ControlAction) -> StatusPhrase {
    match action {
        ControlAction::TurnOn => StatusPhrase::TurnedOn,
        ControlAction::TurnOff => StatusPhrase::TurnedOff,
        _ => StatusPhrase::Adjusted,
    }
}
