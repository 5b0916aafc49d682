//! Population states, transition events and theta event payloads.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use downcast_rs::{impl_downcast, Downcast};
use serde::{Serialize, Serializer};

/// Named compartment of a population process, e.g. `S`, `I` or `R`.
///
/// States are cheap to clone and are compared and hashed by name only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimulationState {
    name: Arc<str>,
}

impl SimulationState {
    /// Creates a state with the given name.
    pub fn new(name: &str) -> Self {
        Self { name: Arc::from(name) }
    }

    /// Returns the state name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for SimulationState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for SimulationState {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl Serialize for SimulationState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

/// Transition of one individual from `initial` to `final` state.
///
/// Events are used as keys of the [`TransitionKernel`](crate::TransitionKernel), so equality and hashing are
/// structural over both states.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SimulationEvent {
    initial: SimulationState,
    #[serde(rename = "final")]
    final_state: SimulationState,
}

impl SimulationEvent {
    /// Creates a transition event between two states.
    pub fn new(initial: SimulationState, final_state: SimulationState) -> Self {
        Self { initial, final_state }
    }

    /// Returns the state the transition starts from.
    pub fn initial_state(&self) -> &SimulationState {
        &self.initial
    }

    /// Returns the state the transition ends in.
    pub fn final_state(&self) -> &SimulationState {
        &self.final_state
    }
}

impl Display for SimulationEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.initial, self.final_state)
    }
}

/// Opaque data attached to a theta event.
///
/// Any `Serialize + 'static` type is a payload. Observers get the concrete type back with
/// [`downcast_ref`](Payload::downcast_ref) (via [`downcast_rs`]); serialization is used for logging and for
/// detecting duplicate payloads registered under the same time and observer.
pub trait Payload: Downcast + erased_serde::Serialize {}

impl_downcast!(Payload);

erased_serde::serialize_trait_object!(Payload);

impl<T: Serialize + 'static> Payload for T {}

/// Renders payloads as a JSON array for log records.
pub fn log_payloads(payloads: &[Box<dyn Payload>]) -> String {
    serde_json::to_string(payloads).unwrap_or_else(|err| format!("<unserializable payloads: {err}>"))
}
