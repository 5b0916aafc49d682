//! Errors reported by the simulation core.

use thiserror::Error;

use crate::context::SimulatorId;
use crate::event::{SimulationEvent, SimulationState};
use crate::observer::ObserverId;

/// Error raised while configuring or running a simulation.
///
/// Any error returned from a simulation step aborts the run: it is logged once and then returned from
/// [`StochasticSimulator::run`](crate::StochasticSimulator::run) without any attempt to salvage partial results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// The observer is bound to another simulator instance.
    #[error("observer is bound to simulator {observer} but was added to simulator {simulator}")]
    ForeignObserver {
        /// Simulator the observer reports being bound to.
        observer: SimulatorId,
        /// Simulator the observer was added to.
        simulator: SimulatorId,
    },

    /// Theta event registered for an observer which is not registered on this simulator.
    #[error("observer {0} is not registered on this simulator")]
    UnknownObserver(ObserverId),

    /// Theta event registered for an observer instance which was never added to the simulator.
    #[error("observer is not registered on this simulator")]
    UnregisteredObserver,

    /// Theta event registered at a time which is not a number.
    #[error("theta event time must not be NaN")]
    InvalidThetaTime,

    /// The direct method failed to select an event for the drawn threshold.
    #[error("no transition event selected for draw {draw} among {events:?}")]
    EventSelection {
        /// Threshold drawn for the selection (`U2 * rTotal`).
        draw: f64,
        /// Events present in the kernel at the time of the failure.
        events: Vec<SimulationEvent>,
    },

    /// Poisson sampling was requested with a negative or non-finite mean.
    #[error("invalid Poisson mean {0}")]
    InvalidPoissonMean(f64),

    /// Fixed tau-leaping step is not a positive finite number.
    #[error("invalid fixed step {0}, expected a positive finite number")]
    InvalidStep(f64),

    /// Applying a firing would drive a population count below zero.
    #[error("amount of {state} would become negative ({amount})")]
    NegativeAmount {
        /// State whose count would become negative.
        state: SimulationState,
        /// Count the state would have after the firing.
        amount: i64,
    },
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SimulationError>;
