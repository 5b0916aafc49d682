//! Shared simulation state accessible to the simulator and its observers.

use std::cell::{Ref, RefCell};
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::error::{Result, SimulationError};
use crate::event::Payload;
use crate::observer::{ObserverId, ObserverRef, ObserverSet};
use crate::theta::{ThetaBatch, ThetaEventQueue};

static NEXT_SIMULATOR_ID: AtomicU64 = AtomicU64::new(0);

/// Unique identifier of a simulator instance within the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SimulatorId(u64);

impl SimulatorId {
    fn next() -> Self {
        Self(NEXT_SIMULATOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for SimulatorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "sim-{}", self.0)
    }
}

/// Lifecycle of a simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SimulatorStatus {
    /// Constructed, never run.
    Created,
    /// Clock reset to the start time.
    Initialised,
    /// Inside the run loop.
    Running,
    /// Run loop stopped by the controller.
    Finished,
    /// Run aborted by an error from a step.
    Error,
}

pub(crate) struct ContextState {
    id: SimulatorId,
    name: String,
    reverse_time: bool,
    start_time: f64,
    time: f64,
    steps: u64,
    status: SimulatorStatus,
    kernel_changed: bool,
    theta: ThetaEventQueue,
    observers: ObserverSet,
}

/// Handle to the clock, theta queue and observers of one simulator.
///
/// The context is cheap to clone. Observers typically keep a copy to read the current time, schedule follow-up
/// theta events from inside callbacks and signal that they changed the transition kernel.
#[derive(Clone)]
pub struct SimulationContext {
    state: Rc<RefCell<ContextState>>,
}

impl SimulationContext {
    pub(crate) fn new(name: &str, start_time: f64, reverse_time: bool) -> Self {
        let state = ContextState {
            id: SimulatorId::next(),
            name: name.to_string(),
            reverse_time,
            start_time,
            time: start_time,
            steps: 0,
            status: SimulatorStatus::Created,
            kernel_changed: false,
            theta: ThetaEventQueue::new(reverse_time),
            observers: ObserverSet::default(),
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Returns the id of the simulator.
    pub fn id(&self) -> SimulatorId {
        self.state.borrow().id
    }

    /// Returns the diagnostic name of the simulation algorithm.
    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.state.borrow().time
    }

    /// Returns the time the clock is reset to on initialisation.
    pub fn start_time(&self) -> f64 {
        self.state.borrow().start_time
    }

    /// Returns `true` if the clock runs backwards.
    pub fn is_reverse_time(&self) -> bool {
        self.state.borrow().reverse_time
    }

    /// Returns the number of completed steps of the current run.
    pub fn step_count(&self) -> u64 {
        self.state.borrow().steps
    }

    /// Returns the lifecycle status of the simulator.
    pub fn status(&self) -> SimulatorStatus {
        self.state.borrow().status
    }

    /// Returns the time of the next pending theta event, or an infinity pointing in the time direction if none.
    pub fn next_theta_event_time(&self) -> f64 {
        self.state.borrow().theta.next_event_time()
    }

    /// Schedules a theta event with `payload` for the observer at `time`.
    ///
    /// A time behind the clock is accepted: the event is fired at the start of the next step.
    pub fn register_theta<P: Payload>(&self, observer: ObserverId, time: f64, payload: P) -> Result<()> {
        self.register_theta_boxed(observer, time, Box::new(payload))
    }

    /// Same as [`register_theta`](Self::register_theta) for an already boxed payload.
    pub fn register_theta_boxed(&self, observer: ObserverId, time: f64, payload: Box<dyn Payload>) -> Result<()> {
        if time.is_nan() {
            return Err(SimulationError::InvalidThetaTime);
        }
        let mut state = self.state.borrow_mut();
        if !state.observers.contains_id(observer) {
            return Err(SimulationError::UnknownObserver(observer));
        }
        state.theta.push_theta(time, observer, payload);
        Ok(())
    }

    /// Marks the transition kernel as changed.
    ///
    /// Theta observers call this after updating propensities. The direct method then discards the waiting time it
    /// drew from the old propensities and restarts the step; tau-leaping ignores the mark.
    pub fn reinitialize(&self) {
        self.state.borrow_mut().kernel_changed = true;
    }

    /// Returns the observers registered on the simulator.
    pub fn observers(&self) -> Ref<'_, ObserverSet> {
        Ref::map(self.state.borrow(), |s| &s.observers)
    }

    pub(crate) fn add_observer(&self, observer: ObserverRef) -> ObserverId {
        self.state.borrow_mut().observers.insert(observer)
    }

    pub(crate) fn find_observer(&self, observer: &ObserverRef) -> Option<ObserverId> {
        self.state.borrow().observers.find(observer)
    }

    pub(crate) fn observer(&self, id: ObserverId) -> Option<ObserverRef> {
        self.state.borrow().observers.get(id).cloned()
    }

    // Cloned so that callbacks may access the context while being notified.
    pub(crate) fn observer_list(&self) -> Vec<ObserverRef> {
        self.state.borrow().observers.iter().cloned().collect()
    }

    pub(crate) fn set_name(&self, name: &str) {
        self.state.borrow_mut().name = name.to_string();
    }

    pub(crate) fn set_time(&self, time: f64) {
        self.state.borrow_mut().time = time;
    }

    pub(crate) fn set_status(&self, status: SimulatorStatus) {
        self.state.borrow_mut().status = status;
    }

    pub(crate) fn reset(&self) {
        let mut state = self.state.borrow_mut();
        state.time = state.start_time;
        state.steps = 0;
        state.status = SimulatorStatus::Initialised;
    }

    pub(crate) fn increment_steps(&self) {
        self.state.borrow_mut().steps += 1;
    }

    pub(crate) fn take_kernel_changed(&self) -> bool {
        std::mem::take(&mut self.state.borrow_mut().kernel_changed)
    }

    pub(crate) fn pop_theta(&self) -> ThetaBatch {
        self.state.borrow_mut().theta.next_event_data_and_remove()
    }
}
