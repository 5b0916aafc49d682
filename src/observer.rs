//! Observers receiving lifecycle, theta and event callbacks.

use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use serde::Serialize;

use crate::context::SimulatorId;
use crate::event::{Payload, SimulationEvent};

/// Identifier of an observer registered on a simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObserverId(pub(crate) usize);

impl ObserverId {
    /// Creates an id for the observer registered at position `index`.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the position of the observer in registration order.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for ObserverId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receiver of simulation callbacks.
///
/// An observer is bound to exactly one simulator, which it reports via [`simulator_id`](Self::simulator_id).
/// Observers usually keep the [`SimulationContext`](crate::SimulationContext) obtained from the simulator and return
/// its id here. All callbacks except the binding have empty default implementations.
pub trait Observer {
    /// Simulator this observer is bound to.
    fn simulator_id(&self) -> SimulatorId;

    /// Called once before the first step of a run.
    fn started(&mut self) {}

    /// Called after every step of the run loop.
    fn step(&mut self) {}

    /// Called once after the controller stopped the run.
    fn finished(&mut self) {}

    /// Called when a theta event registered by this observer is due.
    fn theta(&mut self, _time: f64, _payloads: &[Box<dyn Payload>]) {}

    /// Called before `times` firings of `event` are applied.
    ///
    /// An infinite `time` marks a firing that is observed but not applied to the populations.
    fn perform_event(&mut self, _event: &SimulationEvent, _time: f64, _times: u64) {}
}

/// Shared reference to an observer.
pub type ObserverRef = Rc<RefCell<dyn Observer>>;

/// Set of observers keyed by reference identity.
///
/// Two distinct observer instances are never equal, whatever their contents. Iteration follows registration order.
#[derive(Default, Clone)]
pub struct ObserverSet {
    observers: Vec<ObserverRef>,
}

impl ObserverSet {
    /// Inserts the observer unless the same instance is already present, returning its id.
    pub fn insert(&mut self, observer: ObserverRef) -> ObserverId {
        if let Some(id) = self.find(&observer) {
            return id;
        }
        self.observers.push(observer);
        ObserverId(self.observers.len() - 1)
    }

    /// Returns the id of the given observer instance, if present.
    pub fn find(&self, observer: &ObserverRef) -> Option<ObserverId> {
        self.observers.iter().position(|o| same_observer(o, observer)).map(ObserverId)
    }

    /// Returns the observer with the given id.
    pub fn get(&self, id: ObserverId) -> Option<&ObserverRef> {
        self.observers.get(id.0)
    }

    /// Returns `true` if the id belongs to this set.
    pub fn contains_id(&self, id: ObserverId) -> bool {
        id.0 < self.observers.len()
    }

    /// Iterates over observers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ObserverRef> + '_ {
        self.observers.iter()
    }

    /// Returns the number of observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

fn same_observer(a: &ObserverRef, b: &ObserverRef) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}
