//! Transition kernel mapping events to their propensities.

use rustc_hash::FxHashMap;

use crate::event::SimulationEvent;

/// Insertion-ordered mapping from transition events to propensities.
///
/// Only strictly positive rates are stored: [`add_to_kernel`](Self::add_to_kernel) silently ignores rates which are
/// zero, negative or NaN. The iteration order of events is the order in which they were first added, and the
/// cumulative sums returned by [`cdf`](Self::cdf) follow it, so event selection breaks ties between equal
/// propensities by insertion order.
///
/// `Clone` produces an independent copy; [`copy`](Self::copy) is provided as an explicit spelling of it.
#[derive(Clone, Debug, Default)]
pub struct TransitionKernel {
    entries: Vec<(SimulationEvent, f64)>,
    index: FxHashMap<SimulationEvent, usize>,
}

impl TransitionKernel {
    /// Creates an empty kernel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `rate` for `event` if the rate is strictly positive, otherwise does nothing.
    ///
    /// Updating an already stored event keeps its original position.
    pub fn add_to_kernel(&mut self, event: SimulationEvent, rate: f64) {
        if rate.is_nan() || rate <= 0.0 {
            return;
        }
        match self.index.get(&event) {
            Some(&pos) => self.entries[pos].1 = rate,
            None => {
                self.index.insert(event.clone(), self.entries.len());
                self.entries.push((event, rate));
            }
        }
    }

    /// Returns stored events in insertion order.
    pub fn transition_events(&self) -> impl Iterator<Item = &SimulationEvent> + '_ {
        self.entries.iter().map(|(event, _)| event)
    }

    /// Returns stored events with their rates in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&SimulationEvent, f64)> + '_ {
        self.entries.iter().map(|(event, rate)| (event, *rate))
    }

    /// Returns the rate stored for `event`, or `None` if the event is unknown.
    pub fn transition_probability(&self, event: &SimulationEvent) -> Option<f64> {
        self.index.get(event).map(|&pos| self.entries[pos].1)
    }

    /// Returns cumulative sums of rates, accumulated in insertion order.
    pub fn cdf(&self) -> Vec<(SimulationEvent, f64)> {
        let mut sum = 0.0;
        self.entries
            .iter()
            .map(|(event, rate)| {
                sum += rate;
                (event.clone(), sum)
            })
            .collect()
    }

    /// Returns the sum of all stored rates.
    pub fn total_rate(&self) -> f64 {
        self.entries.iter().map(|(_, rate)| rate).sum()
    }

    /// Returns the first event whose cumulative rate reaches `threshold`, scanning in insertion order.
    pub fn select(&self, threshold: f64) -> Option<&SimulationEvent> {
        let mut sum = 0.0;
        for (event, rate) in &self.entries {
            sum += rate;
            if threshold <= sum {
                return Some(event);
            }
        }
        None
    }

    /// Removes all events.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Replaces the whole contents with the given events, applying the same positive-only filter as
    /// [`add_to_kernel`](Self::add_to_kernel).
    pub fn set_transition_probabilities<I>(&mut self, rates: I)
    where
        I: IntoIterator<Item = (SimulationEvent, f64)>,
    {
        self.clear();
        for (event, rate) in rates {
            self.add_to_kernel(event, rate);
        }
    }

    /// Returns an independent copy of the kernel.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Returns the number of stored events.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no events are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for TransitionKernel {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl FromIterator<(SimulationEvent, f64)> for TransitionKernel {
    fn from_iter<I: IntoIterator<Item = (SimulationEvent, f64)>>(iter: I) -> Self {
        let mut kernel = Self::new();
        kernel.set_transition_probabilities(iter);
        kernel
    }
}
