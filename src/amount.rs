//! Population stores which apply event firings.

use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::{Result, SimulationError};
use crate::event::{SimulationEvent, SimulationState};
use crate::kernel::TransitionKernel;

/// Store of population counts updated by event firings.
///
/// The simulator never inspects the populations. Implementations are responsible for keeping counts non-negative
/// and for recomputing propensities in the transition kernel after a firing.
pub trait AmountManager {
    /// Applies `times` firings of `event`.
    fn perform_event(&mut self, event: &SimulationEvent, times: u64) -> Result<()>;

    /// Restores the initial populations.
    fn reset_amount(&mut self) {}

    /// Stores a checkpoint of the current populations.
    fn save(&mut self) {}

    /// Restores the last saved checkpoint.
    fn rollback(&mut self) {}

    /// Returns a human readable description of the populations.
    fn to_verbose_string(&self) -> String {
        String::new()
    }
}

/// Propensity of an event given the current populations.
pub type PropensityFn = Box<dyn Fn(&SimulationEvent, &PopulationAmounts) -> f64>;

/// Integer counts per state, moving individuals from the initial to the final state of each fired event.
///
/// When created with [`with_kernel`](Self::with_kernel), the shared kernel is rebuilt after every firing (and on
/// reset or rollback) from the propensity function, evaluated for the model events in their declared order.
pub struct PopulationAmounts {
    initial: FxHashMap<SimulationState, i64>,
    amounts: FxHashMap<SimulationState, i64>,
    saved: Option<FxHashMap<SimulationState, i64>>,
    capped: bool,
    kernel: Option<(Rc<RefCell<TransitionKernel>>, Vec<SimulationEvent>, PropensityFn)>,
}

impl PopulationAmounts {
    /// Creates a store with the given initial counts.
    pub fn new<I>(initial: I) -> Self
    where
        I: IntoIterator<Item = (SimulationState, i64)>,
    {
        let initial: FxHashMap<_, _> = initial.into_iter().collect();
        Self {
            amounts: initial.clone(),
            initial,
            saved: None,
            capped: false,
            kernel: None,
        }
    }

    /// Attaches a kernel which is kept in sync with the populations, and fills it immediately.
    pub fn with_kernel<F>(mut self, kernel: Rc<RefCell<TransitionKernel>>, events: Vec<SimulationEvent>, propensity: F) -> Self
    where
        F: Fn(&SimulationEvent, &PopulationAmounts) -> f64 + 'static,
    {
        self.kernel = Some((kernel, events, Box::new(propensity)));
        self.update_kernel();
        self
    }

    /// Caps the number of firings to the count of the event's initial state instead of failing.
    ///
    /// Useful with tau-leaping, which may draw more firings than there are individuals to move.
    pub fn capping_firings(mut self) -> Self {
        self.capped = true;
        self
    }

    /// Returns the count of `state`, zero for unknown states.
    pub fn amount(&self, state: &SimulationState) -> i64 {
        self.amounts.get(state).copied().unwrap_or(0)
    }

    /// Overrides the count of `state`.
    pub fn set_amount(&mut self, state: SimulationState, amount: i64) {
        self.amounts.insert(state, amount);
        self.update_kernel();
    }

    /// Returns the sum of all counts.
    pub fn total(&self) -> i64 {
        self.amounts.values().sum()
    }

    /// Recomputes the attached kernel from the current populations.
    pub fn update_kernel(&self) {
        if let Some((kernel, events, propensity)) = &self.kernel {
            let rates: Vec<_> = events.iter().map(|e| (e.clone(), propensity(e, self))).collect();
            kernel.borrow_mut().set_transition_probabilities(rates);
        }
    }
}

impl AmountManager for PopulationAmounts {
    fn perform_event(&mut self, event: &SimulationEvent, times: u64) -> Result<()> {
        let available = self.amount(event.initial_state());
        let times = if self.capped { (times as i64).min(available.max(0)) } else { times as i64 };
        let source = available - times;
        if source < 0 {
            return Err(SimulationError::NegativeAmount {
                state: event.initial_state().clone(),
                amount: source,
            });
        }
        self.amounts.insert(event.initial_state().clone(), source);
        *self.amounts.entry(event.final_state().clone()).or_insert(0) += times;
        self.update_kernel();
        Ok(())
    }

    fn reset_amount(&mut self) {
        self.amounts = self.initial.clone();
        self.update_kernel();
    }

    fn save(&mut self) {
        self.saved = Some(self.amounts.clone());
    }

    fn rollback(&mut self) {
        if let Some(saved) = &self.saved {
            self.amounts = saved.clone();
            self.update_kernel();
        }
    }

    fn to_verbose_string(&self) -> String {
        let mut states: Vec<_> = self.amounts.iter().collect();
        states.sort();
        let mut out = String::new();
        for (state, amount) in states {
            let _ = write!(out, "{}={} ", state, amount);
        }
        out.trim_end().to_string()
    }
}
