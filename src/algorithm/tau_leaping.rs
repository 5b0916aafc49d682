//! Tau-leaping approximations.

use rand::SeedableRng;
use rand_pcg::Pcg64;

use super::{poisson, time_to_next_theta, uniform_open, waiting_time, StepAlgorithm};
use crate::error::{Result, SimulationError};
use crate::event::SimulationEvent;
use crate::log_trace;
use crate::simulator::SimulatorCore;

/// Leap shared by both tau-leaping variants.
struct Leaper {
    rng: Pcg64,
    last_tau: f64,
}

impl Leaper {
    fn new() -> Self {
        Self {
            rng: Pcg64::seed_from_u64(0),
            last_tau: f64::NAN,
        }
    }

    // Theta events due at the start or before the end of the leap are fired first, without restarting on kernel
    // changes.
    // Then every event in the kernel fires a Poisson(rate * |tau|) number of times at the leap's start time.
    fn leap(&mut self, sim: &mut SimulatorCore, tau: f64) -> Result<()> {
        self.last_tau = tau;
        let start = sim.time();
        let end = start + tau;

        loop {
            let next = sim.next_theta_event_time();
            let due = !sim.is_before(start, next) || sim.is_before(next, end);
            if !next.is_finite() || !due {
                break;
            }
            sim.do_theta_event();
        }

        let rates: Vec<(SimulationEvent, f64)> = sim
            .kernel()
            .borrow()
            .entries()
            .map(|(event, rate)| (event.clone(), rate))
            .collect();
        for (event, rate) in rates {
            let times = poisson(&mut self.rng, rate * tau.abs())?;
            if times > 0 {
                log_trace!(sim.context(), "tau {}, firing {} x{}", tau, event, times);
                sim.do_event(&event, start, times)?;
            }
        }

        sim.set_time(end);
        Ok(())
    }
}

/// Tau-leaping with `tau` drawn like the waiting time of the direct method.
///
/// Theta events inside the leap are fired before the leap and kernel changes they cause are not taken into account
/// for the current leap.
pub struct TauLeaping {
    leaper: Leaper,
}

impl TauLeaping {
    /// Creates the algorithm with a generator seeded with zero; the simulator reseeds it from its config.
    pub fn new() -> Self {
        Self { leaper: Leaper::new() }
    }
}

impl Default for TauLeaping {
    fn default() -> Self {
        Self::new()
    }
}

impl StepAlgorithm for TauLeaping {
    fn name(&self) -> &str {
        "TauLeaping"
    }

    fn perform_step(&mut self, sim: &mut SimulatorCore) -> Result<()> {
        let r_total = sim.total_rate();
        let tau = if r_total == 0.0 {
            time_to_next_theta(sim)
        } else {
            waiting_time(r_total, uniform_open(&mut self.leaper.rng), sim.is_reverse_time())
        };
        self.leaper.leap(sim, tau)
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.leaper.rng = Pcg64::seed_from_u64(seed);
    }

    fn last_tau(&self) -> f64 {
        self.leaper.last_tau
    }
}

/// Tau-leaping with a constant step.
///
/// The step is given as a magnitude; it is applied backwards when the simulator runs in reverse time.
pub struct TauLeapingFixedStep {
    leaper: Leaper,
    step: f64,
}

impl TauLeapingFixedStep {
    /// Creates the algorithm with a positive finite step.
    pub fn new(step: f64) -> Result<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(SimulationError::InvalidStep(step));
        }
        Ok(Self {
            leaper: Leaper::new(),
            step,
        })
    }

    /// Returns the step magnitude.
    pub fn step(&self) -> f64 {
        self.step
    }
}

impl StepAlgorithm for TauLeapingFixedStep {
    fn name(&self) -> &str {
        "TauLeapingFixedStep"
    }

    fn perform_step(&mut self, sim: &mut SimulatorCore) -> Result<()> {
        let tau = if sim.is_reverse_time() { -self.step } else { self.step };
        self.leaper.leap(sim, tau)
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.leaper.rng = Pcg64::seed_from_u64(seed);
    }

    fn last_tau(&self) -> f64 {
        self.leaper.last_tau
    }
}
