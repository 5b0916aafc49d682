//! Gillespie direct method.

use rand::SeedableRng;
use rand_pcg::Pcg64;

use super::{time_to_next_theta, uniform_open, waiting_time, StepAlgorithm};
use crate::error::{Result, SimulationError};
use crate::simulator::SimulatorCore;
use crate::{log_debug, log_trace};

/// Exact stochastic simulation using Gillespie's direct method.
///
/// Each step draws an exponential waiting time `tau` from the total propensity and fires one event chosen with
/// probability proportional to its propensity. Theta events already due at the start of the step are fired before
/// anything is drawn, and theta events falling strictly inside the step are fired before the stochastic event. If
/// one of them marks the kernel as changed (see [`SimulationContext::reinitialize`](crate::SimulationContext)),
/// the drawn `tau` is discarded: the clock moves to the time of that theta event and the step starts over with the
/// new propensities.
///
/// With zero total propensity the clock idles to the next theta event, or to infinity if none is pending.
pub struct GillespieSimple {
    rng: Pcg64,
    last_tau: f64,
}

impl GillespieSimple {
    /// Creates the algorithm with a generator seeded with zero; the simulator reseeds it from its config.
    pub fn new() -> Self {
        Self {
            rng: Pcg64::seed_from_u64(0),
            last_tau: f64::NAN,
        }
    }

    // Fires theta events due at or before `start`. Returns true if one of them changed the kernel.
    fn fire_overdue_theta_events(&mut self, sim: &mut SimulatorCore, start: f64) -> bool {
        loop {
            let next = sim.next_theta_event_time();
            if !next.is_finite() || sim.is_before(start, next) {
                return false;
            }
            sim.do_theta_event();
            if sim.context().take_kernel_changed() {
                log_debug!(sim.context(), "kernel changed by theta event due at {}, restarting step", next);
                return true;
            }
        }
    }

    // Fires theta events strictly inside (start, end). Returns true if one of them changed the kernel.
    fn fire_theta_events_within(&mut self, sim: &mut SimulatorCore, start: f64, end: f64) -> bool {
        loop {
            let next = sim.next_theta_event_time();
            if !(sim.is_before(start, next) && sim.is_before(next, end)) {
                return false;
            }
            sim.do_theta_event();
            if sim.context().take_kernel_changed() {
                log_debug!(sim.context(), "kernel changed by theta event at {}, restarting step", next);
                sim.set_time(next);
                return true;
            }
        }
    }
}

impl Default for GillespieSimple {
    fn default() -> Self {
        Self::new()
    }
}

impl StepAlgorithm for GillespieSimple {
    fn name(&self) -> &str {
        "GillespieSimple"
    }

    fn perform_step(&mut self, sim: &mut SimulatorCore) -> Result<()> {
        loop {
            sim.context().take_kernel_changed();
            let start = sim.time();
            if self.fire_overdue_theta_events(sim, start) {
                continue;
            }
            let r_total = sim.total_rate();
            let tau = if r_total == 0.0 {
                time_to_next_theta(sim)
            } else {
                waiting_time(r_total, uniform_open(&mut self.rng), sim.is_reverse_time())
            };
            self.last_tau = tau;
            let end = start + tau;

            if self.fire_theta_events_within(sim, start, end) {
                continue;
            }

            if r_total > 0.0 {
                let draw = uniform_open(&mut self.rng) * r_total;
                let event = {
                    let kernel = sim.kernel().borrow();
                    match kernel.select(draw) {
                        Some(event) => event.clone(),
                        None => {
                            return Err(SimulationError::EventSelection {
                                draw,
                                events: kernel.transition_events().cloned().collect(),
                            })
                        }
                    }
                };
                log_trace!(sim.context(), "tau {}, firing {}", tau, event);
                sim.do_event(&event, end, 1)?;
            }

            sim.set_time(end);
            // Single attempt at a theta event due at the new clock value.
            if !sim.is_before(sim.time(), sim.next_theta_event_time()) {
                sim.do_theta_event();
            }
            return Ok(());
        }
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = Pcg64::seed_from_u64(seed);
    }

    fn reinitialize(&mut self, sim: &SimulatorCore) {
        sim.context().reinitialize();
    }

    fn last_tau(&self) -> f64 {
        self.last_tau
    }
}
