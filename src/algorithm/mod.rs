//! Simulation algorithms and the random sampling they share.

mod gillespie;
mod tau_leaping;

pub use gillespie::GillespieSimple;
pub use tau_leaping::{TauLeaping, TauLeapingFixedStep};

use rand::distributions::{Distribution, Open01};
use rand::Rng;
use rand_distr::Poisson;

use crate::error::{Result, SimulationError};
use crate::simulator::SimulatorCore;

/// Single step of a stochastic simulation algorithm.
///
/// The simulator calls [`perform_step`](Self::perform_step) once per iteration of its run loop. A step reads the
/// propensities from the kernel, fires due theta events and stochastic events through the [`SimulatorCore`] and
/// advances the clock.
pub trait StepAlgorithm {
    /// Diagnostic name of the algorithm.
    fn name(&self) -> &str;

    /// Performs one step.
    fn perform_step(&mut self, sim: &mut SimulatorCore) -> Result<()>;

    /// Reseeds the random number generator.
    fn set_rng_seed(&mut self, seed: u64);

    /// Reacts to an external change of the transition kernel. Does nothing by default.
    fn reinitialize(&mut self, _sim: &SimulatorCore) {}

    /// Length of the last step (`tau`), `NaN` before the first step.
    fn last_tau(&self) -> f64;
}

/// Draws a uniform number from the open interval (0, 1).
pub(crate) fn uniform_open<R: Rng>(rng: &mut R) -> f64 {
    rng.sample(Open01)
}

/// Exponential waiting time `(1 / r_total) * ln(1 / u)`, negated in reverse time.
pub(crate) fn waiting_time(r_total: f64, u: f64, reverse_time: bool) -> f64 {
    let tau = (1.0 / r_total) * (1.0 / u).ln();
    if reverse_time {
        -tau
    } else {
        tau
    }
}

/// Time remaining until the next theta event, or an infinity in the time direction if none is pending.
///
/// An overdue theta event, scheduled behind the clock, yields zero so the clock never moves against the time
/// direction.
pub(crate) fn time_to_next_theta(sim: &SimulatorCore) -> f64 {
    let next = sim.next_theta_event_time();
    if next.is_infinite() {
        return next;
    }
    let remaining = next - sim.time();
    if sim.is_reverse_time() {
        remaining.min(0.0)
    } else {
        remaining.max(0.0)
    }
}

/// Samples a Poisson distributed number of firings. A zero mean always yields zero.
pub(crate) fn poisson<R: Rng>(rng: &mut R, mean: f64) -> Result<u64> {
    if mean == 0.0 {
        return Ok(0);
    }
    if !mean.is_finite() || mean < 0.0 {
        return Err(SimulationError::InvalidPoissonMean(mean));
    }
    let dist = Poisson::new(mean).map_err(|_| SimulationError::InvalidPoissonMean(mean))?;
    let sample: f64 = dist.sample(rng);
    Ok(sample as u64)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn poisson_with_zero_mean_is_zero() {
        let mut rng = Pcg64::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(poisson(&mut rng, 0.0).unwrap(), 0);
        }
    }

    #[test]
    fn poisson_rejects_bad_means() {
        let mut rng = Pcg64::seed_from_u64(1);
        assert!(poisson(&mut rng, -1.0).is_err());
        assert!(poisson(&mut rng, f64::NAN).is_err());
        assert!(poisson(&mut rng, f64::INFINITY).is_err());
    }

    #[test]
    fn poisson_mean_is_close() {
        let mut rng = Pcg64::seed_from_u64(42);
        let n = 20_000;
        let total: u64 = (0..n).map(|_| poisson(&mut rng, 4.0).unwrap()).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 4.0).abs() < 0.1, "mean {}", mean);
    }

    #[test]
    fn waiting_time_sign_follows_direction() {
        assert!(waiting_time(2.0, 0.3, false) > 0.0);
        assert!(waiting_time(2.0, 0.3, true) < 0.0);
        assert_eq!(waiting_time(2.0, 0.3, false), -waiting_time(2.0, 0.3, true));
    }

    #[test]
    fn uniform_draws_are_open() {
        let mut rng = Pcg64::seed_from_u64(7);
        for _ in 0..10_000 {
            let u = uniform_open(&mut rng);
            assert!(u > 0.0 && u < 1.0);
        }
    }
}
