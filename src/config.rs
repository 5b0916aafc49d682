//! Simulator configuration.

use serde::{Deserialize, Serialize};

/// Settings of a simulator fixed at construction.
///
/// Deserializable with missing fields taking their default values, e.g. `{"end_time": 50.0, "seed": 7}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Time the clock is reset to when a run starts.
    pub start_time: f64,
    /// Horizon of the default controller. When absent, a run continues until the clock becomes infinite, i.e. no
    /// event can fire and no theta event is pending.
    pub end_time: Option<f64>,
    /// Runs the clock backwards.
    pub reverse_time: bool,
    /// Seed of the algorithm's random number generator.
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            end_time: None,
            reverse_time: false,
            seed: 123,
        }
    }
}

impl SimulatorConfig {
    /// Sets the start time.
    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    /// Sets the horizon of the default controller.
    pub fn with_end_time(mut self, end_time: f64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Sets the time direction.
    pub fn with_reverse_time(mut self, reverse_time: bool) -> Self {
        self.reverse_time = reverse_time;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the horizon of the default controller.
    pub fn default_end_time(&self) -> f64 {
        match self.end_time {
            Some(end_time) => end_time,
            None if self.reverse_time => f64::NEG_INFINITY,
            None => f64::INFINITY,
        }
    }
}
