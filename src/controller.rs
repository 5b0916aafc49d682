//! Controllers deciding when a run stops.

use crate::context::SimulationContext;

/// Decides whether the run loop performs another step.
///
/// Consulted once before every step, so a stop request takes effect at step granularity. Any
/// `FnMut(&SimulationContext) -> bool` closure is a controller.
pub trait SimulationController {
    /// Returns `true` to perform another step.
    fn go_on(&mut self, ctx: &SimulationContext) -> bool;
}

impl<F> SimulationController for F
where
    F: FnMut(&SimulationContext) -> bool,
{
    fn go_on(&mut self, ctx: &SimulationContext) -> bool {
        self(ctx)
    }
}

/// Stops once the clock reaches a fixed horizon, in either time direction.
#[derive(Clone, Debug)]
pub struct HorizonController {
    end_time: f64,
}

impl HorizonController {
    /// Creates a controller stopping at `end_time`.
    pub fn new(end_time: f64) -> Self {
        Self { end_time }
    }

    /// Returns the horizon.
    pub fn end_time(&self) -> f64 {
        self.end_time
    }
}

impl SimulationController for HorizonController {
    fn go_on(&mut self, ctx: &SimulationContext) -> bool {
        if ctx.is_reverse_time() {
            ctx.time() > self.end_time
        } else {
            ctx.time() < self.end_time
        }
    }
}

/// Stops after a fixed number of steps.
#[derive(Clone, Debug)]
pub struct StepLimitController {
    max_steps: u64,
}

impl StepLimitController {
    /// Creates a controller allowing `max_steps` steps per run.
    pub fn new(max_steps: u64) -> Self {
        Self { max_steps }
    }
}

impl SimulationController for StepLimitController {
    fn go_on(&mut self, ctx: &SimulationContext) -> bool {
        ctx.step_count() < self.max_steps
    }
}
