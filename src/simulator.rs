//! Simulator owning the clock, the theta queue and the run loop.

use std::cell::RefCell;
use std::rc::Rc;

use crate::algorithm::StepAlgorithm;
use crate::amount::AmountManager;
use crate::config::SimulatorConfig;
use crate::context::{SimulationContext, SimulatorId, SimulatorStatus};
use crate::controller::{HorizonController, SimulationController};
use crate::error::{Result, SimulationError};
use crate::event::{log_payloads, Payload, SimulationEvent};
use crate::kernel::TransitionKernel;
use crate::observer::{ObserverId, ObserverRef};
use crate::{log_debug, log_error, log_info};

/// State shared by all algorithms: context, kernel and populations.
///
/// Algorithms receive the core in [`StepAlgorithm::perform_step`] and use it to read propensities, fire stochastic
/// and theta events and advance the clock.
pub struct SimulatorCore {
    ctx: SimulationContext,
    kernel: Rc<RefCell<TransitionKernel>>,
    amounts: Rc<RefCell<dyn AmountManager>>,
}

impl SimulatorCore {
    /// Returns the simulation context.
    pub fn context(&self) -> &SimulationContext {
        &self.ctx
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.ctx.time()
    }

    /// Moves the clock to `time`.
    pub fn set_time(&mut self, time: f64) {
        self.ctx.set_time(time);
    }

    /// Advances the clock by `tau` (negative in reverse time).
    pub fn advance_time(&mut self, tau: f64) {
        self.ctx.set_time(self.ctx.time() + tau);
    }

    /// Returns `true` if the clock runs backwards.
    pub fn is_reverse_time(&self) -> bool {
        self.ctx.is_reverse_time()
    }

    /// Returns `true` if `a` comes strictly before `b` in the simulation's time direction.
    pub fn is_before(&self, a: f64, b: f64) -> bool {
        if self.is_reverse_time() {
            a > b
        } else {
            a < b
        }
    }

    /// Returns the time of the next pending theta event.
    pub fn next_theta_event_time(&self) -> f64 {
        self.ctx.next_theta_event_time()
    }

    /// Returns the shared transition kernel.
    pub fn kernel(&self) -> &Rc<RefCell<TransitionKernel>> {
        &self.kernel
    }

    /// Returns the sum of the current propensities.
    pub fn total_rate(&self) -> f64 {
        self.kernel.borrow().total_rate()
    }

    /// Returns the shared amount manager.
    pub fn amount_manager(&self) -> &Rc<RefCell<dyn AmountManager>> {
        &self.amounts
    }

    /// Notifies observers about `times` firings of `event` at `time`, then applies them to the populations unless
    /// `time` is infinite.
    pub fn do_event(&mut self, event: &SimulationEvent, time: f64, times: u64) -> Result<()> {
        for observer in self.ctx.observer_list() {
            observer.borrow_mut().perform_event(event, time, times);
        }
        if !time.is_infinite() {
            self.amounts.borrow_mut().perform_event(event, times)?;
        }
        Ok(())
    }

    /// Fires all theta events filed under the next theta event time.
    pub fn do_theta_event(&mut self) {
        let batch = self.ctx.pop_theta();
        if batch.is_empty() {
            return;
        }
        for (id, payloads) in batch.entries {
            if payloads.is_empty() {
                continue;
            }
            log_debug!(self.ctx, "theta event at {} for observer {}: {}", batch.time, id, log_payloads(&payloads));
            if let Some(observer) = self.ctx.observer(id) {
                observer.borrow_mut().theta(batch.time, &payloads);
            }
        }
    }
}

/// Stochastic simulator running a [`StepAlgorithm`] over a transition kernel and a population store.
///
/// The simulator owns the clock and the theta event queue (through its [`SimulationContext`]) and drives the run
/// loop; the algorithm only implements a single step.
pub struct StochasticSimulator<A: StepAlgorithm> {
    core: SimulatorCore,
    algorithm: A,
    controller: Option<Box<dyn SimulationController>>,
    config: SimulatorConfig,
}

impl<A: StepAlgorithm> StochasticSimulator<A> {
    /// Creates a simulator and seeds the algorithm with `config.seed`.
    pub fn new(
        mut algorithm: A,
        kernel: Rc<RefCell<TransitionKernel>>,
        amounts: Rc<RefCell<dyn AmountManager>>,
        config: SimulatorConfig,
    ) -> Self {
        algorithm.set_rng_seed(config.seed);
        let ctx = SimulationContext::new(algorithm.name(), config.start_time, config.reverse_time);
        Self {
            core: SimulatorCore { ctx, kernel, amounts },
            algorithm,
            controller: None,
            config,
        }
    }

    /// Returns a handle to the simulation context.
    pub fn create_context(&self) -> SimulationContext {
        self.core.ctx.clone()
    }

    /// Returns the simulation context.
    pub fn context(&self) -> &SimulationContext {
        &self.core.ctx
    }

    /// Returns the id observers must be bound to.
    pub fn id(&self) -> SimulatorId {
        self.core.ctx.id()
    }

    /// Returns the diagnostic name of the algorithm.
    pub fn name(&self) -> &str {
        self.algorithm.name()
    }

    /// Returns the algorithm.
    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Returns the current simulation time.
    pub fn current_time(&self) -> f64 {
        self.core.time()
    }

    /// Returns the time of the next pending theta event.
    pub fn next_theta_event_time(&self) -> f64 {
        self.core.next_theta_event_time()
    }

    /// Returns the shared transition kernel.
    pub fn transition_kernel(&self) -> Rc<RefCell<TransitionKernel>> {
        self.core.kernel.clone()
    }

    /// Returns the shared amount manager.
    pub fn amount_manager(&self) -> Rc<RefCell<dyn AmountManager>> {
        self.core.amounts.clone()
    }

    /// Returns the lifecycle status.
    pub fn status(&self) -> SimulatorStatus {
        self.core.ctx.status()
    }

    /// Returns the number of steps performed in the current run.
    pub fn step_count(&self) -> u64 {
        self.core.ctx.step_count()
    }

    /// Reseeds the algorithm's random number generator.
    pub fn set_rng_seed(&mut self, seed: u64) {
        self.algorithm.set_rng_seed(seed);
    }

    /// Lets the algorithm react to an external change of the kernel.
    pub fn reinitialize(&mut self) {
        self.algorithm.reinitialize(&self.core);
    }

    /// Replaces the controller used by [`run`](Self::run).
    pub fn set_controller<C: SimulationController + 'static>(&mut self, controller: C) {
        self.controller = Some(Box::new(controller));
    }

    /// Registers an observer bound to this simulator.
    ///
    /// Adding the same observer instance again returns its existing id.
    pub fn add_observer(&mut self, observer: ObserverRef) -> Result<ObserverId> {
        let bound_to = observer.borrow().simulator_id();
        if bound_to != self.id() {
            return Err(SimulationError::ForeignObserver {
                observer: bound_to,
                simulator: self.id(),
            });
        }
        Ok(self.core.ctx.add_observer(observer))
    }

    /// Schedules a theta event for a registered observer.
    pub fn register_new_theta<P: Payload>(&mut self, observer: &ObserverRef, time: f64, payload: P) -> Result<()> {
        let id = self.observer_id(observer)?;
        self.core.ctx.register_theta(id, time, payload)
    }

    fn observer_id(&self, observer: &ObserverRef) -> Result<ObserverId> {
        if let Some(id) = self.core.ctx.find_observer(observer) {
            return Ok(id);
        }
        let bound_to = observer.borrow().simulator_id();
        if bound_to != self.id() {
            return Err(SimulationError::ForeignObserver {
                observer: bound_to,
                simulator: self.id(),
            });
        }
        Err(SimulationError::UnregisteredObserver)
    }

    /// Resets the clock to the start time. Populations are left untouched.
    pub fn init(&mut self) {
        self.core.ctx.set_name(self.algorithm.name());
        self.core.ctx.reset();
    }

    /// Performs one step of the algorithm outside of the run loop.
    pub fn step(&mut self) -> Result<()> {
        self.algorithm.perform_step(&mut self.core)?;
        self.core.ctx.increment_steps();
        Ok(())
    }

    /// Fires `times` firings of `event` at `time`, see [`SimulatorCore::do_event`].
    pub fn do_event(&mut self, event: &SimulationEvent, time: f64, times: u64) -> Result<()> {
        self.core.do_event(event, time, times)
    }

    /// Fires the next due theta bucket, see [`SimulatorCore::do_theta_event`].
    pub fn do_theta_event(&mut self) {
        self.core.do_theta_event();
    }

    /// Runs until the controller stops the simulation.
    ///
    /// Installs a [`HorizonController`] at the configured end time if no controller was set. An error from a step
    /// is logged and returned; observers are not notified about the end of an aborted run.
    pub fn run(&mut self) -> Result<()> {
        let end_time = self.config.default_end_time();
        let mut controller = self
            .controller
            .take()
            .unwrap_or_else(|| Box::new(HorizonController::new(end_time)) as Box<dyn SimulationController>);
        let result = self.run_with(controller.as_mut());
        self.controller = Some(controller);
        result
    }

    /// Runs until the clock reaches `max_time`, replacing the current controller.
    pub fn run_until(&mut self, max_time: f64) -> Result<()> {
        self.set_controller(HorizonController::new(max_time));
        self.run()
    }

    fn run_with(&mut self, controller: &mut dyn SimulationController) -> Result<()> {
        self.init();
        log_info!(self.core.ctx, "simulation started");
        for observer in self.core.ctx.observer_list() {
            observer.borrow_mut().started();
        }
        self.core.ctx.set_status(SimulatorStatus::Running);
        while controller.go_on(&self.core.ctx) {
            if let Err(err) = self.algorithm.perform_step(&mut self.core) {
                log_error!(self.core.ctx, "simulation aborted: {}", err);
                self.core.ctx.set_status(SimulatorStatus::Error);
                return Err(err);
            }
            self.core.ctx.increment_steps();
            for observer in self.core.ctx.observer_list() {
                observer.borrow_mut().step();
            }
        }
        for observer in self.core.ctx.observer_list() {
            observer.borrow_mut().finished();
        }
        self.core.ctx.set_status(SimulatorStatus::Finished);
        log_info!(self.core.ctx, "simulation finished after {} steps", self.core.ctx.step_count());
        Ok(())
    }
}
