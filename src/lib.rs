//! Stochsim is a discrete-event engine for simulating continuous-time Markov population processes, such as
//! compartmental epidemic models. It implements the exact Gillespie direct method and two approximate tau-leaping
//! algorithms, and interleaves the stochastic event stream with deterministic _theta events_ scheduled at fixed times.
//!
//! ## Contents
//!
//! - [Basic Concepts](crate#basic-concepts)
//! - [Example](crate#example)
//! - [Algorithms](crate#algorithms)
//! - [Theta Events](crate#theta-events)
//! - [Logging](crate#logging)
//!
//! ## Basic Concepts
//!
//! **States and events.** A population process is described by named compartments ([`SimulationState`]) and
//! transitions between them ([`SimulationEvent`]). Every firing of an event moves one individual from the event's
//! initial state to its final state.
//!
//! **Transition kernel.** The [`TransitionKernel`] maps events to their current propensities, i.e. the rates at which
//! they fire. Only strictly positive rates are stored and events keep the order in which they were added; this order
//! decides which event is selected when cumulative sums tie.
//!
//! **Amount manager.** The populations are owned by an [`AmountManager`] implementation supplied by the user. The
//! simulator asks it to apply firings and never looks at the populations itself. Keeping the kernel in sync with the
//! populations is also the amount manager's job. [`PopulationAmounts`] is a ready-made implementation holding integer
//! counts per state.
//!
//! **Observers.** All results leave the simulator through [`Observer`] callbacks: the start and the end of a run,
//! every step, every firing and every due theta event. An observer is bound to exactly one simulator, which it reports
//! via [`Observer::simulator_id`]; adding it to another simulator fails.
//!
//! **Controller.** A [`SimulationController`] is consulted before every step and decides whether the run continues.
//! By default the simulator stops when the clock reaches the configured end time.
//!
//! ## Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use stochsim::{
//!     GillespieSimple, Observer, PopulationAmounts, SimulationContext, SimulationEvent, SimulationState,
//!     SimulatorConfig, SimulatorId, StochasticSimulator, TransitionKernel,
//! };
//!
//! // Observer counting the infections
//! struct Infections {
//!     ctx: SimulationContext,
//!     count: u64,
//! }
//!
//! impl Observer for Infections {
//!     fn simulator_id(&self) -> SimulatorId {
//!         self.ctx.id()
//!     }
//!
//!     fn perform_event(&mut self, event: &SimulationEvent, _time: f64, times: u64) {
//!         if event.final_state().name() == "I" {
//!             self.count += times;
//!         }
//!     }
//! }
//!
//! let (s, i, r) = (SimulationState::new("S"), SimulationState::new("I"), SimulationState::new("R"));
//! let infection = SimulationEvent::new(s.clone(), i.clone());
//! let recovery = SimulationEvent::new(i.clone(), r.clone());
//!
//! // Populations keep the kernel up to date after every firing
//! let kernel = Rc::new(RefCell::new(TransitionKernel::new()));
//! let amounts = PopulationAmounts::new([(s.clone(), 99), (i.clone(), 1), (r.clone(), 0)]).with_kernel(
//!     kernel.clone(),
//!     vec![infection, recovery],
//!     move |event, pop| {
//!         if event.final_state().name() == "I" {
//!             0.3 * (pop.amount(&s) * pop.amount(&i)) as f64 / 100.0
//!         } else {
//!             0.1 * pop.amount(&i) as f64
//!         }
//!     },
//! );
//!
//! let mut sim = StochasticSimulator::new(
//!     GillespieSimple::new(),
//!     kernel,
//!     Rc::new(RefCell::new(amounts)),
//!     SimulatorConfig::default().with_seed(123),
//! );
//! let observer = Rc::new(RefCell::new(Infections { ctx: sim.create_context(), count: 0 }));
//! sim.add_observer(observer.clone()).unwrap();
//!
//! // Run until the epidemic dies out or the clock reaches 100
//! sim.run_until(100.0).unwrap();
//! println!("Infections: {}", observer.borrow().count);
//! ```
//!
//! ## Algorithms
//!
//! The simulator is generic over a [`StepAlgorithm`] which implements a single step of the run loop:
//!
//! - [`GillespieSimple`] is the exact direct method. Each step draws an exponential waiting time from the total
//!   propensity and fires exactly one event, selected by scanning the kernel's cumulative sums.
//! - [`TauLeaping`] draws the step length in the same way but fires every event a Poisson distributed number of times
//!   within the step.
//! - [`TauLeapingFixedStep`] leaps by a constant step.
//!
//! Every algorithm owns a [PCG](rand_pcg) random number generator seeded from [`SimulatorConfig::seed`], so runs are
//! reproducible. Simulations running backwards in time are supported by setting [`SimulatorConfig::reverse_time`].
//!
//! ## Theta Events
//!
//! Theta events are deterministic events which an observer schedules at a fixed time with an arbitrary serializable
//! payload, either through [`StochasticSimulator::register_new_theta`] before the run or through
//! [`SimulationContext::register_theta`] from inside callbacks. When the clock passes the scheduled time, the observer
//! receives all payloads registered for it at that time in [`Observer::theta`]. Payloads are recovered with
//! [`Payload::downcast_ref`].
//!
//! A theta event typically changes model parameters. After updating the kernel, the observer calls
//! [`SimulationContext::reinitialize`], and the direct method restarts its step with the new propensities instead of
//! using a waiting time drawn from the stale ones.
//!
//! ## Logging
//!
//! The crate logs through the [log](https://crates.io/crates/log) facade and provides the [`log_info!`] family of
//! macros which prefix records with the simulation time and the algorithm name. Install a logger such as
//! [env_logger](https://crates.io/crates/env_logger) to see the records.

#![warn(missing_docs)]

pub mod algorithm;
pub mod amount;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod event;
pub mod kernel;
pub mod log;
pub mod observer;
pub mod simulator;
pub mod theta;

pub use colored;
#[doc(hidden)]
pub use ::log as __log;

pub use algorithm::{GillespieSimple, StepAlgorithm, TauLeaping, TauLeapingFixedStep};
pub use amount::{AmountManager, PopulationAmounts};
pub use config::SimulatorConfig;
pub use context::{SimulationContext, SimulatorId, SimulatorStatus};
pub use controller::{HorizonController, SimulationController, StepLimitController};
pub use error::{Result, SimulationError};
pub use event::{Payload, SimulationEvent, SimulationState};
pub use kernel::TransitionKernel;
pub use observer::{Observer, ObserverId, ObserverRef, ObserverSet};
pub use simulator::{SimulatorCore, StochasticSimulator};
pub use theta::{ThetaBatch, ThetaEventQueue};
