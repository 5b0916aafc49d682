#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use stochsim::{
    AmountManager, Observer, Payload, Result, SimulationContext, SimulationEvent, SimulationState, SimulatorId,
    TransitionKernel,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn state(name: &str) -> SimulationState {
    SimulationState::new(name)
}

pub fn event(from: &str, to: &str) -> SimulationEvent {
    SimulationEvent::new(state(from), state(to))
}

pub fn kernel(rates: &[(&str, &str, f64)]) -> Rc<RefCell<TransitionKernel>> {
    let kernel: TransitionKernel = rates.iter().map(|(from, to, rate)| (event(from, to), *rate)).collect();
    Rc::new(RefCell::new(kernel))
}

pub type ThetaAction = Box<dyn FnMut(&SimulationContext, f64, &[Box<dyn Payload>])>;

/// Observer recording every callback it receives.
pub struct Recorder {
    pub ctx: SimulationContext,
    pub started: u32,
    pub steps: u64,
    pub finished: u32,
    pub events: Vec<(SimulationEvent, f64, u64)>,
    // (time, step count at the time of the call, payloads)
    pub thetas: Vec<(f64, u64, Vec<Value>)>,
    pub on_theta: Option<ThetaAction>,
}

impl Recorder {
    pub fn new(ctx: SimulationContext) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            ctx,
            started: 0,
            steps: 0,
            finished: 0,
            events: Vec::new(),
            thetas: Vec::new(),
            on_theta: None,
        }))
    }

    pub fn with_theta_action<F>(ctx: SimulationContext, action: F) -> Rc<RefCell<Self>>
    where
        F: FnMut(&SimulationContext, f64, &[Box<dyn Payload>]) + 'static,
    {
        let recorder = Self::new(ctx);
        recorder.borrow_mut().on_theta = Some(Box::new(action));
        recorder
    }

    pub fn event_times(&self) -> Vec<f64> {
        self.events.iter().map(|(_, time, _)| *time).collect()
    }

    pub fn firings(&self, event: &SimulationEvent) -> u64 {
        self.events.iter().filter(|(e, _, _)| e == event).map(|(_, _, times)| times).sum()
    }
}

impl Observer for Recorder {
    fn simulator_id(&self) -> SimulatorId {
        self.ctx.id()
    }

    fn started(&mut self) {
        self.started += 1;
    }

    fn step(&mut self) {
        self.steps += 1;
    }

    fn finished(&mut self) {
        self.finished += 1;
    }

    fn theta(&mut self, time: f64, payloads: &[Box<dyn Payload>]) {
        let values = payloads.iter().map(|p| serde_json::to_value(&**p).unwrap()).collect();
        self.thetas.push((time, self.ctx.step_count(), values));
        if let Some(action) = self.on_theta.as_mut() {
            action(&self.ctx, time, payloads);
        }
    }

    fn perform_event(&mut self, event: &SimulationEvent, time: f64, times: u64) {
        self.events.push((event.clone(), time, times));
    }
}

/// Amount manager which only records applied firings.
#[derive(Default)]
pub struct AppliedFirings {
    pub applied: Vec<(SimulationEvent, u64)>,
}

impl AppliedFirings {
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn total(&self) -> u64 {
        self.applied.iter().map(|(_, times)| times).sum()
    }
}

impl AmountManager for AppliedFirings {
    fn perform_event(&mut self, event: &SimulationEvent, times: u64) -> Result<()> {
        self.applied.push((event.clone(), times));
        Ok(())
    }
}
