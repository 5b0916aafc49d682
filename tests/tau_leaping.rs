mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{event, kernel, AppliedFirings, Recorder};
use rand::distributions::Open01;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use stochsim::{
    SimulationError, SimulatorConfig, StepAlgorithm, StepLimitController, StochasticSimulator, TauLeaping,
    TauLeapingFixedStep, TransitionKernel,
};

fn simulator<A: StepAlgorithm>(
    algorithm: A,
    kernel: Rc<RefCell<TransitionKernel>>,
    config: SimulatorConfig,
) -> (StochasticSimulator<A>, Rc<RefCell<AppliedFirings>>) {
    let amounts = AppliedFirings::shared();
    let sim = StochasticSimulator::new(algorithm, kernel, amounts.clone(), config);
    (sim, amounts)
}

#[test]
fn fixed_step_must_be_positive_and_finite() {
    for step in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(TauLeapingFixedStep::new(step), Err(SimulationError::InvalidStep(_))));
    }
    assert_eq!(TauLeapingFixedStep::new(0.25).unwrap().step(), 0.25);
}

#[test]
fn fixed_step_fires_poisson_counts_at_step_start() {
    let (mut sim, amounts) = simulator(
        TauLeapingFixedStep::new(0.5).unwrap(),
        kernel(&[("A", "B", 4.0)]),
        SimulatorConfig::default().with_seed(8),
    );
    let recorder = Recorder::new(sim.create_context());
    sim.add_observer(recorder.clone()).unwrap();
    sim.set_controller(StepLimitController::new(200));
    sim.run().unwrap();

    assert_eq!(sim.current_time(), 100.0);
    assert_eq!(sim.algorithm().last_tau(), 0.5);

    let recorder = recorder.borrow();
    assert_eq!(recorder.steps, 200);
    for (_, time, times) in &recorder.events {
        assert!(*times > 0);
        assert_eq!((time * 2.0).fract(), 0.0);
        assert!(*time < 100.0);
    }
    // 4.0 * 100 expected firings
    let total = amounts.borrow().total();
    assert!((320..=480).contains(&total), "total firings {}", total);
    assert_eq!(recorder.firings(&event("A", "B")), total);
}

#[test]
fn fixed_step_goes_backwards_in_reverse_time() {
    let (mut sim, _) = simulator(
        TauLeapingFixedStep::new(1.0).unwrap(),
        kernel(&[("A", "B", 1.0)]),
        SimulatorConfig::default().with_reverse_time(true).with_start_time(10.0),
    );
    sim.set_controller(StepLimitController::new(4));
    sim.run().unwrap();
    assert_eq!(sim.algorithm().last_tau(), -1.0);
    assert_eq!(sim.current_time(), 6.0);
}

#[test]
fn theta_on_step_boundary_fires_before_the_leap() {
    let kernel = kernel(&[("A", "B", 2.0)]);
    let (mut sim, _) = simulator(
        TauLeapingFixedStep::new(1.0).unwrap(),
        kernel.clone(),
        SimulatorConfig::default().with_seed(3),
    );
    let recorder = {
        let kernel = kernel.clone();
        Recorder::with_theta_action(sim.create_context(), move |ctx, _, _| {
            kernel.borrow_mut().add_to_kernel(event("B", "A"), 1.0);
            ctx.reinitialize();
        })
    };
    let id = sim.add_observer(recorder.clone()).unwrap();
    sim.context().register_theta(id, 3.0, "open backflow").unwrap();

    sim.run_until(10.0).unwrap();

    let recorder = recorder.borrow();
    assert_eq!(recorder.thetas.len(), 1);
    // fired at the start of the fourth step
    assert_eq!(recorder.thetas[0].0, 3.0);
    assert_eq!(recorder.thetas[0].1, 3);
    assert!(recorder
        .events
        .iter()
        .filter(|(e, _, _)| *e == event("B", "A"))
        .all(|(_, time, _)| *time >= 3.0));
    assert_eq!(sim.current_time(), 10.0);
}

#[test]
fn theta_inside_leap_does_not_restart_it() {
    let kernel = kernel(&[("A", "B", 2.0)]);
    let (mut sim, _) = simulator(
        TauLeapingFixedStep::new(10.0).unwrap(),
        kernel.clone(),
        SimulatorConfig::default(),
    );
    let recorder = {
        let kernel = kernel.clone();
        Recorder::with_theta_action(sim.create_context(), move |ctx, _, _| {
            kernel.borrow_mut().add_to_kernel(event("A", "B"), 20.0);
            ctx.reinitialize();
        })
    };
    let id = sim.add_observer(recorder.clone()).unwrap();
    sim.context().register_theta(id, 4.0, "boost").unwrap();

    sim.step().unwrap();

    let recorder = recorder.borrow();
    assert_eq!(recorder.thetas.len(), 1);
    assert_eq!(sim.current_time(), 10.0);
    assert_eq!(sim.algorithm().last_tau(), 10.0);
    // all firings of the leap are reported at its start time
    assert!(recorder.events.iter().all(|(_, time, _)| *time == 0.0));
}

#[test]
fn first_tau_is_drawn_from_first_uniform() {
    let seed = 77;
    let (mut sim, _) = simulator(
        TauLeaping::new(),
        kernel(&[("A", "B", 2.0), ("B", "C", 3.0)]),
        SimulatorConfig::default().with_seed(seed),
    );
    sim.step().unwrap();

    let mut rng = Pcg64::seed_from_u64(seed);
    let u1: f64 = rng.sample(Open01);
    let expected = (1.0 / 5.0) * (1.0 / u1).ln();
    assert_eq!(sim.algorithm().last_tau(), expected);
    assert_eq!(sim.current_time(), expected);
}

#[test]
fn tau_leaping_idles_to_next_theta() {
    let (mut sim, _) = simulator(TauLeaping::new(), kernel(&[]), SimulatorConfig::default());
    let recorder = Recorder::new(sim.create_context());
    let id = sim.add_observer(recorder.clone()).unwrap();
    sim.context().register_theta(id, 2.5, "wake up").unwrap();

    sim.step().unwrap();
    assert_eq!(sim.algorithm().last_tau(), 2.5);
    assert_eq!(sim.current_time(), 2.5);
    assert!(recorder.borrow().thetas.is_empty());

    // the event sits exactly at the clock value and is fired by a zero-length leap
    sim.step().unwrap();
    assert_eq!(sim.algorithm().last_tau(), 0.0);
    assert_eq!(recorder.borrow().thetas.len(), 1);

    sim.step().unwrap();
    assert_eq!(sim.algorithm().last_tau(), f64::INFINITY);
    assert_eq!(sim.current_time(), f64::INFINITY);
}

#[test]
fn overdue_theta_is_fired_by_zero_length_leap() {
    let (mut sim, _) = simulator(
        TauLeaping::new(),
        kernel(&[]),
        SimulatorConfig::default().with_start_time(10.0),
    );
    let recorder = Recorder::new(sim.create_context());
    let id = sim.add_observer(recorder.clone()).unwrap();
    sim.context().register_theta(id, 4.0, "late").unwrap();

    sim.step().unwrap();
    assert_eq!(sim.algorithm().last_tau(), 0.0);
    assert_eq!(sim.current_time(), 10.0);
    assert_eq!(recorder.borrow().thetas.len(), 1);
    assert_eq!(recorder.borrow().thetas[0].0, 4.0);
}

#[test]
fn tau_leaping_tau_is_positive_and_finite_with_events() {
    let (mut sim, _) = simulator(
        TauLeaping::new(),
        kernel(&[("A", "B", 0.5), ("B", "A", 0.5)]),
        SimulatorConfig::default().with_seed(12),
    );
    for _ in 0..100 {
        sim.step().unwrap();
        let tau = sim.algorithm().last_tau();
        assert!(tau > 0.0 && tau.is_finite());
    }
}

#[test]
fn reinitialize_is_a_no_op_for_tau_leaping() {
    let (mut sim, _) = simulator(
        TauLeapingFixedStep::new(1.0).unwrap(),
        kernel(&[("A", "B", 1.0)]),
        SimulatorConfig::default(),
    );
    sim.reinitialize();
    sim.step().unwrap();
    assert_eq!(sim.current_time(), 1.0);
    assert_eq!(sim.name(), "TauLeapingFixedStep");
}
