use std::cell::{Cell, RefCell};
use std::rc::Rc;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use stochsim::{
    log_info, AmountManager, GillespieSimple, Observer, Payload, PopulationAmounts, SimulationContext, SimulationEvent,
    SimulationState, SimulatorConfig, SimulatorId, StepAlgorithm, StochasticSimulator, TauLeaping,
    TauLeapingFixedStep, TransitionKernel,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Algorithm {
    Gillespie,
    Tau,
    Fixed,
}

#[derive(Parser, Debug)]
#[command(about = "SIR epidemic with a contact reduction intervention")]
struct Args {
    /// Simulation algorithm
    #[arg(long, value_enum, default_value_t = Algorithm::Gillespie)]
    algorithm: Algorithm,

    /// Population size
    #[arg(long, default_value_t = 1000)]
    population: i64,

    /// Initially infected individuals
    #[arg(long, default_value_t = 5)]
    infected: i64,

    /// Transmission rate
    #[arg(long, default_value_t = 0.3)]
    beta: f64,

    /// Recovery rate
    #[arg(long, default_value_t = 0.1)]
    gamma: f64,

    /// Time of the intervention
    #[arg(long, default_value_t = 30.0)]
    intervention_time: f64,

    /// Factor applied to the transmission rate by the intervention
    #[arg(long, default_value_t = 0.5)]
    contact_factor: f64,

    /// Step of the fixed step tau-leaping
    #[arg(long, default_value_t = 0.1)]
    step: f64,

    /// Simulation end time
    #[arg(long, default_value_t = 150.0)]
    end_time: f64,

    /// Interval between printed rows
    #[arg(long, default_value_t = 1.0)]
    print_interval: f64,

    /// Random seed
    #[arg(long, default_value_t = 123)]
    seed: u64,
}

// Theta payload of the intervention
#[derive(Serialize)]
struct ContactReduction {
    factor: f64,
}

struct Compartments {
    s: SimulationState,
    i: SimulationState,
    r: SimulationState,
}

// Prints populations as CSV rows and applies the intervention
struct CsvObserver {
    ctx: SimulationContext,
    compartments: Rc<Compartments>,
    amounts: Rc<RefCell<PopulationAmounts>>,
    beta: Rc<Cell<f64>>,
    print_interval: f64,
    next_print: f64,
}

impl CsvObserver {
    fn print_row(&self) {
        let amounts = self.amounts.borrow();
        let c = &self.compartments;
        println!(
            "{:.3},{},{},{}",
            self.ctx.time(),
            amounts.amount(&c.s),
            amounts.amount(&c.i),
            amounts.amount(&c.r)
        );
    }
}

impl Observer for CsvObserver {
    fn simulator_id(&self) -> SimulatorId {
        self.ctx.id()
    }

    fn started(&mut self) {
        println!("time,S,I,R");
        self.print_row();
        self.next_print = self.ctx.time() + self.print_interval;
    }

    fn step(&mut self) {
        if self.ctx.time().is_finite() && self.ctx.time() >= self.next_print {
            self.print_row();
            while self.next_print <= self.ctx.time() {
                self.next_print += self.print_interval;
            }
        }
    }

    fn finished(&mut self) {
        log_info!(self.ctx, "final populations: {}", self.amounts.borrow().to_verbose_string());
    }

    fn theta(&mut self, _time: f64, payloads: &[Box<dyn Payload>]) {
        for payload in payloads {
            if let Some(reduction) = payload.downcast_ref::<ContactReduction>() {
                self.beta.set(self.beta.get() * reduction.factor);
                log_info!(self.ctx, "transmission rate reduced to {:.3}", self.beta.get());
            }
        }
        self.amounts.borrow().update_kernel();
        self.ctx.reinitialize();
    }
}

fn run<A: StepAlgorithm>(algorithm: A, args: &Args) -> stochsim::Result<()> {
    let compartments = Rc::new(Compartments {
        s: SimulationState::new("S"),
        i: SimulationState::new("I"),
        r: SimulationState::new("R"),
    });
    let infection = SimulationEvent::new(compartments.s.clone(), compartments.i.clone());
    let recovery = SimulationEvent::new(compartments.i.clone(), compartments.r.clone());

    let beta = Rc::new(Cell::new(args.beta));
    let kernel = Rc::new(RefCell::new(TransitionKernel::new()));
    let amounts = {
        let c = compartments.clone();
        let beta = beta.clone();
        let gamma = args.gamma;
        let population = args.population as f64;
        PopulationAmounts::new([
            (c.s.clone(), args.population - args.infected),
            (c.i.clone(), args.infected),
            (c.r.clone(), 0),
        ])
        .capping_firings()
        .with_kernel(kernel.clone(), vec![infection, recovery], move |event, pop| {
            let infected = pop.amount(&c.i) as f64;
            if event.final_state() == &c.i {
                beta.get() * pop.amount(&c.s) as f64 * infected / population
            } else {
                gamma * infected
            }
        })
    };
    let amounts = Rc::new(RefCell::new(amounts));

    let config = SimulatorConfig::default().with_end_time(args.end_time).with_seed(args.seed);
    let mut sim = StochasticSimulator::new(algorithm, kernel, amounts.clone(), config);
    let observer = Rc::new(RefCell::new(CsvObserver {
        ctx: sim.create_context(),
        compartments,
        amounts,
        beta,
        print_interval: args.print_interval,
        next_print: 0.0,
    }));
    let id = sim.add_observer(observer)?;
    sim.context().register_theta(
        id,
        args.intervention_time,
        ContactReduction {
            factor: args.contact_factor,
        },
    )?;
    sim.run()
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let result = match args.algorithm {
        Algorithm::Gillespie => run(GillespieSimple::new(), &args),
        Algorithm::Tau => run(TauLeaping::new(), &args),
        Algorithm::Fixed => TauLeapingFixedStep::new(args.step).and_then(|algorithm| run(algorithm, &args)),
    };
    if let Err(err) = result {
        log::error!("simulation failed: {}", err);
        std::process::exit(1);
    }
}
