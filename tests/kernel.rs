mod common;

use common::event;
use stochsim::TransitionKernel;

#[test]
fn non_positive_rates_are_dropped() {
    let mut kernel = TransitionKernel::new();
    kernel.add_to_kernel(event("S", "I"), 0.0);
    kernel.add_to_kernel(event("I", "R"), -1.5);
    kernel.add_to_kernel(event("R", "S"), f64::NAN);
    assert!(kernel.is_empty());

    kernel.add_to_kernel(event("S", "I"), 0.5);
    assert_eq!(kernel.len(), 1);
    assert_eq!(kernel.transition_probability(&event("S", "I")), Some(0.5));
}

#[test]
fn zero_rate_does_not_remove_existing_entry() {
    let mut kernel = TransitionKernel::new();
    kernel.add_to_kernel(event("S", "I"), 2.0);
    kernel.add_to_kernel(event("S", "I"), 0.0);
    assert_eq!(kernel.transition_probability(&event("S", "I")), Some(2.0));
}

#[test]
fn unknown_event_has_no_probability() {
    let kernel: TransitionKernel = [(event("S", "I"), 1.0)].into_iter().collect();
    assert_eq!(kernel.transition_probability(&event("I", "R")), None);
}

#[test]
fn events_keep_insertion_order() {
    let mut kernel = TransitionKernel::new();
    kernel.add_to_kernel(event("I", "R"), 1.0);
    kernel.add_to_kernel(event("S", "I"), 3.0);
    kernel.add_to_kernel(event("R", "S"), 0.5);
    // update keeps the original position
    kernel.add_to_kernel(event("I", "R"), 4.0);

    let events: Vec<_> = kernel.transition_events().cloned().collect();
    assert_eq!(events, vec![event("I", "R"), event("S", "I"), event("R", "S")]);
    assert_eq!(kernel.total_rate(), 7.5);
}

#[test]
fn cdf_accumulates_in_insertion_order() {
    let kernel: TransitionKernel = [(event("S", "I"), 3.0), (event("I", "R"), 1.0), (event("R", "S"), 0.5)]
        .into_iter()
        .collect();
    let cdf = kernel.cdf();
    assert_eq!(
        cdf,
        vec![(event("S", "I"), 3.0), (event("I", "R"), 4.0), (event("R", "S"), 4.5)]
    );
}

#[test]
fn select_breaks_ties_by_insertion_order() {
    let kernel: TransitionKernel = [(event("A", "B"), 1.0), (event("B", "C"), 1.0)].into_iter().collect();
    assert_eq!(kernel.select(1.0), Some(&event("A", "B")));
    assert_eq!(kernel.select(1.0000001), Some(&event("B", "C")));
    assert_eq!(kernel.select(0.2), Some(&event("A", "B")));
    assert_eq!(kernel.select(2.5), None);
}

#[test]
fn clear_and_refill_reproduces_cdf() {
    let entries = vec![(event("S", "I"), 2.0), (event("I", "R"), 0.25), (event("E", "I"), 1.0)];
    let mut kernel: TransitionKernel = entries.clone().into_iter().collect();
    let before = kernel.cdf();

    kernel.clear();
    assert!(kernel.is_empty());
    assert!(kernel.cdf().is_empty());

    for (event, rate) in entries {
        kernel.add_to_kernel(event, rate);
    }
    assert_eq!(kernel.cdf(), before);
}

#[test]
fn copy_is_independent() {
    let mut kernel: TransitionKernel = [(event("S", "I"), 2.0), (event("I", "R"), 1.0)].into_iter().collect();
    let mut copy = kernel.copy();
    assert_eq!(copy.cdf(), kernel.cdf());
    assert_eq!(copy, kernel);

    kernel.add_to_kernel(event("I", "R"), 5.0);
    assert_eq!(copy.transition_probability(&event("I", "R")), Some(1.0));

    copy.clear();
    assert_eq!(kernel.len(), 2);
    assert_eq!(kernel.total_rate(), 7.0);
}

#[test]
fn bulk_replace_drops_previous_contents() {
    let mut kernel: TransitionKernel = [(event("S", "I"), 2.0)].into_iter().collect();
    kernel.set_transition_probabilities(vec![(event("I", "R"), 1.0), (event("R", "S"), 0.0)]);
    let events: Vec<_> = kernel.transition_events().cloned().collect();
    assert_eq!(events, vec![event("I", "R")]);
}
