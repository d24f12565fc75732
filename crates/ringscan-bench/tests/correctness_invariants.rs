//! Post-operation invariant tests using generated data.
#![allow(clippy::expect_used)]

use proptest::prelude::*;
use ringscan_bench::correctness;
use ringscan_bench::{SizeTier, TransferNetwork, generate_network};
use ringscan_core::{
    DetectConfig, RiskConfig, TransferGraph, build_graph, cyclic_components, dedupe_cycles,
    detect_cycles, fixed_length_cycles, summarize,
};

fn medium() -> (TransferNetwork, TransferGraph) {
    let network = generate_network(&SizeTier::Medium.config(42));
    let graph = build_graph(&network.transfers, &network.accounts);
    (network, graph)
}

#[test]
fn graph_construction_invariants() {
    let (network, graph) = medium();
    correctness::check_graph_invariants(&network, &graph).expect("graph invariants hold");
}

#[test]
fn detected_cycles_are_well_formed() {
    let (_, graph) = medium();
    let cycles = detect_cycles(&graph, &DetectConfig::default());
    assert!(!cycles.is_empty(), "planted rings should yield cycles");
    for cycle in &cycles {
        correctness::check_cycle(&graph, cycle).expect("cycle invariants hold");
    }
}

#[test]
fn planted_rings_fall_in_cyclic_components() {
    let (network, graph) = medium();
    let components = cyclic_components(&graph);
    correctness::check_rings_in_cyclic_components(&network, &graph, &components)
        .expect("every ring inside one cyclic component");
}

#[test]
fn report_matches_cycles() {
    let (_, graph) = medium();
    let config = RiskConfig::default();
    let cycles = detect_cycles(&graph, &DetectConfig::default());
    let report = summarize(&cycles, &graph, &config);
    correctness::check_report(&report, &cycles, &graph, &config).expect("report invariants hold");
}

#[test]
fn parallel_detection_matches_sequential() {
    let network = generate_network(&SizeTier::Large.config(42));
    let graph = build_graph(&network.transfers, &network.accounts);
    let sequential = detect_cycles(&graph, &DetectConfig::default());
    let parallel = detect_cycles(
        &graph,
        &DetectConfig {
            parallel: true,
            ..DetectConfig::default()
        },
    );
    correctness::check_same_multiset(&graph, &sequential, &parallel)
        .expect("same cycles either way");
}

#[test]
fn deduped_cycles_stay_well_formed() {
    let (_, graph) = medium();
    let cycles = dedupe_cycles(&graph, detect_cycles(&graph, &DetectConfig::default()));
    for cycle in &cycles {
        correctness::check_cycle(&graph, cycle).expect("canonical cycle invariants hold");
    }
}

#[test]
fn fixed_length_rings_are_well_formed() {
    let (_, graph) = medium();
    for ring in fixed_length_cycles(&graph, 3, Some(500)) {
        assert_eq!(ring.hops(), 3);
        correctness::check_cycle(&graph, &ring).expect("ring invariants hold");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn invariants_hold_for_any_seed(seed in any::<u64>()) {
        let network = generate_network(&SizeTier::Small.config(seed));
        let graph = build_graph(&network.transfers, &network.accounts);
        let config = RiskConfig::default();

        prop_assert!(correctness::check_graph_invariants(&network, &graph).is_ok());

        let cycles = detect_cycles(&graph, &DetectConfig::default());
        for cycle in &cycles {
            prop_assert!(correctness::check_cycle(&graph, cycle).is_ok());
        }

        let components = cyclic_components(&graph);
        prop_assert!(
            correctness::check_rings_in_cyclic_components(&network, &graph, &components).is_ok()
        );

        let report = summarize(&cycles, &graph, &config);
        prop_assert!(correctness::check_report(&report, &cycles, &graph, &config).is_ok());
    }
}
