//! Transfer-network generator and benchmark utilities for ringscan.
//!
//! This crate provides deterministic generation of synthetic transfer
//! networks with planted laundering rings, for benchmarking and
//! property-based testing of `ringscan-core`.

use std::path::PathBuf;

pub mod correctness;
pub mod generator;

pub use generator::{GeneratorConfig, SizeTier, TransferNetwork, generate_network};

/// Returns the path where the generated XLarge-tier document is stored.
///
/// The file lives under `target/bench-fixtures/xlarge.network.json` so it is
/// gitignored and shared between the generator binary and ad-hoc CLI runs.
pub fn network_fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("target")
        .join("bench-fixtures")
        .join("xlarge.network.json")
}
