//! Transfer-network generator.
//!
//! Produces a forward-only backbone of transfers (acyclic by construction),
//! an optional backward mesh that introduces incidental cycles, and a set of
//! planted rings whose membership is returned as ground truth.

pub mod scores;
pub mod topology;

use rand::SeedableRng;
use rand::rngs::StdRng;
use ringscan_core::{EdgeRecord, RiskRecord};
use serde_json::{Value, json};

/// Configuration for the transfer-network generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator (deterministic).
    pub seed: u64,
    /// Number of accounts.
    pub num_accounts: usize,
    /// Forward transfers emitted per account in the backbone.
    pub transfers_per_account: usize,
    /// Backward transfers as a fraction of the backbone (0.0-0.05).
    pub mesh_density: f64,
    /// Number of planted rings.
    pub num_rings: usize,
    /// Shortest planted ring, in accounts.
    pub min_ring_len: usize,
    /// Longest planted ring, in accounts.
    pub max_ring_len: usize,
    /// Fraction of accounts outside high-risk rings that carry a score.
    pub scored_fraction: f64,
    /// Fraction of planted rings whose members all score above 0.75.
    pub high_risk_ring_fraction: f64,
    /// Probability that a backbone transfer is repeated.
    pub repeat_rate: f64,
}

/// Predefined size tiers for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// 50 accounts, ~100 transfers
    Small,
    /// 1,000 accounts, ~3,000 transfers
    Medium,
    /// 10,000 accounts, ~30,000 transfers
    Large,
    /// 100,000 accounts, ~400,000 transfers
    XLarge,
}

impl SizeTier {
    /// Returns the default `GeneratorConfig` for this size tier.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        match self {
            SizeTier::Small => GeneratorConfig {
                seed,
                num_accounts: 50,
                transfers_per_account: 2,
                mesh_density: 0.0,
                num_rings: 3,
                min_ring_len: 3,
                max_ring_len: 5,
                scored_fraction: 0.5,
                high_risk_ring_fraction: 0.34,
                repeat_rate: 0.05,
            },
            SizeTier::Medium => GeneratorConfig {
                seed,
                num_accounts: 1_000,
                transfers_per_account: 3,
                mesh_density: 0.01,
                num_rings: 20,
                min_ring_len: 3,
                max_ring_len: 8,
                scored_fraction: 0.6,
                high_risk_ring_fraction: 0.25,
                repeat_rate: 0.05,
            },
            SizeTier::Large => GeneratorConfig {
                seed,
                num_accounts: 10_000,
                transfers_per_account: 3,
                mesh_density: 0.01,
                num_rings: 100,
                min_ring_len: 3,
                max_ring_len: 10,
                scored_fraction: 0.6,
                high_risk_ring_fraction: 0.2,
                repeat_rate: 0.05,
            },
            SizeTier::XLarge => GeneratorConfig {
                seed,
                num_accounts: 100_000,
                transfers_per_account: 4,
                mesh_density: 0.005,
                num_rings: 500,
                min_ring_len: 3,
                max_ring_len: 12,
                scored_fraction: 0.7,
                high_risk_ring_fraction: 0.2,
                repeat_rate: 0.05,
            },
        }
    }
}

/// A generated network plus the rings planted in it.
#[derive(Debug, Clone)]
pub struct TransferNetwork {
    pub transfers: Vec<EdgeRecord>,
    pub accounts: Vec<RiskRecord>,
    /// Planted rings as closed id paths (`[a, b, c, a]`).
    pub rings: Vec<Vec<String>>,
    /// Indices into `rings` of the rings seeded with high scores.
    pub high_risk_rings: Vec<usize>,
}

impl TransferNetwork {
    /// Renders the network as the JSON document the `ringscan` binary reads.
    pub fn to_document(&self) -> Value {
        json!({
            "transfers": self.transfers,
            "accounts": self.accounts,
        })
    }
}

/// Generates a transfer network from the given configuration.
///
/// All randomness is deterministic, seeded from `config.seed`.
pub fn generate_network(config: &GeneratorConfig) -> TransferNetwork {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let ids = topology::account_ids(config.num_accounts);
    let (transfers, rings) = topology::build_transfers(config, &ids, &mut rng);
    let high_risk_rings = scores::pick_high_risk_rings(config, rings.len());
    let accounts = scores::assign_scores(config, &ids, &rings, &high_risk_rings, &mut rng);
    TransferNetwork {
        transfers,
        accounts,
        rings,
        high_risk_rings,
    }
}
