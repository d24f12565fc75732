//! Risk-score assignment.

use std::collections::HashSet;

use rand::Rng;
use rand::rngs::StdRng;
use ringscan_core::RiskRecord;

use super::GeneratorConfig;

/// The first `round(num_rings * high_risk_ring_fraction)` rings.
pub fn pick_high_risk_rings(config: &GeneratorConfig, num_rings: usize) -> Vec<usize> {
    let count = (num_rings as f64 * config.high_risk_ring_fraction).round() as usize;
    (0..count.min(num_rings)).collect()
}

/// Scores every member of a high-risk ring in `[0.75, 1.0]`, and a
/// `scored_fraction` sample of the remaining accounts in `[0.0, 0.6)`.
///
/// Records come out in account order.
pub fn assign_scores(
    config: &GeneratorConfig,
    ids: &[String],
    rings: &[Vec<String>],
    high_risk_rings: &[usize],
    rng: &mut StdRng,
) -> Vec<RiskRecord> {
    let flagged: HashSet<&str> = high_risk_rings
        .iter()
        .filter_map(|&r| rings.get(r))
        .flatten()
        .map(String::as_str)
        .collect();

    let mut records = Vec::new();
    for id in ids {
        if flagged.contains(id.as_str()) {
            records.push(RiskRecord::new(id.clone(), round3(rng.gen_range(0.75..=1.0))));
        } else if rng.gen_bool(config.scored_fraction) {
            records.push(RiskRecord::new(id.clone(), round3(rng.gen_range(0.0..0.6))));
        }
    }
    records
}

fn round3(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}
