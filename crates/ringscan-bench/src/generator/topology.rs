//! Topology strategies: forward backbone, backward mesh, planted rings.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom as _;
use rand::seq::index;
use ringscan_core::EdgeRecord;

use super::GeneratorConfig;

/// Account ids `acc-000000`, `acc-000001`, ...
pub fn account_ids(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("acc-{i:06}")).collect()
}

/// Builds the full transfer list and returns it with the planted rings.
///
/// The returned transfers are shuffled so that ring hops are interleaved
/// with ordinary traffic.
pub fn build_transfers(
    config: &GeneratorConfig,
    ids: &[String],
    rng: &mut StdRng,
) -> (Vec<EdgeRecord>, Vec<Vec<String>>) {
    let mut transfers: Vec<EdgeRecord> = Vec::new();
    let mut counter: usize = 0;

    add_backbone(config, ids, rng, &mut transfers, &mut counter);
    add_mesh(config, ids, rng, &mut transfers, &mut counter);
    let rings = add_rings(config, ids, rng, &mut transfers, &mut counter);

    transfers.shuffle(rng);
    (transfers, rings)
}

/// A labelled transfer; labels run `tx-00000000`, `tx-00000001`, ...
fn transfer(from: &str, to: &str, amount: f64, counter: &mut usize) -> EdgeRecord {
    let label = format!("tx-{:08}", *counter);
    *counter += 1;
    EdgeRecord::new(from, to, amount).with_label(label)
}

/// Amount rounded to cents.
fn gen_amount(rng: &mut StdRng, low: f64, high: f64) -> f64 {
    (rng.gen_range(low..high) * 100.0).round() / 100.0
}

/// Transfers only from lower to higher account index, so the backbone alone
/// never closes a cycle.
fn add_backbone(
    config: &GeneratorConfig,
    ids: &[String],
    rng: &mut StdRng,
    out: &mut Vec<EdgeRecord>,
    counter: &mut usize,
) {
    let n = ids.len();
    for (i, from) in ids.iter().enumerate() {
        if i + 1 >= n {
            break;
        }
        for _ in 0..config.transfers_per_account {
            let j = rng.gen_range(i + 1..n);
            let amount = gen_amount(rng, 10.0, 10_000.0);
            out.push(transfer(from, &ids[j], amount, counter));
            if rng.gen_bool(config.repeat_rate) {
                let again = gen_amount(rng, 10.0, 10_000.0);
                out.push(transfer(from, &ids[j], again, counter));
            }
        }
    }
}

fn add_mesh(
    config: &GeneratorConfig,
    ids: &[String],
    rng: &mut StdRng,
    out: &mut Vec<EdgeRecord>,
    counter: &mut usize,
) {
    let n = ids.len();
    if n < 2 {
        return;
    }
    let count = (out.len() as f64 * config.mesh_density).round() as usize;
    for _ in 0..count {
        let from = rng.gen_range(1..n);
        let to = rng.gen_range(0..from);
        let amount = gen_amount(rng, 10.0, 2_000.0);
        out.push(transfer(&ids[from], &ids[to], amount, counter));
    }
}

/// Plants `config.num_rings` rings of distinct accounts. Each hop forwards
/// slightly less than it received, as layered funds do.
fn add_rings(
    config: &GeneratorConfig,
    ids: &[String],
    rng: &mut StdRng,
    out: &mut Vec<EdgeRecord>,
    counter: &mut usize,
) -> Vec<Vec<String>> {
    let n = ids.len();
    let max_len = config.max_ring_len.min(n);
    let min_len = config.min_ring_len.max(1).min(max_len);
    if max_len == 0 {
        return Vec::new();
    }

    let mut rings = Vec::with_capacity(config.num_rings);
    for _ in 0..config.num_rings {
        let len = rng.gen_range(min_len..=max_len);
        let members: Vec<String> = index::sample(rng, n, len)
            .into_iter()
            .map(|i| ids[i].clone())
            .collect();

        let mut amount = gen_amount(rng, 5_000.0, 50_000.0);
        for (k, from) in members.iter().enumerate() {
            let to = &members[(k + 1) % len];
            out.push(transfer(from, to, amount, counter));
            amount = (amount * 0.97 * 100.0).round() / 100.0;
        }

        let mut path = members.clone();
        path.push(members[0].clone());
        rings.push(path);
    }
    rings
}
