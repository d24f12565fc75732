/// Fixed-length ring search.
///
/// A ring of `k` hops is a closed path `a0 → a1 → … → a(k-1) → a0` whose
/// accounts are pairwise distinct. This mirrors pattern queries of the form
/// "two accounts that send money back and forth", "three accounts in a
/// loop", and so on: each ring is reported once per starting account, so a
/// three-account loop yields three rotations for `hops = 3`.
///
/// Unlike [`super::detect_cycles`], this search is exhaustive for the given
/// length. The cost grows with `degree^hops`; keep `hops` small or pass a
/// `limit`.
use petgraph::graph::NodeIndex;
use tracing::debug;

use super::TransferGraph;
use super::cycles::Cycle;

/// Enumerates every ring of exactly `hops` transfers.
///
/// Starts are taken from [`TransferGraph::sources`] in order and successors
/// in adjacency order, so the output order is deterministic. `hops == 1`
/// finds self-loops; `hops == 0` returns nothing. When `limit` is `Some(n)`
/// the search stops after `n` rings.
pub fn fixed_length_cycles(
    graph: &TransferGraph,
    hops: usize,
    limit: Option<usize>,
) -> Vec<Cycle> {
    let mut rings: Vec<Cycle> = Vec::new();
    if hops == 0 {
        return rings;
    }

    'starts: for &start in graph.sources() {
        let mut path: Vec<NodeIndex> = vec![start];
        // Next successor position for each node on `path`.
        let mut cursor: Vec<usize> = vec![0];

        while let Some(next) = cursor.last_mut() {
            let Some(&node) = path.last() else {
                break;
            };
            let Some(&child) = graph.neighbours(node).get(*next) else {
                cursor.pop();
                path.pop();
                continue;
            };
            *next += 1;

            if path.len() == hops {
                if child == start {
                    if let Some(ring) = Cycle::from_open(&path) {
                        rings.push(ring);
                    }
                    if limit.is_some_and(|cap| rings.len() >= cap) {
                        break 'starts;
                    }
                }
                continue;
            }

            if child == start || path.contains(&child) {
                continue;
            }
            path.push(child);
            cursor.push(0);
        }
    }

    debug!(hops, rings = rings.len(), "fixed-length ring search finished");
    rings
}
