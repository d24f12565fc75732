//! Disjoint-set forest used to partition a transfer graph into weakly
//! connected components.
//!
//! Elements are dense ordinals `0..n` (petgraph node indices). `find` uses
//! iterative path-halving and `union` uses union-by-rank with the lower
//! ordinal winning ties, so representatives do not depend on the order in
//! which transfers were unioned.

/// A union-find structure over `n` ordinals.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// Creates `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0u8; n],
        }
    }

    /// Returns the representative of the set containing `x`.
    ///
    /// `x` must be below [`UnionFind::len`].
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            let grandparent = self.parent[self.parent[x]];
            self.parent[x] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Merges the sets containing `a` and `b`.
    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }

        let (root, child) = match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => (rb, ra),
            std::cmp::Ordering::Greater => (ra, rb),
            std::cmp::Ordering::Equal => {
                let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
                self.rank[root] = self.rank[root].saturating_add(1);
                (root, child)
            }
        };
        self.parent[child] = root;
    }

    /// Assigns each element a dense component label.
    ///
    /// Labels are numbered `0..k` in order of each component's lowest
    /// ordinal, so element `0` is always in component `0`.
    pub fn labels(&mut self) -> Vec<usize> {
        let n = self.parent.len();
        let mut label_of_root: Vec<Option<usize>> = vec![None; n];
        let mut next = 0usize;
        let mut labels = Vec::with_capacity(n);
        for x in 0..n {
            let root = self.find(x);
            let label = *label_of_root[root].get_or_insert_with(|| {
                let assigned = next;
                next += 1;
                assigned
            });
            labels.push(label);
        }
        labels
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}
