//! Union-find over dense indices.
//!
//! Parent-pointer arena with iterative path compression and union by rank.
//! Indices are handed out densely by [`UnionFind::push`].

#[derive(Debug, Clone, Default)]
pub(crate) struct UnionFind {
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            parent: Vec::with_capacity(capacity),
            rank: Vec::with_capacity(capacity),
        }
    }

    /// Number of elements in the arena.
    pub(crate) fn len(&self) -> usize {
        self.parent.len()
    }

    /// Add a new singleton element and return its index.
    pub(crate) fn push(&mut self) -> u32 {
        let index = self.parent.len() as u32;
        self.parent.push(index);
        self.rank.push(0);
        index
    }

    /// Find the component root of `x`, compressing the path behind it.
    pub(crate) fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut cursor = x;
        while self.parent[cursor as usize] != root {
            let next = self.parent[cursor as usize];
            self.parent[cursor as usize] = root;
            cursor = next;
        }
        root
    }

    /// Merge the components of `a` and `b`; returns the surviving root.
    pub(crate) fn union(&mut self, a: u32, b: u32) -> u32 {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return root_a;
        }
        let (winner, loser) = if self.rank[root_a as usize] >= self.rank[root_b as usize] {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[loser as usize] = winner;
        if self.rank[winner as usize] == self.rank[loser as usize] {
            self.rank[winner as usize] += 1;
        }
        winner
    }
}
