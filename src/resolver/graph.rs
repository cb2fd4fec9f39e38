//! Explicit mention graph.
//!
//! Edges join mentions that match pairwise; clusters are the connected
//! components. Transitivity is deliberate: if A matches B and B matches C,
//! all three cluster together even when A and C share no signal. This lets
//! different similarity rules chain, and it is also the main over-merging
//! risk, since one spurious edge fuses two otherwise separate clusters.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::similarity::MatchReason;

/// An undirected edge between two mention positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Lower endpoint.
    pub a: usize,
    /// Higher endpoint.
    pub b: usize,
    /// First rule that matched the pair.
    pub reason: MatchReason,
}

/// Undirected graph over `0..len` mention positions.
///
/// Node `i` of the underlying graph is mention position `i`.
#[derive(Debug, Clone, Default)]
pub struct MentionGraph {
    graph: UnGraph<(), MatchReason, u32>,
}

impl MentionGraph {
    /// Creates a graph with `len` isolated nodes.
    #[must_use]
    pub fn new(len: usize) -> Self {
        let mut graph = UnGraph::with_capacity(len, len);
        for _ in 0..len {
            graph.add_node(());
        }
        Self { graph }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Adds an edge. Self-loops and out-of-range nodes are ignored.
    pub fn add_edge(&mut self, a: usize, b: usize, reason: MatchReason) {
        if a == b || a >= self.len() || b >= self.len() {
            return;
        }
        let (lo, hi) = (a.min(b), a.max(b));
        self.graph
            .add_edge(NodeIndex::new(lo), NodeIndex::new(hi), reason);
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.graph.edge_references().map(|e| Edge {
            a: e.source().index(),
            b: e.target().index(),
            reason: *e.weight(),
        })
    }

    /// Connected components, each sorted ascending, ordered by their
    /// smallest node. Every node belongs to exactly one component.
    #[must_use]
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut sets = UnionFind::<usize>::new(self.len());
        for edge in self.graph.edge_references() {
            sets.union(edge.source().index(), edge.target().index());
        }

        // Slot of each root's component in the output, assigned on first sight.
        let mut slot_of_root: Vec<Option<usize>> = vec![None; self.len()];
        let mut components: Vec<Vec<usize>> = Vec::new();
        for node in 0..self.len() {
            let root = sets.find(node);
            match slot_of_root[root] {
                Some(slot) => components[slot].push(node),
                None => {
                    slot_of_root[root] = Some(components.len());
                    components.push(vec![node]);
                }
            }
        }
        components
    }
}
