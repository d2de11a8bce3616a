//! Cluster assignments.

use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Identifier of a cluster within one assignment. Non-negative, dense after
/// normalization.
pub type ClusterId = u64;

/// Total map from vertex to cluster id.
///
/// Produced wholesale by a clustering recompute; after a successful recompute
/// every vertex of the clustered graph has an entry, isolated vertices as
/// singletons. Reads for uncovered vertices are precondition violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    map: HashMap<NodeIndex, ClusterId>,
}

impl ClusterAssignment {
    /// Create an empty assignment (the result for an empty graph).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a normalized assignment from arbitrary component labels.
    ///
    /// Ids are relabelled to `0..cluster_count`, assigned in ascending vertex
    /// index order of first appearance, so structurally equal partitions
    /// compare equal regardless of how the algorithm labelled them.
    pub fn from_labels(labels: impl IntoIterator<Item = (NodeIndex, ClusterId)>) -> Self {
        let sorted: BTreeMap<NodeIndex, ClusterId> = labels.into_iter().collect();
        let mut relabel: HashMap<ClusterId, ClusterId> = HashMap::new();
        let mut map = HashMap::with_capacity(sorted.len());
        for (v, raw) in sorted {
            let next = relabel.len() as ClusterId;
            let id = *relabel.entry(raw).or_insert(next);
            map.insert(v, id);
        }
        Self { map }
    }

    /// Cluster id of a vertex, if covered by the last recompute.
    pub fn get(&self, v: NodeIndex) -> Option<ClusterId> {
        self.map.get(&v).copied()
    }

    /// Cluster id of a vertex.
    ///
    /// # Panics
    /// Panics if `v` was not covered by the last recompute. Querying ahead of
    /// the recompute is a precondition violation, not a recoverable state.
    pub fn cluster_of(&self, v: NodeIndex) -> ClusterId {
        match self.map.get(&v) {
            Some(id) => *id,
            None => panic!("no cluster assigned for vertex {v:?}; recompute has not covered it"),
        }
    }

    /// Number of vertices covered.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no vertex is covered.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of distinct clusters.
    pub fn cluster_count(&self) -> usize {
        let mut ids: Vec<ClusterId> = self.map.values().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// Clusters as sorted vertex groups, ordered by cluster id.
    pub fn groups(&self) -> Vec<Vec<NodeIndex>> {
        let mut by_id: BTreeMap<ClusterId, Vec<NodeIndex>> = BTreeMap::new();
        for (&v, &id) in &self.map {
            by_id.entry(id).or_default().push(v);
        }
        by_id
            .into_values()
            .map(|mut vs| {
                vs.sort_unstable();
                vs
            })
            .collect()
    }

    /// Iterate over `(vertex, cluster)` pairs in ascending vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, ClusterId)> + '_ {
        let sorted: BTreeMap<NodeIndex, ClusterId> =
            self.map.iter().map(|(&v, &c)| (v, c)).collect();
        sorted.into_iter()
    }

    /// True when `u` and `v` are covered and share a cluster.
    pub fn same_cluster(&self, u: NodeIndex, v: NodeIndex) -> bool {
        matches!((self.get(u), self.get(v)), (Some(a), Some(b)) if a == b)
    }
}
