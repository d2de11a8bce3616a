//! Louvain community detection.
//!
//! Greedy modularity optimization in two alternating phases: local moves
//! (each vertex joins the neighbouring community with the best positive
//! modularity gain) and aggregation (communities collapse into
//! super-vertices, intra-community weight becomes a self-loop). Levels
//! repeat until a level makes no move, then super-vertex labels are
//! flattened back onto the original vertices.
//!
//! Vertices are visited in ascending index order and a move is only taken on
//! a strictly positive gain, so the result is deterministic without any
//! random tie-breaking.

use crate::types::{ClusterAssignment, ClusterId, DependencyGraph, WeightRepository};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::collections::HashMap;

/// Undirected weighted graph in dense-index form, self-loops allowed.
struct WeightedGraph {
    /// adjacency[v] = (neighbour, weight); self-loops stored once with their
    /// full weight.
    adjacency: Vec<Vec<(usize, f64)>>,
    total_weight: f64,
}

impl WeightedGraph {
    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Weighted degree including twice the self-loop weight.
    fn degree(&self, v: usize) -> f64 {
        self.adjacency[v]
            .iter()
            .map(|&(u, w)| if u == v { 2.0 * w } else { w })
            .sum()
    }

    fn self_loop(&self, v: usize) -> f64 {
        self.adjacency[v]
            .iter()
            .filter(|&&(u, _)| u == v)
            .map(|&(_, w)| w)
            .sum()
    }
}

fn build_weighted(graph: &DependencyGraph, weights: &WeightRepository) -> WeightedGraph {
    let dense: HashMap<_, _> = graph
        .vertices()
        .enumerate()
        .map(|(i, v)| (v, i))
        .collect();
    let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); dense.len()];
    let mut total_weight = 0.0;

    // Parallel directed edges accumulate into one undirected weight.
    let mut pair_weight: HashMap<(usize, usize), f64> = HashMap::new();
    for e in graph.graph().edge_references() {
        let (mut a, mut b) = (dense[&e.source()], dense[&e.target()]);
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        let w = weights.resolve(&e.weight().dependency_type).max(0) as f64;
        *pair_weight.entry((a, b)).or_insert(0.0) += w;
    }

    for ((a, b), w) in pair_weight {
        total_weight += w;
        if a == b {
            adjacency[a].push((a, w));
        } else {
            adjacency[a].push((b, w));
            adjacency[b].push((a, w));
        }
    }

    WeightedGraph {
        adjacency,
        total_weight,
    }
}

/// One level of local moves. Returns the community of each vertex and
/// whether any vertex moved.
fn local_moves(g: &WeightedGraph) -> (Vec<usize>, bool) {
    let n = g.node_count();
    let mut community: Vec<usize> = (0..n).collect();
    let degrees: Vec<f64> = (0..n).map(|v| g.degree(v)).collect();
    // Sum of weighted degrees per community.
    let mut community_degree: Vec<f64> = degrees.clone();

    let m2 = 2.0 * g.total_weight;
    if m2 == 0.0 {
        return (community, false);
    }

    let mut any_moved = false;
    loop {
        let mut moved_this_sweep = false;
        for v in 0..n {
            let own = community[v];

            // Weight from v to each neighbouring community (self-loops do
            // not count toward any community link).
            let mut links: HashMap<usize, f64> = HashMap::new();
            for &(u, w) in &g.adjacency[v] {
                if u != v {
                    *links.entry(community[u]).or_insert(0.0) += w;
                }
            }

            // Detach v, then score staying vs. moving with the standard
            // gain comparison: link(v, c) - degree(c) * degree(v) / 2m.
            community_degree[own] -= degrees[v];
            let stay_score =
                links.get(&own).copied().unwrap_or(0.0) - community_degree[own] * degrees[v] / m2;

            let mut best_community = own;
            let mut best_score = stay_score;
            let mut candidates: Vec<(usize, f64)> =
                links.iter().map(|(&c, &w)| (c, w)).collect();
            candidates.sort_unstable_by(|a, b| a.0.cmp(&b.0));
            for (c, link) in candidates {
                if c == own {
                    continue;
                }
                let score = link - community_degree[c] * degrees[v] / m2;
                if score > best_score {
                    best_score = score;
                    best_community = c;
                }
            }

            community_degree[best_community] += degrees[v];
            if best_community != own {
                community[v] = best_community;
                moved_this_sweep = true;
                any_moved = true;
            }
        }
        if !moved_this_sweep {
            break;
        }
    }
    (community, any_moved)
}

/// Collapse communities into super-vertices.
fn aggregate(g: &WeightedGraph, community: &[usize]) -> (WeightedGraph, Vec<usize>) {
    // Renumber communities densely in ascending order.
    let mut ids: Vec<usize> = community.to_vec();
    ids.sort_unstable();
    ids.dedup();
    let renumber: HashMap<usize, usize> = ids.iter().enumerate().map(|(i, &c)| (c, i)).collect();
    let mapping: Vec<usize> = community.iter().map(|c| renumber[c]).collect();

    let n = ids.len();
    let mut pair_weight: HashMap<(usize, usize), f64> = HashMap::new();
    for v in 0..g.node_count() {
        for &(u, w) in &g.adjacency[v] {
            if u < v {
                continue; // count each undirected edge once; keep (v, v)
            }
            let (mut a, mut b) = (mapping[v], mapping[u]);
            if a > b {
                std::mem::swap(&mut a, &mut b);
            }
            *pair_weight.entry((a, b)).or_insert(0.0) += w;
        }
    }

    let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    let mut total_weight = 0.0;
    for ((a, b), w) in pair_weight {
        total_weight += w;
        if a == b {
            adjacency[a].push((a, w));
        } else {
            adjacency[a].push((b, w));
            adjacency[b].push((a, w));
        }
    }

    (
        WeightedGraph {
            adjacency,
            total_weight,
        },
        mapping,
    )
}

/// Louvain clustering over the undirected weighted view of the graph.
pub fn louvain_clusters(graph: &DependencyGraph, weights: &WeightRepository) -> ClusterAssignment {
    let vertices: Vec<_> = graph.vertices().collect();
    if vertices.is_empty() {
        return ClusterAssignment::new();
    }

    let mut level = build_weighted(graph, weights);
    // assignment[i] = current super-vertex of original dense vertex i.
    let mut assignment: Vec<usize> = (0..vertices.len()).collect();

    loop {
        let (community, moved) = local_moves(&level);
        if !moved {
            break;
        }
        let (coarse, mapping) = aggregate(&level, &community);
        for slot in assignment.iter_mut() {
            *slot = mapping[community[*slot]];
        }
        level = coarse;
    }

    ClusterAssignment::from_labels(
        vertices
            .into_iter()
            .enumerate()
            .map(|(i, v)| (v, assignment[i] as ClusterId)),
    )
}

/// Modularity of an assignment, used by tests to check moves never hurt.
pub fn modularity(
    graph: &DependencyGraph,
    weights: &WeightRepository,
    assignment: &ClusterAssignment,
) -> f64 {
    let g = build_weighted(graph, weights);
    let dense: HashMap<_, usize> = graph
        .vertices()
        .enumerate()
        .map(|(i, v)| (v, i))
        .collect();
    let community: Vec<ClusterId> = {
        let mut c = vec![0; dense.len()];
        for (v, id) in assignment.iter() {
            c[dense[&v]] = id;
        }
        c
    };

    let m2 = 2.0 * g.total_weight;
    if m2 == 0.0 {
        return 0.0;
    }

    let mut intra = 0.0;
    for v in 0..g.node_count() {
        intra += g.self_loop(v);
        for &(u, w) in &g.adjacency[v] {
            if u > v && community[u] == community[v] {
                intra += w;
            }
        }
    }

    let mut degree_sums: HashMap<ClusterId, f64> = HashMap::new();
    for v in 0..g.node_count() {
        *degree_sums.entry(community[v]).or_insert(0.0) += g.degree(v);
    }

    let mut q = 2.0 * intra / m2;
    for d in degree_sums.values() {
        q -= (d / m2) * (d / m2);
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::stable_graph::NodeIndex;

    fn two_cliques_bridged() -> (DependencyGraph, Vec<NodeIndex>) {
        let mut g = DependencyGraph::new();
        let vs: Vec<NodeIndex> = (0..8).map(|i| g.add_vertex(format!("v{i}"))).collect();
        for group in [[0, 1, 2, 3], [4, 5, 6, 7]] {
            for i in 0..4 {
                for j in (i + 1)..4 {
                    g.add_dependency(vs[group[i]], vs[group[j]], "calls");
                }
            }
        }
        g.add_dependency(vs[0], vs[4], "calls");
        (g, vs)
    }

    #[test]
    fn test_two_cliques_become_two_communities() {
        let (g, vs) = two_cliques_bridged();
        let repo = WeightRepository::default();
        let a = louvain_clusters(&g, &repo);

        assert_eq!(a.cluster_count(), 2);
        assert!(a.same_cluster(vs[0], vs[3]));
        assert!(a.same_cluster(vs[4], vs[7]));
        assert!(!a.same_cluster(vs[0], vs[4]));
    }

    #[test]
    fn test_result_modularity_beats_singletons() {
        let (g, _) = two_cliques_bridged();
        let repo = WeightRepository::default();

        let result = louvain_clusters(&g, &repo);
        let singletons = ClusterAssignment::from_labels(
            g.vertices().enumerate().map(|(i, v)| (v, i as ClusterId)),
        );

        assert!(modularity(&g, &repo, &result) > modularity(&g, &repo, &singletons));
    }

    #[test]
    fn test_edgeless_graph_stays_singletons() {
        let mut g = DependencyGraph::new();
        for i in 0..4 {
            g.add_vertex(format!("v{i}"));
        }
        let repo = WeightRepository::default();
        let a = louvain_clusters(&g, &repo);
        assert_eq!(a.cluster_count(), 4);
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_empty_graph() {
        let g = DependencyGraph::new();
        let repo = WeightRepository::default();
        assert!(louvain_clusters(&g, &repo).is_empty());
    }

    #[test]
    fn test_weights_steer_communities() {
        // A path 0 - 1 - 2 - 3 where the middle edge is weak: Louvain should
        // pair {0,1} and {2,3}.
        let mut g = DependencyGraph::new();
        let vs: Vec<NodeIndex> = (0..4).map(|i| g.add_vertex(format!("v{i}"))).collect();
        let mut repo = WeightRepository::new(1);
        repo.set_weight("strong", 10);
        repo.set_weight("weak", 1);
        g.add_dependency(vs[0], vs[1], "strong");
        g.add_dependency(vs[1], vs[2], "weak");
        g.add_dependency(vs[2], vs[3], "strong");

        let a = louvain_clusters(&g, &repo);
        assert!(a.same_cluster(vs[0], vs[1]));
        assert!(a.same_cluster(vs[2], vs[3]));
        assert!(!a.same_cluster(vs[1], vs[2]));
    }
}
