use crate::graph::SynergyGraph;
use serde::{Deserialize, Serialize};

const DEFAULT_CLUSTER_THRESHOLD: f32 = 3.0;
const DEFAULT_HUB_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hub {
    pub name: String,
    pub degree: usize,
    pub weighted_degree: f32,
}

/// Structural summary of a deck's synergy graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohesionReport {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f32,
    pub average_strength: f32,
    /// Connected groups over edges at or above the cluster threshold,
    /// largest first. Singletons are omitted.
    pub clusters: Vec<Vec<String>>,
    pub hubs: Vec<Hub>,
    pub isolated: Vec<String>,
    /// 0..=10, half from density and half from mean edge strength.
    pub cohesion: f32,
}

impl CohesionReport {
    pub fn analyze(graph: &SynergyGraph) -> Self {
        Self::analyze_with(graph, DEFAULT_CLUSTER_THRESHOLD, DEFAULT_HUB_COUNT)
    }

    pub fn analyze_with(graph: &SynergyGraph, cluster_threshold: f32, hub_count: usize) -> Self {
        let n = graph.node_count();
        let density = graph.density();
        let average_strength = graph.average_strength();

        let mut hubs: Vec<Hub> = (0..n)
            .map(|index| Hub {
                name: graph.nodes[index].clone(),
                degree: graph.degree(index),
                weighted_degree: graph.weighted_degree(index),
            })
            .filter(|hub| hub.degree > 0)
            .collect();
        hubs.sort_by(|a, b| b.weighted_degree.total_cmp(&a.weighted_degree));
        hubs.truncate(hub_count);

        let isolated = (0..n)
            .filter(|index| graph.degree(*index) == 0)
            .map(|index| graph.nodes[index].clone())
            .collect();

        Self {
            node_count: n,
            edge_count: graph.edge_count(),
            density,
            average_strength,
            clusters: clusters(graph, cluster_threshold),
            hubs,
            isolated,
            cohesion: (density * 5.0 + average_strength * 0.5).clamp(0.0, 10.0),
        }
    }
}

fn find(parent: &mut [usize], i: usize) -> usize {
    if parent[i] != i {
        parent[i] = find(parent, parent[i]);
    }
    parent[i]
}

fn union(parent: &mut [usize], rank: &mut [usize], i: usize, j: usize) {
    let pi = find(parent, i);
    let pj = find(parent, j);
    if pi == pj {
        return;
    }
    if rank[pi] < rank[pj] {
        parent[pi] = pj;
    } else if rank[pi] > rank[pj] {
        parent[pj] = pi;
    } else {
        parent[pj] = pi;
        rank[pi] += 1;
    }
}

fn clusters(graph: &SynergyGraph, threshold: f32) -> Vec<Vec<String>> {
    let n = graph.node_count();
    let mut parent: Vec<usize> = (0..n).collect();
    let mut rank: Vec<usize> = vec![0; n];
    for edge in &graph.edges {
        if edge.strength >= threshold && edge.a_index < n && edge.b_index < n {
            union(&mut parent, &mut rank, edge.a_index, edge.b_index);
        }
    }

    // Group members by root in node order so output is stable.
    let mut groups: Vec<(usize, Vec<String>)> = Vec::new();
    for index in 0..n {
        let root = find(&mut parent, index);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(graph.nodes[index].clone()),
            None => groups.push((root, vec![graph.nodes[index].clone()])),
        }
    }
    let mut clusters: Vec<Vec<String>> = groups
        .into_iter()
        .map(|(_, members)| members)
        .filter(|members| members.len() > 1)
        .collect();
    clusters.sort_by(|a, b| b.len().cmp(&a.len()));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{SynergyEdge, SynergyKind};

    fn graph(n: usize, edges: &[(usize, usize, f32)]) -> SynergyGraph {
        SynergyGraph {
            nodes: (0..n).map(|i| format!("card {i}")).collect(),
            edges: edges
                .iter()
                .map(|(a, b, strength)| SynergyEdge {
                    a: format!("card {a}"),
                    b: format!("card {b}"),
                    a_index: *a,
                    b_index: *b,
                    kind: SynergyKind::Combo,
                    strength: *strength,
                    bidirectional: true,
                })
                .collect(),
        }
    }

    #[test]
    fn clusters_follow_strong_edges() {
        let graph = graph(6, &[(0, 1, 8.0), (1, 2, 5.0), (3, 4, 6.0), (2, 3, 1.0)]);
        let report = CohesionReport::analyze(&graph);
        assert_eq!(report.clusters.len(), 2);
        assert_eq!(report.clusters[0], vec!["card 0", "card 1", "card 2"]);
        assert_eq!(report.clusters[1], vec!["card 3", "card 4"]);
        assert_eq!(report.isolated, vec!["card 5"]);
    }

    #[test]
    fn hubs_rank_by_weighted_degree() {
        let graph = graph(4, &[(0, 1, 2.0), (1, 2, 9.0), (1, 3, 1.0)]);
        let report = CohesionReport::analyze_with(&graph, 3.0, 2);
        assert_eq!(report.hubs.len(), 2);
        assert_eq!(report.hubs[0].name, "card 1");
        assert_eq!(report.hubs[0].degree, 3);
        assert_eq!(report.hubs[1].name, "card 2");
    }

    #[test]
    fn cohesion_is_bounded() {
        let complete = graph(3, &[(0, 1, 10.0), (0, 2, 10.0), (1, 2, 10.0)]);
        assert_eq!(CohesionReport::analyze(&complete).cohesion, 10.0);
        let empty = graph(3, &[]);
        let report = CohesionReport::analyze(&empty);
        assert_eq!(report.cohesion, 0.0);
        assert_eq!(report.isolated.len(), 3);
        assert!(report.clusters.is_empty());
    }
}
