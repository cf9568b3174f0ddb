pub mod builder;
pub mod cohesion;
pub mod relation;

pub use builder::SynergyGraphBuilder;
pub use cohesion::{CohesionReport, Hub};
pub use relation::{SynergyKind, TAG_RELATIONS, TagRelation};

use serde::{Deserialize, Serialize};

/// One derived relationship. Recomputed per run, never authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyEdge {
    pub a: String,
    pub b: String,
    pub a_index: usize,
    pub b_index: usize,
    pub kind: SynergyKind,
    /// 0..=10
    pub strength: f32,
    pub bidirectional: bool,
}

impl SynergyEdge {
    pub fn touches(&self, index: usize) -> bool {
        self.a_index == index || self.b_index == index
    }
}

/// Cards as nodes (by position, names may repeat for fungible cards) and
/// the strongest edge per pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynergyGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<SynergyEdge>,
}

impl SynergyGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn degree(&self, index: usize) -> usize {
        self.edges.iter().filter(|edge| edge.touches(index)).count()
    }

    pub fn weighted_degree(&self, index: usize) -> f32 {
        self.edges
            .iter()
            .filter(|edge| edge.touches(index))
            .map(|edge| edge.strength)
            .sum()
    }

    /// Edges as a fraction of all possible pairs.
    pub fn density(&self) -> f32 {
        let n = self.nodes.len();
        if n < 2 {
            return 0.0;
        }
        let possible = (n * (n - 1) / 2) as f32;
        self.edges.len() as f32 / possible
    }

    pub fn average_strength(&self) -> f32 {
        if self.edges.is_empty() {
            return 0.0;
        }
        self.edges.iter().map(|edge| edge.strength).sum::<f32>() / self.edges.len() as f32
    }

    pub fn edges_of_kind(&self, kind: SynergyKind) -> impl Iterator<Item = &SynergyEdge> + '_ {
        self.edges.iter().filter(move |edge| edge.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(a: usize, b: usize, strength: f32) -> SynergyEdge {
        SynergyEdge {
            a: format!("card {a}"),
            b: format!("card {b}"),
            a_index: a,
            b_index: b,
            kind: SynergyKind::Thematic,
            strength,
            bidirectional: true,
        }
    }

    #[test]
    fn degree_and_density() {
        let graph = SynergyGraph {
            nodes: (0..4).map(|i| format!("card {i}")).collect(),
            edges: vec![edge(0, 1, 4.0), edge(0, 2, 2.0), edge(1, 2, 6.0)],
        };
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.degree(3), 0);
        assert_eq!(graph.weighted_degree(2), 8.0);
        assert_eq!(graph.density(), 0.5);
        assert_eq!(graph.average_strength(), 4.0);
        assert_eq!(graph.edges_of_kind(SynergyKind::Thematic).count(), 3);
    }

    #[test]
    fn empty_graph_metrics_are_zero() {
        let graph = SynergyGraph::default();
        assert_eq!(graph.density(), 0.0);
        assert_eq!(graph.average_strength(), 0.0);
    }
}
