use std::collections::BTreeSet;

use crate::graph::relation::{SynergyKind, matching_relations};
use crate::graph::{SynergyEdge, SynergyGraph};
use crate::model::candidate::ScoredCandidate;
use crate::model::role::Role;
use tracing::{Level, event};

const MAX_STRENGTH: f32 = 10.0;
/// Tags in this category describe creature types and are handled as tribal.
const TRIBAL_CATEGORY: &str = "tribal";

/// Features of one card that edge derivation looks at.
struct NodeFeatures<'c> {
    name: &'c str,
    tag_names: Vec<&'c str>,
    mean_priority: f32,
    categories: BTreeSet<&'c str>,
    creature_types: BTreeSet<String>,
    mana_value: f32,
    is_land: bool,
    roles: BTreeSet<Role>,
}

impl<'c> NodeFeatures<'c> {
    fn of(candidate: &'c ScoredCandidate) -> Self {
        let tag_names: Vec<&str> = candidate.tags.iter().map(|tag| tag.name.as_str()).collect();
        let mean_priority = if candidate.tags.is_empty() {
            0.0
        } else {
            candidate
                .tags
                .iter()
                .map(|tag| f32::from(tag.priority))
                .sum::<f32>()
                / candidate.tags.len() as f32
        };
        Self {
            name: candidate.name(),
            tag_names,
            mean_priority,
            categories: candidate
                .tags
                .iter()
                .map(|tag| tag.category.as_str())
                .filter(|category| *category != TRIBAL_CATEGORY)
                .collect(),
            creature_types: candidate.card.creature_types().into_iter().collect(),
            mana_value: candidate.card.mana_value,
            is_land: candidate.card.is_land(),
            roles: candidate
                .role_relevance
                .iter()
                .copied()
                .filter(|role| !matches!(role, Role::Land | Role::Synergy))
                .collect(),
        }
    }
}

/// Derives pairwise synergy edges across a set of cards.
#[derive(Debug, Clone, Default)]
pub struct SynergyGraphBuilder {
    min_strength: f32,
}

impl SynergyGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops edges weaker than `min_strength`.
    pub fn with_min_strength(mut self, min_strength: f32) -> Self {
        self.min_strength = min_strength.clamp(0.0, MAX_STRENGTH);
        self
    }

    pub fn build<'c, I>(&self, cards: I) -> SynergyGraph
    where
        I: IntoIterator<Item = &'c ScoredCandidate>,
    {
        let nodes: Vec<NodeFeatures<'c>> = cards.into_iter().map(NodeFeatures::of).collect();
        let mut edges = Vec::new();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                if let Some(edge) = self.edge_between(i, &nodes[i], j, &nodes[j]) {
                    edges.push(edge);
                }
            }
        }
        let graph = SynergyGraph {
            nodes: nodes.iter().map(|node| node.name.to_string()).collect(),
            edges,
        };
        event!(
            target: "deckforge::graph",
            Level::DEBUG,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
        );
        graph
    }

    /// Strongest relationship between two cards, if any clears the floor.
    fn edge_between(
        &self,
        a_index: usize,
        a: &NodeFeatures<'_>,
        b_index: usize,
        b: &NodeFeatures<'_>,
    ) -> Option<SynergyEdge> {
        // (kind, strength, reversed, directed)
        let mut best: Option<(SynergyKind, f32, bool, bool)> = None;
        let mut offer = |kind: SynergyKind, strength: f32, reversed: bool, directed: bool| {
            let strength = strength.clamp(0.0, MAX_STRENGTH);
            let better = match best {
                None => true,
                Some((best_kind, best_strength, _, _)) => {
                    strength > best_strength || (strength == best_strength && kind < best_kind)
                }
            };
            if better {
                best = Some((kind, strength, reversed, directed));
            }
        };

        let priority_bonus = (a.mean_priority + b.mean_priority) / 10.0;
        for (relation, reversed) in matching_relations(&a.tag_names, &b.tag_names) {
            offer(
                relation.kind,
                relation.kind.base_strength() + priority_bonus,
                reversed,
                relation.directed,
            );
        }

        let shared_types = a.creature_types.intersection(&b.creature_types).count();
        if shared_types > 0 {
            offer(
                SynergyKind::Tribal,
                SynergyKind::Tribal.base_strength() + shared_types as f32,
                false,
                false,
            );
        }

        let shared_categories = a.categories.intersection(&b.categories).count();
        if shared_categories > 0 {
            offer(
                SynergyKind::Thematic,
                SynergyKind::Thematic.base_strength() + shared_categories as f32 * 0.5,
                false,
                false,
            );
        }

        if !a.is_land
            && !b.is_land
            && a.mana_value <= 3.0
            && b.mana_value <= 3.0
            && (a.mana_value - b.mana_value).abs() <= 1.0
        {
            offer(
                SynergyKind::Curve,
                SynergyKind::Curve.base_strength(),
                false,
                false,
            );
        }

        if a.roles.intersection(&b.roles).next().is_some() {
            offer(
                SynergyKind::Utility,
                SynergyKind::Utility.base_strength(),
                false,
                false,
            );
        }

        let (kind, strength, reversed, directed) = best?;
        if strength < self.min_strength || strength <= 0.0 {
            return None;
        }
        let (source, target) = if reversed {
            ((b_index, b.name), (a_index, a.name))
        } else {
            ((a_index, a.name), (b_index, b.name))
        };
        Some(SynergyEdge {
            a: source.1.to_string(),
            b: target.1.to_string(),
            a_index: source.0,
            b_index: target.0,
            kind,
            strength,
            bidirectional: !directed,
        })
    }
}
