use std::collections::{BTreeMap, BTreeSet};

use crate::model::card::Card;
use crate::model::role::Role;
use crate::model::tag::MechanicTag;
use serde::{Deserialize, Serialize};

/// A candidate card with every derived score attached. Immutable once scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub card: Card,
    pub tags: Vec<MechanicTag>,
    pub role_scores: BTreeMap<Role, f32>,
    pub synergy_score: f32,
    pub power_score: f32,
    pub budget_score: f32,
    pub curve_score: f32,
    pub total_score: f32,
    pub role_relevance: BTreeSet<Role>,
    pub price: f64,
    /// Starts equal to `total_score`; pools keep their own weighted copy.
    pub selection_priority: f32,
    pub is_staple: bool,
    /// Descriptions of the synergy rules that fired, strongest first.
    #[serde(default)]
    pub synergy_notes: Vec<String>,
}

impl ScoredCandidate {
    pub fn name(&self) -> &str {
        &self.card.name
    }

    pub fn role_score(&self, role: Role) -> f32 {
        self.role_scores.get(&role).copied().unwrap_or(0.0)
    }

    pub fn is_relevant(&self, role: Role) -> bool {
        self.role_relevance.contains(&role)
    }

    /// Highest role score and its role; ties resolve to the earlier role.
    pub fn best_role(&self) -> (Role, f32) {
        Role::ALL
            .iter()
            .map(|role| (*role, self.role_score(*role)))
            .fold((Role::Synergy, 0.0), |best, candidate| {
                if candidate.1 > best.1 { candidate } else { best }
            })
    }

    pub fn is_fungible(&self) -> bool {
        self.card.is_fungible()
    }
}
