use std::collections::BTreeMap;

use crate::graph::CohesionReport;
use crate::model::policy::Policy;
use crate::model::role::Role;
use crate::optimizer::{AssemblyResult, DeckEntry};
use serde::{Deserialize, Serialize};

/// Mana values 0..=6 get their own bucket; 7 and above share the last one.
pub const CURVE_BUCKETS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCoverage {
    pub role: Role,
    pub current: usize,
    pub overflow: usize,
    pub minimum: usize,
    pub target: usize,
}

impl RoleCoverage {
    pub fn is_satisfied(&self) -> bool {
        self.current >= self.minimum
    }
}

/// Human-facing summary of one generated deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckReport {
    pub size: usize,
    pub target_size: usize,
    pub total_cost: f64,
    pub budget: f64,
    pub land_count: usize,
    pub role_coverage: Vec<RoleCoverage>,
    pub cost_by_role: BTreeMap<Role, f64>,
    /// Non-land cards per mana value bucket.
    pub curve: [usize; CURVE_BUCKETS],
    pub average_mana_value: f32,
    pub average_synergy: f32,
    pub replacement_count: usize,
    pub warnings: Vec<String>,
    #[serde(default)]
    pub cohesion: Option<CohesionReport>,
}

impl DeckReport {
    pub fn from_result(
        result: &AssemblyResult,
        policy: &Policy,
        cohesion: Option<&CohesionReport>,
    ) -> Self {
        let deck = &result.final_deck;
        let mut cost_by_role: BTreeMap<Role, f64> = BTreeMap::new();
        for entry in deck {
            *cost_by_role.entry(entry.assigned_role).or_insert(0.0) += entry.price_used;
        }

        let spells: Vec<&DeckEntry> = deck
            .iter()
            .filter(|entry| !entry.candidate.card.is_land())
            .collect();
        let mut curve = [0usize; CURVE_BUCKETS];
        for entry in &spells {
            curve[curve_bucket(entry.candidate.card.mana_value)] += 1;
        }
        let average_mana_value = mean(spells.iter().map(|e| e.candidate.card.mana_value));
        let average_synergy = mean(deck.iter().map(|e| e.candidate.synergy_score));

        Self {
            size: deck.len(),
            target_size: policy.target_size,
            total_cost: result.total_cost,
            budget: policy.total_budget,
            land_count: deck.len() - spells.len(),
            role_coverage: result
                .role_quotas
                .iter()
                .map(|quota| RoleCoverage {
                    role: quota.role,
                    current: quota.current,
                    overflow: quota.overflow,
                    minimum: quota.minimum,
                    target: quota.target,
                })
                .collect(),
            cost_by_role,
            curve,
            average_mana_value,
            average_synergy,
            replacement_count: result.replacements.len(),
            warnings: result.warning_messages(),
            cohesion: cohesion.cloned(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.size == self.target_size
    }

    pub fn budget_used(&self) -> f64 {
        if self.budget > 0.0 {
            self.total_cost / self.budget
        } else {
            0.0
        }
    }

    pub fn unmet_roles(&self) -> impl Iterator<Item = &RoleCoverage> + '_ {
        self.role_coverage
            .iter()
            .filter(|coverage| !coverage.is_satisfied())
    }
}

fn curve_bucket(mana_value: f32) -> usize {
    if !mana_value.is_finite() || mana_value <= 0.0 {
        return 0;
    }
    (mana_value.floor() as usize).min(CURVE_BUCKETS - 1)
}

fn mean<I: Iterator<Item = f32>>(values: I) -> f32 {
    let (sum, count) = values.fold((0.0f32, 0usize), |(sum, count), value| {
        (sum + value, count + 1)
    });
    if count == 0 { 0.0 } else { sum / count as f32 }
}
