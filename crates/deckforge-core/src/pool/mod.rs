use std::collections::BTreeMap;

use crate::model::candidate::ScoredCandidate;
use crate::model::policy::Policy;
use crate::model::role::Role;
use serde::Serialize;
use tracing::{Level, event};

/// Candidates kept per role before weighting, as a multiple of the role maximum.
const PRESELECT_FACTOR: usize = 3;
/// Candidates kept per role after weighting.
const WEIGHTED_FACTOR: usize = 2;

/// A pool member, referencing the scored candidate by index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoolEntry {
    pub index: usize,
    pub role_score: f32,
    /// Selection priority after the type weighting pass.
    pub priority: f32,
}

/// Ranked candidates for one role. Read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RolePool {
    pub role: Role,
    pub entries: Vec<PoolEntry>,
    pub target_count: usize,
    pub min_count: usize,
    pub max_count: usize,
}

impl RolePool {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|entry| entry.index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.entries.iter().any(|entry| entry.index == index)
    }
}

/// Partitions scored candidates into per-role pools.
pub struct RolePoolBuilder<'a> {
    policy: &'a Policy,
}

impl<'a> RolePoolBuilder<'a> {
    pub fn new(policy: &'a Policy) -> Self {
        Self { policy }
    }

    pub fn build(&self, candidates: &[ScoredCandidate]) -> BTreeMap<Role, RolePool> {
        let mut pools = BTreeMap::new();
        for (role, bounds) in &self.policy.composition {
            let pool = self.build_role(
                *role,
                bounds.target,
                bounds.minimum(),
                bounds.maximum(),
                candidates,
            );
            event!(
                target: "deckforge::pools",
                Level::DEBUG,
                role = %role,
                size = pool.len(),
                target = pool.target_count,
                max = pool.max_count,
            );
            pools.insert(*role, pool);
        }
        pools
    }

    fn build_role(
        &self,
        role: Role,
        target_count: usize,
        min_count: usize,
        max_count: usize,
        candidates: &[ScoredCandidate],
    ) -> RolePool {
        let mut entries: Vec<PoolEntry> = candidates
            .iter()
            .enumerate()
            .filter(|(_, candidate)| candidate.role_score(role) > 0.0)
            .map(|(index, candidate)| PoolEntry {
                index,
                role_score: candidate.role_score(role),
                priority: candidate.selection_priority,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.role_score
                .total_cmp(&a.role_score)
                .then_with(|| {
                    candidates[b.index]
                        .total_score
                        .total_cmp(&candidates[a.index].total_score)
                })
        });
        entries.truncate(max_count * PRESELECT_FACTOR);

        for entry in &mut entries {
            let card_type = candidates[entry.index].card.primary_type();
            entry.priority *= self.policy.type_multiplier(card_type);
        }
        entries.retain(|entry| {
            !self
                .policy
                .is_excluded(candidates[entry.index].card.primary_type())
        });
        entries.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        entries.truncate(max_count * WEIGHTED_FACTOR);

        RolePool {
            role,
            entries,
            target_count,
            min_count,
            max_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::Card;
    use crate::model::card_type::CardType;
    use crate::model::policy::RoleTarget;
    use std::collections::{BTreeMap, BTreeSet};

    fn candidate(
        name: &str,
        type_line: &str,
        role: Role,
        role_score: f32,
        total: f32,
    ) -> ScoredCandidate {
        let mut role_scores = BTreeMap::new();
        role_scores.insert(role, role_score);
        let mut relevance = BTreeSet::new();
        if role_score >= Role::RELEVANCE_THRESHOLD {
            relevance.insert(role);
        }
        ScoredCandidate {
            card: Card::new(name, type_line, 2.0),
            tags: Vec::new(),
            role_scores,
            synergy_score: 0.0,
            power_score: 5.0,
            budget_score: 5.0,
            curve_score: 5.0,
            total_score: total,
            role_relevance: relevance,
            price: 1.0,
            selection_priority: total,
            is_staple: false,
            synergy_notes: Vec::new(),
        }
    }

    fn policy_with(role: Role, target: RoleTarget) -> Policy {
        let mut composition = BTreeMap::new();
        composition.insert(role, target);
        Policy::new(100.0, 10.0, 10).with_composition(composition)
    }

    #[test]
    fn pools_are_bounded_by_twice_the_maximum() {
        let policy = policy_with(Role::Draw, RoleTarget::bounded(2, 1, 2));
        let candidates: Vec<ScoredCandidate> = (0..10)
            .map(|i| candidate(&format!("Draw {i}"), "Sorcery", Role::Draw, i as f32, 5.0))
            .collect();
        let pools = RolePoolBuilder::new(&policy).build(&candidates);
        let pool = &pools[&Role::Draw];
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.entries[0].index, 9);
        assert_eq!(pool.min_count, 1);
    }

    #[test]
    fn candidates_without_the_role_are_left_out() {
        let policy = policy_with(Role::Removal, RoleTarget::new(3));
        let candidates = vec![
            candidate("Draw", "Sorcery", Role::Draw, 8.0, 5.0),
            candidate("Kill", "Instant", Role::Removal, 6.0, 5.0),
        ];
        let pools = RolePoolBuilder::new(&policy).build(&candidates);
        let indices: Vec<usize> = pools[&Role::Removal].indices().collect();
        assert_eq!(indices, vec![1]);
    }

    #[test]
    fn type_weights_reorder_and_exclude() {
        let mut policy = policy_with(Role::Removal, RoleTarget::new(4));
        policy.type_weights.insert(CardType::Creature, 10);
        policy.type_weights.insert(CardType::Sorcery, 0);
        let candidates = vec![
            candidate("Instant Kill", "Instant", Role::Removal, 9.0, 6.0),
            candidate("Creature Kill", "Creature — Elf", Role::Removal, 7.0, 4.0),
            candidate("Sorcery Kill", "Sorcery", Role::Removal, 9.0, 9.0),
        ];
        let pools = RolePoolBuilder::new(&policy).build(&candidates);
        let pool = &pools[&Role::Removal];
        let indices: Vec<usize> = pool.indices().collect();
        assert_eq!(indices, vec![1, 0]);
        assert!((pool.entries[0].priority - 8.0).abs() < 1e-5);
        // Scored candidates keep their own priority.
        assert_eq!(candidates[1].selection_priority, 4.0);
    }
}
