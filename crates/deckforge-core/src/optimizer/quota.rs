use std::collections::BTreeMap;

use crate::model::card_type::CardType;
use crate::model::policy::Policy;
use crate::model::role::Role;
use serde::{Deserialize, Serialize};

/// Per-role accounting during assembly.
///
/// `current` counts entries admitted while the role had room and never
/// exceeds `target` (plus one for a critical staple). Entries admitted once
/// every role was saturated are tracked in `overflow` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleQuota {
    pub role: Role,
    pub target: usize,
    pub minimum: usize,
    pub current: usize,
    pub overflow: usize,
    pub members: Vec<String>,
}

impl RoleQuota {
    pub fn new(role: Role, target: usize, minimum: usize) -> Self {
        Self {
            role,
            target,
            minimum,
            current: 0,
            overflow: 0,
            members: Vec::new(),
        }
    }

    pub fn has_room(&self, critical: bool) -> bool {
        self.current < self.target || (critical && self.current < self.target + 1)
    }

    pub fn is_short(&self) -> bool {
        self.current < self.minimum
    }

    /// Whether one counted member can leave without breaching the minimum.
    pub fn can_release(&self) -> bool {
        self.current > self.minimum
    }

    pub fn admit(&mut self, name: &str, overflow: bool) {
        if overflow {
            self.overflow += 1;
        } else {
            self.current += 1;
        }
        self.members.push(name.to_string());
    }

    pub fn release(&mut self, name: &str, overflow: bool) {
        if overflow {
            self.overflow = self.overflow.saturating_sub(1);
        } else {
            self.current = self.current.saturating_sub(1);
        }
        if let Some(position) = self.members.iter().position(|member| member == name) {
            self.members.remove(position);
        }
    }

    /// Swaps one member for another without touching the counts.
    pub fn rename(&mut self, removed: &str, added: &str) {
        if let Some(member) = self.members.iter_mut().find(|member| *member == removed) {
            *member = added.to_string();
        }
    }
}

/// Builds one quota per composition role.
pub fn quotas_for(policy: &Policy) -> BTreeMap<Role, RoleQuota> {
    policy
        .composition
        .iter()
        .map(|(role, bounds)| (*role, RoleQuota::new(*role, bounds.target, bounds.minimum())))
        .collect()
}

/// Optional per-type ceilings, counted by primary type.
#[derive(Debug, Clone, Default)]
pub struct TypeQuotas {
    limits: BTreeMap<CardType, usize>,
    counts: BTreeMap<CardType, usize>,
}

impl TypeQuotas {
    pub fn new(limits: &BTreeMap<CardType, usize>) -> Self {
        Self {
            limits: limits.clone(),
            counts: BTreeMap::new(),
        }
    }

    pub fn count(&self, card_type: CardType) -> usize {
        self.counts.get(&card_type).copied().unwrap_or(0)
    }

    /// Critical staples may exceed a type ceiling by one.
    pub fn allows(&self, card_type: CardType, critical: bool) -> bool {
        match self.limits.get(&card_type) {
            None => true,
            Some(limit) => {
                let count = self.count(card_type);
                count < *limit || (critical && count < limit + 1)
            }
        }
    }

    pub fn add(&mut self, card_type: CardType) {
        *self.counts.entry(card_type).or_insert(0) += 1;
    }

    pub fn remove(&mut self, card_type: CardType) {
        if let Some(count) = self.counts.get_mut(&card_type) {
            *count = count.saturating_sub(1);
        }
    }
}
