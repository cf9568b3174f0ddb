use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::PolicyError;
use crate::model::candidate::ScoredCandidate;
use crate::model::policy::Policy;
use crate::model::role::Role;
use crate::optimizer::dedup::dedup_candidates;
use crate::optimizer::quota::{RoleQuota, TypeQuotas, quotas_for};
use crate::optimizer::rank::rank_candidates;
use crate::optimizer::result::{
    AssemblyResult, AssemblyWarning, DeckEntry, Replacement, ReplacementReason,
};
use crate::pool::RolePool;
use tracing::{Level, event};

/// Tolerance for summed cent prices compared against the budget.
const BUDGET_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssemblyPhase {
    Init,
    FillEssential,
    FillRemainder,
    BudgetRepair,
    SizeRepair,
    Done,
}

impl AssemblyPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            AssemblyPhase::Init => "init",
            AssemblyPhase::FillEssential => "fill_essential",
            AssemblyPhase::FillRemainder => "fill_remainder",
            AssemblyPhase::BudgetRepair => "budget_repair",
            AssemblyPhase::SizeRepair => "size_repair",
            AssemblyPhase::Done => "done",
        }
    }

    pub const fn next(self) -> Option<AssemblyPhase> {
        match self {
            AssemblyPhase::Init => Some(AssemblyPhase::FillEssential),
            AssemblyPhase::FillEssential => Some(AssemblyPhase::FillRemainder),
            AssemblyPhase::FillRemainder => Some(AssemblyPhase::BudgetRepair),
            AssemblyPhase::BudgetRepair => Some(AssemblyPhase::SizeRepair),
            AssemblyPhase::SizeRepair => Some(AssemblyPhase::Done),
            AssemblyPhase::Done => None,
        }
    }
}

impl fmt::Display for AssemblyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds one deck from scored candidates and their role pools.
///
/// Construct one per request. Business-constraint conflicts (budget, quota,
/// pool size) never fail; they degrade to warnings on the result. Only a
/// malformed policy is rejected, at construction.
#[derive(Debug, Clone)]
pub struct BudgetOptimizer {
    policy: Policy,
}

impl BudgetOptimizer {
    pub fn new(policy: &Policy) -> Result<Self, PolicyError> {
        let mut policy = policy.clone();
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn assemble(
        &self,
        candidates: &[ScoredCandidate],
        pools: &BTreeMap<Role, RolePool>,
    ) -> AssemblyResult {
        let mut assembly = Assembly::new(&self.policy, candidates, pools);
        let mut phase = Some(AssemblyPhase::Init);
        while let Some(current) = phase {
            assembly.run(current);
            phase = current.next();
        }
        assembly.into_result()
    }
}

struct Assembly<'a> {
    policy: &'a Policy,
    candidates: &'a [ScoredCandidate],
    pools: &'a BTreeMap<Role, RolePool>,
    ranked: Vec<usize>,
    /// Survived dedup and not type-excluded.
    eligible: Vec<bool>,
    /// Ever placed in the deck. Never cleared, so removed cards stay out.
    used: Vec<bool>,
    /// Taken out by a repair. Blocks fungible re-entry too.
    retired: Vec<bool>,
    deck: Vec<DeckEntry>,
    /// Candidate index behind each deck entry, parallel to `deck`.
    slots: Vec<usize>,
    quotas: BTreeMap<Role, RoleQuota>,
    types: TypeQuotas,
    replacements: Vec<Replacement>,
    warnings: Vec<AssemblyWarning>,
}

impl<'a> Assembly<'a> {
    fn new(
        policy: &'a Policy,
        candidates: &'a [ScoredCandidate],
        pools: &'a BTreeMap<Role, RolePool>,
    ) -> Self {
        Self {
            policy,
            candidates,
            pools,
            ranked: Vec::new(),
            eligible: vec![false; candidates.len()],
            used: vec![false; candidates.len()],
            retired: vec![false; candidates.len()],
            deck: Vec::with_capacity(policy.target_size),
            slots: Vec::with_capacity(policy.target_size),
            quotas: quotas_for(policy),
            types: TypeQuotas::new(&policy.type_targets),
            replacements: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn run(&mut self, phase: AssemblyPhase) {
        match phase {
            AssemblyPhase::Init => self.init(),
            AssemblyPhase::FillEssential => self.fill_essential(),
            AssemblyPhase::FillRemainder => self.fill_remainder(),
            AssemblyPhase::BudgetRepair => self.budget_repair(),
            AssemblyPhase::SizeRepair => self.size_repair(),
            AssemblyPhase::Done => self.finish(),
        }
        event!(
            target: "deckforge::assembly",
            Level::DEBUG,
            phase = phase.as_str(),
            deck_size = self.deck.len(),
            total_cost = self.total_cost(),
            warnings = self.warnings.len(),
        );
    }

    fn init(&mut self) {
        let survivors: Vec<usize> = dedup_candidates(self.candidates)
            .into_iter()
            .filter(|index| {
                !self
                    .policy
                    .is_excluded(self.candidates[*index].card.primary_type())
            })
            .collect();
        for index in &survivors {
            self.eligible[*index] = true;
        }
        self.ranked = rank_candidates(self.candidates, &survivors, self.policy);
    }

    fn fill_essential(&mut self) {
        for role in Role::ESSENTIAL {
            if !self.quotas.contains_key(&role) {
                continue;
            }
            for position in 0..self.ranked.len() {
                if self.is_full() || !self.role_has_room(role, false) {
                    break;
                }
                let index = self.ranked[position];
                let candidate = &self.candidates[index];
                if !self.available(index)
                    || !candidate.is_relevant(role)
                    || !self.suits_role(index, role)
                {
                    continue;
                }
                if !self.within_cap(index) || !self.fits_budget(index) || !self.type_allows(index)
                {
                    continue;
                }
                self.admit(index, role, false);
            }
        }
    }

    fn fill_remainder(&mut self) {
        let mut abandoned: BTreeSet<Role> = BTreeSet::new();
        for position in 0..self.ranked.len() {
            if self.is_full() {
                break;
            }
            let index = self.ranked[position];
            if !self.available(index) || !self.within_cap(index) || !self.type_allows(index) {
                continue;
            }
            let Some(role) = self.open_role(index) else {
                continue;
            };
            if self.fits_budget(index) {
                self.admit(index, role, false);
                continue;
            }
            if abandoned.contains(&role) {
                continue;
            }
            match self.cheapest_fitting(role) {
                Some(alternative) => self.admit(alternative, role, false),
                None => {
                    abandoned.insert(role);
                }
            }
        }

        // Every role saturated: keep filling by rank, outside the quotas.
        for position in 0..self.ranked.len() {
            if self.is_full() {
                break;
            }
            let index = self.ranked[position];
            if !self.available(index) || !self.within_cap(index) || !self.fits_budget(index) {
                continue;
            }
            self.admit_anywhere(index);
        }
    }

    fn budget_repair(&mut self) {
        let floor = self
            .policy
            .target_size
            .saturating_sub(self.policy.thresholds.repair_slack);
        while self.over_budget() && self.deck.len() > floor {
            let Some(position) = self.repair_target() else {
                break;
            };
            let role = self.deck[position].assigned_role;
            let price = self.deck[position].price_used;
            match self.cheaper_alternative(role, price) {
                Some(alternative) => {
                    self.replace_at(position, alternative, ReplacementReason::BudgetRepair)
                }
                None => {
                    let was_short = self.quotas.get(&role).is_some_and(RoleQuota::is_short);
                    let entry = self.remove_at(position);
                    self.warn(AssemblyWarning::EntryRemoved {
                        name: entry.name().to_string(),
                        role,
                        price,
                    });
                    if !entry.overflow && !was_short {
                        if let Some(quota) = self.quotas.get(&role).filter(|q| q.is_short()) {
                            let warning = AssemblyWarning::QuotaFloorBreached {
                                role,
                                current: quota.current,
                                minimum: quota.minimum,
                            };
                            self.warn(warning);
                        }
                    }
                }
            }
        }
        if self.over_budget() {
            self.warn(AssemblyWarning::OverBudget {
                total_cost: self.total_cost(),
                budget: self.policy.total_budget,
            });
        }
    }

    fn size_repair(&mut self) {
        let cap = self.policy.per_item_cap;
        while !self.is_full() {
            let remaining = self.remaining_budget();
            if let Some(index) =
                self.cheapest_unused(|c| c.price <= cap && c.price <= remaining + BUDGET_EPSILON)
            {
                self.admit_anywhere(index);
                continue;
            }

            if let Some(index) = self.cheapest_unused(|c| c.price <= cap) {
                let incoming = self.candidates[index].price;
                let needed = incoming - remaining;
                let swap = self.most_expensive(|entry| {
                    entry.price_used > needed && entry.price_used > incoming
                });
                if let Some(position) = swap {
                    self.replace_at(position, index, ReplacementReason::SizeRepair);
                    continue;
                }
            }

            if let Some(index) = self.cheapest_unused(|_| true) {
                self.admit_anywhere(index);
                let candidate = &self.candidates[index];
                if candidate.price > cap {
                    self.warn(AssemblyWarning::ForcedOverCap {
                        name: candidate.name().to_string(),
                        price: candidate.price,
                        cap,
                    });
                }
                if candidate.price > remaining + BUDGET_EPSILON {
                    self.warn(AssemblyWarning::ForcedOverBudget {
                        name: candidate.name().to_string(),
                        price: candidate.price,
                    });
                }
                continue;
            }

            self.warn(AssemblyWarning::PoolExhausted {
                missing: self.policy.target_size - self.deck.len(),
            });
            break;
        }
    }

    fn finish(&mut self) {
        let shortfalls: Vec<AssemblyWarning> = self
            .quotas
            .values()
            .filter(|quota| quota.is_short())
            .map(|quota| AssemblyWarning::RoleShortfall {
                role: quota.role,
                current: quota.current,
                minimum: quota.minimum,
                target: quota.target,
            })
            .collect();
        for warning in shortfalls {
            self.warn(warning);
        }
        if self.deck.len() != self.policy.target_size {
            self.warn(AssemblyWarning::SizeMismatch {
                expected: self.policy.target_size,
                actual: self.deck.len(),
            });
        }
        event!(
            target: "deckforge::assembly",
            Level::INFO,
            deck_size = self.deck.len(),
            target_size = self.policy.target_size,
            total_cost = self.total_cost(),
            budget = self.policy.total_budget,
            replacements = self.replacements.len(),
            warnings = self.warnings.len(),
            "assembly complete"
        );
    }

    fn into_result(self) -> AssemblyResult {
        let total_cost = self.total_cost();
        AssemblyResult {
            final_deck: self.deck,
            total_cost,
            replacements: self.replacements,
            warnings: self.warnings,
            role_quotas: self.quotas.into_values().collect(),
        }
    }

    fn total_cost(&self) -> f64 {
        self.deck.iter().map(|entry| entry.price_used).sum()
    }

    fn remaining_budget(&self) -> f64 {
        self.policy.total_budget - self.total_cost()
    }

    fn over_budget(&self) -> bool {
        self.total_cost() > self.policy.total_budget + BUDGET_EPSILON
    }

    fn is_full(&self) -> bool {
        self.deck.len() >= self.policy.target_size
    }

    fn available(&self, index: usize) -> bool {
        self.eligible[index]
            && !self.retired[index]
            && (!self.used[index] || self.candidates[index].is_fungible())
    }

    fn within_cap(&self, index: usize) -> bool {
        self.candidates[index].price <= self.policy.per_item_cap
    }

    fn fits_budget(&self, index: usize) -> bool {
        self.total_cost() + self.candidates[index].price
            <= self.policy.total_budget + BUDGET_EPSILON
    }

    fn is_critical(&self, index: usize) -> bool {
        self.policy.is_critical(self.candidates[index].name())
    }

    fn type_allows(&self, index: usize) -> bool {
        let card_type = self.candidates[index].card.primary_type();
        self.types.allows(card_type, self.is_critical(index))
    }

    fn role_has_room(&self, role: Role, critical: bool) -> bool {
        self.quotas
            .get(&role)
            .is_some_and(|quota| quota.has_room(critical))
    }

    /// Lands only fill the land role, and the land role only takes lands.
    fn suits_role(&self, index: usize, role: Role) -> bool {
        self.candidates[index].card.is_land() == (role == Role::Land)
    }

    /// Whether `index` can stand in for an entry assigned to `role`.
    fn fills_role(&self, index: usize, role: Role) -> bool {
        let candidate = &self.candidates[index];
        match role {
            Role::Land => candidate.card.is_land(),
            other => !candidate.card.is_land() && candidate.role_score(other) > 0.0,
        }
    }

    /// Strongest role with room left, falling back to synergy filler.
    fn open_role(&self, index: usize) -> Option<Role> {
        let candidate = &self.candidates[index];
        let critical = self.is_critical(index);
        if candidate.card.is_land() {
            return self
                .role_has_room(Role::Land, critical)
                .then_some(Role::Land);
        }
        let mut scored: Vec<(Role, f32)> = candidate
            .role_scores
            .iter()
            .filter(|(role, score)| **role != Role::Land && **score > 0.0)
            .map(|(role, score)| (*role, *score))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
            .into_iter()
            .map(|(role, _)| role)
            .find(|role| self.role_has_room(*role, critical))
            .or_else(|| {
                self.role_has_room(Role::Synergy, critical)
                    .then_some(Role::Synergy)
            })
    }

    fn fallback_role(&self, index: usize) -> Role {
        let candidate = &self.candidates[index];
        if candidate.card.is_land() {
            Role::Land
        } else {
            match candidate.best_role() {
                (Role::Land, _) => Role::Synergy,
                (role, _) => role,
            }
        }
    }

    fn pool_indices(&self, role: Role) -> Vec<usize> {
        self.pools
            .get(&role)
            .map(|pool| pool.indices().collect())
            .unwrap_or_default()
    }

    fn cheapest_fitting(&self, role: Role) -> Option<usize> {
        self.pool_indices(role)
            .into_iter()
            .filter(|index| {
                self.available(*index)
                    && self.suits_role(*index, role)
                    && self.within_cap(*index)
                    && self.fits_budget(*index)
                    && self.type_allows(*index)
            })
            .min_by(|a, b| self.candidates[*a].price.total_cmp(&self.candidates[*b].price))
    }

    fn cheaper_alternative(&self, role: Role, below: f64) -> Option<usize> {
        self.pool_indices(role)
            .into_iter()
            .chain(
                self.ranked
                    .iter()
                    .copied()
                    .filter(|index| self.fills_role(*index, role)),
            )
            .filter(|index| {
                self.available(*index)
                    && self.suits_role(*index, role)
                    && self.within_cap(*index)
                    && self.candidates[*index].price < below
            })
            .min_by(|a, b| self.candidates[*a].price.total_cmp(&self.candidates[*b].price))
    }

    fn cheapest_unused<F>(&self, accept: F) -> Option<usize>
    where
        F: Fn(&ScoredCandidate) -> bool,
    {
        self.ranked
            .iter()
            .copied()
            .filter(|index| self.available(*index) && accept(&self.candidates[*index]))
            .min_by(|a, b| self.candidates[*a].price.total_cmp(&self.candidates[*b].price))
    }

    /// Position of the priciest entry matching `accept`; the earliest wins ties.
    fn most_expensive<F>(&self, accept: F) -> Option<usize>
    where
        F: Fn(&DeckEntry) -> bool,
    {
        let mut best: Option<(usize, f64)> = None;
        for (position, entry) in self.deck.iter().enumerate() {
            if !accept(entry) {
                continue;
            }
            if best.is_none_or(|(_, price)| entry.price_used > price) {
                best = Some((position, entry.price_used));
            }
        }
        best.map(|(position, _)| position)
    }

    fn repair_target(&self) -> Option<usize> {
        self.most_expensive(|entry| {
            entry.price_used > 0.0
                && (entry.overflow
                    || self
                        .quotas
                        .get(&entry.assigned_role)
                        .is_none_or(RoleQuota::can_release))
        })
        .or_else(|| self.most_expensive(|entry| entry.price_used > 0.0))
    }

    fn admit_anywhere(&mut self, index: usize) {
        match self.open_role(index) {
            Some(role) => self.admit(index, role, false),
            None => {
                let role = self.fallback_role(index);
                self.admit(index, role, true);
            }
        }
    }

    fn admit(&mut self, index: usize, role: Role, overflow: bool) {
        let candidates = self.candidates;
        let candidate = &candidates[index];
        let overflow = self.claim(index, role, overflow);
        self.types.add(candidate.card.primary_type());
        event!(
            target: "deckforge::assembly",
            Level::TRACE,
            card = candidate.name(),
            role = role.as_str(),
            price = candidate.price,
            overflow,
        );
        self.deck.push(entry_for(candidate, role, overflow));
        self.slots.push(index);
    }

    /// Marks `index` used and counts it against `role`. Returns the effective overflow flag.
    fn claim(&mut self, index: usize, role: Role, overflow: bool) -> bool {
        let overflow = overflow || !self.quotas.contains_key(&role);
        self.used[index] = true;
        if let Some(quota) = self.quotas.get_mut(&role) {
            quota.admit(self.candidates[index].name(), overflow);
        }
        overflow
    }

    fn remove_at(&mut self, position: usize) -> DeckEntry {
        let entry = self.deck.remove(position);
        let index = self.slots.remove(position);
        self.retired[index] = true;
        if let Some(quota) = self.quotas.get_mut(&entry.assigned_role) {
            quota.release(entry.name(), entry.overflow);
        }
        self.types.remove(entry.candidate.card.primary_type());
        entry
    }

    /// Swaps the entry at `position` for candidate `index`. The newcomer keeps
    /// the outgoing slot when it can fill that role, otherwise it is seated
    /// like any other addition.
    fn replace_at(&mut self, position: usize, index: usize, reason: ReplacementReason) {
        let candidates = self.candidates;
        let candidate = &candidates[index];
        let vacated = self.deck[position].assigned_role;
        let outgoing = std::mem::replace(&mut self.slots[position], index);
        self.retired[outgoing] = true;

        let (role, overflow) = if self.fills_role(index, vacated) {
            self.used[index] = true;
            if let Some(quota) = self.quotas.get_mut(&vacated) {
                quota.rename(candidates[outgoing].name(), candidate.name());
            }
            (vacated, self.deck[position].overflow)
        } else {
            let previous = &self.deck[position];
            if let Some(quota) = self.quotas.get_mut(&vacated) {
                quota.release(previous.name(), previous.overflow);
            }
            let (role, overflow) = match self.open_role(index) {
                Some(role) => (role, false),
                None => (self.fallback_role(index), true),
            };
            (role, self.claim(index, role, overflow))
        };

        let removed = std::mem::replace(
            &mut self.deck[position],
            entry_for(candidate, role, overflow),
        );
        self.types.remove(removed.candidate.card.primary_type());
        self.types.add(candidate.card.primary_type());
        event!(
            target: "deckforge::assembly",
            Level::DEBUG,
            removed = removed.name(),
            added = candidate.name(),
            vacated = vacated.as_str(),
            role = role.as_str(),
            reason = reason.as_str(),
        );
        self.replacements.push(Replacement {
            removed: removed.name().to_string(),
            added: candidate.name().to_string(),
            reason,
            role: vacated,
            saved: removed.price_used - candidate.price,
        });
    }

    fn warn(&mut self, warning: AssemblyWarning) {
        event!(
            target: "deckforge::assembly",
            Level::WARN,
            kind = warning.kind(),
            "{warning}"
        );
        self.warnings.push(warning);
    }
}

fn entry_for(candidate: &ScoredCandidate, role: Role, overflow: bool) -> DeckEntry {
    let synergy_note = if candidate.synergy_notes.is_empty() {
        format!("fills {role}")
    } else {
        candidate.synergy_notes.join("; ")
    };
    DeckEntry {
        candidate: candidate.clone(),
        assigned_role: role,
        price_used: candidate.price,
        synergy_note,
        overflow,
    }
}
