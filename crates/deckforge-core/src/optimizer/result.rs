use std::fmt;

use crate::model::candidate::ScoredCandidate;
use crate::model::role::Role;
use crate::optimizer::quota::RoleQuota;
use serde::{Deserialize, Serialize};

/// One selected card and why it was selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub candidate: ScoredCandidate,
    pub assigned_role: Role,
    pub price_used: f64,
    pub synergy_note: String,
    /// Admitted after every role quota was saturated.
    #[serde(default)]
    pub overflow: bool,
}

impl DeckEntry {
    pub fn name(&self) -> &str {
        self.candidate.name()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementReason {
    BudgetRepair,
    SizeRepair,
}

impl ReplacementReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReplacementReason::BudgetRepair => "budget_repair",
            ReplacementReason::SizeRepair => "size_repair",
        }
    }
}

impl fmt::Display for ReplacementReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    pub removed: String,
    pub added: String,
    pub reason: ReplacementReason,
    pub role: Role,
    /// Price of the removed card minus price of the added card.
    pub saved: f64,
}

/// Soft failures recorded during assembly. A run always yields a deck; these
/// say how it falls short.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssemblyWarning {
    RoleShortfall {
        role: Role,
        current: usize,
        minimum: usize,
        target: usize,
    },
    OverBudget {
        total_cost: f64,
        budget: f64,
    },
    EntryRemoved {
        name: String,
        role: Role,
        price: f64,
    },
    QuotaFloorBreached {
        role: Role,
        current: usize,
        minimum: usize,
    },
    ForcedOverBudget {
        name: String,
        price: f64,
    },
    ForcedOverCap {
        name: String,
        price: f64,
        cap: f64,
    },
    PoolExhausted {
        missing: usize,
    },
    SizeMismatch {
        expected: usize,
        actual: usize,
    },
}

impl AssemblyWarning {
    pub const fn kind(&self) -> &'static str {
        match self {
            AssemblyWarning::RoleShortfall { .. } => "role_shortfall",
            AssemblyWarning::OverBudget { .. } => "over_budget",
            AssemblyWarning::EntryRemoved { .. } => "entry_removed",
            AssemblyWarning::QuotaFloorBreached { .. } => "quota_floor_breached",
            AssemblyWarning::ForcedOverBudget { .. } => "forced_over_budget",
            AssemblyWarning::ForcedOverCap { .. } => "forced_over_cap",
            AssemblyWarning::PoolExhausted { .. } => "pool_exhausted",
            AssemblyWarning::SizeMismatch { .. } => "size_mismatch",
        }
    }

    /// Size problems make the deck unusable as-is.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            AssemblyWarning::SizeMismatch { .. } | AssemblyWarning::PoolExhausted { .. }
        )
    }
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyWarning::RoleShortfall {
                role,
                current,
                minimum,
                target,
            } => write!(
                f,
                "{role}: {current} selected, below minimum {minimum} (target {target})"
            ),
            AssemblyWarning::OverBudget { total_cost, budget } => write!(
                f,
                "total cost ${total_cost:.2} exceeds budget ${budget:.2}"
            ),
            AssemblyWarning::EntryRemoved { name, role, price } => write!(
                f,
                "removed {name} (${price:.2}, {role}) to recover budget"
            ),
            AssemblyWarning::QuotaFloorBreached {
                role,
                current,
                minimum,
            } => write!(
                f,
                "{role} dropped to {current}, below minimum {minimum}, during budget repair"
            ),
            AssemblyWarning::ForcedOverBudget { name, price } => write!(
                f,
                "added {name} (${price:.2}) over budget to reach deck size"
            ),
            AssemblyWarning::ForcedOverCap { name, price, cap } => write!(
                f,
                "added {name} (${price:.2}) above the ${cap:.2} per-card cap to reach deck size"
            ),
            AssemblyWarning::PoolExhausted { missing } => write!(
                f,
                "CRITICAL: candidate pool exhausted, {missing} card(s) short"
            ),
            AssemblyWarning::SizeMismatch { expected, actual } => write!(
                f,
                "CRITICAL: deck has {actual} cards, expected {expected}"
            ),
        }
    }
}

/// Outcome of one assembly run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyResult {
    pub final_deck: Vec<DeckEntry>,
    /// Always the exact sum of `price_used` over `final_deck`.
    pub total_cost: f64,
    pub replacements: Vec<Replacement>,
    pub warnings: Vec<AssemblyWarning>,
    pub role_quotas: Vec<RoleQuota>,
}

impl AssemblyResult {
    pub fn len(&self) -> usize {
        self.final_deck.len()
    }

    pub fn is_empty(&self) -> bool {
        self.final_deck.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.final_deck.iter().map(DeckEntry::name)
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    pub fn has_warning(&self, kind: &str) -> bool {
        self.warnings.iter().any(|warning| warning.kind() == kind)
    }

    pub fn quota(&self, role: Role) -> Option<&RoleQuota> {
        self.role_quotas.iter().find(|quota| quota.role == role)
    }
}
