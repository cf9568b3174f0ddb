use std::collections::BTreeMap;

use crate::error::PolicyError;
use crate::model::card_type::CardType;
use crate::model::role::Role;
use serde::{Deserialize, Serialize};

const DEFAULT_TARGET_SIZE: usize = 99;
const DEFAULT_POWER_LEVEL: u8 = 6;
const MINIMUM_NUMERATOR: usize = 7;
const MAXIMUM_NUMERATOR: usize = 15;
const NEUTRAL_TYPE_WEIGHT: f32 = 5.0;

/// Role counts for a 99-card deck; other sizes scale proportionally and the
/// synergy role absorbs the remainder.
const BASE_COMPOSITION: [(Role, usize); 10] = [
    (Role::Land, 37),
    (Role::Ramp, 10),
    (Role::Draw, 10),
    (Role::Removal, 8),
    (Role::BoardWipe, 3),
    (Role::Protection, 5),
    (Role::Tutor, 2),
    (Role::GraveyardRecursion, 3),
    (Role::GraveyardHate, 2),
    (Role::WinCondition, 4),
];

const DEFAULT_CRITICAL_STAPLES: [&str; 12] = [
    "Sol Ring",
    "Arcane Signet",
    "Command Tower",
    "Lightning Greaves",
    "Swiftfoot Boots",
    "Cultivate",
    "Kodama's Reach",
    "Swords to Plowshares",
    "Path to Exile",
    "Counterspell",
    "Rhystic Study",
    "Cyclonic Rift",
];

/// Per-role quantity bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTarget {
    pub target: usize,
    #[serde(default)]
    pub min: Option<usize>,
    #[serde(default)]
    pub max: Option<usize>,
}

impl RoleTarget {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            min: None,
            max: None,
        }
    }

    pub fn bounded(target: usize, min: usize, max: usize) -> Self {
        Self {
            target,
            min: Some(min),
            max: Some(max),
        }
    }

    /// Explicit minimum, or `floor(target * 0.7)`.
    pub fn minimum(&self) -> usize {
        self.min.unwrap_or(self.target * MINIMUM_NUMERATOR / 10)
    }

    /// Explicit maximum, or `ceil(target * 1.5)`.
    pub fn maximum(&self) -> usize {
        self.max.unwrap_or((self.target * MAXIMUM_NUMERATOR).div_ceil(10))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurvePreference {
    Early,
    #[default]
    Balanced,
    Late,
}

/// Mana-curve slot targets produced by the upstream curve-hint generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveTargets {
    /// Slots for mana value 0..=2.
    #[serde(default = "default_early_slots")]
    pub early_slots: usize,
    /// Slots for mana value 3..=4.
    #[serde(default = "default_mid_slots")]
    pub mid_slots: usize,
    /// Slots for mana value 5 and up.
    #[serde(default = "default_late_slots")]
    pub late_slots: usize,
    #[serde(default)]
    pub preference: CurvePreference,
}

impl Default for CurveTargets {
    fn default() -> Self {
        Self {
            early_slots: default_early_slots(),
            mid_slots: default_mid_slots(),
            late_slots: default_late_slots(),
            preference: CurvePreference::Balanced,
        }
    }
}

fn default_early_slots() -> usize {
    24
}

fn default_mid_slots() -> usize {
    22
}

fn default_late_slots() -> usize {
    12
}

/// Comparator and repair constants for assembly. The gaps were tuned
/// empirically and are kept configurable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankThresholds {
    /// Minimum synergy gap for synergy alone to decide ordering.
    #[serde(default = "default_synergy_gap")]
    pub synergy_gap: f32,
    /// Gap beyond which type-weighted synergy decides ordering.
    #[serde(default = "default_weighted_synergy_gap")]
    pub weighted_synergy_gap: f32,
    /// Price gap beyond which the cheaper in-budget card wins.
    #[serde(default = "default_price_gap")]
    pub price_gap: f64,
    /// Entries below target the budget repair loop may drop before giving up.
    #[serde(default = "default_repair_slack")]
    pub repair_slack: usize,
}

impl Default for RankThresholds {
    fn default() -> Self {
        Self {
            synergy_gap: default_synergy_gap(),
            weighted_synergy_gap: default_weighted_synergy_gap(),
            price_gap: default_price_gap(),
            repair_slack: default_repair_slack(),
        }
    }
}

fn default_synergy_gap() -> f32 {
    3.0
}

fn default_weighted_synergy_gap() -> f32 {
    1.0
}

fn default_price_gap() -> f64 {
    1.0
}

fn default_repair_slack() -> usize {
    9
}

/// Everything a generation run needs to know about the user's constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub total_budget: f64,
    pub per_item_cap: f64,
    #[serde(default = "default_prefer_cheapest")]
    pub prefer_cheapest: bool,
    #[serde(default = "default_target_size")]
    pub target_size: usize,
    /// 0..=10 per type; 0 excludes the type, absent is neutral.
    #[serde(default)]
    pub type_weights: BTreeMap<CardType, u8>,
    /// Optional ceilings on how many cards of each primary type may be picked
    /// while filling roles.
    #[serde(default)]
    pub type_targets: BTreeMap<CardType, usize>,
    /// Filled with the scaled default composition when empty.
    #[serde(default)]
    pub composition: BTreeMap<Role, RoleTarget>,
    #[serde(default = "default_power_level")]
    pub power_level_target: u8,
    #[serde(default)]
    pub curve_targets: CurveTargets,
    #[serde(default = "default_critical_staples")]
    pub critical_staples: Vec<String>,
    #[serde(default)]
    pub thresholds: RankThresholds,
}

fn default_prefer_cheapest() -> bool {
    true
}

fn default_target_size() -> usize {
    DEFAULT_TARGET_SIZE
}

fn default_power_level() -> u8 {
    DEFAULT_POWER_LEVEL
}

fn default_critical_staples() -> Vec<String> {
    DEFAULT_CRITICAL_STAPLES
        .iter()
        .map(|name| name.to_string())
        .collect()
}

impl Policy {
    /// Policy with the default composition for `target_size`.
    pub fn new(total_budget: f64, per_item_cap: f64, target_size: usize) -> Self {
        Self {
            total_budget,
            per_item_cap,
            prefer_cheapest: true,
            target_size,
            type_weights: BTreeMap::new(),
            type_targets: BTreeMap::new(),
            composition: Self::default_composition(target_size),
            power_level_target: DEFAULT_POWER_LEVEL,
            curve_targets: CurveTargets::default(),
            critical_staples: default_critical_staples(),
            thresholds: RankThresholds::default(),
        }
    }

    pub fn default_composition(target_size: usize) -> BTreeMap<Role, RoleTarget> {
        let scale = target_size as f64 / DEFAULT_TARGET_SIZE as f64;
        let mut composition = BTreeMap::new();
        let mut assigned = 0usize;
        for (role, base) in BASE_COMPOSITION {
            let target = (base as f64 * scale).round() as usize;
            assigned += target;
            composition.insert(role, RoleTarget::new(target));
        }
        composition.insert(
            Role::Synergy,
            RoleTarget::new(target_size.saturating_sub(assigned)),
        );
        composition
    }

    pub fn with_composition(mut self, composition: BTreeMap<Role, RoleTarget>) -> Self {
        self.composition = composition;
        self
    }

    pub fn role_target(&self, role: Role) -> Option<&RoleTarget> {
        self.composition.get(&role)
    }

    /// Priority multiplier for a card type: 0 when excluded, 1 when neutral,
    /// rising exponentially to 2 at weight 10.
    pub fn type_multiplier(&self, card_type: CardType) -> f32 {
        match self.type_weights.get(&card_type) {
            None => 1.0,
            Some(0) => 0.0,
            Some(weight) => 2f32.powf((f32::from(*weight) - NEUTRAL_TYPE_WEIGHT) / 5.0),
        }
    }

    pub fn is_excluded(&self, card_type: CardType) -> bool {
        self.type_weights.get(&card_type) == Some(&0)
    }

    pub fn is_critical(&self, name: &str) -> bool {
        self.critical_staples.iter().any(|staple| staple == name)
    }

    /// Fills defaults and checks every field. Only contract violations fail.
    pub fn validate(&mut self) -> Result<(), PolicyError> {
        if self.composition.is_empty() {
            self.composition = Self::default_composition(self.target_size);
        }
        self.check()
    }

    /// Validation without normalization.
    pub fn check(&self) -> Result<(), PolicyError> {
        if !self.total_budget.is_finite() || self.total_budget < 0.0 {
            return Err(PolicyError::invalid(
                "total_budget",
                "budget must be a finite, non-negative amount",
            ));
        }
        if !self.per_item_cap.is_finite() || self.per_item_cap < 0.0 {
            return Err(PolicyError::invalid(
                "per_item_cap",
                "price cap must be a finite, non-negative amount",
            ));
        }
        if self.target_size == 0 {
            return Err(PolicyError::invalid(
                "target_size",
                "deck size must be greater than zero",
            ));
        }
        if !(1..=10).contains(&self.power_level_target) {
            return Err(PolicyError::invalid(
                "power_level_target",
                format!("expected 1..=10, got {}", self.power_level_target),
            ));
        }
        if self.composition.is_empty() {
            return Err(PolicyError::invalid(
                "composition",
                "at least one role target is required",
            ));
        }
        for (card_type, weight) in &self.type_weights {
            if *weight > 10 {
                return Err(PolicyError::invalid(
                    format!("type_weights.{card_type}"),
                    format!("weight must be 0..=10, got {weight}"),
                ));
            }
        }
        for (role, bounds) in &self.composition {
            if bounds.minimum() > bounds.target || bounds.target > bounds.maximum() {
                return Err(PolicyError::invalid(
                    format!("composition.{role}"),
                    format!(
                        "bounds must satisfy min <= target <= max (got {} <= {} <= {})",
                        bounds.minimum(),
                        bounds.target,
                        bounds.maximum()
                    ),
                ));
            }
        }
        let thresholds = &self.thresholds;
        if !(thresholds.synergy_gap.is_finite() && thresholds.synergy_gap >= 0.0)
            || !(thresholds.weighted_synergy_gap.is_finite()
                && thresholds.weighted_synergy_gap >= 0.0)
            || !(thresholds.price_gap.is_finite() && thresholds.price_gap >= 0.0)
        {
            return Err(PolicyError::invalid(
                "thresholds",
                "comparator gaps must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_composition_sums_to_deck_size() {
        for size in [10usize, 40, 60, 99, 100] {
            let composition = Policy::default_composition(size);
            let total: usize = composition.values().map(|t| t.target).sum();
            assert_eq!(total, size, "size {size}");
        }
        let full = Policy::default_composition(99);
        assert_eq!(full[&Role::Land].target, 37);
        assert_eq!(full[&Role::Synergy].target, 15);
    }

    #[test]
    fn minimum_defaults_to_seventy_percent() {
        let target = RoleTarget::new(10);
        assert_eq!(target.minimum(), 7);
        assert_eq!(target.maximum(), 15);
        assert_eq!(RoleTarget::new(0).maximum(), 0);
    }

    #[test]
    fn type_multiplier_curve() {
        let mut policy = Policy::new(100.0, 10.0, 99);
        policy.type_weights.insert(CardType::Creature, 10);
        policy.type_weights.insert(CardType::Instant, 0);
        policy.type_weights.insert(CardType::Sorcery, 5);
        assert!((policy.type_multiplier(CardType::Creature) - 2.0).abs() < 1e-6);
        assert_eq!(policy.type_multiplier(CardType::Instant), 0.0);
        assert!((policy.type_multiplier(CardType::Sorcery) - 1.0).abs() < 1e-6);
        assert_eq!(policy.type_multiplier(CardType::Artifact), 1.0);
        assert!(policy.is_excluded(CardType::Instant));
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{"total_budget": 150.0, "per_item_cap": 15.0}"#;
        let mut policy: Policy = serde_json::from_str(json).unwrap();
        policy.validate().expect("valid");
        assert_eq!(policy.target_size, 99);
        assert!(policy.prefer_cheapest);
        assert_eq!(policy.power_level_target, 6);
        assert_eq!(policy.thresholds.repair_slack, 9);
        assert!(policy.is_critical("Sol Ring"));
        assert_eq!(policy.composition.len(), Role::ALL.len());
    }

    #[test]
    fn rejects_negative_budget() {
        let mut policy = Policy::new(-1.0, 10.0, 99);
        let err = policy.validate().expect_err("negative budget");
        assert_eq!(err.field(), "total_budget");
    }

    #[test]
    fn rejects_inverted_role_bounds() {
        let mut composition = BTreeMap::new();
        composition.insert(Role::Draw, RoleTarget::bounded(5, 6, 8));
        let mut policy = Policy::new(100.0, 10.0, 99).with_composition(composition);
        let err = policy.validate().expect_err("min above target");
        assert_eq!(err.field(), "composition.draw");
    }

    #[test]
    fn rejects_out_of_range_power_level() {
        let mut policy = Policy::new(100.0, 10.0, 99);
        policy.power_level_target = 11;
        assert!(policy.validate().is_err());
        policy.power_level_target = 0;
        assert!(policy.validate().is_err());
    }
}
