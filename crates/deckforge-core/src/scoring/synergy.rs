use std::collections::BTreeMap;

use crate::error::RuleTableError;
use crate::model::profile::{AnchorProfile, normalize};
use crate::model::tag::MechanicTag;
use serde::{Deserialize, Serialize};

const BUILTIN_RULES: &str = include_str!("../../data/synergy_rules.json");
const LITERAL_MATCH_FACTOR: f32 = 2.0;

/// One declarative anchor/candidate synergy rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyRule {
    pub required_anchor_tags: Vec<String>,
    pub candidate_tag: String,
    pub score: f32,
    #[serde(default)]
    pub description: String,
}

impl SynergyRule {
    fn fires_for(&self, profile: &AnchorProfile) -> bool {
        self.required_anchor_tags
            .iter()
            .any(|tag| profile.has_tag(tag))
    }
}

/// Size tier of a creature type's card pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TribeTier {
    Common,
    Uncommon,
    Rare,
    Mythic,
}

impl TribeTier {
    pub const ALL: [TribeTier; 4] = [
        TribeTier::Common,
        TribeTier::Uncommon,
        TribeTier::Rare,
        TribeTier::Mythic,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBonus {
    pub base_bonus: f32,
    /// Added when the profile flags the tribe both ways.
    pub double_bonus: f32,
    /// Minimum type-tag priority for the full base bonus; below it the base is halved.
    pub threshold: u8,
}

/// Declarative synergy data: rules, tribe tiers and tier bonuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub rules: Vec<SynergyRule>,
    #[serde(default)]
    pub tribes: BTreeMap<String, TribeTier>,
    pub tiers: BTreeMap<TribeTier, TierBonus>,
    #[serde(default = "default_tier")]
    pub default_tier: TribeTier,
}

fn default_tier() -> TribeTier {
    TribeTier::Uncommon
}

impl RuleTable {
    /// The rule table shipped with the crate.
    pub fn builtin() -> Result<Self, RuleTableError> {
        Self::from_json(BUILTIN_RULES)
    }

    pub fn from_json(raw: &str) -> Result<Self, RuleTableError> {
        let mut table: RuleTable = serde_json::from_str(raw)?;
        table.normalize();
        table.validate()?;
        Ok(table)
    }

    fn normalize(&mut self) {
        for rule in &mut self.rules {
            rule.candidate_tag = normalize(&rule.candidate_tag);
            for tag in &mut rule.required_anchor_tags {
                *tag = normalize(tag);
            }
        }
        self.tribes = std::mem::take(&mut self.tribes)
            .into_iter()
            .map(|(tribe, tier)| (normalize(&tribe), tier))
            .collect();
    }

    fn validate(&self) -> Result<(), RuleTableError> {
        for (index, rule) in self.rules.iter().enumerate() {
            let message = if rule.required_anchor_tags.is_empty() {
                Some("rule needs at least one anchor tag")
            } else if rule.candidate_tag.is_empty() {
                Some("candidate tag must not be empty")
            } else if !rule.score.is_finite() {
                Some("score must be finite")
            } else {
                None
            };
            if let Some(message) = message {
                return Err(RuleTableError::Invalid {
                    index,
                    message: message.to_string(),
                });
            }
        }
        for tier in TribeTier::ALL {
            let Some(bonus) = self.tiers.get(&tier) else {
                return Err(RuleTableError::Invalid {
                    index: self.rules.len(),
                    message: format!("missing bonus for tribe tier {tier:?}"),
                });
            };
            if !(bonus.base_bonus.is_finite() && bonus.double_bonus.is_finite()) {
                return Err(RuleTableError::Invalid {
                    index: self.rules.len(),
                    message: format!("non-finite bonus for tribe tier {tier:?}"),
                });
            }
        }
        Ok(())
    }

    pub fn tier_of(&self, tribe: &str) -> TribeTier {
        self.tribes
            .get(tribe)
            .copied()
            .unwrap_or(self.default_tier)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiredRule {
    pub index: usize,
    pub contribution: f32,
}

/// Components of a synergy score, kept apart for explanations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynergyBreakdown {
    pub rules: f32,
    pub tribal: f32,
    pub baseline: f32,
    pub fired: Vec<FiredRule>,
}

impl SynergyBreakdown {
    pub fn total(&self) -> f32 {
        self.rules + self.tribal + self.baseline
    }
}

/// Interprets a [`RuleTable`] against an anchor profile and a candidate's tags.
#[derive(Debug, Clone, Copy)]
pub struct TagSynergyScorer<'a> {
    table: &'a RuleTable,
}

impl<'a> TagSynergyScorer<'a> {
    pub fn new(table: &'a RuleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a RuleTable {
        self.table
    }

    /// Signed, unbounded synergy contribution.
    pub fn score(&self, profile: &AnchorProfile, tags: &[MechanicTag]) -> f32 {
        self.breakdown(profile, tags).total()
    }

    pub fn breakdown(&self, profile: &AnchorProfile, tags: &[MechanicTag]) -> SynergyBreakdown {
        let mut breakdown = SynergyBreakdown::default();

        // Every matching rule fires; overlapping rules all contribute.
        for (index, rule) in self.table.rules.iter().enumerate() {
            if !rule.fires_for(profile) {
                continue;
            }
            let Some(tag) = tags.iter().find(|tag| tag.name == rule.candidate_tag) else {
                continue;
            };
            let contribution = rule.score * tag.synergy_weight;
            breakdown.rules += contribution;
            breakdown.fired.push(FiredRule {
                index,
                contribution,
            });
        }
        breakdown.fired.sort_by(|a, b| {
            b.contribution
                .abs()
                .total_cmp(&a.contribution.abs())
                .then(a.index.cmp(&b.index))
        });

        breakdown.tribal = self.tribal_bonus(profile, tags);

        for tag in tags {
            let weight = f32::from(tag.priority) * tag.synergy_weight;
            if profile.has_tag(&tag.name) {
                breakdown.baseline += LITERAL_MATCH_FACTOR * weight;
            } else if profile.has_strategy(&tag.category) {
                breakdown.baseline += weight;
            }
        }

        breakdown
    }

    fn tribal_bonus(&self, profile: &AnchorProfile, tags: &[MechanicTag]) -> f32 {
        let mut bonus = 0.0;
        for tribe in profile.tribes() {
            let type_tag = format!("type_{tribe}");
            let Some(tag) = tags.iter().find(|tag| tag.name == type_tag) else {
                continue;
            };
            let tier = self.table.tier_of(&tribe);
            let Some(tier_bonus) = self.table.tiers.get(&tier) else {
                continue;
            };
            let base = if tag.priority >= tier_bonus.threshold {
                tier_bonus.base_bonus
            } else {
                tier_bonus.base_bonus * 0.5
            };
            bonus += base;
            if profile.tribe_flag_count(&tribe) >= 2 {
                bonus += tier_bonus.double_bonus;
            }
        }
        bonus
    }

    /// Descriptions of the strongest fired rules.
    pub fn notes(&self, breakdown: &SynergyBreakdown, limit: usize) -> Vec<String> {
        breakdown
            .fired
            .iter()
            .take(limit)
            .filter_map(|fired| self.table.rules.get(fired.index))
            .map(|rule| {
                if rule.description.is_empty() {
                    format!("{} synergy", rule.candidate_tag)
                } else {
                    rule.description.clone()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_TABLE: &str = r#"{
        "rules": [
            {"required_anchor_tags": ["tokens", "go_wide"], "candidate_tag": "token_generation", "score": 3.0, "description": "makes tokens"},
            {"required_anchor_tags": ["tokens"], "candidate_tag": "token_generation", "score": 1.0, "description": "more tokens"},
            {"required_anchor_tags": ["tribal_elf"], "candidate_tag": "goblin_payoff", "score": -4.0, "description": "wrong tribe"}
        ],
        "tribes": {"elf": "common", "Sliver": "mythic"},
        "tiers": {
            "common": {"base_bonus": 1.0, "double_bonus": 0.5, "threshold": 3},
            "uncommon": {"base_bonus": 1.5, "double_bonus": 0.75, "threshold": 3},
            "rare": {"base_bonus": 2.5, "double_bonus": 1.25, "threshold": 2},
            "mythic": {"base_bonus": 3.5, "double_bonus": 1.75, "threshold": 1}
        }
    }"#;

    fn table() -> RuleTable {
        RuleTable::from_json(SMALL_TABLE).expect("valid table")
    }

    #[test]
    fn builtin_table_loads() {
        let table = RuleTable::builtin().expect("builtin table parses");
        assert!(!table.is_empty());
        assert!(table.rules.iter().any(|rule| rule.score < 0.0));
    }

    #[test]
    fn overlapping_rules_all_fire() {
        let table = table();
        let scorer = TagSynergyScorer::new(&table);
        let profile = AnchorProfile::from_tags(["tokens"], Vec::<&str>::new());
        let tags = vec![MechanicTag::new("token_generation", "tokens", 4).weighted(2.0)];
        let breakdown = scorer.breakdown(&profile, &tags);
        assert_eq!(breakdown.fired.len(), 2);
        assert!((breakdown.rules - 8.0).abs() < 1e-6);
        assert_eq!(scorer.notes(&breakdown, 1), vec!["makes tokens".to_string()]);
    }

    #[test]
    fn anti_synergy_can_go_negative() {
        let table = table();
        let scorer = TagSynergyScorer::new(&table);
        let profile = AnchorProfile::from_tags(["tribal_elf"], Vec::<&str>::new());
        let tags = vec![MechanicTag::new("goblin_payoff", "tribal", 2)];
        assert!(scorer.score(&profile, &tags) < 0.0);
    }

    #[test]
    fn tribal_bonus_scales_with_tier_and_flags() {
        let table = table();
        let scorer = TagSynergyScorer::new(&table);
        let single = AnchorProfile::from_tags(["elf_matters"], Vec::<&str>::new());
        let double = AnchorProfile::from_tags(["elf_matters", "tribal_elf"], Vec::<&str>::new());
        let elf = vec![MechanicTag::creature_type("elf")];
        assert!((scorer.breakdown(&single, &elf).tribal - 1.0).abs() < 1e-6);
        assert!((scorer.breakdown(&double, &elf).tribal - 1.5).abs() < 1e-6);

        let slivers = AnchorProfile::from_tags(["sliver_matters"], Vec::<&str>::new());
        let sliver = vec![MechanicTag::creature_type("sliver")];
        assert!((scorer.breakdown(&slivers, &sliver).tribal - 3.5).abs() < 1e-6);
    }

    #[test]
    fn low_priority_type_tag_halves_base_bonus() {
        let table = table();
        let scorer = TagSynergyScorer::new(&table);
        let profile = AnchorProfile::from_tags(["elf_matters"], Vec::<&str>::new());
        let weak = vec![MechanicTag::new("type_elf", "tribal", 2)];
        assert!((scorer.breakdown(&profile, &weak).tribal - 0.5).abs() < 1e-6);
    }

    #[test]
    fn baseline_prefers_literal_over_category_match() {
        let table = table();
        let scorer = TagSynergyScorer::new(&table);
        let profile = AnchorProfile::from_tags(["counters"], ["lifegain"]);
        let tags = vec![
            MechanicTag::new("counters", "lifegain", 3),
            MechanicTag::new("soul_sisters", "lifegain", 2).weighted(0.5),
        ];
        let breakdown = scorer.breakdown(&profile, &tags);
        assert!((breakdown.baseline - (6.0 + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn rule_order_does_not_change_total() {
        let mut reversed = table();
        reversed.rules.reverse();
        let original = table();
        let profile = AnchorProfile::from_tags(["tokens", "tribal_elf"], ["tokens"]);
        let tags = vec![
            MechanicTag::new("token_generation", "tokens", 5),
            MechanicTag::new("goblin_payoff", "tribal", 2),
        ];
        let a = TagSynergyScorer::new(&original).score(&profile, &tags);
        let b = TagSynergyScorer::new(&reversed).score(&profile, &tags);
        assert!((a - b).abs() < 1e-5);
    }

    #[test]
    fn rejects_rule_without_anchor_tags() {
        let raw = SMALL_TABLE.replace(r#"["tribal_elf"]"#, "[]");
        let err = RuleTable::from_json(&raw).expect_err("empty anchor tags");
        assert!(matches!(err, RuleTableError::Invalid { index: 2, .. }));
    }

    #[test]
    fn unknown_tribes_use_default_tier() {
        let table = table();
        assert_eq!(table.tier_of("sliver"), TribeTier::Mythic);
        assert_eq!(table.tier_of("dinosaur"), TribeTier::Uncommon);
    }
}
