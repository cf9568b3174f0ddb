use std::collections::{BTreeMap, BTreeSet};

use super::staples::is_known_staple;
use super::synergy::{RuleTable, TagSynergyScorer};
use super::weights::ScoreWeights;
use crate::model::candidate::ScoredCandidate;
use crate::model::card::Card;
use crate::model::policy::{CurvePreference, CurveTargets, Policy};
use crate::model::profile::AnchorProfile;
use crate::model::role::Role;
use crate::model::tag::MechanicTag;
use tracing::{Level, event};

const MAX_SUBSCORE: f32 = 10.0;
const BASELINE_SUBSCORE: f32 = 5.0;
/// Raw tag synergy is divided by this before bonuses are added.
const SYNERGY_SCALE: f32 = 4.0;
const TAG_CATEGORY_ROLE_POINTS: f32 = 4.0;
const PROFILE_OVERLAP_POINTS: f32 = 3.0;
const LATE_SCARCITY_SLOTS: usize = 8;
const SYNERGY_NOTE_LIMIT: usize = 2;

/// Keyword rule: a phrase in rules text worth points towards one role.
struct KeywordRule {
    role: Role,
    phrase: &'static str,
    points: f32,
}

const fn rule(role: Role, phrase: &'static str, points: f32) -> KeywordRule {
    KeywordRule {
        role,
        phrase,
        points,
    }
}

const KEYWORD_RULES: [KeywordRule; 44] = [
    rule(Role::Ramp, "add {", 5.0),
    rule(Role::Ramp, "add one mana", 5.0),
    rule(Role::Ramp, "additional land", 4.0),
    rule(Role::Ramp, "put a land card", 4.0),
    rule(Role::Ramp, "treasure token", 3.0),
    rule(Role::Draw, "draw a card", 5.0),
    rule(Role::Draw, "draw two cards", 6.0),
    rule(Role::Draw, "draw three cards", 7.0),
    rule(Role::Draw, "draws a card", 3.0),
    rule(Role::Draw, "draw cards equal", 7.0),
    rule(Role::Draw, "investigate", 3.0),
    rule(Role::Draw, "scry", 1.0),
    rule(Role::Removal, "destroy target", 6.0),
    rule(Role::Removal, "exile target creature", 6.0),
    rule(Role::Removal, "exile target nonland permanent", 7.0),
    rule(Role::Removal, "damage to any target", 5.0),
    rule(Role::Removal, "damage to target creature", 5.0),
    rule(Role::Removal, "counter target spell", 5.0),
    rule(Role::Removal, "to its owner's hand", 3.0),
    rule(Role::Removal, "fights", 3.0),
    rule(Role::BoardWipe, "destroy all", 8.0),
    rule(Role::BoardWipe, "exile all creatures", 8.0),
    rule(Role::BoardWipe, "all creatures get -", 7.0),
    rule(Role::BoardWipe, "damage to each creature", 6.0),
    rule(Role::BoardWipe, "return all", 5.0),
    rule(Role::Protection, "hexproof", 5.0),
    rule(Role::Protection, "indestructible", 5.0),
    rule(Role::Protection, "protection from", 4.0),
    rule(Role::Protection, "shroud", 4.0),
    rule(Role::Protection, "phase out", 5.0),
    rule(Role::Protection, "ward", 3.0),
    rule(Role::Tutor, "search your library for a card", 3.0),
    rule(Role::GraveyardRecursion, "from your graveyard to your hand", 6.0),
    rule(Role::GraveyardRecursion, "from your graveyard to the battlefield", 7.0),
    rule(Role::GraveyardRecursion, "flashback", 3.0),
    rule(Role::GraveyardRecursion, "unearth", 3.0),
    rule(Role::GraveyardRecursion, "escape", 3.0),
    rule(Role::GraveyardHate, "exile all cards from", 7.0),
    rule(Role::GraveyardHate, "from a graveyard", 5.0),
    rule(Role::GraveyardHate, "cards in graveyards can't", 7.0),
    rule(Role::GraveyardHate, "would be put into a graveyard", 6.0),
    rule(Role::WinCondition, "you win the game", 10.0),
    rule(Role::WinCondition, "additional combat phase", 6.0),
    rule(Role::WinCondition, "each opponent loses", 5.0),
];

/// Scores candidates against one anchor, profile and policy. Construct one
/// per generation run.
pub struct CandidateScorer<'a> {
    anchor: &'a Card,
    profile: &'a AnchorProfile,
    policy: &'a Policy,
    synergy: TagSynergyScorer<'a>,
    weights: ScoreWeights,
}

impl<'a> CandidateScorer<'a> {
    pub fn new(
        anchor: &'a Card,
        profile: &'a AnchorProfile,
        policy: &'a Policy,
        rules: &'a RuleTable,
    ) -> Self {
        Self {
            anchor,
            profile,
            policy,
            synergy: TagSynergyScorer::new(rules),
            weights: ScoreWeights::for_power_level(policy.power_level_target),
        }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    pub fn score(&self, card: Card, tags: Vec<MechanicTag>, price: f64) -> ScoredCandidate {
        let role_scores = role_scores(&card, &tags, self.profile);
        let role_relevance: BTreeSet<Role> = role_scores
            .iter()
            .filter(|(_, score)| **score >= Role::RELEVANCE_THRESHOLD)
            .map(|(role, _)| *role)
            .collect();
        let best_role_score = role_scores.values().copied().fold(0.0, f32::max);

        let breakdown = self.synergy.breakdown(self.profile, &tags);
        let synergy_score = self.synergy_score(&card, &tags, breakdown.total());
        let synergy_notes = self.synergy.notes(&breakdown, SYNERGY_NOTE_LIMIT);

        let is_staple = is_known_staple(&card.name);
        let power_score = power_score(&card, &role_scores, is_staple);
        let budget_score = budget_score(price, self.policy.per_item_cap);
        let curve_score = curve_score(&card, &self.policy.curve_targets);

        let w = self.weights;
        let total_score = best_role_score * w.role
            + synergy_score * w.synergy
            + power_score * w.power
            + budget_score * w.budget
            + curve_score * w.curve;

        if tracing::enabled!(Level::DEBUG) {
            event!(
                target: "deckforge::scoring",
                Level::DEBUG,
                card = %card.name,
                best_role_score,
                synergy_score,
                power_score,
                budget_score,
                curve_score,
                total_score,
                price,
                rules_fired = breakdown.fired.len(),
            );
        }

        ScoredCandidate {
            card,
            tags,
            role_scores,
            synergy_score,
            power_score,
            budget_score,
            curve_score,
            total_score,
            role_relevance,
            price,
            selection_priority: total_score,
            is_staple,
            synergy_notes,
        }
    }

    fn synergy_score(&self, card: &Card, tags: &[MechanicTag], raw: f32) -> f32 {
        let mut score = raw / SYNERGY_SCALE;

        let shared_keywords = card
            .keywords
            .iter()
            .filter(|keyword| {
                self.anchor
                    .keywords
                    .iter()
                    .any(|anchor_kw| anchor_kw.eq_ignore_ascii_case(keyword))
            })
            .count()
            .min(3);
        score += shared_keywords as f32;

        if card.is_multicolor() && card.identity_within(&self.anchor.color_identity) {
            score += 1.0;
        }

        if tags
            .iter()
            .any(|tag| self.profile.has_strategy(&tag.category))
        {
            score += 1.5;
        }

        score.clamp(0.0, MAX_SUBSCORE)
    }
}

/// Independent 0..=10 score for every role. Lands only ever fill the land role.
pub fn role_scores(
    card: &Card,
    tags: &[MechanicTag],
    profile: &AnchorProfile,
) -> BTreeMap<Role, f32> {
    let mut scores: BTreeMap<Role, f32> = BTreeMap::new();
    if card.is_land() {
        scores.insert(Role::Land, MAX_SUBSCORE);
        return scores;
    }

    let text = card.text_lower();
    for keyword in &KEYWORD_RULES {
        if text.contains(keyword.phrase) {
            *scores.entry(keyword.role).or_insert(0.0) += keyword.points;
        }
    }

    if text.contains("search your library for") {
        if text.contains("land card") {
            *scores.entry(Role::Ramp).or_insert(0.0) += 6.0;
        } else {
            *scores.entry(Role::Tutor).or_insert(0.0) += 7.0;
        }
    }

    if card.power.unwrap_or(0) >= 6 {
        *scores.entry(Role::WinCondition).or_insert(0.0) += 4.0;
    }

    for role in Role::ALL {
        if role == Role::Land || role == Role::Synergy {
            continue;
        }
        let classified = tags
            .iter()
            .any(|tag| tag.category == role.as_str() || tag.name == role.as_str());
        if classified {
            *scores.entry(role).or_insert(0.0) += TAG_CATEGORY_ROLE_POINTS;
        }
    }

    if card.mana_value <= 2.0 {
        if let Some(removal) = scores.get_mut(&Role::Removal) {
            *removal += 1.0;
        }
    }

    let overlap = tags
        .iter()
        .filter(|tag| profile.has_tag(&tag.name) || profile.has_strategy(&tag.category))
        .count();
    if overlap > 0 {
        scores.insert(Role::Synergy, overlap as f32 * PROFILE_OVERLAP_POINTS);
    }

    for score in scores.values_mut() {
        *score = score.clamp(0.0, MAX_SUBSCORE);
    }
    scores
}

pub fn power_score(card: &Card, role_scores: &BTreeMap<Role, f32>, is_staple: bool) -> f32 {
    let mut score = BASELINE_SUBSCORE;

    if let Some(stats) = card.stat_total() {
        if card.mana_value > 0.0 && stats as f32 >= 2.0 * card.mana_value {
            score += 1.5;
        }
    }

    let utility_roles = Role::UTILITY
        .iter()
        .filter(|role| role_scores.get(role).copied().unwrap_or(0.0) >= Role::RELEVANCE_THRESHOLD)
        .count();
    if utility_roles >= 2 {
        score += 1.5;
    }

    let best_spell_role = role_scores
        .iter()
        .filter(|(role, _)| **role != Role::Land)
        .map(|(_, score)| *score)
        .fold(0.0, f32::max);
    if card.mana_value <= 2.0 && best_spell_role >= 7.0 {
        score += 1.0;
    }

    score += card.rarity.power_bonus();
    if is_staple {
        score += 2.0;
    }

    score.clamp(0.0, MAX_SUBSCORE)
}

/// 0 above the cap, 8 when free, otherwise falling linearly from 9 to 1.
pub fn budget_score(price: f64, per_item_cap: f64) -> f32 {
    if price > per_item_cap {
        return 0.0;
    }
    if price <= 0.0 {
        return 8.0;
    }
    let ratio = (price / per_item_cap).clamp(0.0, 1.0) as f32;
    9.0 - 8.0 * ratio
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurveBucket {
    Early,
    Mid,
    Late,
}

impl CurveBucket {
    fn of(mana_value: f32) -> Self {
        if mana_value <= 2.0 {
            CurveBucket::Early
        } else if mana_value <= 4.0 {
            CurveBucket::Mid
        } else {
            CurveBucket::Late
        }
    }
}

pub fn curve_score(card: &Card, curve: &CurveTargets) -> f32 {
    if card.is_land() {
        return BASELINE_SUBSCORE;
    }

    let adjustment = match (CurveBucket::of(card.mana_value), curve.preference) {
        (CurveBucket::Early, CurvePreference::Early) => 3.0,
        (CurveBucket::Early, CurvePreference::Balanced) => 1.0,
        (CurveBucket::Early, CurvePreference::Late) => 0.0,
        (CurveBucket::Mid, CurvePreference::Balanced) => 2.0,
        (CurveBucket::Mid, _) => 1.0,
        (CurveBucket::Late, CurvePreference::Late) => 3.0,
        (CurveBucket::Late, CurvePreference::Balanced) => -1.0,
        (CurveBucket::Late, CurvePreference::Early) => -2.0,
    };

    let mut score = BASELINE_SUBSCORE + adjustment;
    if card.mana_value >= 7.0 && curve.late_slots < LATE_SCARCITY_SLOTS {
        score -= 2.0;
    }
    score.clamp(0.0, MAX_SUBSCORE)
}
