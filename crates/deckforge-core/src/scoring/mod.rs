pub mod candidate;
pub mod staples;
pub mod synergy;
pub mod weights;

pub use candidate::{CandidateScorer, budget_score, curve_score, power_score, role_scores};
pub use staples::is_known_staple;
pub use synergy::{
    FiredRule, RuleTable, SynergyBreakdown, SynergyRule, TagSynergyScorer, TierBonus, TribeTier,
};
pub use weights::ScoreWeights;
