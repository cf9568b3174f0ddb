pub mod assembly;
pub mod dedup;
pub mod quota;
pub mod rank;
pub mod result;

pub use assembly::{AssemblyPhase, BudgetOptimizer};
pub use dedup::dedup_candidates;
pub use quota::{RoleQuota, TypeQuotas};
pub use rank::{compare_candidates, rank_candidates, stable_merge_sort};
pub use result::{AssemblyResult, AssemblyWarning, DeckEntry, Replacement, ReplacementReason};
