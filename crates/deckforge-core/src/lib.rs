#![deny(warnings)]
pub mod error;
pub mod graph;
pub mod model;
pub mod optimizer;
pub mod pipeline;
pub mod pool;
pub mod report;
pub mod scoring;
pub mod synthetic;

pub use error::{PipelineError, PolicyError, RuleTableError, SourceError};
pub use optimizer::{AssemblyResult, AssemblyWarning, BudgetOptimizer, DeckEntry};
pub use pipeline::{CandidateSource, DeckPipeline, GeneratedDeck, StaticCandidates};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "deckforge"
    }

    pub const fn rules_revision() -> &'static str {
        "tag-rules-2"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
