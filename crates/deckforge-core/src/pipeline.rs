use std::time::Instant;

use crate::error::{PipelineError, SourceError};
use crate::graph::{CohesionReport, SynergyGraph, SynergyGraphBuilder};
use crate::model::candidate::ScoredCandidate;
use crate::model::card::Card;
use crate::model::color::Color;
use crate::model::policy::Policy;
use crate::model::price::PriceOracle;
use crate::model::profile::{AnchorProfile, ProfileSource};
use crate::model::role::Role;
use crate::model::tag::{TagSource, enrich_with_type_tags};
use crate::optimizer::{AssemblyResult, BudgetOptimizer};
use crate::pool::RolePoolBuilder;
use crate::report::DeckReport;
use crate::scoring::{CandidateScorer, RuleTable};
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

/// External card search. Results are assumed legal for the format already;
/// only color identity is passed through.
pub trait CandidateSource {
    fn fetch_candidates(&self, identity: &[Color]) -> Result<Vec<Card>, SourceError>;
}

/// Fixed card list filtered by color identity.
#[derive(Debug, Clone, Default)]
pub struct StaticCandidates {
    cards: Vec<Card>,
}

impl StaticCandidates {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CandidateSource for StaticCandidates {
    fn fetch_candidates(&self, identity: &[Color]) -> Result<Vec<Card>, SourceError> {
        Ok(self
            .cards
            .iter()
            .filter(|card| card.identity_within(identity))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub role: Role,
    pub size: usize,
    pub target: usize,
    pub min: usize,
    pub max: usize,
}

/// Everything one generation run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDeck {
    pub anchor: String,
    pub profile: AnchorProfile,
    pub candidate_count: usize,
    pub pools: Vec<PoolSummary>,
    pub result: AssemblyResult,
    pub graph: SynergyGraph,
    pub cohesion: CohesionReport,
    pub report: DeckReport,
}

/// Runs fetch, tagging, scoring, pooling, assembly and analysis for one anchor.
pub struct DeckPipeline<'a> {
    candidates: &'a dyn CandidateSource,
    tags: &'a dyn TagSource,
    profiles: &'a dyn ProfileSource,
    prices: &'a dyn PriceOracle,
    rules: RuleTable,
}

impl<'a> DeckPipeline<'a> {
    /// Pipeline over the built-in synergy rule table.
    pub fn new(
        candidates: &'a dyn CandidateSource,
        tags: &'a dyn TagSource,
        profiles: &'a dyn ProfileSource,
        prices: &'a dyn PriceOracle,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            candidates,
            tags,
            profiles,
            prices,
            rules: RuleTable::builtin()?,
        })
    }

    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn generate(&self, anchor: &Card, policy: &Policy) -> Result<GeneratedDeck, PipelineError> {
        let started = Instant::now();
        let mut policy = policy.clone();
        policy.validate()?;
        let optimizer = BudgetOptimizer::new(&policy)?;

        let fetched = self.candidates.fetch_candidates(&anchor.color_identity)?;
        let fetched_count = fetched.len();
        let profile = self.profiles.profile_of(anchor);
        let scored = self.score_all(anchor, &profile, &policy, fetched);
        event!(
            target: "deckforge::pipeline",
            Level::DEBUG,
            anchor = %anchor.name,
            fetched = fetched_count,
            scored = scored.len(),
        );

        let pools = RolePoolBuilder::new(&policy).build(&scored);
        let pool_summaries = pools
            .values()
            .map(|pool| PoolSummary {
                role: pool.role,
                size: pool.len(),
                target: pool.target_count,
                min: pool.min_count,
                max: pool.max_count,
            })
            .collect();

        let result = optimizer.assemble(&scored, &pools);
        let graph = SynergyGraphBuilder::new().build(result.final_deck.iter().map(|e| &e.candidate));
        let cohesion = CohesionReport::analyze(&graph);
        let report = DeckReport::from_result(&result, &policy, Some(&cohesion));

        event!(
            target: "deckforge::pipeline",
            Level::INFO,
            anchor = %anchor.name,
            candidates = scored.len(),
            deck_size = result.len(),
            total_cost = result.total_cost,
            budget = policy.total_budget,
            warnings = result.warnings.len(),
            cohesion = cohesion.cohesion,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "deck generated"
        );

        Ok(GeneratedDeck {
            anchor: anchor.name.clone(),
            profile,
            candidate_count: scored.len(),
            pools: pool_summaries,
            result,
            graph,
            cohesion,
            report,
        })
    }

    /// Drops the anchor and fungible cards, then tags, prices and scores the rest.
    fn score_all(
        &self,
        anchor: &Card,
        profile: &AnchorProfile,
        policy: &Policy,
        cards: Vec<Card>,
    ) -> Vec<ScoredCandidate> {
        let scorer = CandidateScorer::new(anchor, profile, policy, &self.rules);
        cards
            .into_iter()
            .filter(|card| card.name != anchor.name && !card.is_fungible())
            .map(|card| {
                let tags = enrich_with_type_tags(&card, self.tags.mechanics_of(&card));
                let price = self.prices.price_of(&card, policy.prefer_cheapest);
                scorer.score(card, tags, price)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::policy::RoleTarget;
    use crate::model::price::ListedPriceOracle;
    use crate::model::profile::StaticProfile;
    use crate::model::tag::{MechanicTag, TagIndex};
    use std::collections::BTreeMap;

    struct OfflineSource;

    impl CandidateSource for OfflineSource {
        fn fetch_candidates(&self, _identity: &[Color]) -> Result<Vec<Card>, SourceError> {
            Err(SourceError::Unavailable("search offline".to_string()))
        }
    }

    fn anchor() -> Card {
        Card::new("Lathril, Blade of the Elves", "Legendary Creature — Elf Noble", 4.0)
            .with_identity(&[Color::Black, Color::Green])
    }

    fn cards() -> Vec<Card> {
        vec![
            anchor(),
            Card::new("Forest", "Basic Land — Forest", 0.0).with_price(0.1),
            Card::new("Llanowar Wastes", "Land", 0.0)
                .with_identity(&[Color::Black, Color::Green])
                .with_price(0.5),
            Card::new("Elvish Mystic", "Creature — Elf Druid", 1.0)
                .with_text("{T}: Add {G}.")
                .with_identity(&[Color::Green])
                .with_price(0.25),
            Card::new("Murder", "Instant", 3.0)
                .with_text("Destroy target creature.")
                .with_identity(&[Color::Black])
                .with_price(0.2),
            Card::new("Counterspell", "Instant", 2.0)
                .with_text("Counter target spell.")
                .with_identity(&[Color::Blue])
                .with_price(1.0),
        ]
    }

    fn policy() -> Policy {
        let mut composition = BTreeMap::new();
        composition.insert(Role::Land, RoleTarget::bounded(1, 1, 1));
        composition.insert(Role::Ramp, RoleTarget::bounded(1, 0, 1));
        composition.insert(Role::Removal, RoleTarget::bounded(1, 0, 1));
        Policy::new(10.0, 5.0, 3).with_composition(composition)
    }

    fn profile() -> StaticProfile {
        StaticProfile(AnchorProfile::from_tags(["tribal_elf", "elf_matters"], ["tribal"]))
    }

    #[test]
    fn generates_a_full_deck_without_anchor_or_basics() {
        let source = StaticCandidates::new(cards());
        let mut tags = TagIndex::new();
        tags.insert(
            "Elvish Mystic",
            vec![MechanicTag::new("elf_payoff", "tribal", 6)],
        );
        let profiles = profile();
        let pipeline = DeckPipeline::new(&source, &tags, &profiles, &ListedPriceOracle).unwrap();
        let deck = pipeline.generate(&anchor(), &policy()).unwrap();

        let names: Vec<&str> = deck.result.names().collect();
        assert_eq!(names.len(), 3);
        assert!(!names.contains(&"Lathril, Blade of the Elves"));
        assert!(!names.contains(&"Forest"));
        assert!(!names.contains(&"Counterspell"));
        assert!(names.contains(&"Llanowar Wastes"));
        assert!(names.contains(&"Elvish Mystic"));
        assert!(names.contains(&"Murder"));
        assert_eq!(deck.candidate_count, 3);
        assert!(deck.result.warnings.is_empty(), "{:?}", deck.result.warnings);
        assert!((deck.result.total_cost - 0.95).abs() < 1e-9);
        assert_eq!(deck.report.size, 3);
        assert_eq!(deck.pools.len(), 3);
    }

    #[test]
    fn source_failures_surface_as_errors() {
        let tags = TagIndex::new();
        let profiles = profile();
        let pipeline =
            DeckPipeline::new(&OfflineSource, &tags, &profiles, &ListedPriceOracle).unwrap();
        let err = pipeline.generate(&anchor(), &policy()).unwrap_err();
        assert!(matches!(err, PipelineError::Source(_)));
    }

    #[test]
    fn invalid_policies_are_rejected_before_fetching() {
        let tags = TagIndex::new();
        let profiles = profile();
        let pipeline =
            DeckPipeline::new(&OfflineSource, &tags, &profiles, &ListedPriceOracle).unwrap();
        let mut policy = policy();
        policy.total_budget = f64::NAN;
        let err = pipeline.generate(&anchor(), &policy).unwrap_err();
        assert!(matches!(err, PipelineError::Policy(_)));
    }
}
