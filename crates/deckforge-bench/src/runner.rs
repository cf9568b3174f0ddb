use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use deckforge_core::PipelineError;
use deckforge_core::model::policy::Policy;
use deckforge_core::model::price::ListedPriceOracle;
use deckforge_core::pipeline::{DeckPipeline, GeneratedDeck};
use deckforge_core::synthetic::{SyntheticPool, Theme};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchConfig, ResolvedOutputs, ScenarioConfig};
use crate::logging::TELEMETRY_FILE;

/// Runs every configured scenario and writes the run log and summary.
pub struct ScenarioRunner {
    config: BenchConfig,
    outputs: ResolvedOutputs,
    logging_enabled: bool,
}

/// Summary details returned after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub scenarios: usize,
    pub runs: usize,
    pub rows_written: usize,
    pub exact_size_runs: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

/// One JSONL row per generated deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLogRow {
    pub run_id: String,
    pub scenario: String,
    pub run_index: usize,
    pub seed: u64,
    pub theme: Theme,
    pub pool_size: usize,
    pub candidates: usize,
    pub deck_size: usize,
    pub target_size: usize,
    pub total_cost: f64,
    pub budget: f64,
    pub replacements: usize,
    pub warnings: Vec<String>,
    pub warning_kinds: Vec<String>,
    pub cohesion: f32,
    pub clusters: usize,
    pub elapsed_ms: f64,
}

impl RunLogRow {
    fn from_deck(
        run_id: &str,
        scenario: &ScenarioConfig,
        run_index: usize,
        seed: u64,
        deck: &GeneratedDeck,
        elapsed_ms: f64,
    ) -> Self {
        let result = &deck.result;
        Self {
            run_id: run_id.to_string(),
            scenario: scenario.name.clone(),
            run_index,
            seed,
            theme: scenario.theme,
            pool_size: scenario.pool_size,
            candidates: deck.candidate_count,
            deck_size: result.len(),
            target_size: deck.report.target_size,
            total_cost: result.total_cost,
            budget: deck.report.budget,
            replacements: result.replacements.len(),
            warnings: result.warning_messages(),
            warning_kinds: result
                .warnings
                .iter()
                .map(|warning| warning.kind().to_string())
                .collect(),
            cohesion: deck.cohesion.cohesion,
            clusters: deck.cohesion.clusters.len(),
            elapsed_ms,
        }
    }

    pub fn is_exact_size(&self) -> bool {
        self.deck_size == self.target_size
    }
}

impl ScenarioRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        if config.scenarios.is_empty() {
            return Err(RunnerError::NoScenarios);
        }
        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
        })
    }

    /// Execute every scenario, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut analytics = AnalyticsCollector::new(&self.config);
        let mut rows_written = 0usize;
        let mut exact_size_runs = 0usize;

        for scenario in &self.config.scenarios {
            let policy = scenario.policy(&self.config.policy);
            let mut rng = StdRng::seed_from_u64(scenario.seed.unwrap_or(0));

            for run_index in 0..scenario.runs {
                let seed = rng.next_u64();
                let started = Instant::now();
                let deck = generate_once(scenario, seed, &policy)?;
                let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;

                let row = RunLogRow::from_deck(
                    &self.config.run_id,
                    scenario,
                    run_index,
                    seed,
                    &deck,
                    elapsed_ms,
                );
                if row.is_exact_size() {
                    exact_size_runs += 1;
                }
                if self.logging_enabled && tracing::enabled!(Level::INFO) {
                    event!(
                        target: "deckforge_bench::run",
                        Level::INFO,
                        run_id = %self.config.run_id,
                        scenario = %scenario.name,
                        run_index = run_index as u32,
                        seed,
                        deck_size = row.deck_size,
                        total_cost = row.total_cost,
                        warnings = %row.warning_kinds.join(","),
                        elapsed_ms
                    );
                }
                analytics.record_run(&row)?;

                serde_json::to_writer(&mut writer, &row)?;
                writer.write_all(b"\n")?;
                rows_written += 1;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| self.outputs.summary_dir().join(TELEMETRY_FILE));

        Ok(RunSummary {
            scenarios: self.config.scenarios.len(),
            runs: rows_written,
            rows_written,
            exact_size_runs,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }
}

/// Generates one synthetic pool and assembles a deck from it.
pub fn generate_once(
    scenario: &ScenarioConfig,
    seed: u64,
    policy: &Policy,
) -> Result<GeneratedDeck, RunnerError> {
    let pool = SyntheticPool::generate(seed, scenario.pool_size, scenario.theme);
    let source = pool.candidates();
    let profiles = pool.profile_source();
    let pipeline = DeckPipeline::new(&source, &pool.tags, &profiles, &ListedPriceOracle)?;
    pipeline
        .generate(&pool.anchor, policy)
        .map_err(|source| RunnerError::Pipeline {
            scenario: scenario.name.clone(),
            seed,
            source,
        })
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("configuration defines no scenarios")]
    NoScenarios,
    #[error("pipeline setup failed: {0}")]
    Setup(#[from] PipelineError),
    #[error("scenario '{scenario}' (seed {seed}) failed: {source}")]
    Pipeline {
        scenario: String,
        seed: u64,
        #[source]
        source: PipelineError,
    },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ScenarioConfig {
        ScenarioConfig {
            name: "unit".to_string(),
            theme: Theme::Graveyard,
            pool_size: 300,
            seed: Some(9),
            runs: 1,
            deck_size: Some(40),
        }
    }

    #[test]
    fn generate_once_is_deterministic_per_seed() {
        let scenario = scenario();
        let policy = scenario.policy(&Policy::new(60.0, 8.0, 99));
        let first = generate_once(&scenario, 17, &policy).expect("deck");
        let second = generate_once(&scenario, 17, &policy).expect("deck");
        assert_eq!(first.result, second.result);
        assert_eq!(first.report.target_size, 40);
    }

    #[test]
    fn rows_capture_deck_shape() {
        let scenario = scenario();
        let policy = scenario.policy(&Policy::new(60.0, 8.0, 99));
        let deck = generate_once(&scenario, 3, &policy).expect("deck");
        let row = RunLogRow::from_deck("r1", &scenario, 0, 3, &deck, 0.0);
        assert_eq!(row.scenario, "unit");
        assert_eq!(row.deck_size, deck.result.len());
        assert_eq!(row.total_cost, deck.result.total_cost);
        assert_eq!(row.warnings.len(), row.warning_kinds.len());
        assert_eq!(row.is_exact_size(), deck.result.len() == 40);
    }

    #[test]
    fn malformed_policy_surfaces_as_pipeline_error() {
        let scenario = scenario();
        let mut policy = Policy::new(60.0, 8.0, 40);
        policy.per_item_cap = f64::NAN;
        let err = generate_once(&scenario, 1, &policy).expect_err("nan cap");
        assert!(matches!(err, RunnerError::Pipeline { seed: 1, .. }));
    }
}
