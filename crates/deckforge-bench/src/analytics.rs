use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use deckforge_core::synthetic::Theme;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;
use thiserror::Error;

use crate::config::BenchConfig;
use crate::runner::RunLogRow;

const CONFIDENCE: f64 = 0.95;
const FALLBACK_Z: f64 = 1.96;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("scenario '{0}' recorded but missing from configuration")]
    UnknownScenario(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Accumulates run rows per scenario, in configuration order.
pub struct AnalyticsCollector {
    run_id: String,
    scenarios: HashMap<String, ScenarioAccumulator>,
    order: Vec<String>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchConfig) -> Self {
        let mut scenarios = HashMap::new();
        let mut order = Vec::new();
        for scenario in &config.scenarios {
            scenarios.insert(
                scenario.name.clone(),
                ScenarioAccumulator::new(scenario.name.clone(), scenario.theme),
            );
            order.push(scenario.name.clone());
        }
        Self {
            run_id: config.run_id.clone(),
            scenarios,
            order,
        }
    }

    pub fn record_run(&mut self, row: &RunLogRow) -> Result<(), AnalyticsError> {
        let acc = self
            .scenarios
            .get_mut(&row.scenario)
            .ok_or_else(|| AnalyticsError::UnknownScenario(row.scenario.clone()))?;
        acc.record(row);
        Ok(())
    }

    pub fn finalize(mut self) -> AnalyticsSummary {
        let mut reports = Vec::new();
        for name in &self.order {
            if let Some(acc) = self.scenarios.remove(name) {
                reports.push(acc.into_report());
            }
        }

        let mut warning_totals: BTreeMap<String, usize> = BTreeMap::new();
        for report in &reports {
            for (kind, count) in &report.warning_counts {
                *warning_totals.entry(kind.clone()).or_default() += count;
            }
        }

        AnalyticsSummary {
            run_id: self.run_id,
            scenarios: reports,
            warning_totals,
        }
    }
}

struct ScenarioAccumulator {
    name: String,
    theme: Theme,
    costs: Vec<f64>,
    budget_used: Vec<f64>,
    exact_size: usize,
    replacements: usize,
    cohesion_total: f64,
    elapsed_total_ms: f64,
    warning_counts: BTreeMap<String, usize>,
}

impl ScenarioAccumulator {
    fn new(name: String, theme: Theme) -> Self {
        Self {
            name,
            theme,
            costs: Vec::new(),
            budget_used: Vec::new(),
            exact_size: 0,
            replacements: 0,
            cohesion_total: 0.0,
            elapsed_total_ms: 0.0,
            warning_counts: BTreeMap::new(),
        }
    }

    fn record(&mut self, row: &RunLogRow) {
        self.costs.push(row.total_cost);
        if row.budget > 0.0 {
            self.budget_used.push(row.total_cost / row.budget);
        }
        if row.is_exact_size() {
            self.exact_size += 1;
        }
        self.replacements += row.replacements;
        self.cohesion_total += f64::from(row.cohesion);
        self.elapsed_total_ms += row.elapsed_ms;
        for kind in &row.warning_kinds {
            *self.warning_counts.entry(kind.clone()).or_default() += 1;
        }
    }

    fn into_report(self) -> ScenarioReport {
        let runs = self.costs.len();
        let per_run = |total: f64| if runs == 0 { 0.0 } else { total / runs as f64 };
        let (mean_cost, ci95) = confidence_interval(&self.costs);
        let mean_budget_used = if self.budget_used.is_empty() {
            0.0
        } else {
            self.budget_used.iter().mean()
        };

        ScenarioReport {
            name: self.name,
            theme: self.theme,
            runs,
            mean_cost,
            ci95,
            mean_budget_used,
            exact_size_rate: per_run(self.exact_size as f64),
            mean_replacements: per_run(self.replacements as f64),
            mean_cohesion: per_run(self.cohesion_total),
            average_ms_per_run: per_run(self.elapsed_total_ms),
            warning_counts: self.warning_counts,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub theme: Theme,
    pub runs: usize,
    pub mean_cost: f64,
    pub ci95: (f64, f64),
    pub mean_budget_used: f64,
    pub exact_size_rate: f64,
    pub mean_replacements: f64,
    pub mean_cohesion: f64,
    pub average_ms_per_run: f64,
    pub warning_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub run_id: String,
    pub scenarios: Vec<ScenarioReport>,
    pub warning_totals: BTreeMap<String, usize>,
}

impl AnalyticsSummary {
    pub fn render_markdown(&self) -> String {
        let mut rows = String::new();
        rows.push_str(&format!("# Assembly Summary: {}\n\n", self.run_id));
        rows.push_str("| Scenario | Theme | Runs | Mean cost | 95% CI | Budget used | Exact size | Replacements | Cohesion | Avg ms/run |\n");
        rows.push_str("|----------|-------|------|-----------|--------|-------------|------------|--------------|----------|------------|\n");

        for report in &self.scenarios {
            rows.push_str(&format!(
                "| {name} | {theme} | {runs} | ${mean:.2} | [${low:.2}, ${high:.2}] | {used:.1}% | {exact:.1}% | {replacements:.2} | {cohesion:.2} | {ms:.2} |\n",
                name = report.name,
                theme = report.theme,
                runs = report.runs,
                mean = report.mean_cost,
                low = report.ci95.0,
                high = report.ci95.1,
                used = report.mean_budget_used * 100.0,
                exact = report.exact_size_rate * 100.0,
                replacements = report.mean_replacements,
                cohesion = report.mean_cohesion,
                ms = report.average_ms_per_run,
            ));
        }

        rows.push_str("\n## Warnings\n\n");
        if self.warning_totals.is_empty() {
            rows.push_str("No warnings recorded.\n");
        } else {
            rows.push_str("| Kind | Count |\n|------|-------|\n");
            for (kind, count) in &self.warning_totals {
                rows.push_str(&format!("| {kind} | {count} |\n"));
            }
        }
        rows
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.render_markdown()).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

/// Two-sided standard normal quantile for `confidence`.
fn z_score(confidence: f64) -> f64 {
    Normal::new(0.0, 1.0)
        .map(|normal| normal.inverse_cdf(0.5 + confidence / 2.0))
        .unwrap_or(FALLBACK_Z)
}

/// Mean and normal-approximation confidence interval.
fn confidence_interval(values: &[f64]) -> (f64, (f64, f64)) {
    if values.is_empty() {
        return (0.0, (0.0, 0.0));
    }
    let mean = values.iter().mean();
    if values.len() == 1 {
        return (mean, (mean, mean));
    }
    let std_error = values.iter().std_dev() / (values.len() as f64).sqrt();
    let margin = z_score(CONFIDENCE) * std_error;
    (mean, (mean - margin, mean + margin))
}
