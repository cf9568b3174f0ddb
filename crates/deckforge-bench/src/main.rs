use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use deckforge_bench::config::{BenchConfig, ResolvedOutputs};
use deckforge_bench::logging::init_telemetry;
use deckforge_bench::runner::ScenarioRunner;

/// Synthetic-pool benchmarking harness for deck assembly.
#[derive(Debug, Parser)]
#[command(
    name = "deckforge-bench",
    author,
    version,
    about = "Deterministic deck assembly benchmark harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the base seed of every scenario.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of runs per scenario.
    #[arg(long, value_name = "RUNS")]
    runs: Option<usize>,

    /// Exit after validating the configuration (no scenario is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchConfig::from_path(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    for scenario in &mut config.scenarios {
        if let Some(seed) = cli.seed {
            scenario.seed = Some(seed);
        }
        if let Some(runs) = cli.runs {
            scenario.runs = runs;
        }
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let scenario_count = config.scenarios.len();
    let run_id = config.run_id.clone();
    let total_runs = config.total_runs();

    println!(
        "Loaded configuration '{run_id}' with {scenario_count} scenario{} ({total_runs} runs, budget ${:.2}, cap ${:.2})",
        if scenario_count == 1 { "" } else { "s" },
        config.policy.total_budget,
        config.policy.per_item_cap,
    );

    let _telemetry = init_telemetry(&config.logging, &outputs)?;
    let runner = ScenarioRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: scenario execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Benchmark complete for '{run_id}': {} scenarios, {} runs ({} at exact size) -> {} rows at {}",
        summary.scenarios,
        summary.runs,
        summary.exact_size_runs,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
