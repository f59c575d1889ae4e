use std::path::PathBuf;

use clap::Parser;

use durak_core::AppInfo;
use durak_sim::config::SimConfig;
use durak_sim::logging::init_logging;
use durak_sim::runner::SimRunner;

/// Simulation harness for Durak bots.
#[derive(Debug, Parser)]
#[command(
    name = "durak-sim",
    author,
    version,
    about = "Deterministic Durak simulation harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "sim/sim.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for deal generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SimConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }
    if let Some(games) = cli.games {
        config.games.count = games;
    }
    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }
    config.validate()?;

    if cli.validate_only {
        println!(
            "configuration ok: run {} with {} games",
            config.run_id, config.games.count
        );
        return Ok(());
    }

    let outputs = config.resolved_outputs();
    let _logging = init_logging(&config.logging, &outputs)?;
    tracing::info!(
        target: "durak_sim::run",
        app = AppInfo::name(),
        version = AppInfo::version(),
        run_id = %config.run_id,
        "starting simulation"
    );

    let runner = SimRunner::new(config, outputs)?;
    let summary = runner.run()?;

    println!(
        "played {} games -> {}",
        summary.games_played,
        summary.jsonl_path.display()
    );
    println!("summary -> {}", summary.summary_path.display());
    Ok(())
}
