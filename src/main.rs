use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use sensebench::config::EvalConfig;
use sensebench::evaluation;
use sensebench::logging::configure_logging;
use sensebench::TARGET_EVALUATION;

#[derive(Parser)]
#[clap(
    name = "sensebench",
    about = "Evaluate baseline word-sense-disambiguation strategies against a sense inventory"
)]
struct Cli {
    /// Path of the evaluation config file
    #[clap(short, long, default_value = "config/eval.json")]
    config: PathBuf,

    /// Override the configured number of evaluation rounds
    #[clap(long)]
    iterations: Option<u32>,

    /// Override the configured RNG seed
    #[clap(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    configure_logging();
    let cli = Cli::parse();

    let mut config = EvalConfig::load(&cli.config)?;
    if let Some(iterations) = cli.iterations {
        config.iterations = iterations;
        config.validate()?;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let start = std::time::Instant::now();
    let summary = evaluation::run(&config)?;
    info!(
        target: TARGET_EVALUATION,
        "Evaluation finished in {:.2?} over {} rounds", start.elapsed(), summary.rounds.len()
    );
    evaluation::print_report(&config, &summary);
    Ok(())
}
