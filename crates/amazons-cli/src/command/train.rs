use std::path::PathBuf;

use amazons_training::trainer::{Trainer, TrainingConfig};
use anyhow::Context;

use crate::{model::report::TrainingReport, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of self-play games to train on
    #[arg(long, default_value_t = 100)]
    games: usize,
    /// Training configuration file (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Weight file, overriding the configuration
    #[arg(long)]
    weights: Option<PathBuf>,
    /// Learning rate, overriding the configuration
    #[arg(long)]
    learning_rate: Option<f32>,
    /// Games between weight saves, overriding the configuration
    #[arg(long)]
    save_interval: Option<usize>,
    /// Random seed, overriding the configuration
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path for the JSON report (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        games,
        config,
        weights,
        learning_rate,
        save_interval,
        seed,
        output,
    } = arg;

    let mut config = match config {
        Some(path) => util::read_json_file::<TrainingConfig, _>("training config", path)?,
        None => TrainingConfig::default(),
    };
    if let Some(weights) = weights {
        config.weights_path.clone_from(weights);
    }
    if let Some(learning_rate) = learning_rate {
        config.learning_rate = *learning_rate;
    }
    if let Some(save_interval) = save_interval {
        config.save_interval = *save_interval;
    }
    if seed.is_some() {
        config.seed = *seed;
    }
    config
        .black
        .validate()
        .context("Invalid black search config")?;
    config
        .white
        .validate()
        .context("Invalid white search config")?;

    let weights_path = config.weights_path.clone();
    let mut trainer = Trainer::new(config)
        .with_context(|| format!("Failed to prepare weights: {}", weights_path.display()))?;
    util::report_weight_origin(&weights_path, trainer.weight_origin());

    for _ in 0..*games {
        let summary = trainer.run_game().context("Training game failed")?;
        let error = summary
            .error
            .map_or_else(|| "-".to_owned(), |error| format!("{error:.4}"));
        eprintln!(
            "Game #{:4}: {:3} plies, black {:3} / white {:3}, target {:+.3}, error {error}{}",
            summary.game,
            summary.outcome.plies,
            summary.outcome.points.black.exclusive,
            summary.outcome.points.white.exclusive,
            summary.target,
            if summary.saved { " (saved)" } else { "" },
        );
        if summary.outcome.rejected > 0 {
            eprintln!(
                "  {} generated moves were rejected",
                summary.outcome.rejected
            );
        }
    }
    trainer
        .save()
        .with_context(|| format!("Failed to save weights: {}", weights_path.display()))?;

    let report = TrainingReport::new(weights_path, trainer.stats());
    eprintln!();
    eprintln!("Training completed");
    eprintln!("  Games: {}", report.games);
    eprintln!(
        "  Wins: black {} / white {} / draw {}",
        report.black_wins, report.white_wins, report.draws
    );
    eprintln!("  Mean target: {:+.3}", report.mean_target);
    if let Some(mean_error) = report.mean_error {
        eprintln!("  Mean error: {mean_error:.4}");
    }
    eprintln!("  Weights: {}", report.weights_path.display());

    util::save_json(&report, output.as_deref())?;

    Ok(())
}
