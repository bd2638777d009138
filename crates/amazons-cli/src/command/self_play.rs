use std::{path::PathBuf, sync::mpsc::Receiver, thread};

use amazons_engine::{Game, GameEvent};
use amazons_evaluator::{
    move_evaluator::CompositeEvaluator,
    neural_network::{NeuralNetwork, Topology},
    turn_search::{SearchConfig, SearchEngine},
};
use amazons_training::self_play::SelfPlay;
use anyhow::Context;
use chrono::Utc;

use crate::{
    model::report::{GameRecord, SelfPlayReport},
    util,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SelfPlayArg {
    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: usize,
    /// Weight file of the network
    #[arg(long, default_value = "amazons.nn")]
    weights: PathBuf,
    /// Search time per turn in milliseconds
    #[arg(long, default_value_t = 3000)]
    time_budget_ms: u64,
    /// Deepest ply searched (defaults to the number of candidate moves)
    #[arg(long)]
    max_depth: Option<usize>,
    /// Chance that white plays a random move instead of searching
    #[arg(long, default_value_t = 1.0)]
    white_random_probability: f64,
    /// Score moves by the network alone, without the territory heuristic
    #[arg(long)]
    no_score_ratio: bool,
    /// Seed of both engines
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path for the JSON report (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SelfPlayArg) -> anyhow::Result<()> {
    let SelfPlayArg {
        games,
        weights,
        time_budget_ms,
        max_depth,
        white_random_probability,
        no_score_ratio,
        seed,
        output,
    } = arg;

    let (network, origin) =
        NeuralNetwork::load_or_initialize(weights, Topology::default(), &mut rand::rng())
            .with_context(|| format!("Failed to load weights: {}", weights.display()))?;
    util::report_weight_origin(weights, &origin);

    let black_search = SearchConfig {
        time_budget_ms: *time_budget_ms,
        max_depth: *max_depth,
        use_score_ratio: !*no_score_ratio,
        seed: *seed,
        ..SearchConfig::default()
    };
    let white_search = SearchConfig {
        random_probability: *white_random_probability,
        seed: seed.map(|seed| seed.wrapping_add(1)),
        ..black_search.clone()
    };
    white_search
        .validate()
        .context("Invalid --white-random-probability")?;

    let mut game = Game::new();
    let printer = {
        let events = game.subscribe();
        thread::spawn(move || print_events(&events))
    };

    let mut records = vec![];
    {
        let black = SearchEngine::new(
            Box::new(CompositeEvaluator::neural(&network, black_search.use_score_ratio)?),
            black_search,
        );
        let white = SearchEngine::new(
            Box::new(CompositeEvaluator::neural(&network, white_search.use_score_ratio)?),
            white_search,
        );
        let mut self_play = SelfPlay::new(black, white);
        for _ in 0..*games {
            game.reset();
            let (_, outcome) = self_play.play_game(&mut game);
            records.push((GameRecord::from(&outcome), outcome.rejected));
        }
    }
    drop(game);
    printer
        .join()
        .map_err(|_| anyhow::anyhow!("Event printer thread panicked"))?;

    eprintln!();
    eprintln!("Self-play completed");
    for (i, (record, rejected)) in records.iter().enumerate() {
        let winner = record
            .winner
            .map_or_else(|| "draw".to_owned(), |color| color.to_string());
        eprintln!(
            "  #{i:3}: {:3} plies, black {:3} / white {:3} => {winner}",
            record.plies, record.black.exclusive, record.white.exclusive
        );
        if *rejected > 0 {
            eprintln!("        {rejected} generated moves were rejected");
        }
    }

    let report = SelfPlayReport {
        played_at: Utc::now(),
        weights_path: weights.clone(),
        games: records.into_iter().map(|(record, _)| record).collect(),
    };
    util::save_json(&report, output.as_deref())?;

    Ok(())
}

fn print_events(events: &Receiver<GameEvent>) {
    let mut game = 0;
    for event in events {
        match event {
            GameEvent::GameReset => {
                game += 1;
                eprintln!("Game #{game}:");
            }
            GameEvent::MoveCommitted { mv, mover } => eprintln!("  {mover}: {mv}"),
            GameEvent::TurnSkipped { color } => eprintln!("  {color}: no legal move"),
            GameEvent::GameFinished { points } => eprintln!(
                "  Finished: black {} / white {}",
                points.black.exclusive, points.white.exclusive
            ),
        }
    }
}
