//! Learning from self-play.
//!
//! After each game the final territory is turned into a single target in
//! `[-1, 1]` (see [`training_target`]). Moves are then sampled uniformly from
//! the game's [`Trajectory`], encoded with
//! [`board_feature::encode`](amazons_evaluator::board_feature::encode), and
//! the network is trained towards the target with one backpropagation step
//! per sample. Every move of a won game is pulled towards the winner, so
//! moves that tend to appear in black wins drift positive over many games.
//!
//! Weights are persisted every [`TrainingConfig::save_interval`] games.

use std::{path::PathBuf, sync::mpsc::Receiver};

use amazons_engine::{Color, Game, GameEvent, Points};
use amazons_evaluator::{
    board_feature,
    move_evaluator::CompositeEvaluator,
    neural_network::{NetworkError, NeuralNetwork, Topology, WeightOrigin},
    turn_search::{SearchConfig, SearchEngine},
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::self_play::{GameOutcome, SelfPlay, Trajectory};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub learning_rate: f32,
    /// Training steps per recorded move of a game.
    pub samples_per_transition: usize,
    /// Games between weight saves; `0` disables periodic saving.
    pub save_interval: usize,
    pub weights_path: PathBuf,
    pub topology: Topology,
    pub black: SearchConfig,
    pub white: SearchConfig,
    /// Seed of the trainer and, offset per game, of both engines.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let side = SearchConfig {
            training: true,
            ..SearchConfig::default()
        };
        Self {
            learning_rate: 0.1,
            samples_per_transition: 10,
            save_interval: 10,
            weights_path: PathBuf::from("amazons.nn"),
            topology: Topology::default(),
            black: side.clone(),
            white: side,
            seed: None,
        }
    }
}

impl TrainingConfig {
    fn side(&self, color: Color) -> &SearchConfig {
        match color {
            Color::Black => &self.black,
            Color::White => &self.white,
        }
    }
}

/// Black-favoring target of a finished game: black's share of reachable
/// cells mapped to `[-1, 1]`, or `0` when nothing is reachable.
#[must_use]
pub fn training_target(points: Points) -> f32 {
    points.black_total_ratio() * 2.0 - 1.0
}

/// Running totals over the games played by a [`Trainer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub games: usize,
    pub black_wins: usize,
    pub white_wins: usize,
    pub target_sum: f64,
    pub error_sum: f64,
    pub error_count: usize,
    /// Mean RMS error of the most recent game that trained anything.
    pub last_error: Option<f32>,
}

impl TrainingStats {
    #[must_use]
    pub fn draws(&self) -> usize {
        self.games - self.black_wins - self.white_wins
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_target(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.target_sum / self.games as f64
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_error(&self) -> Option<f64> {
        (self.error_count > 0).then(|| self.error_sum / self.error_count as f64)
    }

    fn record(&mut self, summary: &GameSummary) {
        self.games += 1;
        match summary.outcome.winner() {
            Some(Color::Black) => self.black_wins += 1,
            Some(Color::White) => self.white_wins += 1,
            None => {}
        }
        self.target_sum += f64::from(summary.target);
        if let Some(error) = summary.error {
            self.error_sum += f64::from(error);
            self.error_count += 1;
            self.last_error = Some(error);
        }
    }
}

/// Result of one training game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameSummary {
    /// One-based game number.
    pub game: usize,
    pub outcome: GameOutcome,
    pub target: f32,
    /// Mean RMS error over the game's training steps, `None` when the game
    /// had no moves to learn from.
    pub error: Option<f32>,
    /// Whether the weights were saved after this game.
    pub saved: bool,
}

/// Self-play training loop around one network.
#[derive(Debug)]
pub struct Trainer {
    config: TrainingConfig,
    network: NeuralNetwork,
    origin: WeightOrigin,
    game: Game,
    rng: Pcg32,
    stats: TrainingStats,
}

impl Trainer {
    /// Loads the network from [`TrainingConfig::weights_path`], or creates
    /// and saves fresh weights when the file is missing or does not fit the
    /// topology.
    pub fn new(config: TrainingConfig) -> Result<Self, NetworkError> {
        let mut rng = seeded_rng(config.seed);
        let (network, origin) =
            NeuralNetwork::load_or_initialize(&config.weights_path, config.topology, &mut rng)?;
        Ok(Self::from_parts(config, network, origin, rng))
    }

    /// Trains `network` without loading it from disk.
    #[must_use]
    pub fn with_network(config: TrainingConfig, network: NeuralNetwork) -> Self {
        let rng = seeded_rng(config.seed);
        Self::from_parts(config, network, WeightOrigin::Loaded, rng)
    }

    fn from_parts(
        config: TrainingConfig,
        network: NeuralNetwork,
        origin: WeightOrigin,
        rng: Pcg32,
    ) -> Self {
        Self {
            config,
            network,
            origin,
            game: Game::new(),
            rng,
            stats: TrainingStats::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    #[must_use]
    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    /// How the network was obtained when the trainer was created.
    #[must_use]
    pub fn weight_origin(&self) -> &WeightOrigin {
        &self.origin
    }

    #[must_use]
    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Events of every game played from now on.
    pub fn subscribe(&mut self) -> Receiver<GameEvent> {
        self.game.subscribe()
    }

    /// Plays one self-play game from the initial position and trains on it.
    pub fn run_game(&mut self) -> Result<GameSummary, NetworkError> {
        let game_index = self.stats.games;
        self.game.reset();

        let (trajectory, outcome) = {
            let black = engine(&self.config, &self.network, Color::Black, game_index)?;
            let white = engine(&self.config, &self.network, Color::White, game_index)?;
            SelfPlay::new(black, white).play_game(&mut self.game)
        };

        let target = training_target(outcome.points);
        let error = self.learn(&trajectory, target)?;

        let game = game_index + 1;
        let saved = self.config.save_interval > 0 && game % self.config.save_interval == 0;
        if saved {
            self.save()?;
        }

        let summary = GameSummary {
            game,
            outcome,
            target,
            error,
            saved,
        };
        self.stats.record(&summary);
        Ok(summary)
    }

    /// Trains on moves sampled from `trajectory` and returns the mean RMS
    /// error, or `None` when the trajectory has no moves.
    pub fn learn(&mut self, trajectory: &Trajectory, target: f32) -> Result<Option<f32>, NetworkError> {
        let transitions = trajectory.transition_count();
        let samples = transitions * self.config.samples_per_transition;
        if samples == 0 {
            return Ok(None);
        }

        let target = [target];
        let mut error_sum = 0.0;
        for _ in 0..samples {
            let index = self.rng.random_range(0..transitions);
            let Some(request) = trajectory.transition(index) else {
                continue;
            };
            let features = board_feature::encode(&request);
            error_sum += self
                .network
                .train(&features, &target, self.config.learning_rate)?;
        }
        #[expect(clippy::cast_precision_loss)]
        let mean = error_sum / samples as f32;
        Ok(Some(mean))
    }

    /// Writes the weights to [`TrainingConfig::weights_path`].
    pub fn save(&self) -> Result<(), NetworkError> {
        self.network.save(&self.config.weights_path)
    }
}

/// Search engine for one side of game number `game_index`.
fn engine<'a>(
    config: &TrainingConfig,
    network: &'a NeuralNetwork,
    color: Color,
    game_index: usize,
) -> Result<SearchEngine<'a>, NetworkError> {
    let side = config.side(color);
    let evaluator = CompositeEvaluator::neural(network, side.use_score_ratio)?;
    let seed = config
        .seed
        .map(|seed| seed.wrapping_add(2 * game_index as u64 + u64::from(color.is_white())))
        .or(side.seed);
    let config = SearchConfig {
        seed,
        ..side.clone()
    };
    Ok(SearchEngine::new(Box::new(evaluator), config))
}

fn seeded_rng(seed: Option<u64>) -> Pcg32 {
    match seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_seed(rand::rng().random()),
    }
}
