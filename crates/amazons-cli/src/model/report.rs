use std::path::PathBuf;

use amazons_engine::{Color, Territory};
use amazons_training::{self_play::GameOutcome, trainer::TrainingStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameRecord {
    pub plies: usize,
    pub finished: bool,
    pub black: Territory,
    pub white: Territory,
    pub winner: Option<Color>,
}

impl From<&GameOutcome> for GameRecord {
    fn from(outcome: &GameOutcome) -> Self {
        Self {
            plies: outcome.plies,
            finished: outcome.finished,
            black: outcome.points.black,
            white: outcome.points.white,
            winner: outcome.winner(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelfPlayReport {
    pub played_at: DateTime<Utc>,
    pub weights_path: PathBuf,
    pub games: Vec<GameRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainingReport {
    pub trained_at: DateTime<Utc>,
    pub weights_path: PathBuf,
    pub games: usize,
    pub black_wins: usize,
    pub white_wins: usize,
    pub draws: usize,
    pub mean_target: f64,
    pub mean_error: Option<f64>,
    pub last_error: Option<f32>,
}

impl TrainingReport {
    pub fn new(weights_path: PathBuf, stats: &TrainingStats) -> Self {
        Self {
            trained_at: Utc::now(),
            weights_path,
            games: stats.games,
            black_wins: stats.black_wins,
            white_wins: stats.white_wins,
            draws: stats.draws(),
            mean_target: stats.mean_target(),
            mean_error: stats.mean_error(),
            last_error: stats.last_error,
        }
    }
}
