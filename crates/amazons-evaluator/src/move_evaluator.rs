//! Scoring a single move.
//!
//! A [`MoveEvaluator`] looks at the position before and after a move and
//! returns a black-favoring score. Two strategies are provided and combined by
//! weighted addition in [`CompositeEvaluator`]:
//!
//! - [`NeuralMoveEvaluator`] - the learned score: the move's
//!   [`board_feature`](crate::board_feature) encoding through a
//!   [`NeuralNetwork`]
//! - [`ScoreRatioEvaluator`] - the change in black's share of reachable and
//!   exclusively owned territory
//!
//! The territory heuristic rewards moves that grab space regardless of how
//! well the network is trained, so search does something sensible before
//! training converges.

use std::fmt;

use amazons_engine::{CellBoard, ChamberMap, Color, GameBoard};

use crate::{
    board_feature::{self, FEATURE_COUNT},
    neural_network::{NetworkError, NeuralNetwork},
};

/// Weight of [`ScoreRatioEvaluator`] next to the network score.
pub const SCORE_RATIO_WEIGHT: f32 = 10.0;

/// Cells and chambers of one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub cells: CellBoard,
    pub chambers: ChamberMap,
}

impl Snapshot {
    #[must_use]
    pub fn of(board: &GameBoard) -> Self {
        Self {
            cells: *board.cells(),
            chambers: *board.chambers(),
        }
    }
}

/// Positions around a move, captured by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationRequest {
    /// Color that made the move.
    pub mover: Color,
    pub before: Snapshot,
    pub after: Snapshot,
}

impl EvaluationRequest {
    #[must_use]
    pub fn new(mover: Color, before: &GameBoard, after: &GameBoard) -> Self {
        Self {
            mover,
            before: Snapshot::of(before),
            after: Snapshot::of(after),
        }
    }
}

/// Scores moves.
pub trait MoveEvaluator: fmt::Debug + Send + Sync {
    /// Returns a black-favoring score: positive is good for black.
    fn evaluate(&self, request: &EvaluationRequest) -> f32;
}

/// Learned move score from a network's first output.
#[derive(Debug, Clone, Copy)]
pub struct NeuralMoveEvaluator<'a> {
    network: &'a NeuralNetwork,
}

impl<'a> NeuralMoveEvaluator<'a> {
    /// Wraps `network`, which must take [`FEATURE_COUNT`] inputs and have at
    /// least one output.
    pub fn new(network: &'a NeuralNetwork) -> Result<Self, NetworkError> {
        let topology = network.topology();
        if topology.input_size != FEATURE_COUNT {
            return Err(NetworkError::DimensionMismatch {
                expected: FEATURE_COUNT,
                actual: topology.input_size,
            });
        }
        if topology.output_size == 0 {
            return Err(NetworkError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        Ok(Self { network })
    }
}

impl MoveEvaluator for NeuralMoveEvaluator<'_> {
    fn evaluate(&self, request: &EvaluationRequest) -> f32 {
        let features = board_feature::encode(request);
        match self.network.forward(&features) {
            Ok(output) => output[0],
            // Checked in `new`; a mismatch here is a broken feature encoding.
            Err(e) => panic!("feature encoding does not fit the network: {e}"),
        }
    }
}

/// Change in black's territory share, `(after - before) / 4`.
///
/// The share of a position is black's fraction of all reachable cells plus
/// black's fraction of all exclusively owned cells, so the result lies in
/// `[-0.5, 0.5]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreRatioEvaluator;

impl ScoreRatioEvaluator {
    fn share(chambers: &ChamberMap) -> f32 {
        let points = chambers.points();
        points.black_total_ratio() + points.black_exclusive_ratio()
    }
}

impl MoveEvaluator for ScoreRatioEvaluator {
    fn evaluate(&self, request: &EvaluationRequest) -> f32 {
        (Self::share(&request.after.chambers) - Self::share(&request.before.chambers)) / 4.0
    }
}

/// Weighted sum of evaluators.
#[derive(Debug, Default)]
pub struct CompositeEvaluator<'a> {
    parts: Vec<(f32, Box<dyn MoveEvaluator + 'a>)>,
}

impl<'a> CompositeEvaluator<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The network score, plus the territory heuristic weighted by
    /// [`SCORE_RATIO_WEIGHT`] when `use_score_ratio` is set.
    pub fn neural(network: &'a NeuralNetwork, use_score_ratio: bool) -> Result<Self, NetworkError> {
        let composite = Self::new().with(1.0, NeuralMoveEvaluator::new(network)?);
        Ok(if use_score_ratio {
            composite.with(SCORE_RATIO_WEIGHT, ScoreRatioEvaluator)
        } else {
            composite
        })
    }

    #[must_use]
    pub fn with<E>(mut self, weight: f32, evaluator: E) -> Self
    where
        E: MoveEvaluator + 'a,
    {
        self.parts.push((weight, Box::new(evaluator)));
        self
    }
}

impl MoveEvaluator for CompositeEvaluator<'_> {
    fn evaluate(&self, request: &EvaluationRequest) -> f32 {
        self.parts
            .iter()
            .map(|(weight, evaluator)| weight * evaluator.evaluate(request))
            .sum()
    }
}
