//! The engine playing against itself.
//!
//! [`SelfPlay`] drives one [`SearchEngine`] per color through a [`Game`] and
//! records the board before every committed move. The recorded
//! [`Trajectory`] is what the [`trainer`](crate::trainer) learns from.

use std::cmp::Ordering;

use amazons_engine::{Color, Game, GameBoard, Points};
use amazons_evaluator::{
    move_evaluator::EvaluationRequest,
    turn_search::{SearchEngine, TurnOutcome},
};

/// Upper bound on committed moves per side in one game.
///
/// The initial position has 92 empty cells and every move fills one with an
/// arrow, so a game cannot legitimately run longer.
pub const MAX_PLIES_PER_SIDE: usize = 92;

/// Consecutive skipped turns after which a game is abandoned.
const MAX_CONSECUTIVE_SKIPS: usize = 2;

/// Boards of one game: the position before each committed move, followed by
/// the final position.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    states: Vec<GameBoard>,
}

impl Trajectory {
    #[must_use]
    pub fn states(&self) -> &[GameBoard] {
        &self.states
    }

    /// Number of recorded moves.
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    /// The `index`-th recorded move as an evaluation request.
    #[must_use]
    pub fn transition(&self, index: usize) -> Option<EvaluationRequest> {
        let before = self.states.get(index)?;
        let after = self.states.get(index + 1)?;
        Some(EvaluationRequest::new(before.turn(), before, after))
    }

    #[must_use]
    pub fn final_state(&self) -> Option<&GameBoard> {
        self.states.last()
    }
}

/// How a self-play game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub points: Points,
    /// Committed moves, both colors together.
    pub plies: usize,
    /// `false` when the game stopped on skips or the ply cap instead.
    pub finished: bool,
    /// Generated moves that failed validation. Anything but zero is a bug
    /// in move generation.
    pub rejected: usize,
}

impl GameOutcome {
    /// Color with more exclusively owned cells, `None` on a tie.
    #[must_use]
    pub fn winner(&self) -> Option<Color> {
        let Points { black, white } = self.points;
        match black.exclusive.cmp(&white.exclusive) {
            Ordering::Greater => Some(Color::Black),
            Ordering::Less => Some(Color::White),
            Ordering::Equal => None,
        }
    }
}

/// Two engines sharing one game.
#[derive(Debug)]
pub struct SelfPlay<'a> {
    black: SearchEngine<'a>,
    white: SearchEngine<'a>,
}

impl<'a> SelfPlay<'a> {
    #[must_use]
    pub fn new(black: SearchEngine<'a>, white: SearchEngine<'a>) -> Self {
        Self { black, white }
    }

    pub fn engine_mut(&mut self, color: Color) -> &mut SearchEngine<'a> {
        match color {
            Color::Black => &mut self.black,
            Color::White => &mut self.white,
        }
    }

    /// Plays `game` from its current position until it is finished, both
    /// sides are stuck, or [`MAX_PLIES_PER_SIDE`] is reached.
    pub fn play_game(&mut self, game: &mut Game) -> (Trajectory, GameOutcome) {
        let mut states = vec![];
        let mut skips = 0;
        let mut rejected = 0;
        while !game.board().is_finished()
            && skips < MAX_CONSECUTIVE_SKIPS
            && states.len() < 2 * MAX_PLIES_PER_SIDE
        {
            let before = game.board().clone();
            match self.engine_mut(before.turn()).play_turn(game) {
                TurnOutcome::Played(_) => {
                    states.push(before);
                    skips = 0;
                }
                TurnOutcome::NoMoves => skips += 1,
                TurnOutcome::Rejected(_) => {
                    rejected += 1;
                    skips += 1;
                }
            }
        }

        let board = game.board();
        let outcome = GameOutcome {
            points: board.points(),
            plies: states.len(),
            finished: board.is_finished(),
            rejected,
        };
        states.push(board.clone());
        (Trajectory { states }, outcome)
    }
}
