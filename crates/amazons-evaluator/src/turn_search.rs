//! Turn search: picking a move for the side to move.
//!
//! # How It Works
//!
//! 1. **Enumerate** - ask the board for every legal move. No moves means the
//!    turn is skipped.
//! 2. **Mode** - in training mode, or when a per-turn draw falls under the
//!    configured random probability, a uniformly random move is played.
//! 3. **Search** - otherwise every (depth, move) pair becomes a task for a
//!    bounded pool of worker threads, shallow depths first. Each task clones
//!    the board, plays the move and scores it (see below). Results are sent
//!    over a channel as they complete.
//! 4. **Wait** - the turn always lasts the full time budget, measured from the
//!    start of the turn. When the budget runs out the pool is cancelled;
//!    tasks still running drop their work and report nothing.
//! 5. **Select** - each move is ranked by its deepest completed score, the
//!    best rank wins and equal ranks keep the lowest move index. Without any
//!    result a random move is played.
//!
//! # Scoring
//!
//! At depth 0 a move is scored by the [`MoveEvaluator`] directly. At depth
//! `d > 0` the score is the *average* over every opponent reply of that
//! reply's depth `d - 1` score. This is an expectation search, not minimax:
//! the opponent is modelled as playing any legal move with equal weight, which
//! smooths the estimate instead of assuming a worst case.
//!
//! Scores are black-favoring; the rank flips them to the mover's side and
//! subtracts [`SELF_CONTAINMENT_PENALTY`] when the moving queen already sits
//! in a chamber no opponent queen can reach
//! ([`ChamberMap::is_sealed`](amazons_engine::ChamberMap::is_sealed)).

use std::{
    num::NonZero,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        mpsc,
    },
    thread,
    time::Duration,
};

use amazons_engine::{Game, GameBoard, InvalidMoveError, Move};
use rand::{Rng as _, SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::move_evaluator::{EvaluationRequest, MoveEvaluator};

/// Rank penalty, in score units, for moving a queen that is already alone in
/// its chamber.
pub const SELF_CONTAINMENT_PENALTY: f32 = 1.0;

const RANK_SCALE: f32 = 1_000_000.0;
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Parameters of a [`SearchEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wall-clock length of a searched turn.
    pub time_budget_ms: u64,
    /// Chance of playing a random move instead of searching.
    pub random_probability: f64,
    /// Deepest ply searched; `None` uses the number of candidate moves.
    pub max_depth: Option<usize>,
    /// Whether the search engine's evaluator blends in the territory
    /// heuristic. Read by whoever builds the evaluator.
    pub use_score_ratio: bool,
    /// Training mode plays random moves to explore the game tree.
    pub training: bool,
    /// Worker threads; `None` uses the available parallelism.
    pub worker_count: Option<usize>,
    /// Seed of the engine's random source; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: 3000,
            random_probability: 0.0,
            max_depth: None,
            use_score_ratio: true,
            training: false,
            worker_count: None,
            seed: None,
        }
    }
}

/// A [`SearchConfig`] whose random probability is not a number in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display("random probability must be within [0, 1], got {value}")]
pub struct InvalidProbabilityError {
    #[error(not(source))]
    pub value: f64,
}

impl SearchConfig {
    #[must_use]
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    /// Checks values that deserialization and CLI parsing let through.
    pub fn validate(&self) -> Result<(), InvalidProbabilityError> {
        if (0.0..=1.0).contains(&self.random_probability) {
            Ok(())
        } else {
            Err(InvalidProbabilityError {
                value: self.random_probability,
            })
        }
    }

    /// Random probability usable as a draw; values rejected by
    /// [`validate`](Self::validate) never trigger a random move.
    fn draw_probability(&self) -> f64 {
        if self.validate().is_ok() {
            self.random_probability
        } else {
            0.0
        }
    }

    fn worker_count(&self) -> usize {
        self.worker_count
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, NonZero::get))
            .max(1)
    }
}

/// Score of one candidate move at one depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMove {
    pub index: usize,
    pub depth: usize,
    /// Black-favoring score.
    pub score: f32,
}

/// How a move was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Decision {
    /// Picked by search; `depth` is the ply of the winning score and `scored`
    /// the number of results collected over all moves.
    Searched {
        depth: usize,
        rank: i64,
        scored: usize,
    },
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnChoice {
    pub mv: Move,
    pub decision: Decision,
}

/// What [`SearchEngine::play_turn`] did with the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TurnOutcome {
    /// The chosen move was committed.
    Played(TurnChoice),
    /// The side to move had no legal move and the turn was skipped.
    NoMoves,
    /// The chosen move failed validation and the turn was skipped.
    Rejected(InvalidMoveError),
}

impl TurnOutcome {
    #[must_use]
    pub fn choice(self) -> Option<TurnChoice> {
        match self {
            Self::Played(choice) => Some(choice),
            Self::NoMoves | Self::Rejected(_) => None,
        }
    }
}

/// Picks and plays moves for one side.
#[derive(Debug)]
pub struct SearchEngine<'a> {
    evaluator: Box<dyn MoveEvaluator + 'a>,
    config: SearchConfig,
    rng: Pcg32,
}

impl<'a> SearchEngine<'a> {
    #[must_use]
    pub fn new(evaluator: Box<dyn MoveEvaluator + 'a>, config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_seed(rand::rng().random()),
        };
        Self {
            evaluator,
            config,
            rng,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Chooses a move for the side to move, or `None` when it has none.
    pub fn choose_move(&mut self, board: &GameBoard) -> Option<TurnChoice> {
        let moves = board.possible_moves();
        if moves.is_empty() {
            return None;
        }

        let random_probability = self.config.draw_probability();
        if !self.config.training && !self.rng.random_bool(random_probability) {
            let results = self.search(board, &moves);
            if let Some((index, depth, rank)) = select(board, &moves, &results) {
                return Some(TurnChoice {
                    mv: moves[index],
                    decision: Decision::Searched {
                        depth,
                        rank,
                        scored: results.len(),
                    },
                });
            }
        }

        let mv = *moves.choose(&mut self.rng)?;
        Some(TurnChoice {
            mv,
            decision: Decision::Random,
        })
    }

    /// Chooses a move and commits it to `game`, skipping the turn when
    /// that is not possible.
    pub fn play_turn(&mut self, game: &mut Game) -> TurnOutcome {
        let Some(choice) = self.choose_move(game.board()) else {
            game.skip_turn();
            return TurnOutcome::NoMoves;
        };
        if let Err(e) = game.apply(choice.mv) {
            game.skip_turn();
            return TurnOutcome::Rejected(e);
        }
        TurnOutcome::Played(choice)
    }

    /// Scores `moves` in parallel until the time budget runs out.
    fn search(&self, board: &GameBoard, moves: &[Move]) -> Vec<ScoredMove> {
        let move_count = moves.len();
        let max_depth = self.config.max_depth.unwrap_or(move_count);
        let task_count = move_count.saturating_mul(max_depth.saturating_add(1));
        let budget = self.config.time_budget();

        let next_task = AtomicUsize::new(0);
        let cancelled = AtomicBool::new(false);
        let (tx, rx) = mpsc::channel();

        thread::scope(|s| {
            for _ in 0..self.config.worker_count() {
                let tx = tx.clone();
                let next_task = &next_task;
                let cancelled = &cancelled;
                s.spawn(move || {
                    while !cancelled.load(Ordering::Relaxed) {
                        let task = next_task.fetch_add(1, Ordering::Relaxed);
                        if task >= task_count {
                            break;
                        }
                        let (depth, index) = (task / move_count, task % move_count);
                        let Some(score) = self.score_move(board, moves[index], depth, cancelled)
                        else {
                            break;
                        };
                        if tx.send(ScoredMove { index, depth, score }).is_err() {
                            break;
                        }
                    }
                });
            }

            loop {
                let elapsed = board.elapsed_turn();
                if elapsed >= budget {
                    break;
                }
                thread::sleep(POLL_INTERVAL.min(budget - elapsed));
            }
            cancelled.store(true, Ordering::Relaxed);
        });

        drop(tx);
        rx.into_iter().collect()
    }

    /// Black-favoring score of `mv` searched `depth` plies deep, or `None`
    /// when cancelled.
    fn score_move(
        &self,
        board: &GameBoard,
        mv: Move,
        depth: usize,
        cancelled: &AtomicBool,
    ) -> Option<f32> {
        if cancelled.load(Ordering::Relaxed) {
            return None;
        }
        let mut after = board.clone();
        after.apply_move(mv).ok()?;

        let replies = if depth == 0 {
            vec![]
        } else {
            after.possible_moves()
        };
        if replies.is_empty() {
            let request = EvaluationRequest::new(board.turn(), board, &after);
            return Some(self.evaluator.evaluate(&request));
        }

        let mut sum = 0.0;
        for reply in &replies {
            sum += self.score_move(&after, *reply, depth - 1, cancelled)?;
        }
        #[expect(clippy::cast_precision_loss)]
        let reply_count = replies.len() as f32;
        Some(sum / reply_count)
    }
}

/// Rank of a black-favoring `score` for the side to move on `board`.
#[expect(clippy::cast_possible_truncation)]
fn rank(board: &GameBoard, mv: Move, score: f32) -> i64 {
    let mover = board.turn();
    let mut value = score * mover.sign();
    if board.chambers().is_sealed(mv.from, mover) {
        value -= SELF_CONTAINMENT_PENALTY;
    }
    (value * RANK_SCALE) as i64
}

/// Best `(index, depth, rank)` over the deepest result of each move.
fn select(board: &GameBoard, moves: &[Move], results: &[ScoredMove]) -> Option<(usize, usize, i64)> {
    let mut deepest: Vec<Option<ScoredMove>> = vec![None; moves.len()];
    for result in results {
        let slot = &mut deepest[result.index];
        if slot.is_none_or(|best| result.depth > best.depth) {
            *slot = Some(*result);
        }
    }

    let mut best: Option<(usize, usize, i64)> = None;
    for result in deepest.into_iter().flatten() {
        let rank = rank(board, moves[result.index], result.score);
        if best.is_none_or(|(_, _, best_rank)| rank > best_rank) {
            best = Some((result.index, result.depth, rank));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use amazons_engine::{CellBoard, Color, Position};

    use super::*;

    /// Scores a move by black's exclusive territory after it.
    #[derive(Debug)]
    struct Territory;

    impl MoveEvaluator for Territory {
        #[expect(clippy::cast_precision_loss)]
        fn evaluate(&self, request: &EvaluationRequest) -> f32 {
            let points = request.after.chambers.points();
            (points.black.exclusive as f32 - points.white.exclusive as f32) / 100.0
        }
    }

    /// Scores a move by the exclusive territory difference once no chamber
    /// is contested, and zero before that.
    #[derive(Debug)]
    struct Decided;

    impl MoveEvaluator for Decided {
        fn evaluate(&self, request: &EvaluationRequest) -> f32 {
            if request.after.chambers.is_finished() {
                Territory.evaluate(request)
            } else {
                0.0
            }
        }
    }

    /// Scores a move by where the arrow lands.
    #[derive(Debug)]
    struct ArrowRow;

    impl MoveEvaluator for ArrowRow {
        #[expect(clippy::cast_precision_loss)]
        fn evaluate(&self, request: &EvaluationRequest) -> f32 {
            let arrow = Position::all()
                .find(|pos| {
                    request.before.cells.get(*pos).is_empty()
                        && request.after.cells.get(*pos).is_arrow()
                })
                .or_else(|| {
                    Position::all().find(|pos| {
                        request.before.cells.get(*pos).is_queen()
                            && request.after.cells.get(*pos).is_arrow()
                    })
                });
            arrow.map_or(0.0, |pos| pos.row() as f32)
        }
    }

    fn config(time_budget_ms: u64, max_depth: Option<usize>) -> SearchConfig {
        SearchConfig {
            time_budget_ms,
            max_depth,
            worker_count: Some(2),
            seed: Some(42),
            ..SearchConfig::default()
        }
    }

    fn sealing_board() -> GameBoard {
        let cells = CellBoard::from_ascii(
            r"
            ......b...
            ......b.W.
            ......b...
            ......b...
            ......b...
            ......b...
            ......b...
            ......bbb.
            B.........
            ..........
            ",
        );
        GameBoard::from_cells(cells, Color::White)
    }

    #[test]
    fn test_config_defaults_and_serde() {
        let config = SearchConfig::default();
        assert_eq!(config.time_budget(), Duration::from_secs(3));
        assert!(config.use_score_ratio);
        assert!(!config.training);

        let parsed: SearchConfig =
            serde_json::from_str(r#"{ "time_budget_ms": 50, "seed": 1 }"#).unwrap();
        assert_eq!(parsed.time_budget_ms, 50);
        assert_eq!(parsed.seed, Some(1));
        assert_eq!(parsed.max_depth, None);
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_search_prefers_territory() {
        // Black can lock the white queen into the top-right room with an
        // arrow at (7, 9); any other move leaves one shared chamber.
        let board = GameBoard::from_cells(*sealing_board().cells(), Color::Black);
        let mut engine = SearchEngine::new(Box::new(Decided), config(1500, Some(0)));
        let choice = engine.choose_move(&board).unwrap();

        assert_eq!(choice.mv.arrow, Position::new(7, 9));
        assert!(matches!(
            choice.decision,
            Decision::Searched { depth: 0, rank, .. } if rank > 0
        ));
    }

    #[test]
    fn test_ties_keep_first_move() {
        let board = GameBoard::new();
        let moves = board.possible_moves();
        let mut engine = SearchEngine::new(Box::new(ArrowRow), config(200, Some(0)));
        let choice = engine.choose_move(&board).unwrap();

        // White minimizes the arrow row; the first move shooting into row 0
        // is the very first move generated.
        assert_eq!(choice.mv, moves[0]);
    }

    #[test]
    fn test_turn_lasts_the_budget() {
        let board = GameBoard::new();
        let started = Instant::now();
        let mut engine = SearchEngine::new(Box::new(ArrowRow), config(150, Some(0)));
        engine.choose_move(&board).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(140));
    }

    #[test]
    fn test_expectation_averages_replies() {
        let board = sealing_board();
        let engine = SearchEngine::new(Box::new(Territory), config(100, Some(1)));
        let cancelled = AtomicBool::new(false);
        let mv = Move::from_tuple([1, 8, 2, 9, 7, 9]);

        let mut after = board.clone();
        after.apply_move(mv).unwrap();
        let replies = after.possible_moves();
        let expected = replies
            .iter()
            .map(|reply| {
                let mut next = after.clone();
                next.apply_move(*reply).unwrap();
                Territory.evaluate(&EvaluationRequest::new(Color::Black, &after, &next))
            })
            .sum::<f32>()
            / replies.len() as f32;

        let score = engine.score_move(&board, mv, 1, &cancelled).unwrap();
        assert!((score - expected).abs() < 1e-5);

        cancelled.store(true, Ordering::Relaxed);
        assert_eq!(engine.score_move(&board, mv, 1, &cancelled), None);
    }

    #[test]
    fn test_select_uses_deepest_result_and_penalty() {
        let board = sealing_board();
        let moves = [
            Move::from_tuple([1, 8, 2, 9, 7, 9]),
            Move::from_tuple([1, 8, 1, 9, 0, 9]),
        ];
        let results = [
            ScoredMove { index: 0, depth: 0, score: -0.5 },
            ScoredMove { index: 0, depth: 1, score: 0.1 },
            ScoredMove { index: 1, depth: 0, score: -0.2 },
        ];
        // Move 0 is ranked by its depth-1 score, so move 1 wins for white.
        assert_eq!(select(&board, &moves, &results), Some((1, 0, 200_000)));
        assert_eq!(select(&board, &moves, &[]), None);

        // The white queen at (1, 8) still shares its chamber with black.
        assert_eq!(rank(&board, moves[1], -0.2), 200_000);

        // A black queen alone in its room is penalized.
        let cells = CellBoard::from_ascii(
            r"
            B.b.......
            ..b.......
            bbb.......
            ..........
            ..........
            ..........
            ..........
            .......W..
            ..........
            .........B
            ",
        );
        let board = GameBoard::from_cells(cells, Color::Black);
        let contained = Move::from_tuple([0, 0, 1, 1, 0, 0]);
        let open = Move::from_tuple([9, 9, 8, 8, 9, 9]);
        assert_eq!(rank(&board, contained, 0.5), -500_000);
        assert_eq!(rank(&board, open, 0.5), 500_000);
    }

    #[test]
    fn test_contested_queens_are_not_penalized() {
        let board = GameBoard::new();
        let moves = board.possible_moves();
        assert_eq!(rank(&board, moves[0], 0.0), 0);
        assert!(
            moves
                .iter()
                .all(|mv| rank(&board, *mv, -0.25) == 250_000)
        );
    }

    #[test]
    fn test_invalid_random_probability() {
        for value in [f64::NAN, f64::INFINITY, -0.1, 1.5] {
            let config = SearchConfig {
                random_probability: value,
                ..SearchConfig::default()
            };
            assert!(config.validate().is_err(), "{value} must be rejected");
        }
        for value in [0.0, 0.3, 1.0] {
            let config = SearchConfig {
                random_probability: value,
                ..SearchConfig::default()
            };
            assert_eq!(config.validate(), Ok(()));
        }

        // An engine built from an unchecked config searches instead of
        // panicking on the draw.
        let config = SearchConfig {
            random_probability: f64::NAN,
            ..config(20, Some(0))
        };
        let mut engine = SearchEngine::new(Box::new(ArrowRow), config);
        let choice = engine.choose_move(&GameBoard::new()).unwrap();
        assert!(choice.decision.is_searched());
    }

    #[test]
    fn test_unbounded_depth_does_not_overflow() {
        let mut engine = SearchEngine::new(Box::new(ArrowRow), config(50, Some(usize::MAX)));
        let choice = engine.choose_move(&GameBoard::new()).unwrap();
        assert!(choice.decision.is_searched());
    }

    #[test]
    fn test_training_plays_random_moves() {
        let mut game = Game::new();
        let config = SearchConfig {
            training: true,
            ..config(10_000, None)
        };
        let mut engine = SearchEngine::new(Box::new(ArrowRow), config);
        let started = Instant::now();

        let choice = engine.play_turn(&mut game).choice().unwrap();
        assert!(choice.decision.is_random());
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(game.board().turn(), Color::Black);
    }

    #[test]
    fn test_seeded_random_play_is_deterministic() {
        let play = || {
            let mut game = Game::new();
            let config = SearchConfig {
                random_probability: 1.0,
                ..config(10_000, None)
            };
            let mut engine = SearchEngine::new(Box::new(ArrowRow), config);
            (0..6)
                .filter_map(|_| engine.play_turn(&mut game).choice())
                .map(|choice| choice.mv)
                .collect::<Vec<_>>()
        };
        let first = play();
        assert_eq!(first.len(), 6);
        assert_eq!(first, play());
    }

    #[test]
    fn test_stuck_side_skips_turn() {
        let cells = CellBoard::from_ascii(
            r"
            Bb........
            bb........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            .........W
            ",
        );
        let mut game = Game::from_board(GameBoard::from_cells(cells, Color::Black));
        let mut engine = SearchEngine::new(Box::new(ArrowRow), config(10, None));
        assert_eq!(engine.play_turn(&mut game), TurnOutcome::NoMoves);
        assert_eq!(game.board().turn(), Color::White);
    }
}
