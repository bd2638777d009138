//! Move evaluation and search for Game of Amazons.
//!
//! This crate turns a [`GameBoard`](amazons_engine::GameBoard) into a move
//! decision. It is organised in three levels:
//!
//! 1. **Network** ([`neural_network`]) - a small feedforward tanh network with
//!    backpropagation training and a raw big-endian weight file format.
//!
//! 2. **Move Evaluation** ([`move_evaluator`]) - scores a single move from the
//!    board and chamber snapshots before and after it. The learned scorer
//!    feeds [`board_feature`] encodings to the network; a closed-form
//!    territory heuristic can be blended in by addition.
//!
//! 3. **Turn Search** ([`turn_search`]) - evaluates every candidate move in
//!    parallel under a wall-clock budget, deepening ply by ply, and picks the
//!    best-ranked move for the side to move.
//!
//! # Architecture
//!
//! ```text
//! Turn Search (pick a move for the current turn)
//!     ↓ uses
//! Move Evaluation (score one before/after pair)
//!     ↓ uses
//! Board Features → Neural Network
//! ```
//!
//! # Score Convention
//!
//! Every [`MoveEvaluator`](move_evaluator::MoveEvaluator) returns a
//! black-favoring score, roughly in `[-1.0, 1.0]` for the network alone:
//! positive values favor black, negative values favor white. The search
//! multiplies by the mover's sign before ranking, so the same evaluator serves
//! both sides.
//!
//! # Example
//!
//! ```rust,no_run
//! use amazons_engine::GameBoard;
//! use amazons_evaluator::{
//!     board_feature::FEATURE_COUNT,
//!     move_evaluator::{CompositeEvaluator, NeuralMoveEvaluator, ScoreRatioEvaluator},
//!     neural_network::{NeuralNetwork, Topology},
//!     turn_search::{SearchConfig, SearchEngine},
//! };
//!
//! let mut rng = rand::rng();
//! let network = NeuralNetwork::random(Topology::default(), &mut rng);
//! let evaluator = CompositeEvaluator::new()
//!     .with(1.0, NeuralMoveEvaluator::new(&network).unwrap())
//!     .with(10.0, ScoreRatioEvaluator);
//!
//! let mut engine = SearchEngine::new(Box::new(evaluator), SearchConfig::default());
//! let board = GameBoard::new();
//! if let Some(choice) = engine.choose_move(&board) {
//!     println!("{}", choice.mv);
//! }
//! # assert_eq!(Topology::default().input_size, FEATURE_COUNT);
//! ```

pub mod board_feature;
pub mod move_evaluator;
pub mod neural_network;
pub mod turn_search;
