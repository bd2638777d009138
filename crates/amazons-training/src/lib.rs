//! Self-play training and match drivers for the Amazons engine.
//!
//! This crate runs whole games on top of `amazons-evaluator`'s search
//! engine:
//!
//! - [`self_play`] - two engines play each other on one
//!   [`Game`](amazons_engine::Game), recording the board before every move
//! - [`trainer`] - turns each finished game into a target and trains the
//!   network on moves sampled from it, saving weights periodically
//! - [`remote`] - plays one side of a game against a peer reached through
//!   the [`RemotePeer`](remote::RemotePeer) trait
//!
//! # How Training Works
//!
//! 1. **Play** - both sides pick moves (randomly by default, to explore)
//!    until no chamber is contested
//! 2. **Target** - black's share of the final territory, mapped to `[-1, 1]`
//! 3. **Learn** - `samples_per_transition` times the number of moves, pick a
//!    random recorded move and run one backpropagation step towards the target
//! 4. **Persist** - every `save_interval` games the weights are written to disk
//!
//! ```text
//! SelfPlay (two SearchEngines)
//!     ↓ produces
//! Trajectory + final Points
//!     ↓ consumed by
//! Trainer → NeuralNetwork::train → weight file
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use amazons_training::trainer::{Trainer, TrainingConfig};
//!
//! let mut trainer = Trainer::new(TrainingConfig::default())?;
//! for _ in 0..100 {
//!     let summary = trainer.run_game()?;
//!     println!("game {}: target {:.3}", summary.game, summary.target);
//! }
//! trainer.save()?;
//! # Ok::<(), amazons_evaluator::neural_network::NetworkError>(())
//! ```

pub mod remote;
pub mod self_play;
pub mod trainer;
