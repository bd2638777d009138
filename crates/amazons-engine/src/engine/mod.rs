//! Game state and turn flow.
//!
//! This module builds the playable game on top of the core data structures:
//!
//! - [`GameBoard`] - cell grid plus side to move, move generation and
//!   validation, and a lazily computed [`ChamberMap`](crate::ChamberMap)
//! - [`Game`] - a [`GameBoard`] that publishes [`GameEvent`]s to subscribers
//!   after every committed change
//!
//! # Game Flow
//!
//! 1. Start from the initial position, white to move
//! 2. The side to move picks one of [`GameBoard::possible_moves`]
//! 3. The move is committed, the turn passes and the chamber cache is cleared
//! 4. A side without legal moves skips its turn
//! 5. The game ends once no chamber is reachable by both colors
//!
//! # Example
//!
//! ```
//! use amazons_engine::{Color, Game};
//!
//! let mut game = Game::new();
//! let events = game.subscribe();
//!
//! assert_eq!(game.board().turn(), Color::White);
//! let mv = game.board().possible_moves()[0];
//! game.apply(mv).unwrap();
//!
//! assert_eq!(game.board().turn(), Color::Black);
//! assert!(events.try_recv().is_ok());
//! ```

pub use self::{game::*, game_board::*};

mod game;
mod game_board;
