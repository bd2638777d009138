use serde::{Deserialize, Serialize};

use super::Position;

/// A complete turn: a queen move followed by an arrow shot from the
/// queen's destination.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("{from} -> {to} / {arrow}")]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub arrow: Position,
}

impl Move {
    #[must_use]
    pub const fn new(from: Position, to: Position, arrow: Position) -> Self {
        Self { from, to, arrow }
    }

    /// Builds a move from `(from_row, from_col, to_row, to_col, arrow_row, arrow_col)`.
    #[must_use]
    pub const fn from_tuple(values: [usize; 6]) -> Self {
        let [fr, fc, tr, tc, ar, ac] = values;
        Self::new(
            Position::new(fr, fc),
            Position::new(tr, tc),
            Position::new(ar, ac),
        )
    }

    #[must_use]
    pub const fn to_tuple(self) -> [usize; 6] {
        [
            self.from.row(),
            self.from.col(),
            self.to.row(),
            self.to.col(),
            self.arrow.row(),
            self.arrow.col(),
        ]
    }
}
