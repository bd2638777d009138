use serde::{Deserialize, Serialize};

use super::{COLUMN_COUNT, ROW_COUNT};

/// A cell coordinate.
///
/// Positions are not bounds-checked on construction so that moves received
/// from outside (a remote peer, a test fixture) can be represented and then
/// rejected by validation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("({row}, {col})")]
pub struct Position {
    row: usize,
    col: usize,
}

impl Position {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn row(self) -> usize {
        self.row
    }

    #[must_use]
    pub const fn col(self) -> usize {
        self.col
    }

    #[must_use]
    pub const fn is_on_board(self) -> bool {
        self.row < ROW_COUNT && self.col < COLUMN_COUNT
    }

    /// Iterates over every board position in row-major order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..ROW_COUNT).flat_map(|row| (0..COLUMN_COUNT).map(move |col| Self::new(row, col)))
    }

    /// Position `distance` steps away in `direction`, if still on the board.
    #[must_use]
    pub fn step(self, direction: Direction, distance: usize) -> Option<Self> {
        let row = offset(self.row, direction.dr, distance)?;
        let col = offset(self.col, direction.dc, distance)?;
        let pos = Self::new(row, col);
        pos.is_on_board().then_some(pos)
    }

    /// Positions along `direction`, nearest first, up to the board edge.
    pub fn ray(self, direction: Direction) -> impl Iterator<Item = Self> {
        (1..).map_while(move |distance| self.step(direction, distance))
    }

    /// 8-connected neighbors on the board.
    pub fn neighbors(self) -> impl Iterator<Item = Self> {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.step(direction, 1))
    }
}

fn offset(base: usize, delta: i8, distance: usize) -> Option<usize> {
    match delta {
        0 => Some(base),
        1 => base.checked_add(distance),
        _ => base.checked_sub(distance),
    }
}

/// One of the eight compass directions a queen or arrow travels along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    dr: i8,
    dc: i8,
}

impl Direction {
    /// All directions, row delta major then column delta, each ascending.
    ///
    /// Move enumeration follows this order, so it must stay fixed.
    pub const ALL: [Self; 8] = [
        Self::new(-1, -1),
        Self::new(-1, 0),
        Self::new(-1, 1),
        Self::new(0, -1),
        Self::new(0, 1),
        Self::new(1, -1),
        Self::new(1, 0),
        Self::new(1, 1),
    ];

    const fn new(dr: i8, dc: i8) -> Self {
        Self { dr, dc }
    }

    /// Direction and distance of a straight or diagonal line from `from` to `to`.
    ///
    /// Returns `None` when the two positions are equal or not aligned.
    #[must_use]
    pub fn between(from: Position, to: Position) -> Option<(Self, usize)> {
        let row_distance = from.row.abs_diff(to.row);
        let col_distance = from.col.abs_diff(to.col);
        let distance = usize::max(row_distance, col_distance);
        if distance == 0 {
            return None;
        }
        if row_distance != 0 && col_distance != 0 && row_distance != col_distance {
            return None;
        }
        let direction = Self::new(signum(from.row, to.row), signum(from.col, to.col));
        Some((direction, distance))
    }
}

fn signum(from: usize, to: usize) -> i8 {
    match to.cmp(&from) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}
