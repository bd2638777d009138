//! Chamber (territory) analysis.
//!
//! A chamber is a maximal 8-connected region of non-arrow cells. Three
//! flood fills are run over the board:
//!
//! 1. **Mixed** - empty cells and all queens are passable. Produces the
//!    chamber labels.
//! 2. **Black** - empty cells and black queens are passable, white queens
//!    are walls. Counts the black queens reaching each region.
//! 3. **White** - the mirror of the black pass.
//!
//! Cells that are walls in a pass get a count of `-1` in that pass; label
//! `0` marks arrow cells. A cell whose black and white counts are both
//! positive lies in a contested chamber, and the game continues exactly
//! while such a cell exists.
//!
//! A queen is a wall in the opponent's pass, so its own cell never says
//! whether the opponent can reach it. The queen counts of the mixed pass are
//! kept for that: they describe the whole chamber around the queen.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{COLUMN_COUNT, Cell, CellBoard, Color, Position, ROW_COUNT};

/// Count assigned to cells that are walls in a single-color pass.
pub const NOT_IN_CHAMBER: i8 = -1;

/// Label assigned to arrow cells.
pub const NO_LABEL: u8 = 0;

type Grid<T> = [[T; COLUMN_COUNT]; ROW_COUNT];

/// Per-cell chamber labels and queen counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChamberMap {
    labels: Grid<u8>,
    black_counts: Grid<i8>,
    white_counts: Grid<i8>,
    mixed_black_counts: Grid<i8>,
    mixed_white_counts: Grid<i8>,
}

impl ChamberMap {
    /// Runs the three flood fills over `board`.
    #[must_use]
    pub fn compute(board: &CellBoard) -> Self {
        let mixed = flood_fill(board, |cell| cell.is_empty() || cell.is_queen());
        let black = flood_fill(board, |cell| cell.is_empty() || cell.is_black_queen());
        let white = flood_fill(board, |cell| cell.is_empty() || cell.is_white_queen());
        Self {
            labels: mixed.labels,
            black_counts: black.black_counts,
            white_counts: white.white_counts,
            mixed_black_counts: mixed.black_counts,
            mixed_white_counts: mixed.white_counts,
        }
    }

    #[must_use]
    pub fn label(&self, pos: Position) -> u8 {
        self.labels[pos.row()][pos.col()]
    }

    /// Black queens reaching the chamber of `pos`, or [`NOT_IN_CHAMBER`].
    #[must_use]
    pub fn black_count(&self, pos: Position) -> i8 {
        self.black_counts[pos.row()][pos.col()]
    }

    /// White queens reaching the chamber of `pos`, or [`NOT_IN_CHAMBER`].
    #[must_use]
    pub fn white_count(&self, pos: Position) -> i8 {
        self.white_counts[pos.row()][pos.col()]
    }

    #[must_use]
    pub fn count(&self, pos: Position, color: Color) -> i8 {
        match color {
            Color::Black => self.black_count(pos),
            Color::White => self.white_count(pos),
        }
    }

    #[must_use]
    pub fn is_contested(&self, pos: Position) -> bool {
        self.black_count(pos) > 0 && self.white_count(pos) > 0
    }

    /// True when `pos` lies in a chamber holding queens of `color` and none
    /// of its opponent, counting queens as passable. Also answers for queen
    /// cells, where the single-color counts cannot.
    #[must_use]
    pub fn is_sealed(&self, pos: Position, color: Color) -> bool {
        let (own, opponent) = match color {
            Color::Black => (self.mixed_black_counts, self.mixed_white_counts),
            Color::White => (self.mixed_white_counts, self.mixed_black_counts),
        };
        own[pos.row()][pos.col()] > 0 && opponent[pos.row()][pos.col()] == 0
    }

    /// Territory counts for both colors.
    #[must_use]
    pub fn points(&self) -> Points {
        let mut points = Points::default();
        for pos in Position::all() {
            let black = self.black_count(pos) > 0;
            let white = self.white_count(pos) > 0;
            if black {
                points.black.total += 1;
                if !white {
                    points.black.exclusive += 1;
                }
            }
            if white {
                points.white.total += 1;
                if !black {
                    points.white.exclusive += 1;
                }
            }
        }
        points
    }

    /// True when no chamber is reachable by both colors.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !Position::all().any(|pos| self.is_contested(pos))
    }
}

/// Cells a color's queens can reach.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    /// Cells in any chamber the color reaches.
    pub total: usize,
    /// Cells in chambers only the color reaches.
    pub exclusive: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Points {
    pub black: Territory,
    pub white: Territory,
}

impl Points {
    #[must_use]
    pub fn get(&self, color: Color) -> Territory {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    /// Black's share of all reachable cells, in `[0, 1]`.
    ///
    /// Cells reachable by both colors are counted for each. Returns `0.5`
    /// when neither color reaches anything.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn black_total_ratio(&self) -> f32 {
        ratio(self.black.total as f32, self.white.total as f32)
    }

    /// Black's share of exclusively owned cells, in `[0, 1]`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn black_exclusive_ratio(&self) -> f32 {
        ratio(self.black.exclusive as f32, self.white.exclusive as f32)
    }
}

fn ratio(black: f32, white: f32) -> f32 {
    let sum = black + white;
    if sum > 0.0 { black / sum } else { 0.5 }
}

struct FillResult {
    labels: Grid<u8>,
    black_counts: Grid<i8>,
    white_counts: Grid<i8>,
}

fn flood_fill<F>(board: &CellBoard, passable: F) -> FillResult
where
    F: Fn(Cell) -> bool,
{
    let mut result = FillResult {
        labels: [[NO_LABEL; COLUMN_COUNT]; ROW_COUNT],
        black_counts: [[NOT_IN_CHAMBER; COLUMN_COUNT]; ROW_COUNT],
        white_counts: [[NOT_IN_CHAMBER; COLUMN_COUNT]; ROW_COUNT],
    };
    let mut visited = [[false; COLUMN_COUNT]; ROW_COUNT];
    let mut queue = VecDeque::new();
    let mut found = Vec::new();
    let mut label = NO_LABEL;

    for start in Position::all() {
        if visited[start.row()][start.col()] || !passable(board.get(start)) {
            continue;
        }
        label += 1;
        let mut black = 0;
        let mut white = 0;
        visited[start.row()][start.col()] = true;
        queue.push_back(start);
        found.clear();

        while let Some(pos) = queue.pop_front() {
            match board.get(pos) {
                Cell::BlackQueen => black += 1,
                Cell::WhiteQueen => white += 1,
                _ => {}
            }
            found.push(pos);
            for next in pos.neighbors() {
                if !visited[next.row()][next.col()] && passable(board.get(next)) {
                    visited[next.row()][next.col()] = true;
                    queue.push_back(next);
                }
            }
        }

        for pos in &found {
            result.labels[pos.row()][pos.col()] = label;
            result.black_counts[pos.row()][pos.col()] = black;
            result.white_counts[pos.row()][pos.col()] = white;
        }
    }

    result
}
