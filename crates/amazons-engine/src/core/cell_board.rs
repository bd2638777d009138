use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::{COLUMN_COUNT, Cell, Color, Direction, Position, QUEENS_PER_COLOR, ROW_COUNT};

/// Failure to parse the text form of a [`CellBoard`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseBoardError {
    #[display("expected 10 rows, got {actual}")]
    RowCount { actual: usize },
    #[display("expected 10 cells in row {row}, got {actual}")]
    RowLength { row: usize, actual: usize },
    #[display("invalid cell {ch:?} at ({row}, {col})")]
    InvalidCell { row: usize, col: usize, ch: char },
    #[display("more than 4 {color} queens")]
    TooManyQueens { color: Color },
}

/// Fixed 10x10 grid of cells.
///
/// The grid is a plain value: copying it yields fully independent storage,
/// which is what search simulation relies on.
///
/// # Text form
///
/// One character per cell, rows top to bottom:
///
/// ```text
/// . empty   B black queen   W white queen
///           b black arrow   w white arrow
/// ```
///
/// [`Display`](fmt::Display) writes one row per line; serde uses the same
/// characters with rows separated by `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellBoard {
    rows: [[Cell; COLUMN_COUNT]; ROW_COUNT],
}

impl Default for CellBoard {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl CellBoard {
    pub const ROW_COUNT: usize = ROW_COUNT;
    pub const COLUMN_COUNT: usize = COLUMN_COUNT;

    pub const EMPTY: Self = Self {
        rows: [[Cell::Empty; COLUMN_COUNT]; ROW_COUNT],
    };

    /// Standard starting position.
    ///
    /// Black queens at (6,0), (6,9), (9,3), (9,6); white queens at
    /// (0,3), (0,6), (3,0), (3,9).
    pub const INITIAL: Self = {
        let mut rows = [[Cell::Empty; COLUMN_COUNT]; ROW_COUNT];
        rows[6][0] = Cell::BlackQueen;
        rows[6][9] = Cell::BlackQueen;
        rows[9][3] = Cell::BlackQueen;
        rows[9][6] = Cell::BlackQueen;
        rows[0][3] = Cell::WhiteQueen;
        rows[0][6] = Cell::WhiteQueen;
        rows[3][0] = Cell::WhiteQueen;
        rows[3][9] = Cell::WhiteQueen;
        Self { rows }
    };

    /// Returns the cell at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is off the board.
    #[must_use]
    pub fn get(&self, pos: Position) -> Cell {
        self.rows[pos.row()][pos.col()]
    }

    pub(crate) fn set(&mut self, pos: Position, cell: Cell) {
        self.rows[pos.row()][pos.col()] = cell;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell; COLUMN_COUNT]> + '_ {
        self.rows.iter()
    }

    /// Queen positions of `color` in row-major order.
    #[must_use]
    pub fn queens(&self, color: Color) -> ArrayVec<Position, QUEENS_PER_COLOR> {
        let queen = color.queen();
        Position::all()
            .filter(|pos| self.get(*pos) == queen)
            .take(QUEENS_PER_COLOR)
            .collect()
    }

    /// Checks that `from` and `to` lie on one line and every cell strictly
    /// between them is empty.
    ///
    /// `vacated` is treated as empty regardless of its content; it is the
    /// origin of the queen that just moved when checking an arrow shot.
    #[must_use]
    pub fn is_path_clear(&self, from: Position, to: Position, vacated: Position) -> bool {
        let Some((direction, distance)) = Direction::between(from, to) else {
            return false;
        };
        from.ray(direction)
            .take(distance - 1)
            .all(|pos| pos == vacated || self.get(pos).is_empty())
    }

    /// Parses the text form of a board.
    ///
    /// Rows may be separated by newlines or `/`; whitespace inside a row is
    /// ignored and blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, ParseBoardError> {
        let lines = text
            .split(['\n', '/'])
            .map(|line| {
                line.chars()
                    .filter(|ch| !ch.is_whitespace())
                    .collect::<Vec<_>>()
            })
            .filter(|chars| !chars.is_empty())
            .collect::<Vec<_>>();
        if lines.len() != ROW_COUNT {
            return Err(ParseBoardError::RowCount {
                actual: lines.len(),
            });
        }

        let mut board = Self::EMPTY;
        for (row, chars) in lines.iter().enumerate() {
            if chars.len() != COLUMN_COUNT {
                return Err(ParseBoardError::RowLength {
                    row,
                    actual: chars.len(),
                });
            }
            for (col, &ch) in chars.iter().enumerate() {
                let cell = Cell::from_char(ch).ok_or(ParseBoardError::InvalidCell { row, col, ch })?;
                board.rows[row][col] = cell;
            }
        }

        for color in [Color::Black, Color::White] {
            let count = board
                .rows
                .iter()
                .flatten()
                .filter(|cell| **cell == color.queen())
                .count();
            if count > QUEENS_PER_COLOR {
                return Err(ParseBoardError::TooManyQueens { color });
            }
        }

        Ok(board)
    }

    /// Creates a board from its text form, for fixtures.
    ///
    /// # Panics
    ///
    /// Panics if the text is not a valid board.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        match Self::parse(art) {
            Ok(board) => board,
            Err(e) => panic!("invalid board fixture: {e}"),
        }
    }

    fn row_strings(&self) -> impl Iterator<Item = String> + '_ {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_char()).collect())
    }
}

impl fmt::Display for CellBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.row_strings() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

impl Serialize for CellBoard {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let text = self.row_strings().collect::<Vec<_>>().join("/");
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for CellBoard {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
