use serde::{Deserialize, Serialize};

/// Side to move.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[display("black")]
    Black,
    #[display("white")]
    White,
}

impl Color {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    #[must_use]
    pub const fn queen(self) -> Cell {
        match self {
            Self::Black => Cell::BlackQueen,
            Self::White => Cell::WhiteQueen,
        }
    }

    #[must_use]
    pub const fn arrow(self) -> Cell {
        match self {
            Self::Black => Cell::BlackArrow,
            Self::White => Cell::WhiteArrow,
        }
    }

    /// `+1.0` for black, `-1.0` for white.
    ///
    /// Evaluation scores are black-favoring; multiplying by the mover's sign
    /// turns them into the mover's perspective.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Black => 1.0,
            Self::White => -1.0,
        }
    }
}

/// Content of a single board cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Cell {
    #[default]
    Empty,
    BlackQueen,
    WhiteQueen,
    BlackArrow,
    WhiteArrow,
}

impl Cell {
    #[must_use]
    pub const fn is_queen(self) -> bool {
        matches!(self, Self::BlackQueen | Self::WhiteQueen)
    }

    #[must_use]
    pub const fn is_arrow(self) -> bool {
        matches!(self, Self::BlackArrow | Self::WhiteArrow)
    }

    /// Color of the queen or arrow occupying the cell.
    #[must_use]
    pub const fn color(self) -> Option<Color> {
        match self {
            Self::Empty => None,
            Self::BlackQueen | Self::BlackArrow => Some(Color::Black),
            Self::WhiteQueen | Self::WhiteArrow => Some(Color::White),
        }
    }

    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::Empty => '.',
            Self::BlackQueen => 'B',
            Self::WhiteQueen => 'W',
            Self::BlackArrow => 'b',
            Self::WhiteArrow => 'w',
        }
    }

    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(Self::Empty),
            'B' => Some(Self::BlackQueen),
            'W' => Some(Self::WhiteQueen),
            'b' => Some(Self::BlackArrow),
            'w' => Some(Self::WhiteArrow),
            _ => None,
        }
    }
}
