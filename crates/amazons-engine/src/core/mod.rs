pub use self::{cell_board::*, chambers::*, moves::*, piece::*, position::*};

pub(crate) mod cell_board;
pub(crate) mod chambers;
pub(crate) mod moves;
pub(crate) mod piece;
pub(crate) mod position;

pub const ROW_COUNT: usize = 10;
pub const COLUMN_COUNT: usize = 10;
pub const CELL_COUNT: usize = ROW_COUNT * COLUMN_COUNT;
pub const QUEENS_PER_COLOR: usize = 4;
