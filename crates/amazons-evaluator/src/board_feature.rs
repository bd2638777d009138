//! Network input encoding of a move.
//!
//! A move is encoded from its [`EvaluationRequest`]: the board and chamber
//! snapshots before and after the move plus the color that made it. Every
//! feature is a flag, `1.0` when the property holds and `-1.0` otherwise.
//!
//! # Layout
//!
//! ```text
//! [mover is black]
//! for each cell, row-major:
//!     9 cell flags, before/after interleaved                 (18)
//!     4 chamber label buckets, before/after interleaved      (8)
//!     black count == 0, white count == 0, before then after  (4)
//! ```
//!
//! The cell flags are: empty, black queen, white queen, black arrow, white
//! arrow, any arrow, any queen, any black piece, any white piece. The label
//! buckets are `-1`, `0` (arrow cell), `1` and `> 1`.
//!
//! The layout is the input contract of a trained network: changing the order
//! or the count invalidates every saved weight file.

use amazons_engine::{CELL_COUNT, Cell, ChamberMap, Position};

use crate::move_evaluator::{EvaluationRequest, Snapshot};

const CELL_FLAGS: usize = 9;
const LABEL_BUCKETS: usize = 4;
const COUNT_FLAGS: usize = 4;

/// Features contributed by a single cell.
pub const FEATURES_PER_CELL: usize = 2 * CELL_FLAGS + 2 * LABEL_BUCKETS + COUNT_FLAGS;

/// Length of an encoded move.
pub const FEATURE_COUNT: usize = 1 + CELL_COUNT * FEATURES_PER_CELL;

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { -1.0 }
}

fn cell_flags(cell: Cell) -> [f32; CELL_FLAGS] {
    [
        flag(cell.is_empty()),
        flag(cell.is_black_queen()),
        flag(cell.is_white_queen()),
        flag(cell.is_black_arrow()),
        flag(cell.is_white_arrow()),
        flag(cell.is_arrow()),
        flag(cell.is_queen()),
        flag(cell.is_black_queen() || cell.is_black_arrow()),
        flag(cell.is_white_queen() || cell.is_white_arrow()),
    ]
}

fn label_buckets(chambers: &ChamberMap, pos: Position) -> [f32; LABEL_BUCKETS] {
    let label = i16::from(chambers.label(pos));
    [
        flag(label == -1),
        flag(label == 0),
        flag(label == 1),
        flag(label > 1),
    ]
}

fn push_interleaved<const N: usize>(features: &mut Vec<f32>, before: [f32; N], after: [f32; N]) {
    for (b, a) in before.into_iter().zip(after) {
        features.push(b);
        features.push(a);
    }
}

/// Encodes `request` into a vector of [`FEATURE_COUNT`] flags.
#[must_use]
pub fn encode(request: &EvaluationRequest) -> Vec<f32> {
    let EvaluationRequest {
        mover,
        before: Snapshot {
            cells: before_cells,
            chambers: before_chambers,
        },
        after: Snapshot {
            cells: after_cells,
            chambers: after_chambers,
        },
    } = request;

    let mut features = Vec::with_capacity(FEATURE_COUNT);
    features.push(flag(mover.is_black()));
    for pos in Position::all() {
        push_interleaved(
            &mut features,
            cell_flags(before_cells.get(pos)),
            cell_flags(after_cells.get(pos)),
        );
        push_interleaved(
            &mut features,
            label_buckets(before_chambers, pos),
            label_buckets(after_chambers, pos),
        );
        features.extend([
            flag(before_chambers.black_count(pos) == 0),
            flag(before_chambers.white_count(pos) == 0),
            flag(after_chambers.black_count(pos) == 0),
            flag(after_chambers.white_count(pos) == 0),
        ]);
    }
    features
}
