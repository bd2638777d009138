pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A move rejected by board validation.
///
/// The board is left untouched when this is returned; the caller decides
/// whether to pick another move or treat it as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid move {mv}")]
pub struct InvalidMoveError {
    #[error(not(source))]
    pub mv: Move,
}

/// A remote peer sent a move that failed validation.
///
/// Unlike [`InvalidMoveError`], this ends the connection the move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("remote peer sent invalid move {mv}")]
pub struct ProtocolViolationError {
    #[error(not(source))]
    pub mv: Move,
}
