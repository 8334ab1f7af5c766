//! Error types for board manipulation and engine configuration

use thiserror::Error;

use crate::board::Move;

/// Errors raised by [`BoardState`](crate::board::BoardState) operations.
///
/// Every failing operation leaves the board unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Move is not legal in the current position
    #[error("illegal move: {mv}")]
    IllegalMove { mv: Move },

    /// Undo requested with no move history
    #[error("no move to undo")]
    EmptyHistory,

    #[error("invalid square: {0:?}")]
    InvalidSquare(String),

    #[error("invalid move text: {0:?}")]
    InvalidMoveText(String),

    /// Piece sets violate a board invariant
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),
}

/// Errors raised while loading or validating a [`SearchConfig`](crate::config::SearchConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("max depth must be at least 1")]
    ZeroDepth,

    #[error("max depth must be at most {max}")]
    DepthTooLarge { max: u32 },

    #[error("number of reported lines must be at least 1")]
    ZeroLines,

    #[error("number of reported lines must be at most {max}")]
    TooManyLines { max: usize },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}
