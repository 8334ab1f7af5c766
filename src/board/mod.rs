//! Board representation for Pigs and Farmers

pub mod bitboard;
pub mod board;
pub mod moves;
pub mod perft;
pub mod zobrist;


use std::fmt;
use std::str::FromStr;

use crate::error::BoardError;

// Re-exports
pub use bitboard::Bitboard;
pub use board::{BoardState, UndoRecord};
pub use moves::{format_line, Move, MoveFlag};
pub use perft::perft;
pub use zobrist::ZobristKeys;

/// Board size (8x8)
pub const BOARD_SIZE: u8 = 8;
pub const TOTAL_SQUARES: usize = 64;

/// Rank index (0-based) the pawns start from
pub const PAWN_START_RANK: u8 = 1;
/// Rank index (0-based) a pawn must reach to win
pub const PROMOTION_RANK: u8 = 7;

/// Side to move.
///
/// The pawn side ("pigs") always moves first; the queen side ("farmer")
/// owns a single long-range queen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Pawns,
    Queen,
}

impl Side {
    /// Get the other side
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::Pawns => Side::Queen,
            Side::Queen => Side::Pawns,
        }
    }

    /// Sign to convert a pawn-side score into this side's perspective
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Side::Pawns => 1,
            Side::Queen => -1,
        }
    }
}

/// Game outcome, resolved in a fixed priority order by [`BoardState::result`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    Ongoing,
    /// A pawn reached the far rank
    PawnsWinAdvancement,
    /// The queen was captured
    PawnsWinCapture,
    /// Every pawn was captured
    QueenWins,
    /// Side to move has no legal moves
    Stalemate,
}

impl GameResult {
    #[inline]
    pub fn is_over(self) -> bool {
        self != GameResult::Ongoing
    }

    /// Winning side, if the game was decided
    pub fn winner(self) -> Option<Side> {
        match self {
            GameResult::PawnsWinAdvancement | GameResult::PawnsWinCapture => Some(Side::Pawns),
            GameResult::QueenWins => Some(Side::Queen),
            GameResult::Ongoing | GameResult::Stalemate => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameResult::Ongoing => "ongoing",
            GameResult::PawnsWinAdvancement => "pawns win (advancement)",
            GameResult::PawnsWinCapture => "pawns win (queen captured)",
            GameResult::QueenWins => "queen wins",
            GameResult::Stalemate => "draw (stalemate)",
        };
        f.write_str(text)
    }
}

/// A square on the board, a1 = 0 .. h8 = 63.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Self {
        debug_assert!(file < BOARD_SIZE && rank < BOARD_SIZE);
        Self(rank * BOARD_SIZE + file)
    }

    #[inline]
    pub const fn from_index(idx: u8) -> Self {
        debug_assert!(idx < 64);
        Self(idx)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    #[inline]
    pub const fn bit(self) -> u64 {
        1u64 << self.0
    }

    /// Square shifted by a signed offset, `None` when it leaves the board
    #[inline]
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Square> {
        let f = self.file() as i8 + file_delta;
        let r = self.rank() as i8 + rank_delta;
        if Self::is_valid(f, r) {
            #[allow(clippy::cast_sign_loss)]
            Some(Square::new(f as u8, r as u8))
        } else {
            None
        }
    }

    #[inline]
    pub fn is_valid(file: i8, rank: i8) -> bool {
        (0..BOARD_SIZE as i8).contains(&file) && (0..BOARD_SIZE as i8).contains(&rank)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, (b'1' + self.rank()) as char)
    }
}

impl FromStr for Square {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(BoardError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file >= BOARD_SIZE || rank >= BOARD_SIZE {
            return Err(BoardError::InvalidSquare(s.to_string()));
        }
        Ok(Square::new(file, rank))
    }
}
