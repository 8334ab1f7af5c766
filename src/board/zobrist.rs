//! Zobrist hashing for position identification
//!
//! Zobrist hashing allows O(1) incremental hash updates when a piece moves
//! or is captured. This is essential for efficient transposition table lookups
//! during search.
//!
//! The key table is generated once from a fixed seed and shared read-only by
//! every [`BoardState`](super::BoardState), so fingerprints are reproducible
//! across runs and across independent board instances.
//!
//! # Example
//!
//! ```
//! use pigs::board::{Bitboard, Side, Square, ZobristKeys};
//!
//! let keys = ZobristKeys::shared();
//! let pawns = Bitboard::RANK_2;
//! let queen = Bitboard::from_square(Square::new(3, 7));
//!
//! let before = keys.hash(pawns, queen, Side::Pawns);
//! let a2 = Square::new(0, 1);
//! let a3 = Square::new(0, 2);
//! let incremental = keys.toggle_side(before ^ keys.pawn(a2) ^ keys.pawn(a3));
//!
//! let mut moved = pawns;
//! moved.clear(a2);
//! moved.set(a3);
//! assert_eq!(incremental, keys.hash(moved, queen, Side::Queen));
//! ```

use once_cell::sync::Lazy;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::{Bitboard, Side, Square, TOTAL_SQUARES};

/// Seed for the key generator. Changing it invalidates every stored fingerprint.
const ZOBRIST_SEED: u64 = 0x1234_5678_90AB_CDEF;

static SHARED_KEYS: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);

/// Zobrist key table.
///
/// One random value per (square, piece kind) plus one for "queen side to move".
#[derive(Debug, Clone)]
pub struct ZobristKeys {
    pawn: [u64; TOTAL_SQUARES],
    queen: [u64; TOTAL_SQUARES],
    queen_to_move: u64,
}

impl ZobristKeys {
    /// Build a key table with deterministic random values.
    #[must_use]
    pub fn new() -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(ZOBRIST_SEED);

        let mut pawn = [0u64; TOTAL_SQUARES];
        let mut queen = [0u64; TOTAL_SQUARES];
        for i in 0..TOTAL_SQUARES {
            pawn[i] = rng.next_u64();
            queen[i] = rng.next_u64();
        }

        Self {
            pawn,
            queen,
            queen_to_move: rng.next_u64(),
        }
    }

    /// Process-wide table, built on first use.
    #[must_use]
    pub fn shared() -> &'static ZobristKeys {
        &SHARED_KEYS
    }

    #[inline]
    pub fn pawn(&self, sq: Square) -> u64 {
        self.pawn[sq.index()]
    }

    #[inline]
    pub fn queen(&self, sq: Square) -> u64 {
        self.queen[sq.index()]
    }

    /// Toggle the side-to-move component of the hash.
    #[inline]
    #[must_use]
    pub fn toggle_side(&self, hash: u64) -> u64 {
        hash ^ self.queen_to_move
    }

    /// Compute the full hash for a position from scratch.
    #[must_use]
    pub fn hash(&self, pawns: Bitboard, queen: Bitboard, side: Side) -> u64 {
        let mut h = 0u64;
        for sq in pawns.iter() {
            h ^= self.pawn(sq);
        }
        for sq in queen.iter() {
            h ^= self.queen(sq);
        }
        if side == Side::Queen {
            h = self.toggle_side(h);
        }
        h
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}
