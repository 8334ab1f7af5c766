//! Bitboard implementation for move generation and evaluation

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use super::{Square, BOARD_SIZE};

/// 64-bit set of squares, bit `i` = square index `i` (a1 = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    pub const RANK_1: Bitboard = Bitboard(0x0000_0000_0000_00FF);
    pub const RANK_2: Bitboard = Bitboard(0x0000_0000_0000_FF00);
    pub const RANK_7: Bitboard = Bitboard(0x00FF_0000_0000_0000);
    pub const RANK_8: Bitboard = Bitboard(0xFF00_0000_0000_0000);

    pub const FILE_A: Bitboard = Bitboard(0x0101_0101_0101_0101);
    pub const FILE_H: Bitboard = Bitboard(0x8080_8080_8080_8080);

    /// Create a bitboard with a single square set
    #[inline]
    pub const fn from_square(sq: Square) -> Self {
        Self(sq.bit())
    }

    /// Set a bit at square
    #[inline]
    pub fn set(&mut self, sq: Square) {
        self.0 |= sq.bit();
    }

    /// Clear a bit at square
    #[inline]
    pub fn clear(&mut self, sq: Square) {
        self.0 &= !sq.bit();
    }

    /// Check if bit is set at square
    #[inline]
    pub const fn get(self, sq: Square) -> bool {
        self.0 & sq.bit() != 0
    }

    /// Count total set bits (popcount)
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Lowest set square, if any
    #[inline]
    pub fn lsb(self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            #[allow(clippy::cast_possible_truncation)]
            Some(Square::from_index(self.0.trailing_zeros() as u8))
        }
    }

    /// Iterate over set squares, lowest index first
    #[inline]
    pub fn iter(self) -> BitboardIter {
        BitboardIter { bits: self.0 }
    }

    /// Rook-style attacks from `sq`, each ray stopping at (and including) the
    /// first occupied square.
    pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
        ray_attacks(sq, occupied, &[(0, 1), (0, -1), (1, 0), (-1, 0)])
    }

    /// Bishop-style attacks from `sq`, blocked like [`Bitboard::rook_attacks`].
    pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
        ray_attacks(sq, occupied, &[(1, 1), (-1, 1), (1, -1), (-1, -1)])
    }

    /// Queen attacks: union of rook and bishop rays.
    #[inline]
    pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
        Self::rook_attacks(sq, occupied) | Self::bishop_attacks(sq, occupied)
    }
}

fn ray_attacks(sq: Square, occupied: Bitboard, dirs: &[(i8, i8)]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &(df, dr) in dirs {
        let mut f = sq.file() as i8 + df;
        let mut r = sq.rank() as i8 + dr;
        while Square::is_valid(f, r) {
            #[allow(clippy::cast_sign_loss)]
            let target = Square::new(f as u8, r as u8);
            attacks.set(target);
            if occupied.get(target) {
                break;
            }
            f += df;
            r += dr;
        }
    }
    attacks
}

impl BitAnd for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitand(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 & rhs.0)
    }
}

impl BitOr for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitor(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 | rhs.0)
    }
}

impl BitAndAssign for Bitboard {
    #[inline]
    fn bitand_assign(&mut self, rhs: Bitboard) {
        self.0 &= rhs.0;
    }
}

impl BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Bitboard) {
        self.0 |= rhs.0;
    }
}

impl Not for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn not(self) -> Bitboard {
        Bitboard(!self.0)
    }
}

/// Iterator over set bits in a Bitboard
pub struct BitboardIter {
    bits: u64,
}

impl Iterator for BitboardIter {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let idx = self.bits.trailing_zeros() as u8;
        // Clear the bit we just found
        self.bits &= self.bits - 1;
        Some(Square::from_index(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_masks() {
        assert_eq!(Bitboard::RANK_2.count(), BOARD_SIZE as u32);
        assert!(Bitboard::RANK_8.get(Square::new(3, 7)));
        assert!(!Bitboard::RANK_7.get(Square::new(3, 7)));
        assert!(Bitboard::FILE_A.get(Square::new(0, 4)));
        assert!(Bitboard::FILE_H.get(Square::new(7, 0)));
    }

    #[test]
    fn test_iter_ascending() {
        let mut bb = Bitboard::EMPTY;
        bb.set(Square::new(7, 7));
        bb.set(Square::new(0, 0));
        bb.set(Square::new(4, 3));
        let squares: Vec<usize> = bb.iter().map(Square::index).collect();
        assert_eq!(squares, vec![0, 28, 63]);
        assert_eq!(bb.lsb(), Some(Square::new(0, 0)));
        assert_eq!(Bitboard::EMPTY.lsb(), None);
    }

    #[test]
    fn test_queen_attacks_empty_board() {
        // Queen on d4 sees 27 squares on an empty board
        let attacks = Bitboard::queen_attacks(Square::new(3, 3), Bitboard::EMPTY);
        assert_eq!(attacks.count(), 27);
        // Corner queen sees 21
        let attacks = Bitboard::queen_attacks(Square::new(0, 0), Bitboard::EMPTY);
        assert_eq!(attacks.count(), 21);
    }

    #[test]
    fn test_rook_attacks_blocked() {
        let mut occ = Bitboard::EMPTY;
        occ.set(Square::new(3, 5)); // d6 blocks north
        let attacks = Bitboard::rook_attacks(Square::new(3, 3), occ);
        assert!(attacks.get(Square::new(3, 4)));
        assert!(attacks.get(Square::new(3, 5)), "blocker square is included");
        assert!(!attacks.get(Square::new(3, 6)), "squares behind blocker are not");
    }

    #[test]
    fn test_bishop_attacks_blocked() {
        let mut occ = Bitboard::EMPTY;
        occ.set(Square::new(5, 5)); // f6
        let attacks = Bitboard::bishop_attacks(Square::new(3, 3), occ);
        assert!(attacks.get(Square::new(4, 4)));
        assert!(attacks.get(Square::new(5, 5)));
        assert!(!attacks.get(Square::new(6, 6)));
        assert!(attacks.get(Square::new(0, 0)));
    }
}
