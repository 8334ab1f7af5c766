//! Move representation

use std::fmt;

use super::{Square, PROMOTION_RANK};

/// Move flag set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveFlag {
    Quiet,
    /// Pawn advancing two ranks from its start rank
    DoubleStep,
    Capture,
}

/// A move from one square to another. Value type: two moves are equal when
/// origin, destination and flag all match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub flag: MoveFlag,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square, flag: MoveFlag) -> Self {
        Self { from, to, flag }
    }

    #[inline]
    pub fn quiet(from: Square, to: Square) -> Self {
        Self::new(from, to, MoveFlag::Quiet)
    }

    #[inline]
    pub fn is_capture(self) -> bool {
        self.flag == MoveFlag::Capture
    }

    #[inline]
    pub fn is_double_step(self) -> bool {
        self.flag == MoveFlag::DoubleStep
    }

    /// Destination lies on the far rank. Only meaningful for pawn moves.
    #[inline]
    pub fn reaches_last_rank(self) -> bool {
        self.to.rank() == PROMOTION_RANK
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Join moves as space separated coordinate text
pub fn format_line(moves: &[Move]) -> String {
    moves
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_display() {
        let mv = Move::new(Square::new(4, 1), Square::new(4, 3), MoveFlag::DoubleStep);
        assert_eq!(mv.to_string(), "e2e4");
    }

    #[test]
    fn test_move_value_equality() {
        let a = Move::quiet(Square::new(0, 1), Square::new(0, 2));
        let b = Move::new(Square::new(0, 1), Square::new(0, 2), MoveFlag::Quiet);
        let c = Move::new(Square::new(0, 1), Square::new(0, 2), MoveFlag::Capture);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_reaches_last_rank() {
        assert!(Move::quiet(Square::new(2, 6), Square::new(2, 7)).reaches_last_rank());
        assert!(!Move::quiet(Square::new(2, 5), Square::new(2, 6)).reaches_last_rank());
    }

    #[test]
    fn test_format_line() {
        let line = [
            Move::quiet(Square::new(0, 1), Square::new(0, 2)),
            Move::quiet(Square::new(3, 7), Square::new(3, 4)),
        ];
        assert_eq!(format_line(&line), "a2a3 d8d5");
        assert_eq!(format_line(&[]), "");
    }
}
