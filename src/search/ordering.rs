//! Move ordering heuristics
//!
//! Good ordering is what makes alpha-beta fast: the earlier the best move is
//! tried, the more siblings get cut off. Moves are ranked in strict tiers,
//! highest first:
//!
//! 1. Best move from the transposition table
//! 2. Pawn capturing the queen
//! 3. Queen capturing a pawn
//! 4. Killer moves for the current ply (most recent first)
//! 5. Pawn moves onto the last two ranks (promotion threats)
//! 6. Everything else
//!
//! Inside a tier, moves are ranked by history score and then by how far a
//! pawn move advances. Ties keep generation order.

use crate::board::{BoardState, Move, Side, PROMOTION_RANK, TOTAL_SQUARES};

/// Deepest ply with killer slots
pub const MAX_PLY: usize = 128;

const TT_MOVE: i32 = 900_000_000;
const PAWN_TAKES_QUEEN: i32 = 800_000_000;
const QUEEN_TAKES_PAWN: i32 = 700_000_000;
const KILLER_PRIMARY: i32 = 600_000_000;
const KILLER_SECONDARY: i32 = 500_000_000;
const PROMOTION_THREAT: i32 = 400_000_000;

/// History scores saturate here so they never cross a tier boundary
const HISTORY_MAX: i32 = 10_000_000;

/// Pawn move onto one of the last two ranks
#[inline]
pub fn is_promotion_threat(side: Side, mv: Move) -> bool {
    side == Side::Pawns && mv.to.rank() + 1 >= PROMOTION_RANK
}

/// Capture or promotion threat; the moves searched in quiescence
#[inline]
pub fn is_tactical(side: Side, mv: Move) -> bool {
    mv.is_capture() || is_promotion_threat(side, mv)
}

/// Killer and history tables.
///
/// Both persist across iterations and across searches until
/// [`clear`](Self::clear) is called.
pub struct MoveOrderer {
    killers: [[Option<Move>; 2]; MAX_PLY],
    history: [[i32; TOTAL_SQUARES]; TOTAL_SQUARES],
}

impl MoveOrderer {
    pub fn new() -> Self {
        Self {
            killers: [[None; 2]; MAX_PLY],
            history: [[0; TOTAL_SQUARES]; TOTAL_SQUARES],
        }
    }

    /// Reset killers and history.
    pub fn clear(&mut self) {
        self.killers = [[None; 2]; MAX_PLY];
        self.history = [[0; TOTAL_SQUARES]; TOTAL_SQUARES];
        log::trace!("killer and history tables cleared");
    }

    /// Killer moves recorded at `ply`, most recent first
    pub fn killers(&self, ply: usize) -> [Option<Move>; 2] {
        self.killers.get(ply).copied().unwrap_or([None; 2])
    }

    pub fn history_score(&self, mv: Move) -> i32 {
        self.history[mv.from.index()][mv.to.index()]
    }

    /// Ordering score of a single move. Higher is tried first.
    pub fn score_move(&self, board: &BoardState, mv: Move, tt_move: Option<Move>, ply: usize) -> i32 {
        let side = board.side_to_move();

        let tier = if tt_move == Some(mv) {
            TT_MOVE
        } else if mv.is_capture() {
            match side {
                Side::Pawns => PAWN_TAKES_QUEEN,
                Side::Queen => QUEEN_TAKES_PAWN,
            }
        } else {
            let [primary, secondary] = self.killers(ply);
            if primary == Some(mv) {
                KILLER_PRIMARY
            } else if secondary == Some(mv) {
                KILLER_SECONDARY
            } else if is_promotion_threat(side, mv) {
                PROMOTION_THREAT
            } else {
                0
            }
        };

        let advancement = match side {
            Side::Pawns => i32::from(mv.to.rank()),
            Side::Queen => 0,
        };

        tier + self.history_score(mv) * 8 + advancement
    }

    /// Sort moves best-first. The sort is stable, so equal scores keep
    /// generation order.
    pub fn order_moves(&self, moves: &mut [Move], board: &BoardState, tt_move: Option<Move>, ply: usize) {
        let mut scored: Vec<(i32, Move)> = moves
            .iter()
            .map(|&mv| (self.score_move(board, mv, tt_move, ply), mv))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        for (slot, (_, mv)) in moves.iter_mut().zip(scored) {
            *slot = mv;
        }
    }

    /// Record a beta cutoff. Captures are ordered by their own tier and
    /// do not update killers or history.
    pub fn update_cutoff(&mut self, ply: usize, mv: Move, depth: i32) {
        if mv.is_capture() {
            return;
        }

        if let Some(slot) = self.killers.get_mut(ply) {
            if slot[0] != Some(mv) {
                slot[1] = slot[0];
                slot[0] = Some(mv);
            }
        }

        let entry = &mut self.history[mv.from.index()][mv.to.index()];
        *entry = entry.saturating_add(depth * depth).min(HISTORY_MAX);
    }
}

impl Default for MoveOrderer {
    fn default() -> Self {
        Self::new()
    }
}
