//! Heuristic evaluation function for Pigs and Farmers positions
//!
//! Scores are from the pawn side's perspective. The position is judged on:
//! - Terminal results (short-circuit to a decided score)
//! - Material (pawns against the queen)
//! - Pawn advancement, growing exponentially towards the far rank
//! - Queen activity (centrality, low ranks, mobility, attacked pawns)
//! - Pawn structure (horizontal neighbours, pawns blocked by the queen)
//! - Tempo

use crate::board::{BoardState, GameResult, Side, BOARD_SIZE, PROMOTION_RANK};

use super::score::Score;

/// Bonus unit for pawn advancement
const ADVANCE_UNIT: i32 = 5;
/// Per-rank bonus for pawns past the middle of the board
const NEAR_PROMOTION_STEP: i32 = 50;
/// Extra bonus for a pawn one step from the far rank
const LAST_STEP_BONUS: i32 = 200;

const CENTRALITY_WEIGHT: i32 = 5;
const QUEEN_RANK_WEIGHT: i32 = 3;
const QUEEN_MOBILITY_WEIGHT: i32 = 2;
const QUEEN_ATTACK_WEIGHT: i32 = 10;

const NEIGHBOUR_BONUS: i32 = 5;
const BLOCKED_FILE_PENALTY: i32 = 20;
const TEMPO: i32 = 10;

/// Evaluate the position from the pawn side's perspective.
///
/// Positive values favour the pawns, negative values favour the queen.
/// Decided games return `±Score::DECIDED`, stalemate returns 0.
///
/// # Example
///
/// ```
/// use pigs::board::BoardState;
/// use pigs::eval::evaluate;
///
/// let board = BoardState::new();
/// assert_eq!(evaluate(&board), evaluate(&board));
/// ```
#[must_use]
pub fn evaluate(board: &BoardState) -> i32 {
    match board.result() {
        GameResult::PawnsWinAdvancement | GameResult::PawnsWinCapture => return Score::DECIDED,
        GameResult::QueenWins => return -Score::DECIDED,
        GameResult::Stalemate => return 0,
        GameResult::Ongoing => {}
    }

    let pawns = board.pawns();
    let queen_square = board.queen_square();
    let queen_attacks = board.queen_attacks();
    let queen_to_move = board.side_to_move() == Side::Queen;

    #[allow(clippy::cast_possible_wrap)]
    let mut score = pawns.count() as i32 * Score::PAWN;
    if queen_square.is_some() {
        score -= Score::QUEEN;
    }

    for sq in pawns.iter() {
        let rank = i32::from(sq.rank());

        let mut advance = (1 << (rank - 1).max(0)) * ADVANCE_UNIT;
        let mut near_promotion = 0;
        if rank >= 5 {
            near_promotion += (rank - 4) * NEAR_PROMOTION_STEP;
        }
        if rank == i32::from(PROMOTION_RANK) - 1 {
            near_promotion += LAST_STEP_BONUS;
        }

        if queen_attacks.get(sq) {
            if queen_to_move {
                advance /= 4;
                near_promotion /= 4;
            } else {
                advance = advance * 3 / 4;
                near_promotion = near_promotion * 3 / 4;
            }
        }

        score += advance + near_promotion;
    }

    if let Some(q) = queen_square {
        let file = i32::from(q.file());
        let rank = i32::from(q.rank());

        score -= (4 - (file - 3).abs()) * CENTRALITY_WEIGHT;
        score -= (i32::from(BOARD_SIZE) - rank) * QUEEN_RANK_WEIGHT;

        #[allow(clippy::cast_possible_wrap)]
        {
            score -= queen_attacks.count() as i32 * QUEEN_MOBILITY_WEIGHT;
            score -= (queen_attacks & pawns).count() as i32 * QUEEN_ATTACK_WEIGHT;
        }
    }

    for sq in pawns.iter() {
        if sq.offset(-1, 0).is_some_and(|n| pawns.get(n)) {
            score += NEIGHBOUR_BONUS;
        }
        if sq.offset(1, 0).is_some_and(|n| pawns.get(n)) {
            score += NEIGHBOUR_BONUS;
        }
        if let Some(q) = queen_square {
            if q.file() == sq.file() && q.rank() > sq.rank() {
                score -= BLOCKED_FILE_PENALTY;
            }
        }
    }

    if queen_to_move {
        score - TEMPO
    } else {
        score + TEMPO
    }
}

/// Evaluate the position from the side to move's perspective (negamax convention).
#[inline]
#[must_use]
pub fn evaluate_relative(board: &BoardState) -> i32 {
    evaluate(board) * board.side_to_move().sign()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Bitboard, Square};

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn position(pawns: &[&str], queen: &[&str], side: Side) -> BoardState {
        let mut p = Bitboard::EMPTY;
        for name in pawns {
            p.set(sq(name));
        }
        let mut q = Bitboard::EMPTY;
        for name in queen {
            q.set(sq(name));
        }
        BoardState::from_position(p, q, side).unwrap()
    }

    #[test]
    fn test_evaluate_initial_position() {
        // material -100, advancement 38 (d2 attacked), queen terms -73,
        // neighbours +70, d-file block -20, tempo +10
        let board = BoardState::new();
        assert_eq!(evaluate(&board), -75);
    }

    #[test]
    fn test_evaluate_deterministic() {
        let board = position(&["a3", "c5", "f6"], &["e4"], Side::Queen);
        assert_eq!(evaluate(&board), evaluate(&board.clone()));
    }

    #[test]
    fn test_evaluate_terminal_states() {
        assert_eq!(evaluate(&position(&["c8"], &["h1"], Side::Queen)), Score::DECIDED);
        assert_eq!(evaluate(&position(&["c5"], &[], Side::Queen)), Score::DECIDED);
        assert_eq!(evaluate(&position(&[], &["c5"], Side::Pawns)), -Score::DECIDED);
        assert_eq!(evaluate(&position(&["a3"], &["a4"], Side::Pawns)), 0);
    }

    #[test]
    fn test_evaluate_tempo() {
        // a2 is not attacked from h8, so only the tempo term differs
        let pawns_turn = position(&["a2"], &["h8"], Side::Pawns);
        let queen_turn = position(&["a2"], &["h8"], Side::Queen);
        assert_eq!(evaluate(&pawns_turn) - evaluate(&queen_turn), 2 * TEMPO);
    }

    #[test]
    fn test_evaluate_attacked_pawn_discount() {
        // Queen on f4 attacks the pawn on c7 along the diagonal
        let pawns_turn = position(&["c7", "a2"], &["f4"], Side::Pawns);
        let queen_turn = position(&["c7", "a2"], &["f4"], Side::Queen);
        assert!(evaluate(&pawns_turn) - evaluate(&queen_turn) > 2 * TEMPO);
    }

    #[test]
    fn test_evaluate_advancement() {
        let advanced = position(&["a6"], &["h1"], Side::Pawns);
        let behind = position(&["a3"], &["h1"], Side::Pawns);
        assert!(evaluate(&advanced) > evaluate(&behind));
    }

    #[test]
    fn test_evaluate_relative_sign() {
        let pawns_turn = position(&["b3", "c4"], &["g7"], Side::Pawns);
        let queen_turn = position(&["b3", "c4"], &["g7"], Side::Queen);
        assert_eq!(evaluate_relative(&pawns_turn), evaluate(&pawns_turn));
        assert_eq!(evaluate_relative(&queen_turn), -evaluate(&queen_turn));
    }
}
