//! Perft: leaf-node counting for move generation / make-unmake validation

use super::BoardState;

/// Count leaf positions reachable in exactly `depth` plies.
///
/// Finished games are leaves: no moves are generated past a decided result.
pub fn perft(board: &mut BoardState, depth: u32) -> u64 {
    if depth == 0 || board.is_game_over() {
        return 1;
    }

    let moves = board.generate_legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in moves {
        if board.make_move(mv).is_err() {
            continue;
        }
        nodes += perft(board, depth - 1);
        let undone = board.unmake_move();
        debug_assert!(undone.is_ok());
    }
    nodes
}
