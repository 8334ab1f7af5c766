//! Board invariants checked along random games

use pigs::board::{perft, BoardState, GameResult, Move};
use pigs::eval::evaluate;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

const GAMES: usize = 40;
const MAX_PLIES: usize = 60;

/// Play seeded random games and hand every visited position to `check`.
fn for_each_random_position(seed: u64, mut check: impl FnMut(&mut BoardState)) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    for _ in 0..GAMES {
        let mut board = BoardState::new();
        for _ in 0..MAX_PLIES {
            check(&mut board);
            if board.is_game_over() {
                break;
            }
            let moves = board.generate_legal_moves();
            let mv = moves[rng.random_range(0..moves.len())];
            board.make_move(mv).unwrap();
        }
    }
}

#[test]
fn test_make_unmake_restores_every_position() {
    for_each_random_position(1, |board| {
        let before = board.clone();
        for mv in board.generate_legal_moves() {
            board.make_move(mv).unwrap();
            assert_eq!(board.hash(), board.compute_hash());
            board.unmake_move().unwrap();

            assert_eq!(board.pawns(), before.pawns());
            assert_eq!(board.queen(), before.queen());
            assert_eq!(board.side_to_move(), before.side_to_move());
            assert_eq!(board.ply(), before.ply());
            assert_eq!(board.hash(), before.hash());
        }
    });
}

#[test]
fn test_move_text_round_trip() {
    for_each_random_position(2, |board| {
        for mv in board.generate_legal_moves() {
            let parsed: Move = board.parse_move(&mv.to_string()).unwrap();
            assert_eq!(parsed, mv);
        }
    });
}

#[test]
fn test_fen_round_trip() {
    for_each_random_position(3, |board| {
        let restored = BoardState::from_fen(&board.to_fen()).unwrap();
        assert_eq!(restored, *board);
    });
}

#[test]
fn test_legality_check_matches_generation() {
    for_each_random_position(4, |board| {
        let moves = board.generate_legal_moves();
        assert_eq!(board.legal_move_count(), moves.len());
        assert_eq!(board.has_legal_moves(), !moves.is_empty());
        for mv in moves {
            assert!(board.is_legal_move(mv));
        }
    });
}

#[test]
fn test_invariants_hold() {
    for_each_random_position(5, |board| {
        assert!((board.pawns() & board.queen()).is_empty());
        assert!(board.queen().count() <= 1);
        assert!(board.pawns().iter().all(|sq| sq.rank() >= 1));
        assert_eq!(evaluate(board), evaluate(board));
    });
}

#[test]
fn test_terminal_positions_have_a_result() {
    let mut finished = 0;
    for_each_random_position(6, |board| {
        if board.is_game_over() {
            finished += 1;
            assert_ne!(board.result(), GameResult::Ongoing);
            if board.result() == GameResult::Stalemate {
                assert!(board.generate_legal_moves().is_empty());
            }
        }
    });
    assert!(finished > 0, "random games should reach a result");
}

#[test]
fn test_perft_is_deterministic() {
    let mut board = BoardState::new();
    let first: Vec<u64> = (1..=4).map(|d| perft(&mut board, d)).collect();
    let second: Vec<u64> = (1..=4).map(|d| perft(&mut board, d)).collect();
    assert_eq!(first, second);
    assert_eq!(first[0], 16);
    assert!(first.windows(2).all(|w| w[1] > w[0]));
}
