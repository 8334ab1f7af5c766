//! Negamax alpha-beta search with quiescence and transposition table
//!
//! This module implements the tree search the engine drives once per
//! iterative-deepening depth:
//!
//! - Negamax with alpha-beta pruning
//! - Transposition table probing/storing with ply-independent mate scores
//! - Quiescence extension over captures and promotion threats
//! - Killer/history move ordering
//! - Independent full-window scoring of every root move (multi-line report)
//! - Principal variation reconstruction from the transposition table
//! - Cooperative cancellation through a shared [`StopHandle`] and a deadline
//!
//! # Example
//!
//! ```
//! use pigs::board::BoardState;
//! use pigs::search::Searcher;
//!
//! let mut searcher = Searcher::new(1 << 12);
//! let mut board = BoardState::new();
//! let mut root_moves = board.generate_legal_moves();
//!
//! searcher.begin(None);
//! let scores = searcher.search_root(&mut board, 2, &mut root_moves, None);
//! assert_eq!(scores.len(), 16);
//! searcher.finish();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::board::{BoardState, GameResult, Move};
use crate::eval::{evaluate_relative, Score};

use super::ordering::{is_tactical, MoveOrderer};
use super::{EntryType, TTStats, TranspositionTable};

/// Moves searched between clock checks inside a move loop
const STOP_CHECK_INTERVAL: usize = 4;

// =============================================================================
// Cancellation
// =============================================================================

/// Thread-safe handle to request that a running search stops early.
///
/// Cloning the handle shares the same flags. The search polls the stop flag
/// at every node; once observed, the current iteration is abandoned and the
/// last completed one is reported.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stop: Arc<AtomicBool>,
    searching: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the running search to stop.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Whether a search is currently running
    pub fn is_searching(&self) -> bool {
        self.searching.load(Ordering::Acquire)
    }

    fn reset(&self) {
        self.stop.store(false, Ordering::Relaxed);
    }

    fn set_searching(&self, searching: bool) {
        self.searching.store(searching, Ordering::Release);
    }
}

// =============================================================================
// Results
// =============================================================================

/// A root move with the score of its full-window subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootMove {
    pub mv: Move,
    /// Score from the root side to move's perspective
    pub score: i32,
}

/// One reported line: root move plus its continuation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PvLine {
    pub moves: Vec<Move>,
    /// Score from the pawns' perspective, whichever side moves at the root
    pub score: i32,
    /// Iteration depth the line was computed at
    pub depth: u32,
}

impl PvLine {
    pub fn first_move(&self) -> Option<Move> {
        self.moves.first().copied()
    }
}

/// Convert a score to its table form: mate scores relative to this node.
#[inline]
fn score_to_tt(score: i32, ply: u32) -> i32 {
    #[allow(clippy::cast_possible_wrap)]
    let ply = ply as i32;
    if score > Score::MATE_THRESHOLD {
        score + ply
    } else if score < -Score::MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`]: mate scores relative to the root again.
#[inline]
fn score_from_tt(score: i32, ply: u32) -> i32 {
    #[allow(clippy::cast_possible_wrap)]
    let ply = ply as i32;
    if score > Score::MATE_THRESHOLD {
        score - ply
    } else if score < -Score::MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Score of a finished game for the side to move, `ply` plies from the root.
fn terminal_score(board: &BoardState, result: GameResult, ply: u32) -> i32 {
    #[allow(clippy::cast_possible_wrap)]
    let distance = Score::MATE - ply as i32;
    match result.winner() {
        Some(winner) if winner == board.side_to_move() => distance,
        Some(_) => -distance,
        None => 0,
    }
}

/// Undo a move made by the search itself; its history is never empty.
#[inline]
fn undo(board: &mut BoardState) {
    let undone = board.unmake_move();
    debug_assert!(undone.is_ok());
}

// =============================================================================
// Searcher
// =============================================================================

/// Single-threaded alpha-beta searcher.
///
/// Owns the transposition table and the ordering heuristics; both persist
/// across searches until explicitly cleared.
pub struct Searcher {
    tt: TranspositionTable,
    orderer: MoveOrderer,
    stop: StopHandle,
    deadline: Option<Instant>,
    /// Stop observed; every frame unwinds with a placeholder score
    aborted: bool,
    nodes: u64,
    sel_depth: u32,
}

impl Searcher {
    /// Create a searcher with a transposition table of at least `tt_capacity` slots.
    pub fn new(tt_capacity: usize) -> Self {
        Self {
            tt: TranspositionTable::new(tt_capacity),
            orderer: MoveOrderer::new(),
            stop: StopHandle::new(),
            deadline: None,
            aborted: false,
            nodes: 0,
            sel_depth: 0,
        }
    }

    /// Handle for stopping searches run by this searcher from another thread
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Prepare a new top-level search: clear the stop flag, reset counters,
    /// arm the deadline and advance the table generation.
    pub fn begin(&mut self, time_limit: Option<Duration>) {
        self.stop.reset();
        self.stop.set_searching(true);
        self.deadline = time_limit.map(|limit| Instant::now() + limit);
        self.aborted = false;
        self.nodes = 0;
        self.sel_depth = 0;
        self.tt.new_search();
    }

    /// Mark the search as finished.
    pub fn finish(&mut self) {
        self.deadline = None;
        self.stop.set_searching(false);
    }

    /// Nodes visited since [`begin`](Self::begin)
    #[inline]
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Deepest ply reached since the last [`reset_sel_depth`](Self::reset_sel_depth)
    #[inline]
    pub fn sel_depth(&self) -> u32 {
        self.sel_depth
    }

    pub fn reset_sel_depth(&mut self) {
        self.sel_depth = 0;
    }

    /// Whether the current search was cancelled or ran out of time
    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn tt_hits(&self) -> u64 {
        self.tt.hits()
    }

    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }

    pub fn clear_hash(&mut self) {
        self.tt.clear();
    }

    pub fn clear_killers(&mut self) {
        self.orderer.clear();
    }

    /// Poll the stop flag and the deadline. Latches once either fires.
    #[inline]
    fn should_stop(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        let expired = self.deadline.is_some_and(|d| Instant::now() >= d);
        if self.stop.is_stopped() || expired {
            self.aborted = true;
            log::debug!(
                "search interrupted after {} nodes ({})",
                self.nodes,
                if expired { "deadline" } else { "stop requested" }
            );
        }
        self.aborted
    }

    /// Score every root move with an independent full-window search of
    /// `depth` plies.
    ///
    /// `root_moves` is reordered in place (hint first). The returned scores
    /// follow that order; if the search is interrupted only the moves
    /// finished before the stop are included.
    pub fn search_root(
        &mut self,
        board: &mut BoardState,
        depth: i32,
        root_moves: &mut [Move],
        hint: Option<Move>,
    ) -> Vec<RootMove> {
        self.orderer.order_moves(root_moves, board, hint, 0);

        let mut scores = Vec::with_capacity(root_moves.len());
        let mut child_pv = Vec::new();

        for &mv in root_moves.iter() {
            if self.should_stop() {
                break;
            }
            if board.make_move(mv).is_err() {
                continue;
            }
            let score = -self.alpha_beta(board, depth - 1, -Score::INFINITY, Score::INFINITY, 1, &mut child_pv);
            undo(board);

            if self.aborted {
                break;
            }
            scores.push(RootMove { mv, score });
        }

        scores
    }

    /// Build up to `count` reported lines from root scores sorted best-first.
    ///
    /// Line scores are converted to the pawns' perspective. Each continuation follows the table's best moves from the position
    /// after the root move, for at most `depth - 1` further plies, and stops
    /// at the first miss, illegal move or finished game.
    pub fn build_lines(&mut self, board: &mut BoardState, scores: &[RootMove], depth: u32, count: usize) -> Vec<PvLine> {
        let mut lines = Vec::with_capacity(count.min(scores.len()));
        let sign = board.side_to_move().sign();

        for root in scores.iter().take(count) {
            if board.make_move(root.mv).is_err() {
                continue;
            }
            let mut moves = vec![root.mv];

            for _ in 1..depth {
                if board.is_game_over() {
                    break;
                }
                let next = self.tt.probe(board.hash()).and_then(|e| e.best_move);
                match next {
                    Some(mv) if board.make_move(mv).is_ok() => moves.push(mv),
                    _ => break,
                }
            }

            for _ in 0..moves.len() {
                undo(board);
            }

            lines.push(PvLine {
                moves,
                score: root.score * sign,
                depth,
            });
        }

        lines
    }

    /// Negamax alpha-beta. Returns the score from the side to move's
    /// perspective and fills `pv` with the best line found below this node.
    fn alpha_beta(
        &mut self,
        board: &mut BoardState,
        depth: i32,
        mut alpha: i32,
        beta: i32,
        ply: u32,
        pv: &mut Vec<Move>,
    ) -> i32 {
        pv.clear();

        if self.should_stop() {
            return 0;
        }

        self.nodes += 1;
        self.sel_depth = self.sel_depth.max(ply);

        let result = board.result();
        if result.is_over() {
            return terminal_score(board, result, ply);
        }

        let hash = board.hash();
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(hash) {
            tt_move = entry.best_move;
            if entry.depth >= depth {
                let score = score_from_tt(entry.score, ply);
                match entry.entry_type {
                    EntryType::Exact => {
                        pv.extend(entry.best_move);
                        return score;
                    }
                    EntryType::LowerBound if score >= beta => return score,
                    EntryType::UpperBound if score <= alpha => return score,
                    _ => {}
                }
            }
        }

        if depth <= 0 {
            return self.quiescence(board, alpha, beta, ply);
        }

        let mut moves = board.generate_legal_moves();
        self.orderer.order_moves(&mut moves, board, tt_move, ply as usize);

        let mut best_score = -Score::INFINITY;
        let mut best_move = None;
        let mut entry_type = EntryType::UpperBound;
        let mut child_pv = Vec::new();

        for (i, &mv) in moves.iter().enumerate() {
            if i % STOP_CHECK_INTERVAL == 0 && self.should_stop() {
                return 0;
            }
            if board.make_move(mv).is_err() {
                continue;
            }
            let score = -self.alpha_beta(board, depth - 1, -beta, -alpha, ply + 1, &mut child_pv);
            undo(board);

            if self.aborted {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(mv);

                if score > alpha {
                    alpha = score;
                    entry_type = EntryType::Exact;

                    pv.clear();
                    pv.push(mv);
                    pv.extend_from_slice(&child_pv);

                    if score >= beta {
                        entry_type = EntryType::LowerBound;
                        self.orderer.update_cutoff(ply as usize, mv, depth);
                        break;
                    }
                }
            }
        }

        self.tt.store(hash, score_to_tt(best_score, ply), depth, entry_type, best_move);
        best_score
    }

    /// Quiescence search over captures and promotion threats.
    fn quiescence(&mut self, board: &mut BoardState, mut alpha: i32, beta: i32, ply: u32) -> i32 {
        if self.should_stop() {
            return 0;
        }

        self.nodes += 1;
        self.sel_depth = self.sel_depth.max(ply);

        let result = board.result();
        if result.is_over() {
            return terminal_score(board, result, ply);
        }

        let stand_pat = evaluate_relative(board);
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let side = board.side_to_move();
        let mut tactical: Vec<Move> = board
            .generate_legal_moves()
            .into_iter()
            .filter(|&mv| is_tactical(side, mv))
            .collect();
        if tactical.is_empty() {
            return stand_pat;
        }
        self.orderer.order_moves(&mut tactical, board, None, ply as usize);

        for mv in tactical {
            if board.make_move(mv).is_err() {
                continue;
            }
            let score = -self.quiescence(board, -beta, -alpha, ply + 1);
            undo(board);

            if self.aborted {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Bitboard, Side, Square};

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

    fn best(scores: &[RootMove]) -> RootMove {
        let mut sorted = scores.to_vec();
        sorted.sort_by(|a, b| b.score.cmp(&a.score));
        sorted[0]
    }

    #[test]
    fn test_mate_score_tt_round_trip() {
        for ply in [0u32, 1, 7, 40] {
            for score in [Score::MATE - 3, -(Score::MATE - 9), 250, -40, 0] {
                assert_eq!(score_from_tt(score_to_tt(score, ply), ply), score);
            }
        }
        // A mate found 5 plies from the root, stored at ply 2, is "mate in 3" from that node
        assert_eq!(score_to_tt(Score::MATE - 5, 2), Score::MATE - 3);
        assert_eq!(score_to_tt(123, 9), 123);
    }

    #[test]
    fn test_terminal_score_perspective() {
        // Queen captured, queen to move: the side to move lost
        let board = position(&["e3"], &[], Side::Queen);
        assert_eq!(terminal_score(&board, board.result(), 3), -(Score::MATE - 3));

        let board = position(&[], &["e3"], Side::Queen);
        assert_eq!(terminal_score(&board, board.result(), 2), Score::MATE - 2);

        let board = position(&["a3"], &["a4"], Side::Pawns);
        assert_eq!(terminal_score(&board, board.result(), 5), 0);
    }

    #[test]
    fn test_search_root_scores_every_move() {
        let mut searcher = Searcher::new(1 << 12);
        let mut board = BoardState::new();
        let before = board.clone();
        let mut root_moves = board.generate_legal_moves();

        searcher.begin(None);
        let scores = searcher.search_root(&mut board, 3, &mut root_moves, None);
        searcher.finish();

        assert_eq!(scores.len(), root_moves.len());
        assert_eq!(board, before);
        assert!(searcher.nodes() > 0);
        assert!(searcher.sel_depth() >= 3);
    }

    #[test]
    fn test_finds_promotion_in_one() {
        let mut searcher = Searcher::new(1 << 12);
        let mut board = position(&["b7", "g2"], &["e5"], Side::Pawns);
        let mut root_moves = board.generate_legal_moves();

        searcher.begin(None);
        let scores = searcher.search_root(&mut board, 1, &mut root_moves, None);
        searcher.finish();

        let top = best(&scores);
        assert_eq!(top.mv, Move::quiet(sq("b7"), sq("b8")));
        assert_eq!(top.score, Score::MATE - 1);
    }

    #[test]
    fn test_queen_captures_last_pawn() {
        let mut searcher = Searcher::new(1 << 12);
        let mut board = position(&["c5"], &["c1"], Side::Queen);
        let mut root_moves = board.generate_legal_moves();

        searcher.begin(None);
        let scores = searcher.search_root(&mut board, 2, &mut root_moves, None);
        searcher.finish();

        let top = best(&scores);
        assert!(top.mv.is_capture());
        assert_eq!(top.mv.to, sq("c5"));
        assert_eq!(top.score, Score::MATE - 1);
    }

    #[test]
    fn test_quiescence_sees_capture() {
        // Pawns to move can take the queen; depth 0 must still see it through quiescence
        let mut searcher = Searcher::new(1 << 12);
        let mut board = position(&["d2", "a2"], &["e3"], Side::Pawns);

        searcher.begin(None);
        let score = searcher.quiescence(&mut board, -Score::INFINITY, Score::INFINITY, 0);
        searcher.finish();

        assert_eq!(score, Score::MATE - 1);
    }

    #[test]
    fn test_build_lines_follow_table() {
        let mut searcher = Searcher::new(1 << 14);
        let mut board = BoardState::new();
        let before = board.clone();
        let mut root_moves = board.generate_legal_moves();

        searcher.begin(None);
        let mut scores = searcher.search_root(&mut board, 4, &mut root_moves, None);
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        let lines = searcher.build_lines(&mut board, &scores, 4, 3);
        searcher.finish();

        assert_eq!(lines.len(), 3);
        assert_eq!(board, before);
        for (line, root) in lines.iter().zip(&scores) {
            assert_eq!(line.first_move(), Some(root.mv));
            assert_eq!(line.score, root.score);
            assert!(line.moves.len() <= 4);

            // Every line must be playable from the root
            let mut replay = before.clone();
            for &mv in &line.moves {
                replay.make_move(mv).unwrap();
            }
        }
    }

    #[test]
    fn test_line_scores_use_pawn_view() {
        // Queen to move takes the last pawn: a win for the queen is negative
        let mut searcher = Searcher::new(1 << 12);
        let mut board = position(&["c5"], &["c1"], Side::Queen);
        let mut root_moves = board.generate_legal_moves();

        searcher.begin(None);
        let mut scores = searcher.search_root(&mut board, 2, &mut root_moves, None);
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        let lines = searcher.build_lines(&mut board, &scores, 2, 2);
        searcher.finish();

        assert_eq!(scores[0].score, Score::MATE - 1);
        assert_eq!(lines[0].score, -(Score::MATE - 1));
        for (line, root) in lines.iter().zip(&scores) {
            assert_eq!(line.score, -root.score);
        }
    }

    #[test]
    fn test_stop_before_search() {
        let mut searcher = Searcher::new(1 << 10);
        let mut board = BoardState::new();
        let mut root_moves = board.generate_legal_moves();

        searcher.begin(None);
        searcher.stop_handle().stop();
        let scores = searcher.search_root(&mut board, 5, &mut root_moves, None);

        assert!(scores.is_empty());
        assert!(searcher.is_aborted());
        assert_eq!(board, BoardState::new());
    }

    #[test]
    fn test_begin_clears_stop_flag() {
        let mut searcher = Searcher::new(1 << 10);
        let handle = searcher.stop_handle();
        handle.stop();

        searcher.begin(None);
        assert!(!handle.is_stopped());
        assert!(handle.is_searching());
        assert!(!searcher.is_aborted());

        searcher.finish();
        assert!(!handle.is_searching());
    }

    #[test]
    fn test_expired_deadline_aborts() {
        let mut searcher = Searcher::new(1 << 10);
        let mut board = BoardState::new();
        let mut root_moves = board.generate_legal_moves();

        searcher.begin(Some(Duration::ZERO));
        let scores = searcher.search_root(&mut board, 6, &mut root_moves, None);
        searcher.finish();

        assert!(scores.is_empty());
        assert!(searcher.is_aborted());
    }

    #[test]
    fn test_clear_hash_and_killers() {
        let mut searcher = Searcher::new(1 << 10);
        let mut board = BoardState::new();
        let mut root_moves = board.generate_legal_moves();

        searcher.begin(None);
        searcher.search_root(&mut board, 3, &mut root_moves, None);
        searcher.finish();
        assert!(searcher.tt_stats().used > 0);

        searcher.clear_hash();
        searcher.clear_killers();
        assert_eq!(searcher.tt_stats().used, 0);
    }

    fn first_killer(searcher: &Searcher) -> Option<Move> {
        (0..crate::search::MAX_PLY).find_map(|ply| searcher.orderer.killers(ply)[0])
    }

    #[test]
    fn test_ordering_tables_persist_across_searches() {
        let mut searcher = Searcher::new(1 << 12);
        let mut board = BoardState::new();
        let mut root_moves = board.generate_legal_moves();

        searcher.begin(None);
        searcher.search_root(&mut board, 4, &mut root_moves, None);
        searcher.finish();

        let killer = first_killer(&searcher).unwrap();
        let history = searcher.orderer.history_score(killer);
        assert!(history > 0);

        // A new search leaves killers and history in place
        searcher.begin(None);
        assert_eq!(first_killer(&searcher), Some(killer));
        assert_eq!(searcher.orderer.history_score(killer), history);
        searcher.finish();

        searcher.clear_killers();
        assert!(first_killer(&searcher).is_none());
        assert_eq!(searcher.orderer.history_score(killer), 0);
    }
}
