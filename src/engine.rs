//! Iterative-deepening search engine
//!
//! The engine drives the [`Searcher`] from depth 1 up to the configured
//! maximum. After every completed depth it builds a [`SearchInfo`] snapshot
//! (score, node counts, multi-line report) and hands it to the progress
//! callback. Searching stops at the maximum depth, on a stop request, when
//! the time budget runs out, or once a forced result is confirmed deep
//! enough.
//!
//! # Example
//!
//! ```
//! use pigs::{BoardState, SearchConfig, SearchEngine};
//!
//! let config = SearchConfig::default().with_max_depth(3).with_multi_pv(2);
//! let mut engine = SearchEngine::with_config(config).unwrap();
//! let board = BoardState::new();
//!
//! let result = engine.search(&board);
//! assert_eq!(result.depth, 3);
//! assert_eq!(result.lines.len(), 2);
//! println!("best move: {}", result.best_move.unwrap());
//! ```

use std::fmt;
use std::time::Instant;

use crate::board::{format_line, BoardState, Move};
use crate::config::{SearchConfig, MAX_DEPTH, MAX_MULTI_PV};
use crate::error::ConfigError;
use crate::eval::{is_mate_score, Score};
use crate::search::{PvLine, RootMove, Searcher, StopHandle, TTStats};

/// Depth from which a mate score ends the deepening loop
const MATE_EXIT_DEPTH: u32 = 10;

/// Progress callback, invoked on the search thread after each completed depth
pub type SearchCallback = Box<dyn FnMut(&SearchInfo) + Send>;

/// Snapshot of a completed iteration.
///
/// Scores are from the pawns' perspective whichever side moves at the root:
/// positive favours the pawns, negative the queen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: u32,
    /// Deepest ply reached during the iteration, quiescence included
    pub sel_depth: u32,
    pub score: i32,
    pub nodes: u64,
    /// Nodes per second
    pub nps: u64,
    pub time_ms: u64,
    /// Best lines, best first
    pub lines: Vec<PvLine>,
}

impl SearchInfo {
    /// Whether the score encodes a forced result
    pub fn is_mate(&self) -> bool {
        is_mate_score(self.score)
    }

    /// Moves to the decisive result: positive when the pawns win, negative
    /// when the queen wins, 0 without a forced result.
    pub fn mate_in(&self) -> i32 {
        if !self.is_mate() {
            0
        } else if self.score > 0 {
            (Score::MATE - self.score + 1) / 2
        } else {
            -(Score::MATE + self.score + 1) / 2
        }
    }

    /// Principal variation of the best line
    pub fn pv(&self) -> &[Move] {
        self.lines.first().map(|l| l.moves.as_slice()).unwrap_or_default()
    }
}

impl fmt::Display for SearchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "depth {} seldepth {} ", self.depth, self.sel_depth)?;
        if self.is_mate() {
            write!(f, "score mate {} ", self.mate_in())?;
        } else {
            write!(f, "score cp {} ", self.score)?;
        }
        write!(
            f,
            "nodes {} nps {} time {} pv {}",
            self.nodes,
            self.nps,
            self.time_ms,
            format_line(self.pv())
        )
    }
}

/// Result of one engine invocation.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Best move, `None` only when the position has no legal moves
    pub best_move: Option<Move>,
    /// Deepest completed depth, 0 if no iteration completed
    pub depth: u32,
    pub sel_depth: u32,
    /// Score from the pawns' perspective
    pub score: i32,
    /// Nodes searched in total, interrupted iteration included
    pub nodes: u64,
    pub nps: u64,
    pub time_ms: u64,
    pub tt_hits: u64,
    pub lines: Vec<PvLine>,
    /// Search ended by a stop request or the time budget
    pub stopped: bool,
}

impl SearchResult {
    fn empty() -> Self {
        Self::default()
    }
}

/// Search engine with iterative deepening and multi-line reporting.
///
/// The transposition table and the killer/history tables live for the
/// whole engine and carry over between searches until cleared.
pub struct SearchEngine {
    config: SearchConfig,
    searcher: Searcher,
    callback: Option<SearchCallback>,
    best_move: Option<Move>,
}

impl SearchEngine {
    /// Create an engine with default settings.
    pub fn new() -> Self {
        Self::build(SearchConfig::default())
    }

    /// Create an engine from a validated configuration.
    pub fn with_config(config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SearchConfig) -> Self {
        Self {
            searcher: Searcher::new(config.tt_capacity),
            config,
            callback: None,
            best_move: None,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Set the last iterative-deepening depth (at least 1).
    pub fn set_max_depth(&mut self, depth: u32) {
        self.config.max_depth = depth.clamp(1, MAX_DEPTH);
    }

    /// Set the time budget in milliseconds, 0 = unbounded.
    pub fn set_time_limit_ms(&mut self, ms: u64) {
        self.config.time_limit_ms = ms;
    }

    /// Set the number of reported lines, clamped to `1..=10`.
    pub fn set_multi_pv(&mut self, lines: usize) {
        self.config.multi_pv = lines.clamp(1, MAX_MULTI_PV);
    }

    pub fn set_callback(&mut self, callback: impl FnMut(&SearchInfo) + Send + 'static) {
        self.callback = Some(Box::new(callback));
    }

    pub fn clear_callback(&mut self) {
        self.callback = None;
    }

    /// Handle that can stop a running search from another thread
    pub fn stop_handle(&self) -> StopHandle {
        self.searcher.stop_handle()
    }

    /// Request the running search to stop.
    pub fn stop(&self) {
        self.searcher.stop_handle().stop();
    }

    pub fn is_searching(&self) -> bool {
        self.searcher.stop_handle().is_searching()
    }

    /// Best move of the last search
    pub fn best_move(&self) -> Option<Move> {
        self.best_move
    }

    /// Clear the transposition table.
    pub fn clear_hash(&mut self) {
        self.searcher.clear_hash();
    }

    /// Clear killer moves and the history table.
    pub fn clear_killers(&mut self) {
        self.searcher.clear_killers();
    }

    pub fn tt_stats(&self) -> TTStats {
        self.searcher.tt_stats()
    }

    /// Search the position.
    ///
    /// Runs to the configured depth, the time budget, a stop request or a
    /// confirmed forced result, and reports the last fully completed depth.
    /// The board is not modified.
    pub fn search(&mut self, board: &BoardState) -> SearchResult {
        let start = Instant::now();
        self.searcher.begin(self.config.time_limit());

        let mut work = board.clone();
        let mut root_moves = work.generate_legal_moves();
        if root_moves.is_empty() || work.is_game_over() {
            log::warn!("search requested on a finished position ({})", board.result());
            self.searcher.finish();
            self.best_move = None;
            return SearchResult::empty();
        }

        let multi_pv = self.config.multi_pv.clamp(1, MAX_MULTI_PV);
        let mut info = SearchInfo::default();
        let mut best_move = None;
        let mut fallback = None;
        let mut fallback_score = 0;

        for depth in 1..=self.config.max_depth {
            self.searcher.reset_sel_depth();
            #[allow(clippy::cast_possible_wrap)]
            let mut scores = self.searcher.search_root(&mut work, depth as i32, &mut root_moves, best_move);

            if self.searcher.is_aborted() {
                if depth == 1 {
                    match best_partial(&scores) {
                        Some(partial) => {
                            fallback = Some(partial.mv);
                            fallback_score = partial.score * work.side_to_move().sign();
                        }
                        None => fallback = root_moves.first().copied(),
                    }
                }
                log::debug!("depth {depth} abandoned, reporting depth {}", info.depth);
                break;
            }

            scores.sort_by(|a, b| b.score.cmp(&a.score));
            let lines = self.searcher.build_lines(&mut work, &scores, depth, multi_pv);
            let Some(best_score) = lines.first().map(|l| l.score) else {
                continue;
            };

            let elapsed = start.elapsed();
            let nodes = self.searcher.nodes();
            info = SearchInfo {
                depth,
                sel_depth: self.searcher.sel_depth(),
                score: best_score,
                nodes,
                nps: nps(nodes, elapsed.as_millis()),
                time_ms: millis(elapsed.as_millis()),
                lines,
            };
            best_move = info.lines.first().and_then(PvLine::first_move);

            log::debug!(
                "depth {} score {} nodes {} nps {} pv {}",
                info.depth,
                info.score,
                info.nodes,
                info.nps,
                format_line(info.pv())
            );

            if let Some(callback) = self.callback.as_mut() {
                callback(&info);
            }

            if depth >= MATE_EXIT_DEPTH && info.is_mate() {
                log::debug!("forced result at depth {depth}, stopping");
                break;
            }
        }

        let stopped = self.searcher.is_aborted();
        self.searcher.finish();

        let elapsed = start.elapsed();
        let nodes = self.searcher.nodes();
        let best_move = best_move.or(fallback);
        self.best_move = best_move;

        SearchResult {
            best_move,
            depth: info.depth,
            sel_depth: info.sel_depth,
            score: if info.depth > 0 { info.score } else { fallback_score },
            nodes,
            nps: nps(nodes, elapsed.as_millis()),
            time_ms: millis(elapsed.as_millis()),
            tt_hits: self.searcher.tt_hits(),
            lines: info.lines,
            stopped,
        }
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Highest-scored root move of an interrupted first iteration
fn best_partial(scores: &[RootMove]) -> Option<RootMove> {
    scores.iter().copied().fold(None, |best: Option<RootMove>, r| match best {
        Some(b) if b.score >= r.score => Some(b),
        _ => Some(r),
    })
}

#[allow(clippy::cast_possible_truncation)]
fn millis(ms: u128) -> u64 {
    ms.min(u128::from(u64::MAX)) as u64
}

fn nps(nodes: u64, ms: u128) -> u64 {
    if ms == 0 {
        nodes
    } else {
        millis(u128::from(nodes) * 1000 / ms)
    }
}
