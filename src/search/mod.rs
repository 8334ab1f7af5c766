//! Search module for the Pigs and Farmers engine
//!
//! Contains:
//! - Transposition table for caching search results
//! - Move ordering (killer and history heuristics)
//! - Negamax alpha-beta search with quiescence and cancellation

pub mod alphabeta;
pub mod ordering;
pub mod tt;

pub use alphabeta::{PvLine, RootMove, Searcher, StopHandle};
pub use ordering::{MoveOrderer, MAX_PLY};
pub use tt::{EntryType, TTEntry, TTStats, TranspositionTable};
