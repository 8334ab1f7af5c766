//! Pigs and Farmers game engine
//!
//! An engine for the asymmetric pawns-against-queen game:
//! - Standard 8x8 board
//! - Eight pawns ("pigs") start on rank 2 and move first
//! - A single queen ("farmer") starts on d8
//! - Pawns move forward only: one step, two from the start rank, and
//!   capture the queen diagonally
//! - Pawns win by reaching rank 8 or capturing the queen
//! - The queen wins by capturing every pawn
//! - A side without legal moves is stalemated (draw)
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Bitboard position, move generation, reversible moves, hashing
//! - [`eval`]: Static position evaluation
//! - [`search`]: Transposition table, move ordering, alpha-beta search
//! - [`engine`]: Iterative deepening driver with multi-line reporting
//! - [`config`]: Search settings
//!
//! # Quick Start
//!
//! ```
//! use pigs::{BoardState, SearchConfig, SearchEngine};
//!
//! let mut board = BoardState::new();
//! let mut engine = SearchEngine::with_config(SearchConfig::default().with_max_depth(4)).unwrap();
//!
//! let result = engine.search(&board);
//! if let Some(mv) = result.best_move {
//!     board.make_move(mv).unwrap();
//!     println!("engine plays {mv}");
//! }
//! ```

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{BoardState, GameResult, Move, MoveFlag, Side, Square};
pub use config::SearchConfig;
pub use engine::{SearchEngine, SearchInfo, SearchResult};
pub use error::{BoardError, ConfigError};
pub use search::{PvLine, StopHandle};
