//! Transposition Table for caching search results
//!
//! The transposition table stores search results indexed by position
//! fingerprint, enabling reuse of previous search results for positions
//! reached again through a different move order or in a later search.
//!
//! Entries carry a generation tag. The generation advances once per
//! top-level search, so stale entries are detected without clearing the
//! table between searches.
//!
//! # Example
//!
//! ```
//! use pigs::board::{Move, Square};
//! use pigs::search::{EntryType, TranspositionTable};
//!
//! let mut tt = TranspositionTable::new(1 << 10);
//! tt.new_search();
//!
//! let hash = 0x1234_5678_9ABC_DEF0;
//! let mv = Move::quiet(Square::new(4, 1), Square::new(4, 2));
//! tt.store(hash, 120, 5, EntryType::Exact, Some(mv));
//!
//! let entry = tt.probe(hash).unwrap();
//! assert_eq!(entry.score, 120);
//! assert_eq!(entry.best_move, Some(mv));
//! ```

use crate::board::Move;

/// Bound kind of a stored score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Exact score - the search completed inside the window
    Exact,
    /// Lower bound - score >= stored value (beta cutoff)
    LowerBound,
    /// Upper bound - score <= stored value (alpha fail-low)
    UpperBound,
}

/// Transposition table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    /// Fingerprint of the position
    pub hash: u64,
    /// Score, with mate scores stored relative to this position
    pub score: i32,
    /// Remaining search depth the score was computed at
    pub depth: i32,
    pub entry_type: EntryType,
    /// Best move found for this position
    pub best_move: Option<Move>,
    /// Generation of the search that wrote the entry
    pub age: u8,
}

/// Fixed-capacity, direct-mapped transposition table.
///
/// Each fingerprint maps to exactly one slot (`hash & (capacity - 1)`);
/// collisions are resolved by the replacement policy in [`store`](Self::store).
pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    mask: usize,
    generation: u8,
    hits: u64,
}

impl TranspositionTable {
    /// Create a table with at least `capacity` slots, rounded up to a power of two.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let size = capacity.max(1).next_power_of_two();
        Self {
            entries: vec![None; size],
            mask: size - 1,
            generation: 0,
            hits: 0,
        }
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        #[allow(clippy::cast_possible_truncation)]
        let low = hash as usize;
        low & self.mask
    }

    /// Number of slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn generation(&self) -> u8 {
        self.generation
    }

    /// Probes that returned an entry since the last [`new_search`](Self::new_search)
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Advance the generation tag. Called once per top-level search.
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.hits = 0;
        log::trace!("transposition table generation {}", self.generation);
    }

    /// Look up a position.
    ///
    /// Returns the entry only when the fingerprint matches exactly and the
    /// entry was written by the current or the immediately preceding
    /// generation. Anything else is a miss.
    pub fn probe(&mut self, hash: u64) -> Option<TTEntry> {
        let entry = self.entries[self.index(hash)]?;
        if entry.hash != hash {
            return None;
        }
        if entry.age != self.generation && entry.age != self.generation.wrapping_sub(1) {
            return None;
        }
        self.hits += 1;
        Some(entry)
    }

    /// Store a search result.
    ///
    /// The slot is overwritten when it is empty, holds a different position,
    /// holds a result from an older generation, or the new search is at least
    /// as deep. Otherwise the deeper same-generation entry is kept.
    pub fn store(
        &mut self,
        hash: u64,
        score: i32,
        depth: i32,
        entry_type: EntryType,
        best_move: Option<Move>,
    ) {
        let idx = self.index(hash);
        let generation = self.generation;

        let should_replace = match &self.entries[idx] {
            None => true,
            Some(e) => e.hash != hash || depth >= e.depth || e.age != generation,
        };

        if should_replace {
            self.entries[idx] = Some(TTEntry {
                hash,
                score,
                depth,
                entry_type,
                best_move,
                age: generation,
            });
        }
    }

    /// Clear all entries and reset the generation counter.
    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.generation = 0;
        self.hits = 0;
        log::trace!("transposition table cleared ({} slots)", self.entries.len());
    }

    /// Get statistics about table usage.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        let size = self.entries.len();
        let used = self.entries.iter().filter(|e| e.is_some()).count();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let usage_percent = (used as f64 / size as f64 * 100.0) as u8;
        TTStats {
            size,
            used,
            usage_percent,
        }
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy)]
pub struct TTStats {
    /// Total number of slots in the table
    pub size: usize,
    /// Number of slots currently occupied
    pub used: usize,
    /// Percentage of table in use (0-100)
    pub usage_percent: u8,
}
