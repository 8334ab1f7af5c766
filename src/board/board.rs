//! Board state with reversible move execution and incremental hashing

use std::fmt;

use super::bitboard::Bitboard;
use super::moves::{Move, MoveFlag};
use super::zobrist::ZobristKeys;
use super::{GameResult, Side, Square, BOARD_SIZE, PAWN_START_RANK};
use crate::error::BoardError;

/// Square the queen starts on (d8)
pub const QUEEN_START: Square = Square::new(3, 7);

/// Record of an applied move, enough to restore the previous position exactly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoRecord {
    pub mv: Move,
    /// Piece set removed by a capture (empty for non-captures)
    pub captured: Bitboard,
    /// Fingerprint before the move was applied
    pub hash: u64,
}

/// Game state: pawn and queen bitboards, side to move, ply and fingerprint.
///
/// Mutated only through paired [`make_move`](Self::make_move) /
/// [`unmake_move`](Self::unmake_move) calls; each move pushes one
/// [`UndoRecord`] on the history stack instead of cloning the state.
#[derive(Clone)]
pub struct BoardState {
    pawns: Bitboard,
    queen: Bitboard,
    side: Side,
    ply: u32,
    hash: u64,
    history: Vec<UndoRecord>,
    keys: &'static ZobristKeys,
}

impl BoardState {
    /// Canonical initial position with the shared key table.
    pub fn new() -> Self {
        Self::with_keys(ZobristKeys::shared())
    }

    /// Canonical initial position hashed with the given key table.
    pub fn with_keys(keys: &'static ZobristKeys) -> Self {
        let mut state = Self {
            pawns: Bitboard::EMPTY,
            queen: Bitboard::EMPTY,
            side: Side::Pawns,
            ply: 0,
            hash: 0,
            history: Vec::with_capacity(128),
            keys,
        };
        state.reset();
        state
    }

    /// Build an arbitrary position. See [`set_position`](Self::set_position).
    pub fn from_position(pawns: Bitboard, queen: Bitboard, side: Side) -> Result<Self, BoardError> {
        let mut state = Self::new();
        state.set_position(pawns, queen, side)?;
        Ok(state)
    }

    /// Restore the canonical initial position: eight pawns on rank 2,
    /// queen on d8, pawns to move.
    pub fn reset(&mut self) {
        self.pawns = Bitboard::RANK_2;
        self.queen = Bitboard::from_square(QUEEN_START);
        self.side = Side::Pawns;
        self.ply = 0;
        self.history.clear();
        self.hash = self.compute_hash();
    }

    /// Set up an arbitrary position and clear the history.
    ///
    /// Rejects overlapping piece sets, more than one queen and pawns behind
    /// their start rank. On error the board is unchanged.
    pub fn set_position(&mut self, pawns: Bitboard, queen: Bitboard, side: Side) -> Result<(), BoardError> {
        if !(pawns & queen).is_empty() {
            return Err(BoardError::InvalidPosition(
                "pawn and queen sets overlap".to_string(),
            ));
        }
        if queen.count() > 1 {
            return Err(BoardError::InvalidPosition(format!(
                "expected at most one queen, found {}",
                queen.count()
            )));
        }
        if !(pawns & Bitboard::RANK_1).is_empty() {
            return Err(BoardError::InvalidPosition(
                "pawn behind its start rank".to_string(),
            ));
        }

        self.pawns = pawns;
        self.queen = queen;
        self.side = side;
        self.ply = 0;
        self.history.clear();
        self.hash = self.compute_hash();
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[inline]
    pub fn pawns(&self) -> Bitboard {
        self.pawns
    }

    #[inline]
    pub fn queen(&self) -> Bitboard {
        self.queen
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.pawns | self.queen
    }

    #[inline]
    pub fn side_to_move(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    /// Incrementally maintained fingerprint
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Fingerprint recomputed from scratch (equals [`hash`](Self::hash) at all times)
    pub fn compute_hash(&self) -> u64 {
        self.keys.hash(self.pawns, self.queen, self.side)
    }

    /// Applied moves, oldest first
    pub fn history(&self) -> &[UndoRecord] {
        &self.history
    }

    #[inline]
    pub fn queen_square(&self) -> Option<Square> {
        self.queen.lsb()
    }

    #[inline]
    pub fn pawn_count(&self) -> u32 {
        self.pawns.count()
    }

    #[inline]
    pub fn is_pawn_at(&self, sq: Square) -> bool {
        self.pawns.get(sq)
    }

    #[inline]
    pub fn is_queen_at(&self, sq: Square) -> bool {
        self.queen.get(sq)
    }

    /// Squares the queen attacks (empty if the queen is gone)
    pub fn queen_attacks(&self) -> Bitboard {
        match self.queen_square() {
            Some(sq) => Bitboard::queen_attacks(sq, self.occupied()),
            None => Bitboard::EMPTY,
        }
    }

    // =========================================================================
    // Move generation
    // =========================================================================

    /// All legal moves for the side to move.
    ///
    /// There is no check concept in this game, so pseudo-legal moves are legal.
    pub fn generate_legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(32);
        match self.side {
            Side::Pawns => self.generate_pawn_moves(&mut moves),
            Side::Queen => self.generate_queen_moves(&mut moves),
        }
        moves
    }

    pub fn legal_move_count(&self) -> usize {
        self.generate_legal_moves().len()
    }

    /// Whether any legal move exists, without allocating a move list
    pub fn has_legal_moves(&self) -> bool {
        let empty = !self.occupied();
        match self.side {
            Side::Pawns => {
                let pushes = Bitboard(self.pawns.0 << 8) & empty;
                let left = Bitboard((self.pawns & !Bitboard::FILE_A).0 << 7);
                let right = Bitboard((self.pawns & !Bitboard::FILE_H).0 << 9);
                !pushes.is_empty() || !((left | right) & self.queen).is_empty()
            }
            Side::Queen => !self.queen_attacks().is_empty(),
        }
    }

    fn generate_pawn_moves(&self, moves: &mut Vec<Move>) {
        let occupied = self.occupied();

        for from in self.pawns.iter() {
            if let Some(to) = from.offset(0, 1) {
                if !occupied.get(to) {
                    moves.push(Move::new(from, to, MoveFlag::Quiet));

                    if from.rank() == PAWN_START_RANK {
                        if let Some(to2) = from.offset(0, 2) {
                            if !occupied.get(to2) {
                                moves.push(Move::new(from, to2, MoveFlag::DoubleStep));
                            }
                        }
                    }
                }
            }

            for file_delta in [-1i8, 1] {
                if let Some(target) = from.offset(file_delta, 1) {
                    if self.queen.get(target) {
                        moves.push(Move::new(from, target, MoveFlag::Capture));
                    }
                }
            }
        }
    }

    fn generate_queen_moves(&self, moves: &mut Vec<Move>) {
        let Some(from) = self.queen_square() else {
            return;
        };
        let occupied = self.occupied();
        let attacks = Bitboard::queen_attacks(from, occupied);

        for to in (attacks & !occupied).iter() {
            moves.push(Move::new(from, to, MoveFlag::Quiet));
        }
        for to in (attacks & self.pawns).iter() {
            moves.push(Move::new(from, to, MoveFlag::Capture));
        }
    }

    /// Check a single move against the position without building the move list.
    pub fn is_legal_move(&self, mv: Move) -> bool {
        let occupied = self.occupied();
        match self.side {
            Side::Pawns => {
                if !self.pawns.get(mv.from) {
                    return false;
                }
                match mv.flag {
                    MoveFlag::Quiet => {
                        mv.from.offset(0, 1) == Some(mv.to) && !occupied.get(mv.to)
                    }
                    MoveFlag::DoubleStep => {
                        mv.from.rank() == PAWN_START_RANK
                            && mv.from.offset(0, 2) == Some(mv.to)
                            && mv.from.offset(0, 1).is_some_and(|mid| !occupied.get(mid))
                            && !occupied.get(mv.to)
                    }
                    MoveFlag::Capture => {
                        (mv.from.offset(-1, 1) == Some(mv.to) || mv.from.offset(1, 1) == Some(mv.to))
                            && self.queen.get(mv.to)
                    }
                }
            }
            Side::Queen => {
                if self.queen_square() != Some(mv.from) {
                    return false;
                }
                let attacks = Bitboard::queen_attacks(mv.from, occupied);
                if !attacks.get(mv.to) {
                    return false;
                }
                match mv.flag {
                    MoveFlag::Quiet => !occupied.get(mv.to),
                    MoveFlag::Capture => self.pawns.get(mv.to),
                    MoveFlag::DoubleStep => false,
                }
            }
        }
    }

    // =========================================================================
    // Move execution
    // =========================================================================

    /// Apply a legal move. Illegal moves are rejected and the state is left
    /// untouched.
    pub fn make_move(&mut self, mv: Move) -> Result<(), BoardError> {
        if !self.is_legal_move(mv) {
            return Err(BoardError::IllegalMove { mv });
        }

        let mut undo = UndoRecord {
            mv,
            captured: Bitboard::EMPTY,
            hash: self.hash,
        };

        match self.side {
            Side::Pawns => {
                if mv.is_capture() {
                    undo.captured = self.queen;
                    self.hash ^= self.keys.queen(mv.to);
                    self.queen = Bitboard::EMPTY;
                }
                self.hash ^= self.keys.pawn(mv.from) ^ self.keys.pawn(mv.to);
                self.pawns.clear(mv.from);
                self.pawns.set(mv.to);
            }
            Side::Queen => {
                if mv.is_capture() {
                    undo.captured = Bitboard::from_square(mv.to);
                    self.hash ^= self.keys.pawn(mv.to);
                    self.pawns.clear(mv.to);
                }
                self.hash ^= self.keys.queen(mv.from) ^ self.keys.queen(mv.to);
                self.queen.clear(mv.from);
                self.queen.set(mv.to);
            }
        }

        self.hash = self.keys.toggle_side(self.hash);
        self.side = self.side.opponent();
        self.ply += 1;
        self.history.push(undo);
        Ok(())
    }

    /// Revert the most recent move, returning it.
    pub fn unmake_move(&mut self) -> Result<Move, BoardError> {
        let undo = self.history.pop().ok_or(BoardError::EmptyHistory)?;
        let mv = undo.mv;

        self.side = self.side.opponent();
        self.ply -= 1;

        match self.side {
            Side::Pawns => {
                self.pawns.clear(mv.to);
                self.pawns.set(mv.from);
                if mv.is_capture() {
                    self.queen = undo.captured;
                }
            }
            Side::Queen => {
                self.queen.clear(mv.to);
                self.queen.set(mv.from);
                if mv.is_capture() {
                    self.pawns |= undo.captured;
                }
            }
        }

        self.hash = undo.hash;
        Ok(mv)
    }

    // =========================================================================
    // Game state
    // =========================================================================

    /// Game outcome, checked in priority order: advancement, queen captured,
    /// pawns exhausted, stalemate.
    pub fn result(&self) -> GameResult {
        if !(self.pawns & Bitboard::RANK_8).is_empty() {
            return GameResult::PawnsWinAdvancement;
        }
        if self.queen.is_empty() {
            return GameResult::PawnsWinCapture;
        }
        if self.pawns.is_empty() {
            return GameResult::QueenWins;
        }
        if !self.has_legal_moves() {
            return GameResult::Stalemate;
        }
        GameResult::Ongoing
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.result().is_over()
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// Parse coordinate text such as `e2e4`, inferring the flag from the
    /// position. The returned move is not checked for legality.
    pub fn parse_move(&self, text: &str) -> Result<Move, BoardError> {
        let text = text.trim();
        if text.len() != 4 || !text.is_ascii() {
            return Err(BoardError::InvalidMoveText(text.to_string()));
        }
        let from: Square = text[0..2]
            .parse()
            .map_err(|_| BoardError::InvalidMoveText(text.to_string()))?;
        let to: Square = text[2..4]
            .parse()
            .map_err(|_| BoardError::InvalidMoveText(text.to_string()))?;

        let flag = match self.side {
            Side::Pawns if self.queen.get(to) => MoveFlag::Capture,
            Side::Pawns if to.rank() == from.rank() + 2 => MoveFlag::DoubleStep,
            Side::Queen if self.pawns.get(to) => MoveFlag::Capture,
            _ => MoveFlag::Quiet,
        };
        Ok(Move::new(from, to, flag))
    }

    /// FEN-style description: ranks 8 to 1, `P` pawn, `q` queen, then side
    /// to move and a full-move counter.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(48);
        for rank in (0..BOARD_SIZE).rev() {
            let mut empty = 0;
            for file in 0..BOARD_SIZE {
                let sq = Square::new(file, rank);
                let piece = if self.pawns.get(sq) {
                    Some('P')
                } else if self.queen.get(sq) {
                    Some('q')
                } else {
                    None
                };
                match piece {
                    Some(c) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(c);
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        fen.push_str(if self.side == Side::Pawns { " w" } else { " b" });
        fen.push_str(" - - 0 ");
        fen.push_str(&(self.ply / 2 + 1).to_string());
        fen
    }

    /// Parse the layout produced by [`to_fen`](Self::to_fen). Only the
    /// placement field is required; side defaults to the pawns.
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let mut fields = fen.split_whitespace();
        let placement = fields
            .next()
            .ok_or_else(|| BoardError::InvalidFen("empty string".to_string()))?;

        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != BOARD_SIZE as usize {
            return Err(BoardError::InvalidFen(format!(
                "expected 8 ranks, found {}",
                rows.len()
            )));
        }

        let mut pawns = Bitboard::EMPTY;
        let mut queen = Bitboard::EMPTY;
        for (i, row) in rows.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let rank = BOARD_SIZE - 1 - i as u8;
            let mut file = 0u8;
            for c in row.chars() {
                if file >= BOARD_SIZE {
                    return Err(BoardError::InvalidFen(format!("rank {} too long", rank + 1)));
                }
                match c {
                    'P' | 'p' => {
                        pawns.set(Square::new(file, rank));
                        file += 1;
                    }
                    'Q' | 'q' => {
                        queen.set(Square::new(file, rank));
                        file += 1;
                    }
                    '1'..='8' => {
                        #[allow(clippy::cast_possible_truncation)]
                        let run = c as u8 - b'0';
                        file += run;
                    }
                    other => {
                        return Err(BoardError::InvalidFen(format!("unexpected character {other:?}")));
                    }
                }
            }
            if file != BOARD_SIZE {
                return Err(BoardError::InvalidFen(format!(
                    "rank {} has {} files",
                    rank + 1,
                    file
                )));
            }
        }

        let side = match fields.next() {
            None | Some("w") => Side::Pawns,
            Some("b") => Side::Queen,
            Some(other) => {
                return Err(BoardError::InvalidFen(format!("bad side to move {other:?}")));
            }
        };

        // Castling, en passant and halfmove fields are placeholders
        let fullmove = fields.nth(3).map(str::parse::<u32>);
        let fullmove = match fullmove {
            None => 1,
            Some(Ok(n)) if n >= 1 => n,
            Some(_) => return Err(BoardError::InvalidFen("bad full-move number".to_string())),
        };

        let ply = (fullmove - 1)
            .checked_mul(2)
            .and_then(|p| p.checked_add(u32::from(side == Side::Queen)))
            .ok_or_else(|| BoardError::InvalidFen("bad full-move number".to_string()))?;

        let mut state = Self::from_position(pawns, queen, side)
            .map_err(|e| BoardError::InvalidFen(e.to_string()))?;
        state.ply = ply;
        Ok(state)
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for BoardState {
    fn eq(&self, other: &Self) -> bool {
        self.pawns == other.pawns
            && self.queen == other.queen
            && self.side == other.side
            && self.ply == other.ply
            && self.hash == other.hash
    }
}

impl Eq for BoardState {}

impl fmt::Debug for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardState")
            .field("fen", &self.to_fen())
            .field("hash", &format_args!("{:#018x}", self.hash))
            .field("history_len", &self.history.len())
            .finish()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..BOARD_SIZE).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..BOARD_SIZE {
                let sq = Square::new(file, rank);
                let c = if self.pawns.get(sq) {
                    'P'
                } else if self.queen.get(sq) {
                    'q'
                } else {
                    '.'
                };
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")?;
        let side = match self.side {
            Side::Pawns => "pawns",
            Side::Queen => "queen",
        };
        write!(f, "\n   ({side} to move)")
    }
}
