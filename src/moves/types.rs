use crate::board::{Color, Piece, PieceKind, Square};
use arrayvec::ArrayVec;
use std::fmt;

/// Upper bound on the number of steps (equivalently, captures) in a single
/// capture sequence. Bounded by the number of pieces that could possibly be
/// on a 10x10 board (50 dark squares); 24 leaves comfortable headroom
/// without resorting to a heap allocation per move.
pub const MAX_CHAIN: usize = 24;

/// A single move: the mover's starting square, the ordered path it follows
/// afterward (one entry per step; the last is the final resting square),
/// and the ordered squares it captures along the way (empty for a
/// non-capturing move). `captures.len()` is either 0 or `steps.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub start: Square,
    pub steps: ArrayVec<Square, MAX_CHAIN>,
    pub captures: ArrayVec<Square, MAX_CHAIN>,
}

impl Move {
    pub fn quiet(start: Square, to: Square) -> Self {
        let mut steps = ArrayVec::new();
        steps.push(to);
        Self {
            start,
            steps,
            captures: ArrayVec::new(),
        }
    }

    #[inline(always)]
    pub fn is_capture(&self) -> bool {
        !self.captures.is_empty()
    }

    #[inline(always)]
    pub fn end(&self) -> Square {
        *self.steps.last().expect("a move always has at least one step")
    }

    #[inline(always)]
    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    /// Number of captured pieces that are Kings, used by the majority
    /// capture tie-break on the 10x10 variant. Must be evaluated against
    /// the board the move was generated from, before it is applied.
    pub fn kings_captured(&self, board: &crate::board::Board) -> usize {
        self.captures
            .iter()
            .filter(|&&sq| {
                board
                    .piece_at(sq)
                    .map(|p| p.kind == PieceKind::King)
                    .unwrap_or(false)
            })
            .count()
    }

    /// Fixed tie-break tuple used when `deterministic_ordering` is enabled:
    /// captures first (more captures sort earlier), then start/end
    /// coordinates lexicographically.
    pub fn tie_break_key(&self) -> (bool, i32, i8, i8, i8, i8) {
        let end = self.end();
        (
            !self.is_capture(),
            -(self.captures.len() as i32),
            self.start.row,
            self.start.col,
            end.row,
            end.col,
        )
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        for step in &self.steps {
            let sep = if self.is_capture() { "x" } else { "-" };
            write!(f, "{sep}{step}")?;
        }
        Ok(())
    }
}

/// Produced by `execute::make_move`; the sole mechanism for reverting a
/// move. Carries both the pre-promotion and post-promotion form of the
/// mover so `unmake` can restore the exact prior piece, plus every captured
/// piece (with its original square already baked into `Piece::square`) so
/// each can be re-placed.
#[derive(Debug, Clone, Copy)]
pub struct Undo {
    pub start: Square,
    pub mover_before: Piece,
    pub mover_after: Piece,
    pub captured: ArrayVec<Piece, MAX_CHAIN>,
    pub prev_side: Color,
    pub prev_hash: u64,
}

/// Produced by `execute::make_null_move`; reverts a "pass" used by null-move
/// pruning, which never places or removes a piece.
#[derive(Debug, Clone, Copy)]
pub struct NullMoveUndo {
    pub prev_side: Color,
    pub prev_hash: u64,
}
