use crate::board::{Board, Color, Piece, Square, Variant};
use crate::error::EngineError;
use crate::moves::execute::{make_move, unmake_move};
use crate::moves::generate::legal_moves;
use crate::moves::types::{Move, Undo};
use crate::search::cancel::Cancel;
use crate::search::eval::EvalProfile;
use crate::search::mcts::{self, MctsOptions};
use crate::search::minimax::{self, SearchOutcome};
use crate::search::options::SearchOptions;
use crate::status::{self, Winner};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Minimax,
    Mcts,
}

/// A read-only view of the current position, handed out instead of a live
/// `&Board` so a collaborator cannot accidentally reach past the façade and
/// mutate state that move-history bookkeeping depends on.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub pieces: Vec<Piece>,
    pub side_to_move: Color,
    pub winner: Option<Winner>,
}

impl Snapshot {
    fn from_board(board: &Board) -> Self {
        let mut pieces: Vec<Piece> = board
            .pieces(Color::White)
            .chain(board.pieces(Color::Black))
            .collect();
        pieces.sort_by_key(|p| (p.square.row, p.square.col));
        Self {
            pieces,
            side_to_move: board.side_to_move,
            winner: status::winner(board),
        }
    }
}

struct MoveRecord {
    undo: Undo,
}

/// The single entry point external collaborators drive: owns the board, the
/// applied-move history needed to support multi-ply `undo`, and per-size
/// evaluator overrides. Mirrors the move/undo bookkeeping pattern of the
/// system this was distilled from, layered strictly on top of the
/// single-ply `make_move`/`unmake_move` primitives — the façade's history is
/// what lets a caller undo several plies, not a requirement of the board
/// itself.
pub struct Game {
    board: Board,
    history: Vec<MoveRecord>,
    profiles: HashMap<u8, EvalProfile>,
}

impl Game {
    pub fn new_game(variant: Variant) -> Self {
        Self {
            board: Board::new(variant),
            history: Vec::new(),
            profiles: HashMap::new(),
        }
    }

    pub fn reset(&mut self, variant: Option<Variant>) {
        let variant = variant.unwrap_or(self.board.variant());
        self.board = Board::new(variant);
        self.history.clear();
    }

    pub fn current_board(&self) -> Snapshot {
        Snapshot::from_board(&self.board)
    }

    pub fn legal_moves_for(&self, row: i8, col: i8) -> Result<Vec<Move>, EngineError> {
        let sq = Square::new(row, col);
        if !sq.in_bounds(self.board.size) {
            return Err(EngineError::InvalidArgument(format!(
                "square ({row},{col}) is out of bounds for a {}x{} board",
                self.board.size, self.board.size
            )));
        }
        let Some(piece) = self.board.piece_at(sq) else {
            return Ok(Vec::new());
        };
        if piece.color != self.board.side_to_move {
            return Ok(Vec::new());
        }
        let moves = legal_moves(&self.board, self.board.side_to_move);
        Ok(moves
            .into_iter()
            .find(|(p, _)| p.square == sq)
            .map(|(_, mvs)| mvs)
            .unwrap_or_default())
    }

    /// Validates that `start` followed by `steps` matches exactly one
    /// currently legal move, applies it, and records it for `undo`.
    pub fn make_move(&mut self, start: Square, steps: &[Square]) -> Result<Snapshot, EngineError> {
        let candidates = legal_moves(&self.board, self.board.side_to_move);
        let matched = candidates
            .into_iter()
            .find(|(p, _)| p.square == start)
            .and_then(|(_, mvs)| {
                mvs.into_iter()
                    .find(|m| m.start == start && m.steps.as_slice() == steps)
            });

        let Some(mv) = matched else {
            tracing::debug!(?start, ?steps, "make_move rejected: not a legal move");
            return Err(EngineError::IllegalMove(format!(
                "no legal move from {start} following the given path"
            )));
        };

        let undo = make_move(&mut self.board, &mv);
        self.history.push(MoveRecord { undo });
        Ok(Snapshot::from_board(&self.board))
    }

    pub fn undo(&mut self) -> Result<Snapshot, EngineError> {
        let Some(record) = self.history.pop() else {
            return Err(EngineError::InvalidArgument(
                "no moves to undo".to_string(),
            ));
        };
        unmake_move(&mut self.board, &record.undo);
        Ok(Snapshot::from_board(&self.board))
    }

    pub fn is_game_over(&self) -> Option<Winner> {
        status::winner(&self.board)
    }

    pub fn set_evaluator_profile(&mut self, size: u8, profile: EvalProfile) {
        self.profiles.insert(size, profile);
    }

    fn profile_for_current_board(&self) -> EvalProfile {
        self.profiles
            .get(&self.board.size)
            .copied()
            .unwrap_or_else(|| EvalProfile::for_size(self.board.size))
    }

    /// Static evaluation of the current position from `perspective`, using
    /// whatever profile `set_evaluator_profile` installed for this board
    /// size (or the tuned default if none was set).
    pub fn evaluate_current(&self, perspective: Color) -> f64 {
        let profile = self.profile_for_current_board();
        crate::search::eval::evaluate_with_profile(&self.board, perspective, &profile)
    }

    /// Selects a move for `color` using `algorithm`, without applying it.
    /// Returns `Ok(None)` when the position is already over for that side —
    /// per the error-handling contract, an AI with no legal moves is not an
    /// error, just a signal to check `is_game_over` instead.
    pub fn select_ai_move(
        &self,
        color: Color,
        algorithm: Algorithm,
        options: &SearchOptions,
        mcts_options: Option<&MctsOptions>,
        cancel: Option<Cancel>,
    ) -> Result<Option<Move>, EngineError> {
        if self.board.side_to_move != color {
            return Err(EngineError::InvalidArgument(format!(
                "it is not {color}'s turn to move"
            )));
        }
        if legal_moves(&self.board, color).is_empty() {
            return Ok(None);
        }

        let cancel = cancel.unwrap_or_default();

        let chosen = match algorithm {
            Algorithm::Minimax => {
                let outcome = if options.parallel {
                    minimax::search_parallel(&self.board, options, &cancel)
                } else {
                    minimax::search(&self.board, options, &cancel)
                };
                match outcome {
                    SearchOutcome::Cancelled => {
                        tracing::debug!("select_ai_move cancelled before any move was chosen");
                        return Err(EngineError::Cancelled);
                    }
                    SearchOutcome::Completed { best_move, .. }
                    | SearchOutcome::TimeUp { best_move, .. } => best_move,
                }
            }
            Algorithm::Mcts => {
                let mcts_options = mcts_options
                    .cloned()
                    .unwrap_or_default();
                if mcts_options.root_parallel_workers > 1 {
                    mcts::run_root_parallel(&self.board, &mcts_options, &cancel)
                } else {
                    mcts::run(&self.board, &mcts_options, &cancel).map(|(mv, _)| mv)
                }
            }
        };

        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_starts_unfinished() {
        let game = Game::new_game(Variant::British);
        assert!(game.is_game_over().is_none());
        assert_eq!(game.current_board().side_to_move, Color::White);
    }

    #[test]
    fn make_move_then_undo_round_trips() {
        let mut game = Game::new_game(Variant::British);
        let before = game.current_board();
        let mv = legal_moves(&game.board, Color::White)[0].1[0];
        let steps: Vec<Square> = mv.steps.iter().copied().collect();

        game.make_move(mv.start, &steps).unwrap();
        assert_ne!(game.current_board().side_to_move, before.side_to_move);

        game.undo().unwrap();
        assert_eq!(game.current_board().side_to_move, before.side_to_move);
        assert_eq!(game.current_board().pieces.len(), before.pieces.len());
    }

    #[test]
    fn illegal_move_is_rejected() {
        let mut game = Game::new_game(Variant::British);
        let bogus = Square::new(3, 3);
        let err = game.make_move(bogus, &[Square::new(2, 2)]);
        assert!(err.is_err());
    }

    #[test]
    fn select_ai_move_returns_a_legal_move() {
        let game = Game::new_game(Variant::British);
        let mut options = SearchOptions::default();
        options.max_depth = 3;
        let mv = game
            .select_ai_move(Color::White, Algorithm::Minimax, &options, None, None)
            .unwrap();
        assert!(mv.is_some());
    }
}
