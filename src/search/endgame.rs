use crate::board::{Board, Color};
use crate::moves::execute::{make_move, unmake_move};
use crate::moves::generate::legal_moves;
use crate::search::eval::evaluate;
use crate::search::options::SearchOptions;
use std::collections::{HashMap, HashSet};

const WIN_SCORE: f64 = 1000.0;

/// Exhaustively solves a low-material position up to `max_plies`, memoizing
/// by `(zobrist, mover)` and guarding against cycles with a per-path visited
/// set — draughts carries no repetition-draw rule, so a position that
/// recurs along the current search path is scored as a draw rather than
/// explored forever.
fn solve(
    board: &mut Board,
    mover: Color,
    plies_left: u32,
    memo: &mut HashMap<(u64, Color), f64>,
    path: &mut HashSet<(u64, Color)>,
) -> f64 {
    let key = (board.zobrist, mover);
    if let Some(&v) = memo.get(&key) {
        return v;
    }
    if path.contains(&key) {
        return 0.0;
    }
    if plies_left == 0 {
        let v = evaluate(board, mover);
        memo.insert(key, v);
        return v;
    }

    let moves = legal_moves(board, mover);
    if moves.is_empty() {
        let v = -WIN_SCORE;
        memo.insert(key, v);
        return v;
    }

    path.insert(key);
    let mut best = f64::NEG_INFINITY;
    for (_, mvs) in &moves {
        for mv in mvs {
            let undo = make_move(board, mv);
            let score = -solve(board, mover.opposite(), plies_left - 1, memo, path);
            unmake_move(board, &undo);
            if score > best {
                best = score;
            }
        }
    }
    path.remove(&key);
    memo.insert(key, best);
    best
}

/// Attempts to solve `board` exactly for `mover`, returning `None` when the
/// position has too much material left or the solver is disabled.
pub fn try_solve(board: &Board, mover: Color, options: &SearchOptions) -> Option<f64> {
    if !options.endgame_solver {
        return None;
    }
    if board.total_piece_count() as u8 > options.endgame_max_pieces {
        return None;
    }
    let mut scratch = board.clone();
    let mut memo = HashMap::new();
    let mut path = HashSet::new();
    Some(solve(
        &mut scratch,
        mover,
        options.endgame_max_plies,
        &mut memo,
        &mut path,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{PieceKind, Square, Variant};

    fn place_only(variant: Variant, placements: &[(Color, PieceKind, i8, i8)]) -> Board {
        let mut board = Board::new(variant);
        for row in 0..board.size {
            for col in 0..board.size {
                let sq = Square::new(row as i8, col as i8);
                if let Some(p) = board.piece_at(sq) {
                    board.remove(p.square);
                }
            }
        }
        for &(color, kind, row, col) in placements {
            board.place_new(color, kind, Square::new(row, col));
        }
        board
    }

    #[test]
    fn lone_king_with_no_moves_loses() {
        let board = place_only(
            Variant::British,
            &[
                (Color::White, PieceKind::Man, 0, 1),
                (Color::Black, PieceKind::Man, 7, 0),
            ],
        );
        let options = SearchOptions::default();
        let score = try_solve(&board, Color::White, &options).unwrap();
        assert_eq!(score, -WIN_SCORE);
    }

    #[test]
    fn skips_when_too_much_material() {
        let board = Board::new(Variant::British);
        let mut options = SearchOptions::default();
        options.endgame_max_pieces = 2;
        assert!(try_solve(&board, Color::White, &options).is_none());
    }
}
