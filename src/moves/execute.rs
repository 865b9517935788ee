use crate::board::{Board, Piece, PieceKind};
use crate::moves::types::{Move, NullMoveUndo, Undo};
use arrayvec::ArrayVec;

/// Applies `mv` to `board`, assuming it is already known to be a legal move
/// (callers that accept external input validate against `generate::legal_moves`
/// first — see `Game::make_move`). Captures are removed in path order;
/// promotion is checked once after the final step.
pub fn make_move(board: &mut Board, mv: &Move) -> Undo {
    let prev_side = board.side_to_move;
    let prev_hash = board.zobrist;

    let mover_before = board.remove(mv.start);
    debug_assert_eq!(mover_before.color, prev_side);

    let mut captured: ArrayVec<Piece, { crate::moves::types::MAX_CHAIN }> = ArrayVec::new();
    let mut square = mover_before.square;
    for (i, &step) in mv.steps.iter().enumerate() {
        if i < mv.captures.len() {
            captured.push(board.remove(mv.captures[i]));
        }
        square = step;
    }

    let mut moved = mover_before;
    moved.square = square;
    board.place(moved);

    let promo_rank = board.home_rank(prev_side.opposite());
    let mover_after = if moved.kind == PieceKind::Man && moved.square.row == promo_rank {
        let removed = board.remove(moved.square);
        let promoted = Piece {
            id: removed.id,
            color: removed.color,
            kind: PieceKind::King,
            square: removed.square,
        };
        board.place(promoted);
        promoted
    } else {
        moved
    };

    board.flip_turn();

    #[cfg(debug_assertions)]
    board.assert_hash();

    Undo {
        start: mv.start,
        mover_before,
        mover_after,
        captured,
        prev_side,
        prev_hash,
    }
}

/// Strictly reverses `make_move`: removes the (possibly promoted) mover,
/// re-places every captured piece, restores the pre-promotion mover at its
/// start square, and restores turn/hash directly from the undo record
/// rather than re-deriving them by inverse XOR.
pub fn unmake_move(board: &mut Board, undo: &Undo) {
    board.remove(undo.mover_after.square);

    for captured in undo.captured.iter().rev() {
        board.place(*captured);
    }

    board.place(undo.mover_before);
    board.side_to_move = undo.prev_side;
    board.zobrist = undo.prev_hash;

    #[cfg(debug_assertions)]
    board.assert_hash();
}

/// Passes the turn without moving a piece, for null-move pruning. Only the
/// side and the two turn-key XORs change.
pub fn make_null_move(board: &mut Board) -> NullMoveUndo {
    let prev_side = board.side_to_move;
    let prev_hash = board.zobrist;
    board.flip_turn();
    NullMoveUndo {
        prev_side,
        prev_hash,
    }
}

pub fn unmake_null_move(board: &mut Board, undo: &NullMoveUndo) {
    board.side_to_move = undo.prev_side;
    board.zobrist = undo.prev_hash;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Color, Square, Variant};
    use crate::moves::generate::legal_moves;

    #[test]
    fn make_unmake_round_trips_hash_from_start_position() {
        let mut board = Board::new(Variant::British);
        let before = board.clone();
        let moves = legal_moves(&board, Color::White);
        let mv = moves[0].1[0];

        let undo = make_move(&mut board, &mv);
        assert_ne!(board.zobrist, before.zobrist);

        unmake_move(&mut board, &undo);
        assert_eq!(board.zobrist, before.zobrist);
        assert_eq!(board.side_to_move, before.side_to_move);
        for color in [Color::White, Color::Black] {
            assert_eq!(board.piece_count(color), before.piece_count(color));
        }
    }

    #[test]
    fn promotion_round_trip() {
        let mut board = Board::new(Variant::British);
        let size = board.size;
        for row in 0..size {
            for col in 0..size {
                let sq = Square::new(row as i8, col as i8);
                if let Some(p) = board.piece_at(sq) {
                    board.remove(p.square);
                }
            }
        }
        board.place_new(Color::White, PieceKind::Man, Square::new(1, 2));
        let before_hash = board.recompute_hash();
        board.zobrist = before_hash;

        let moves = legal_moves(&board, Color::White);
        let mv = moves[0].1[0];
        let undo = make_move(&mut board, &mv);

        let promoted = board.piece_at(mv.end()).unwrap();
        assert_eq!(promoted.kind, PieceKind::King);

        unmake_move(&mut board, &undo);
        let restored = board.piece_at(Square::new(1, 2)).unwrap();
        assert_eq!(restored.kind, PieceKind::Man);
        assert_eq!(board.zobrist, before_hash);
    }

    #[test]
    fn null_move_round_trips() {
        let mut board = Board::new(Variant::British);
        let before_hash = board.zobrist;
        let before_side = board.side_to_move;

        let undo = make_null_move(&mut board);
        assert_ne!(board.side_to_move, before_side);

        unmake_null_move(&mut board, &undo);
        assert_eq!(board.zobrist, before_hash);
        assert_eq!(board.side_to_move, before_side);
    }
}
