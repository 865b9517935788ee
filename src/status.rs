use crate::board::{Board, Color};
use crate::moves::generate::legal_moves;

/// The outcome of a position: a side has won, or — only in the
/// (practically unreachable, but handled) case where both sides have
/// pieces yet neither can move — a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Side(Color),
    Draw,
}

/// Game-over detection: if only one side still has pieces, that side wins.
/// Otherwise the side to move loses if it has no legal moves; the opposite
/// side loses if it is the one stuck. Both sides stuck at once cannot arise
/// from legal play but is still resolved, as a draw, rather than panicking.
pub fn winner(board: &Board) -> Option<Winner> {
    let white_has_pieces = board.piece_count(Color::White) > 0;
    let black_has_pieces = board.piece_count(Color::Black) > 0;

    match (white_has_pieces, black_has_pieces) {
        (true, false) => return Some(Winner::Side(Color::White)),
        (false, true) => return Some(Winner::Side(Color::Black)),
        (false, false) => return Some(Winner::Draw),
        (true, true) => {}
    }

    let mover = board.side_to_move;
    let mover_has_moves = !legal_moves(board, mover).is_empty();
    if mover_has_moves {
        return None;
    }

    let other_has_moves = !legal_moves(board, mover.opposite()).is_empty();
    if other_has_moves {
        Some(Winner::Side(mover.opposite()))
    } else {
        Some(Winner::Draw)
    }
}

pub fn is_game_over(board: &Board) -> bool {
    winner(board).is_some()
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
    fn starting_position_is_not_over() {
        let board = Board::new(Variant::British);
        assert!(winner(&board).is_none());
    }

    #[test]
    fn side_with_no_pieces_loses() {
        let board = place_only(
            Variant::British,
            &[(Color::White, PieceKind::Man, 5, 0)],
        );
        assert_eq!(winner(&board), Some(Winner::Side(Color::White)));
    }

    #[test]
    fn starvation_hands_the_win_to_the_other_side() {
        let board = place_only(
            Variant::British,
            &[
                (Color::White, PieceKind::Man, 0, 1),
                (Color::Black, PieceKind::Man, 7, 0),
            ],
        );
        assert_eq!(winner(&board), Some(Winner::Side(Color::Black)));
    }
}
