use crate::board::{Board, Color, Piece, PieceKind};
use crate::moves::generate::legal_moves;
use crate::moves::types::Move;

/// Phase-dependent weight vector for one board size. `EvalProfile::for_size`
/// returns the tuned default; `Game::set_evaluator_profile` lets a caller
/// override it without touching the search core.
#[derive(Debug, Clone, Copy)]
pub struct EvalProfile {
    pub man_value: f64,
    pub king_value_open: f64,
    pub king_value_end: f64,
    pub progress: f64,
    pub center: f64,
    pub back_rank: f64,
    pub promotion_threat: f64,
    pub edge_anchor: f64,
    pub support: f64,
    pub mobility: f64,
    pub capture_pressure: f64,
    pub capture_opportunity: f64,
    pub threatened: f64,
}

const PROFILE_8: EvalProfile = EvalProfile {
    man_value: 1.0,
    king_value_open: 2.05,
    king_value_end: 2.35,
    progress: 0.06,
    center: 0.04,
    back_rank: 0.15,
    promotion_threat: 0.08,
    edge_anchor: 0.03,
    support: 0.05,
    mobility: 0.03,
    capture_pressure: 0.12,
    capture_opportunity: 0.20,
    threatened: 0.25,
};

const PROFILE_10: EvalProfile = EvalProfile {
    man_value: 1.0,
    king_value_open: 2.65,
    king_value_end: 3.10,
    progress: 0.05,
    center: 0.05,
    back_rank: 0.12,
    promotion_threat: 0.07,
    edge_anchor: 0.04,
    support: 0.06,
    mobility: 0.025,
    capture_pressure: 0.15,
    capture_opportunity: 0.22,
    threatened: 0.28,
};

impl EvalProfile {
    pub fn for_size(size: u8) -> EvalProfile {
        if size >= 10 { PROFILE_10 } else { PROFILE_8 }
    }
}

fn phase(board: &Board) -> f64 {
    let total = board.initial_total_both_sides() as f64;
    if total <= 0.0 {
        return 1.0;
    }
    (1.0 - board.total_piece_count() as f64 / total).clamp(0.0, 1.0)
}

fn material_value(piece: Piece, profile: &EvalProfile, phase: f64) -> f64 {
    match piece.kind {
        PieceKind::Man => profile.man_value,
        PieceKind::King => {
            profile.king_value_open + (profile.king_value_end - profile.king_value_open) * phase
        }
    }
}

fn forward_progress(piece: Piece, board: &Board) -> f64 {
    let max_rank = board.max_rank() as f64;
    if max_rank <= 0.0 {
        return 0.0;
    }
    match piece.color {
        Color::White => (max_rank - piece.square.row as f64) / max_rank,
        Color::Black => piece.square.row as f64 / max_rank,
    }
}

fn center_bias(piece: Piece, board: &Board) -> f64 {
    let max_rank = board.max_rank() as f64;
    let center = max_rank / 2.0;
    let dist = (piece.square.row as f64 - center).abs() + (piece.square.col as f64 - center).abs();
    1.0 - dist / (2.0 * center)
}

fn back_rank_guard(piece: Piece, board: &Board) -> f64 {
    if piece.square.row == board.home_rank(piece.color) {
        1.0
    } else {
        0.0
    }
}

fn promotion_threat(piece: Piece, board: &Board) -> f64 {
    let max_rank = board.max_rank() as f64;
    if max_rank <= 0.0 {
        return 0.0;
    }
    let opp_home = board.home_rank(piece.color.opposite()) as f64;
    let dist = (piece.square.row as f64 - opp_home).abs();
    1.0 - dist / max_rank
}

fn edge_anchor(piece: Piece, board: &Board) -> f64 {
    let max_col = board.max_rank() as i8; // square grid: same extent on both axes
    let col = piece.square.col;
    if col == 0 || col == max_col {
        1.0
    } else if col == 1 || col == max_col - 1 {
        0.5
    } else {
        0.0
    }
}

fn support_network(piece: Piece, board: &Board) -> f64 {
    let mut same = 0;
    let mut total = 0;
    for (dr, dc) in crate::board::DIAGONALS {
        let nb = Board::neighbor(piece.square, dr, dc);
        if !nb.in_bounds(board.size) {
            continue;
        }
        total += 1;
        if let Some(other) = board.piece_at(nb)
            && other.color == piece.color
        {
            same += 1;
        }
    }
    if total == 0 { 0.0 } else { same as f64 / total as f64 }
}

fn capture_pressure(moves: &[(Piece, Vec<Move>)]) -> f64 {
    moves
        .iter()
        .flat_map(|(_, mvs)| mvs.iter())
        .filter(|m| m.is_capture())
        .map(|m| 1.0 + 0.2 * m.capture_count() as f64)
        .sum()
}

fn mobility_count(moves: &[(Piece, Vec<Move>)]) -> usize {
    moves.iter().map(|(_, mvs)| mvs.len()).sum()
}

fn capturable_square_count(moves: &[(Piece, Vec<Move>)]) -> usize {
    let mut seen: Vec<crate::board::Square> = Vec::new();
    for (_, mvs) in moves {
        for mv in mvs {
            for &sq in &mv.captures {
                if !seen.contains(&sq) {
                    seen.push(sq);
                }
            }
        }
    }
    seen.len()
}

/// Ten-term phase-weighted evaluation from `perspective`'s point of view.
/// Built as a single White-minus-Black signed total so that
/// `evaluate(board, White) == -evaluate(board, Black)` holds by
/// construction rather than by careful bookkeeping at each call site.
pub fn evaluate(board: &Board, perspective: Color) -> f64 {
    evaluate_with_profile(board, perspective, &EvalProfile::for_size(board.size))
}

pub fn evaluate_with_profile(board: &Board, perspective: Color, profile: &EvalProfile) -> f64 {
    let ph = phase(board);
    let mut total = 0.0;

    for piece in board.pieces(Color::White).chain(board.pieces(Color::Black)) {
        let sign = if piece.color == Color::White { 1.0 } else { -1.0 };
        total += sign * material_value(piece, profile, ph);
        total += sign * center_bias(piece, board) * profile.center;
        total += sign * edge_anchor(piece, board) * profile.edge_anchor;
        total += sign * support_network(piece, board) * profile.support;
        if piece.kind == PieceKind::Man {
            total += sign * forward_progress(piece, board) * profile.progress;
            total += sign * back_rank_guard(piece, board) * profile.back_rank;
            total += sign * promotion_threat(piece, board) * profile.promotion_threat;
        }
    }

    let white_moves = legal_moves(board, Color::White);
    let black_moves = legal_moves(board, Color::Black);

    let mobility_diff = mobility_count(&white_moves) as f64 - mobility_count(&black_moves) as f64;
    total += mobility_diff * profile.mobility;

    let pressure_diff = capture_pressure(&white_moves) - capture_pressure(&black_moves);
    total += pressure_diff * profile.capture_pressure;

    // White's capturable targets and Black's threatened-piece count are the
    // same quantity viewed from each side; both terms read from this one
    // differential, weighted independently per the data model.
    let target_diff =
        capturable_square_count(&white_moves) as f64 - capturable_square_count(&black_moves) as f64;
    total += target_diff * profile.capture_opportunity;
    total += target_diff * profile.threatened;

    match perspective {
        Color::White => total,
        Color::Black => -total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Variant;

    #[test]
    fn perspective_flip_is_antisymmetric() {
        let board = Board::new(Variant::British);
        let w = evaluate(&board, Color::White);
        let b = evaluate(&board, Color::Black);
        assert!((w + b).abs() < 1e-6);
    }

    #[test]
    fn starting_position_is_balanced() {
        let board = Board::new(Variant::British);
        let w = evaluate(&board, Color::White);
        assert!(w.abs() < 1e-6);
    }

    #[test]
    fn material_advantage_favors_the_heavier_side() {
        let mut board = Board::new(Variant::British);
        let black_man = board.pieces(Color::Black).next().unwrap();
        board.remove(black_man.square);
        assert!(evaluate(&board, Color::White) > 0.0);
        assert!(evaluate(&board, Color::Black) < 0.0);
    }
}
