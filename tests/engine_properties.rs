use draughts_core::board::{Board, Color, Square, Variant};
use draughts_core::moves::generate::legal_moves;
use draughts_core::search::cancel::Cancel;
use draughts_core::search::minimax::{search, SearchOutcome};
use draughts_core::search::options::SearchOptions;
use draughts_core::search::tt::{Bound, TranspositionTable};
use std::time::{Duration, Instant};

#[test]
fn move_generation_is_deterministic_across_runs() {
    let board = Board::new(Variant::International);
    let a = legal_moves(&board, Color::White);
    let b = legal_moves(&board, Color::White);
    assert_eq!(a.len(), b.len());
    for (left, right) in a.iter().zip(b.iter()) {
        assert_eq!(left.0.square, right.0.square);
        assert_eq!(left.1.len(), right.1.len());
    }
}

#[test]
fn tt_perspective_entries_are_not_aliased() {
    let board = Board::new(Variant::British);
    let mut tt = TranspositionTable::new(64);
    tt.store(board.zobrist, Color::White, 2, 1.5, Bound::Exact, None);
    tt.store(board.zobrist, Color::Black, 2, -1.5, Bound::Exact, None);

    let white_entry = tt.get(board.zobrist, Color::White).unwrap();
    let black_entry = tt.get(board.zobrist, Color::Black).unwrap();
    assert_eq!(white_entry.score, 1.5);
    assert_eq!(black_entry.score, -1.5);
}

#[test]
fn bounded_time_search_returns_within_the_deadline() {
    let board = Board::new(Variant::International);
    let mut options = SearchOptions::default();
    options.max_depth = 30;
    options.time_limit_ms = Some(100);
    let cancel = Cancel::new();

    let start = Instant::now();
    let outcome = search(&board, &options, &cancel);
    let elapsed = start.elapsed();

    assert!(elapsed < Duration::from_millis(500));
    assert!(matches!(
        outcome,
        SearchOutcome::Completed { .. } | SearchOutcome::TimeUp { .. }
    ));
}

#[test]
fn overwhelming_material_scores_strictly_in_favor_of_the_stronger_side() {
    let mut board = Board::new(Variant::British);
    for row in 0..board.size {
        for col in 0..board.size {
            let sq = Square::new(row as i8, col as i8);
            if let Some(p) = board.piece_at(sq)
                && p.color == Color::Black
                && p.square != Square::new(0, 1)
            {
                board.remove(p.square);
            }
        }
    }
    let score = draughts_core::search::eval::evaluate(&board, Color::White);
    assert!(score > 0.0);
    let opposite = draughts_core::search::eval::evaluate(&board, Color::Black);
    assert!(opposite < 0.0);
}
