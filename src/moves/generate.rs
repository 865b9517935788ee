use crate::board::{Board, Color, DIAGONALS, Piece, PieceKind, Square, Variant};
use crate::moves::cache::MoveCache;
use crate::moves::types::Move;
use arrayvec::ArrayVec;
use std::cell::RefCell;

const MAX_MOVES_PER_PIECE: usize = 32;

/// Default capacity for the generator's own cache. Per-thread rather than
/// global: root-parallel search workers already keep private TTs and
/// endgame memos, so a thread-local move cache follows the same no-shared-
/// mutable-state discipline instead of needing a lock.
const DEFAULT_CACHE_CAPACITY: usize = 20_000;

thread_local! {
    static MOVE_CACHE: RefCell<MoveCache> = RefCell::new(MoveCache::new(DEFAULT_CACHE_CAPACITY));
}

#[inline]
fn is_empty(board: &Board, sq: Square, vacated: &[Square]) -> bool {
    sq.in_bounds(board.size) && (board.piece_at(sq).is_none() || vacated.contains(&sq))
}

#[inline]
fn is_enemy(board: &Board, sq: Square, color: Color) -> bool {
    board
        .piece_at(sq)
        .map(|p| p.color != color)
        .unwrap_or(false)
}

fn forward_dirs(color: Color) -> [(i8, i8); 2] {
    match color {
        Color::White => [(-1, -1), (-1, 1)],
        Color::Black => [(1, -1), (1, 1)],
    }
}

/// Non-capturing moves for one piece.
pub fn quiet_moves_for_piece(board: &Board, piece: Piece) -> ArrayVec<Move, MAX_MOVES_PER_PIECE> {
    let mut out = ArrayVec::new();
    let flying = piece.kind == PieceKind::King && board.variant() == Variant::International;

    let dirs: ArrayVec<(i8, i8), 4> = match piece.kind {
        PieceKind::Man => forward_dirs(piece.color).into_iter().collect(),
        PieceKind::King => DIAGONALS.into_iter().collect(),
    };

    for &(dr, dc) in &dirs {
        if flying {
            let mut sq = Board::neighbor(piece.square, dr, dc);
            while is_empty(board, sq, &[]) {
                out.push(Move::quiet(piece.square, sq));
                sq = Board::neighbor(sq, dr, dc);
            }
        } else {
            let sq = Board::neighbor(piece.square, dr, dc);
            if is_empty(board, sq, &[]) {
                out.push(Move::quiet(piece.square, sq));
            }
        }
    }
    out
}

struct CaptureWalk<'a> {
    board: &'a Board,
    color: Color,
    flying: bool,
    dirs: ArrayVec<(i8, i8), 4>,
    start: Square,
    out: &'a mut ArrayVec<Move, MAX_MOVES_PER_PIECE>,
}

/// Depth-first enumeration of capture sequences from one piece's square.
/// `vacated` tracks squares the mover has physically left during this
/// sequence (so a later jump may land on them); `captured` tracks squares
/// already captured in this sequence (ghosted — still blocking, but may not
/// be captured a second time). A sequence is only emitted once no further
/// extension is possible, matching the rule that captures must continue as
/// long as they can.
fn dfs_captures(
    walk: &mut CaptureWalk,
    current: Square,
    vacated: &mut ArrayVec<Square, 24>,
    captured: &mut ArrayVec<Square, 24>,
    steps: &mut ArrayVec<Square, 24>,
) {
    let mut extended = false;

    for &(dr, dc) in &walk.dirs {
        if walk.flying {
            let mut probe = Board::neighbor(current, dr, dc);
            while is_empty(walk.board, probe, vacated) {
                probe = Board::neighbor(probe, dr, dc);
            }
            if probe.in_bounds(walk.board.size)
                && is_enemy(walk.board, probe, walk.color)
                && !captured.contains(&probe)
            {
                let mut land = Board::neighbor(probe, dr, dc);
                while is_empty(walk.board, land, vacated) {
                    vacated.push(current);
                    captured.push(probe);
                    steps.push(land);

                    extended = true;
                    dfs_captures(walk, land, vacated, captured, steps);

                    steps.pop();
                    captured.pop();
                    vacated.pop();
                    land = Board::neighbor(land, dr, dc);
                }
            }
        } else {
            let mid = Board::neighbor(current, dr, dc);
            let land = Board::neighbor(mid, dr, dc);
            if is_enemy(walk.board, mid, walk.color)
                && !captured.contains(&mid)
                && is_empty(walk.board, land, vacated)
            {
                vacated.push(current);
                captured.push(mid);
                steps.push(land);

                extended = true;
                dfs_captures(walk, land, vacated, captured, steps);

                steps.pop();
                captured.pop();
                vacated.pop();
            }
        }
    }

    if !extended && !steps.is_empty() {
        let mut mv_steps = ArrayVec::new();
        mv_steps.extend(steps.iter().copied());
        let mut mv_captures = ArrayVec::new();
        mv_captures.extend(captured.iter().copied());
        walk.out.push(Move {
            start: walk.start,
            steps: mv_steps,
            captures: mv_captures,
        });
    }
}

/// Capture moves for one piece (may be empty). On the 8x8 variant, Men only
/// capture along their forward diagonals and Kings step one square at a
/// time; on 10x10, Men capture in all four directions and Kings fly.
pub fn capture_moves_for_piece(board: &Board, piece: Piece) -> ArrayVec<Move, MAX_MOVES_PER_PIECE> {
    let international = board.variant() == Variant::International;
    let dirs: ArrayVec<(i8, i8), 4> = match piece.kind {
        PieceKind::Man if !international => forward_dirs(piece.color).into_iter().collect(),
        _ => DIAGONALS.into_iter().collect(),
    };
    let flying = piece.kind == PieceKind::King && international;

    let mut out = ArrayVec::new();
    let mut walk = CaptureWalk {
        board,
        color: piece.color,
        flying,
        dirs,
        start: piece.square,
        out: &mut out,
    };
    let mut vacated = ArrayVec::new();
    let mut captured = ArrayVec::new();
    let mut steps = ArrayVec::new();
    dfs_captures(&mut walk, piece.square, &mut vacated, &mut captured, &mut steps);
    out
}

/// All moves available to `color`, keyed by the piece that can make them,
/// with forced capture and (on 10x10) majority capture already applied.
/// Deterministic for a given board: pieces are walked in row-major order and
/// each piece's own moves are generated in a fixed direction order. Consults
/// (and populates) this thread's default move cache, keyed by
/// `(board size, zobrist, color)`; use `legal_moves_cached` to supply a
/// differently-sized cache instead (MCTS rollouts use a smaller one).
pub fn legal_moves(board: &Board, color: Color) -> Vec<(Piece, Vec<Move>)> {
    MOVE_CACHE.with(|cache| legal_moves_cached(board, color, &mut cache.borrow_mut()))
}

/// Same contract as `legal_moves`, but consulting and populating the given
/// cache rather than the default thread-local one.
pub fn legal_moves_cached(
    board: &Board,
    color: Color,
    cache: &mut MoveCache,
) -> Vec<(Piece, Vec<Move>)> {
    if let Some(hit) = cache.get_all(board.size, board.zobrist, color, board) {
        return hit;
    }
    let computed = legal_moves_uncached(board, color);
    cache.insert(board.size, board.zobrist, color, &computed);
    computed
}

fn legal_moves_uncached(board: &Board, color: Color) -> Vec<(Piece, Vec<Move>)> {
    let mut pieces: Vec<Piece> = board.pieces(color).collect();
    pieces.sort_by_key(|p| (p.square.row, p.square.col));

    let mut per_piece: Vec<(Piece, Vec<Move>)> = Vec::with_capacity(pieces.len());
    let mut any_capture = false;
    for piece in &pieces {
        let captures = capture_moves_for_piece(board, *piece);
        if !captures.is_empty() {
            any_capture = true;
        }
        per_piece.push((*piece, captures.into_iter().collect()));
    }

    if !any_capture {
        per_piece.clear();
        for piece in &pieces {
            let quiets: Vec<Move> = quiet_moves_for_piece(board, *piece).into_iter().collect();
            if !quiets.is_empty() {
                per_piece.push((*piece, quiets));
            }
        }
        return per_piece;
    }

    // Forced capture: drop pieces that ended up with no capture moves.
    per_piece.retain(|(_, moves)| !moves.is_empty());

    if board.variant() == Variant::International {
        let max_captures = per_piece
            .iter()
            .flat_map(|(_, moves)| moves.iter())
            .map(Move::capture_count)
            .max()
            .unwrap_or(0);

        for (_, moves) in per_piece.iter_mut() {
            moves.retain(|m| m.capture_count() == max_captures);
        }
        per_piece.retain(|(_, moves)| !moves.is_empty());

        let max_kings = per_piece
            .iter()
            .flat_map(|(_, moves)| moves.iter())
            .map(|m| m.kings_captured(board))
            .max()
            .unwrap_or(0);

        for (_, moves) in per_piece.iter_mut() {
            moves.retain(|m| m.kings_captured(board) == max_kings);
        }
        per_piece.retain(|(_, moves)| !moves.is_empty());
    }

    per_piece
}
