use crate::board::{Board, Color, Piece};
use crate::moves::execute::{make_move, make_null_move, unmake_move, unmake_null_move};
use crate::moves::generate::legal_moves;
use crate::moves::types::Move;
use crate::search::cancel::{Cancel, Deadline};
use crate::search::context::SearchContext;
use crate::search::endgame;
use crate::search::eval::evaluate;
use crate::search::options::SearchOptions;
use crate::search::ordering::order_moves;
use crate::search::tt::{Bound, TranspositionTable};
use std::time::Duration;

const INF: f64 = 1.0e9;
const MATE_SCORE: f64 = 1000.0;
const NULL_WINDOW_EPS: f64 = 1.0e-3;
const NODE_CHECK_INTERVAL: u64 = 2048;

/// What an iterative-deepening run actually returned. A caller that only
/// wants "the best move" can match `Completed` and `TimeUp` the same way;
/// the distinction exists so a UI can tell "ran out of time, kept the last
/// finished depth" apart from "the opponent (or the player) cancelled".
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Completed {
        score: f64,
        best_move: Option<Move>,
        depth_reached: u8,
        nodes: u64,
    },
    TimeUp {
        best_move: Option<Move>,
        depth_reached: u8,
        nodes: u64,
    },
    Cancelled,
}

impl SearchOutcome {
    pub fn best_move(&self) -> Option<Move> {
        match self {
            SearchOutcome::Completed { best_move, .. } => *best_move,
            SearchOutcome::TimeUp { best_move, .. } => *best_move,
            SearchOutcome::Cancelled => None,
        }
    }
}

fn flatten(moves: Vec<(Piece, Vec<Move>)>) -> Vec<(Piece, Move)> {
    moves
        .into_iter()
        .flat_map(|(p, mvs)| mvs.into_iter().map(move |m| (p, m)))
        .collect()
}

fn time_up(cancel: &Cancel, deadline: Option<&Deadline>) -> bool {
    if cancel.is_cancelled() {
        return true;
    }
    deadline.map(|d| d.is_past()).unwrap_or(false)
}

/// Negamax alpha-beta over the draughts rule engine: every score returned is
/// relative to whichever side is to move at that node, so a caller always
/// negates a child's score before comparing it with its own alpha/beta.
/// Returns `None` exactly when the node was abandoned for cancellation or a
/// deadline.
#[allow(clippy::too_many_arguments)]
fn negamax(
    board: &mut Board,
    ctx: &mut SearchContext,
    tt: &mut TranspositionTable,
    options: &SearchOptions,
    depth: u8,
    ply: usize,
    mut alpha: f64,
    beta: f64,
    cancel: &Cancel,
    deadline: Option<&Deadline>,
    nodes: &mut u64,
) -> Option<f64> {
    *nodes += 1;
    if *nodes % NODE_CHECK_INTERVAL == 0 && time_up(cancel, deadline) {
        return None;
    }

    let color = board.side_to_move;
    let hash = board.zobrist;
    let original_alpha = alpha;

    let mut tt_move = None;
    if options.transposition_table
        && let Some(entry) = tt.get(hash, color)
    {
        tt_move = entry.best_move;
        if entry.depth >= depth {
            match entry.bound {
                Bound::Exact => return Some(entry.score),
                Bound::Lower if entry.score >= beta => return Some(entry.score),
                Bound::Upper if entry.score <= alpha => return Some(entry.score),
                _ => {}
            }
        }
    }

    if let Some(score) = endgame::try_solve(board, color, options) {
        return Some(score);
    }

    let moves = legal_moves(board, color);
    if moves.is_empty() {
        return Some(-MATE_SCORE + ply as f64);
    }

    if depth == 0 {
        return if options.quiescence_search {
            quiescence(board, options, ply, alpha, beta, nodes)
        } else {
            Some(evaluate(board, color))
        };
    }

    let any_capture = moves.iter().any(|(_, mvs)| mvs.iter().any(Move::is_capture));

    if options.null_move_pruning
        && ply > 0
        && !any_capture
        && depth > options.null_move_reduction
    {
        let undo = make_null_move(board);
        let reduced = depth - options.null_move_reduction - 1;
        let score = negamax(
            board,
            ctx,
            tt,
            options,
            reduced,
            ply + 1,
            -beta,
            -beta + NULL_WINDOW_EPS,
            cancel,
            deadline,
            nodes,
        )
        .map(|s| -s);
        unmake_null_move(board, &undo);
        if let Some(s) = score
            && s >= beta
        {
            return Some(beta);
        }
    }

    let mut flat = flatten(moves);
    order_moves(&mut flat, board, ctx, tt_move, ply);

    let mut best_score = -INF;
    let mut best_move = None;
    let mut move_count: u32 = 0;

    for (_, mv) in flat {
        ctx.record_tried(&mv);
        let undo = make_move(board, &mv);

        let score = if move_count == 0 {
            negamax(
                board,
                ctx,
                tt,
                options,
                depth - 1,
                ply + 1,
                -beta,
                -alpha,
                cancel,
                deadline,
                nodes,
            )
            .map(|s| -s)
        } else {
            let mut reduction = 0u8;
            if options.late_move_reduction
                && depth >= options.lmr_min_depth
                && move_count >= options.lmr_min_moves as u32
                && !mv.is_capture()
            {
                reduction = options.lmr_reduction;
            }
            let reduced_depth = depth.saturating_sub(1 + reduction);
            let mut s = negamax(
                board,
                ctx,
                tt,
                options,
                reduced_depth,
                ply + 1,
                -alpha - NULL_WINDOW_EPS,
                -alpha,
                cancel,
                deadline,
                nodes,
            )
            .map(|v| -v);

            if let Some(v) = s
                && v > alpha
                && reduction > 0
            {
                s = negamax(
                    board, ctx, tt, options, depth - 1, ply + 1, -alpha - NULL_WINDOW_EPS, -alpha,
                    cancel, deadline, nodes,
                )
                .map(|x| -x);
            }
            if let Some(v) = s
                && v > alpha
                && v < beta
            {
                s = negamax(
                    board, ctx, tt, options, depth - 1, ply + 1, -beta, -alpha, cancel, deadline,
                    nodes,
                )
                .map(|x| -x);
            }
            s
        };

        unmake_move(board, &undo);
        move_count += 1;

        let Some(score) = score else {
            return None;
        };

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            if options.killer_moves && !mv.is_capture() {
                ctx.update_killer(ply, mv);
            }
            if options.history_heuristic && !mv.is_capture() {
                ctx.update_history(&mv, depth as i32);
            }
            break;
        }
    }

    if options.transposition_table {
        let bound = if best_score <= original_alpha {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        tt.store(hash, color, depth, best_score, bound, best_move);
    }

    Some(best_score)
}

/// Extends search through forced-capture continuations past the nominal
/// leaf, so the static evaluator is never asked to judge a position in the
/// middle of a capture sequence.
fn quiescence(
    board: &mut Board,
    options: &SearchOptions,
    ply: usize,
    mut alpha: f64,
    beta: f64,
    nodes: &mut u64,
) -> Option<f64> {
    *nodes += 1;
    let color = board.side_to_move;
    let stand_pat = evaluate(board, color);
    if ply > options.max_quiescence_depth as usize {
        return Some(stand_pat);
    }
    if stand_pat >= beta {
        return Some(beta);
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let moves = legal_moves(board, color);
    let is_capture_position = moves.iter().any(|(_, mvs)| mvs.iter().any(Move::is_capture));
    if !is_capture_position {
        return Some(alpha);
    }

    for (_, mvs) in &moves {
        for mv in mvs {
            let undo = make_move(board, mv);
            let score = quiescence(board, options, ply + 1, -beta, -alpha, nodes).map(|s| -s);
            unmake_move(board, &undo);
            let Some(score) = score else {
                return None;
            };
            if score >= beta {
                return Some(beta);
            }
            if score > alpha {
                alpha = score;
            }
        }
    }
    Some(alpha)
}

/// Single-threaded iterative-deepening search from `board`'s side to move.
pub fn search(board: &Board, options: &SearchOptions, cancel: &Cancel) -> SearchOutcome {
    let mut working = board.clone();
    let mut ctx = SearchContext::new();
    let mut tt = TranspositionTable::default();
    let mut nodes = 0u64;

    let deadline = if options.iterative_deepening {
        options
            .time_limit_ms
            .map(|ms| Deadline::from_now(Duration::from_millis(ms)))
    } else {
        None
    };

    let depths: Vec<u8> = if options.iterative_deepening {
        (1..=options.max_depth).collect()
    } else {
        vec![options.max_depth]
    };

    let mut best_move = None;
    let mut best_score = 0.0;
    let mut depth_reached = 0u8;

    for depth in depths {
        if time_up(cancel, deadline.as_ref()) {
            break;
        }

        let (mut alpha, mut beta) = if options.aspiration_windows && depth > 4 {
            (
                best_score - options.aspiration_window,
                best_score + options.aspiration_window,
            )
        } else {
            (-INF, INF)
        };

        let outcome = loop {
            let result = negamax(
                &mut working,
                &mut ctx,
                &mut tt,
                options,
                depth,
                0,
                alpha,
                beta,
                cancel,
                deadline.as_ref(),
                &mut nodes,
            );
            match result {
                None => break None,
                Some(score) if score <= alpha && alpha > -INF => {
                    alpha = -INF;
                }
                Some(score) if score >= beta && beta < INF => {
                    beta = INF;
                }
                Some(score) => break Some(score),
            }
        };

        let Some(score) = outcome else {
            return if cancel.is_cancelled() {
                SearchOutcome::Cancelled
            } else {
                SearchOutcome::TimeUp {
                    best_move,
                    depth_reached,
                    nodes,
                }
            };
        };

        best_score = score;
        depth_reached = depth;
        best_move = tt
            .get(working.zobrist, working.side_to_move)
            .and_then(|e| e.best_move)
            .or(best_move);

        if score.abs() >= MATE_SCORE - 200.0 {
            break;
        }
    }

    SearchOutcome::Completed {
        score: best_score,
        best_move,
        depth_reached,
        nodes,
    }
}

fn partition_round_robin(moves: Vec<(Piece, Move)>, workers: usize) -> Vec<Vec<(Piece, Move)>> {
    let mut buckets = vec![Vec::new(); workers];
    for (i, mv) in moves.into_iter().enumerate() {
        buckets[i % workers].push(mv);
    }
    buckets
}

/// Splits the root move list across up to `options.max_workers` native
/// threads (`std::thread::scope`, never a process pool), each running a
/// fixed-depth search of its own slice with an independent context and
/// table. Falls back to the single-threaded search when parallelism is
/// disabled or there is only one worker.
pub fn search_parallel(board: &Board, options: &SearchOptions, cancel: &Cancel) -> SearchOutcome {
    if !options.parallel || options.max_workers <= 1 {
        return search(board, options, cancel);
    }

    let color = board.side_to_move;
    let root_moves = flatten(legal_moves(board, color));
    if root_moves.is_empty() {
        return SearchOutcome::Completed {
            score: -MATE_SCORE,
            best_move: None,
            depth_reached: 0,
            nodes: 0,
        };
    }

    let deadline = options
        .time_limit_ms
        .filter(|_| options.iterative_deepening)
        .map(|ms| Deadline::from_now(Duration::from_millis(ms)));

    let workers = options.max_workers.min(root_moves.len()).max(1);
    let buckets = partition_round_robin(root_moves, workers);

    let results: Vec<(Option<Move>, f64, u64)> = std::thread::scope(|scope| {
        let handles: Vec<_> = buckets
            .into_iter()
            .map(|bucket| {
                let board = board.clone();
                let options = options;
                let cancel = cancel.clone();
                let deadline = deadline;
                scope.spawn(move || {
                    let mut ctx = SearchContext::new();
                    let mut tt = TranspositionTable::default();
                    let mut nodes = 0u64;
                    let mut best: (Option<Move>, f64) = (None, f64::NEG_INFINITY);
                    for (_, mv) in bucket {
                        let mut scratch = board.clone();
                        let undo = make_move(&mut scratch, &mv);
                        let score = negamax(
                            &mut scratch,
                            &mut ctx,
                            &mut tt,
                            options,
                            options.max_depth.saturating_sub(1),
                            1,
                            -INF,
                            INF,
                            &cancel,
                            deadline.as_ref(),
                            &mut nodes,
                        )
                        .map(|s| -s)
                        .unwrap_or(f64::NEG_INFINITY);
                        unmake_move(&mut scratch, &undo);
                        if score > best.1 {
                            best = (Some(mv), score);
                        }
                    }
                    (best.0, best.1, nodes)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let total_nodes: u64 = results.iter().map(|(_, _, n)| n).sum();
    let (best_move, best_score, _) = results
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap();

    SearchOutcome::Completed {
        score: best_score,
        best_move,
        depth_reached: options.max_depth,
        nodes: total_nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Variant;

    #[test]
    fn finds_a_move_from_the_starting_position() {
        let board = Board::new(Variant::British);
        let mut options = SearchOptions::default();
        options.max_depth = 4;
        let cancel = Cancel::new();
        let outcome = search(&board, &options, &cancel);
        assert!(outcome.best_move().is_some());
    }

    #[test]
    fn cancelled_search_reports_cancelled() {
        let board = Board::new(Variant::British);
        let mut options = SearchOptions::default();
        options.max_depth = 20;
        let cancel = Cancel::new();
        cancel.cancel();
        let outcome = search(&board, &options, &cancel);
        assert!(matches!(outcome, SearchOutcome::Cancelled));
    }

    #[test]
    fn fixed_depth_search_ignores_time_limit() {
        let board = Board::new(Variant::British);
        let mut options = SearchOptions::default();
        options.iterative_deepening = false;
        options.max_depth = 3;
        options.time_limit_ms = Some(0);
        let cancel = Cancel::new();
        let outcome = search(&board, &options, &cancel);
        assert!(matches!(outcome, SearchOutcome::Completed { .. }));
    }

    #[test]
    fn parallel_search_finds_a_move() {
        let board = Board::new(Variant::British);
        let mut options = SearchOptions::default();
        options.parallel = true;
        options.max_workers = 2;
        options.max_depth = 3;
        let cancel = Cancel::new();
        let outcome = search_parallel(&board, &options, &cancel);
        assert!(outcome.best_move().is_some());
    }
}
