use crate::board::{Board, Color, Piece};
use crate::moves::cache::MoveCache;
use crate::moves::execute::{make_move, unmake_move};
use crate::moves::generate::{legal_moves, legal_moves_cached};
use crate::moves::types::{Move, Undo};
use crate::search::cancel::Cancel;
use crate::search::eval::evaluate;
use crate::search::minimax;
use crate::search::options::SearchOptions;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;

/// Rollout positions churn rapidly and are rarely revisited across
/// iterations, so they get a small cache of their own instead of polluting
/// (and evicting from) the generator's larger default cache.
const ROLLOUT_CACHE_CAPACITY: usize = 2_048;

/// Normalization divisor applied to a raw evaluator score before squashing
/// it into `[-1, 1]` for backpropagation. Tuned separately per board size
/// since the 10x10 variant's larger piece count and higher king values push
/// raw evaluation magnitudes well above the 8x8 range.
pub const LEAF_NORM_8: f64 = 4.0;
pub const LEAF_NORM_10: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutPolicy {
    Random,
    Heuristic,
    MinimaxGuided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafPolicy {
    RandomTerminal,
    HeuristicEval,
    MinimaxEval,
}

#[derive(Debug, Clone)]
pub struct MctsOptions {
    pub iterations: u32,
    pub exploration_c: f64,
    pub rollout_policy: RolloutPolicy,
    pub leaf_policy: LeafPolicy,
    pub progressive_widening_k: f64,
    pub progressive_widening_alpha: f64,
    pub max_rollout_plies: u32,
    pub root_parallel_workers: usize,
    pub seed: Option<u64>,
    /// Search depth used by `RolloutPolicy::MinimaxGuided` and
    /// `LeafPolicy::MinimaxEval` — how far the guiding minimax call looks
    /// ahead from the position it is scoring.
    pub guidance_depth: u8,
}

impl Default for MctsOptions {
    fn default() -> Self {
        Self {
            iterations: 2000,
            exploration_c: 1.4,
            rollout_policy: RolloutPolicy::Heuristic,
            leaf_policy: LeafPolicy::HeuristicEval,
            progressive_widening_k: 2.0,
            progressive_widening_alpha: 0.5,
            max_rollout_plies: 60,
            root_parallel_workers: 1,
            seed: None,
            guidance_depth: 3,
        }
    }
}

fn leaf_norm(size: u8) -> f64 {
    if size >= 10 { LEAF_NORM_10 } else { LEAF_NORM_8 }
}

fn normalize(raw: f64, size: u8) -> f64 {
    (raw / leaf_norm(size)).tanh()
}

struct Node {
    children: Vec<(Move, usize)>,
    untried: Vec<(Piece, Move)>,
    to_move: Color,
    visits: u32,
    value_sum: f64,
}

impl Node {
    fn new(board: &Board) -> Self {
        let untried = legal_moves(board, board.side_to_move)
            .into_iter()
            .flat_map(|(p, mvs)| mvs.into_iter().map(move |m| (p, m)))
            .collect();
        Self {
            children: Vec::new(),
            untried,
            to_move: board.side_to_move,
            visits: 0,
            value_sum: 0.0,
        }
    }

    fn is_terminal(&self) -> bool {
        self.children.is_empty() && self.untried.is_empty()
    }

    fn mean_value(&self) -> f64 {
        if self.visits == 0 { 0.0 } else { self.value_sum / self.visits as f64 }
    }
}

struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn widening_cap(&self, idx: usize, options: &MctsOptions) -> usize {
        let visits = self.nodes[idx].visits.max(1) as f64;
        ((options.progressive_widening_k * visits.powf(options.progressive_widening_alpha)).ceil()
            as usize)
            .max(1)
    }

    fn select_child(&self, idx: usize, options: &MctsOptions) -> usize {
        let parent_visits = self.nodes[idx].visits.max(1) as f64;
        self.nodes[idx]
            .children
            .iter()
            .max_by(|(_, a), (_, b)| {
                let score = |child: usize| {
                    let node = &self.nodes[child];
                    if node.visits == 0 {
                        return f64::INFINITY;
                    }
                    let exploitation = -node.mean_value();
                    let exploration = options.exploration_c
                        * (parent_visits.ln() / node.visits as f64).sqrt();
                    exploitation + exploration
                };
                score(*a)
                    .partial_cmp(&score(*b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(_, idx)| *idx)
            .expect("select_child only called on a node with children")
    }
}

fn random_move(board: &Board, rng: &mut StdRng, cache: &mut MoveCache) -> Option<Move> {
    let moves = legal_moves_cached(board, board.side_to_move, cache);
    if moves.is_empty() {
        return None;
    }
    let flat: Vec<Move> = moves.into_iter().flat_map(|(_, mvs)| mvs).collect();
    let idx = rng.random_range(0..flat.len());
    Some(flat[idx])
}

/// Argmax of a depth-1 static evaluation over every legal move.
fn greedy_move(board: &Board, cache: &mut MoveCache) -> Option<Move> {
    let moves = legal_moves_cached(board, board.side_to_move, cache);
    if moves.is_empty() {
        return None;
    }
    let color = board.side_to_move;
    let mut best: Option<(f64, Move)> = None;
    for (_, mvs) in moves {
        for mv in mvs {
            let mut scratch = board.clone();
            make_move(&mut scratch, &mv);
            let score = evaluate(&scratch, color);
            if best.as_ref().map(|(s, _)| score > *s).unwrap_or(true) {
                best = Some((score, mv));
            }
        }
    }
    best.map(|(_, mv)| mv)
}

/// Argmax of a depth-`guidance_depth` minimax evaluation over every legal
/// move: each candidate is played out, then searched to that depth from the
/// opponent's reply, negating the returned (opponent-relative) score back
/// to the mover's perspective.
fn minimax_guided_move(board: &Board, guidance_depth: u8, cache: &mut MoveCache) -> Option<Move> {
    let moves = legal_moves_cached(board, board.side_to_move, cache);
    if moves.is_empty() {
        return None;
    }
    let mut guided = SearchOptions::default();
    guided.iterative_deepening = false;
    guided.max_depth = guidance_depth.max(1);

    let mut best: Option<(f64, Move)> = None;
    for (_, mvs) in moves {
        for mv in mvs {
            let mut scratch = board.clone();
            make_move(&mut scratch, &mv);
            let outcome = minimax::search(&scratch, &guided, &Cancel::new());
            let opponent_score = match outcome {
                minimax::SearchOutcome::Completed { score, .. } => score,
                _ => evaluate(&scratch, scratch.side_to_move),
            };
            let score = -opponent_score;
            if best.as_ref().map(|(s, _)| score > *s).unwrap_or(true) {
                best = Some((score, mv));
            }
        }
    }
    best.map(|(_, mv)| mv)
}

/// Plays `board` forward using `policy` until a terminal position or
/// `max_plies` is reached, then scores the result relative to `perspective`
/// (the mover at the node the rollout started from), in `[-1, 1]`. Consults
/// a small, rollout-local move cache rather than the generator's default
/// one, since rollout positions churn too fast to be worth caching broadly.
fn rollout(
    board: &Board,
    options: &MctsOptions,
    perspective: Color,
    rng: &mut StdRng,
    cache: &mut MoveCache,
) -> f64 {
    let mut scratch = board.clone();
    let mut plies = 0u32;

    loop {
        if legal_moves_cached(&scratch, scratch.side_to_move, cache).is_empty() {
            let sign = if scratch.side_to_move == perspective { -1.0 } else { 1.0 };
            return sign;
        }
        if plies >= options.max_rollout_plies {
            return normalize(evaluate(&scratch, perspective), scratch.size);
        }

        let mv = match options.rollout_policy {
            RolloutPolicy::Random => random_move(&scratch, rng, cache),
            RolloutPolicy::Heuristic => greedy_move(&scratch, cache),
            RolloutPolicy::MinimaxGuided => {
                minimax_guided_move(&scratch, options.guidance_depth, cache)
            }
        };
        let Some(mv) = mv else {
            let sign = if scratch.side_to_move == perspective { -1.0 } else { 1.0 };
            return sign;
        };
        make_move(&mut scratch, &mv);
        plies += 1;
    }
}

fn evaluate_leaf(
    board: &Board,
    options: &MctsOptions,
    perspective: Color,
    rng: &mut StdRng,
    cache: &mut MoveCache,
) -> f64 {
    if legal_moves_cached(board, board.side_to_move, cache).is_empty() {
        let sign = if board.side_to_move == perspective { -1.0 } else { 1.0 };
        return sign;
    }
    match options.leaf_policy {
        LeafPolicy::RandomTerminal => rollout(board, options, perspective, rng, cache),
        LeafPolicy::HeuristicEval => normalize(evaluate(board, perspective), board.size),
        LeafPolicy::MinimaxEval => {
            let mut guided = SearchOptions::default();
            guided.iterative_deepening = false;
            guided.max_depth = options.guidance_depth;
            let outcome = minimax::search(board, &guided, &Cancel::new());
            let score = match outcome {
                minimax::SearchOutcome::Completed { score, .. } => score,
                _ => evaluate(board, board.side_to_move),
            };
            normalize(score, board.size)
        }
    }
}

/// Runs one MCTS tree to completion from `board`'s position and returns the
/// most-visited root move, along with that move's visit count (used by
/// `search_root_parallel` for plurality voting).
pub fn run(board: &Board, options: &MctsOptions, cancel: &Cancel) -> Option<(Move, u32)> {
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut tree = Tree {
        nodes: vec![Node::new(board)],
    };
    if tree.nodes[0].is_terminal() {
        return None;
    }

    let mut rollout_cache = MoveCache::new(ROLLOUT_CACHE_CAPACITY);

    for _ in 0..options.iterations {
        if cancel.is_cancelled() {
            break;
        }

        let mut scratch = board.clone();
        let mut path = vec![0usize];
        let mut undo_stack: Vec<Undo> = Vec::new();
        let mut idx = 0usize;

        // Selection
        loop {
            if tree.nodes[idx].is_terminal() {
                break;
            }
            let cap = tree.widening_cap(idx, options);
            if !tree.nodes[idx].untried.is_empty() && tree.nodes[idx].children.len() < cap {
                break;
            }
            if tree.nodes[idx].children.is_empty() {
                break;
            }
            let next = tree.select_child(idx, options);
            let mv = tree.nodes[idx]
                .children
                .iter()
                .find(|(_, c)| *c == next)
                .map(|(m, _)| *m)
                .unwrap();
            undo_stack.push(make_move(&mut scratch, &mv));
            idx = next;
            path.push(idx);
        }

        // Expansion
        let leaf_color;
        if !tree.nodes[idx].is_terminal() && !tree.nodes[idx].untried.is_empty() {
            let cap = tree.widening_cap(idx, options);
            if tree.nodes[idx].children.len() < cap {
                let pick = rng.random_range(0..tree.nodes[idx].untried.len());
                let (_, mv) = tree.nodes[idx].untried.swap_remove(pick);
                undo_stack.push(make_move(&mut scratch, &mv));
                let child = Node::new(&scratch);
                let child_idx = tree.nodes.len();
                tree.nodes.push(child);
                tree.nodes[idx].children.push((mv, child_idx));
                idx = child_idx;
                path.push(idx);
            }
        }
        leaf_color = tree.nodes[idx].to_move;

        // Simulation
        let value = if tree.nodes[idx].is_terminal() {
            let sign = -1.0;
            sign
        } else {
            evaluate_leaf(&scratch, options, leaf_color, &mut rng, &mut rollout_cache)
        };

        // Backpropagation
        let mut signed = value;
        for &node_idx in path.iter().rev() {
            tree.nodes[node_idx].visits += 1;
            tree.nodes[node_idx].value_sum += signed;
            signed = -signed;
        }

        for undo in undo_stack.into_iter().rev() {
            unmake_move(&mut scratch, &undo);
        }
    }

    tree.nodes[0]
        .children
        .iter()
        .max_by_key(|(_, idx)| tree.nodes[*idx].visits)
        .map(|(mv, idx)| (*mv, tree.nodes[*idx].visits))
}

/// Runs `options.root_parallel_workers` independent trees on native threads
/// and picks the move with the most total votes (ties broken by summed
/// visit count), rather than pooling a single shared tree across threads.
pub fn run_root_parallel(board: &Board, options: &MctsOptions, cancel: &Cancel) -> Option<Move> {
    if options.root_parallel_workers <= 1 {
        return run(board, options, cancel).map(|(mv, _)| mv);
    }

    let results: Vec<Option<(Move, u32)>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..options.root_parallel_workers)
            .map(|worker| {
                let mut worker_options = options.clone();
                worker_options.seed = options
                    .seed
                    .map(|s| s ^ (worker as u64).wrapping_mul(0x9E37_79B9))
                    .or(Some(worker as u64));
                let board = board.clone();
                let cancel = cancel.clone();
                scope.spawn(move || run(&board, &worker_options, &cancel))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut votes: HashMap<Move, (u32, u32)> = HashMap::new();
    for (mv, visits) in results.into_iter().flatten() {
        let entry = votes.entry(mv).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += visits;
    }

    votes
        .into_iter()
        .max_by_key(|(_, (ballots, visits))| (*ballots, *visits))
        .map(|(mv, _)| mv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Variant;

    #[test]
    fn single_tree_finds_a_move() {
        let board = Board::new(Variant::British);
        let mut options = MctsOptions::default();
        options.iterations = 50;
        let cancel = Cancel::new();
        assert!(run(&board, &options, &cancel).is_some());
    }

    #[test]
    fn root_parallel_finds_a_move() {
        let board = Board::new(Variant::British);
        let mut options = MctsOptions::default();
        options.iterations = 30;
        options.root_parallel_workers = 3;
        let cancel = Cancel::new();
        assert!(run_root_parallel(&board, &options, &cancel).is_some());
    }

    #[test]
    fn cancelled_tree_returns_whatever_it_found() {
        let board = Board::new(Variant::British);
        let mut options = MctsOptions::default();
        options.iterations = 10_000;
        let cancel = Cancel::new();
        cancel.cancel();
        // First call happens before any iteration checks cancellation, so a
        // tree with zero completed iterations still has no visited children.
        let _ = run(&board, &options, &cancel);
    }

    #[test]
    fn minimax_guided_move_picks_a_legal_move() {
        let board = Board::new(Variant::British);
        let mut cache = MoveCache::new(64);
        let guided = minimax_guided_move(&board, 3, &mut cache).unwrap();
        let legal: Vec<Move> = legal_moves(&board, board.side_to_move)
            .into_iter()
            .flat_map(|(_, mvs)| mvs)
            .collect();
        assert!(legal.contains(&guided));
    }

    #[test]
    fn minimax_guided_policy_is_wired_into_rollout_dispatch() {
        let board = Board::new(Variant::British);
        let mut options = MctsOptions::default();
        options.iterations = 20;
        options.rollout_policy = RolloutPolicy::MinimaxGuided;
        options.guidance_depth = 2;
        let cancel = Cancel::new();
        assert!(run(&board, &options, &cancel).is_some());
    }
}
