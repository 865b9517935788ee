/// Every search heuristic is an explicit opt-in flag rather than an
/// always-on behavior: a caller comparing two configurations (or replaying a
/// recorded game against a different engine version) needs to know exactly
/// which heuristics were active, not guess from hardcoded constants.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub iterative_deepening: bool,
    pub transposition_table: bool,
    pub killer_moves: bool,
    pub history_heuristic: bool,
    pub null_move_pruning: bool,
    pub late_move_reduction: bool,
    pub quiescence_search: bool,
    pub aspiration_windows: bool,
    pub endgame_solver: bool,
    pub parallel: bool,

    pub max_depth: u8,
    pub max_quiescence_depth: u8,
    pub null_move_reduction: u8,
    pub lmr_min_depth: u8,
    pub lmr_min_moves: u8,
    pub lmr_reduction: u8,
    pub endgame_max_pieces: u8,
    pub endgame_max_plies: u32,
    pub aspiration_window: f64,
    pub time_limit_ms: Option<u64>,
    pub max_workers: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            iterative_deepening: true,
            transposition_table: true,
            killer_moves: true,
            history_heuristic: true,
            null_move_pruning: true,
            late_move_reduction: true,
            quiescence_search: true,
            aspiration_windows: true,
            endgame_solver: true,
            parallel: false,

            max_depth: 12,
            max_quiescence_depth: 12,
            null_move_reduction: 2,
            lmr_min_depth: 3,
            lmr_min_moves: 4,
            lmr_reduction: 1,
            endgame_max_pieces: 6,
            endgame_max_plies: 40,
            aspiration_window: 0.5,
            time_limit_ms: None,
            max_workers: 1,
        }
    }
}

impl SearchOptions {
    /// A conservative, fully-disabled profile useful for differential
    /// testing one heuristic at a time against this baseline.
    pub fn bare() -> Self {
        Self {
            iterative_deepening: false,
            transposition_table: false,
            killer_moves: false,
            history_heuristic: false,
            null_move_pruning: false,
            late_move_reduction: false,
            quiescence_search: false,
            aspiration_windows: false,
            endgame_solver: false,
            parallel: false,
            ..Self::default()
        }
    }
}
