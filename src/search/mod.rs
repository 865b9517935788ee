pub mod cancel;
pub mod context;
pub mod endgame;
pub mod eval;
pub mod mcts;
pub mod minimax;
pub mod options;
pub mod ordering;
pub mod tt;

pub use cancel::{Cancel, Deadline};
pub use minimax::SearchOutcome;
pub use options::SearchOptions;
