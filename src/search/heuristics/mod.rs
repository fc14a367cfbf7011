mod blind;
mod causal_graph_heuristic;
mod goal_count;
mod hadd;
mod heuristic;
mod hff;
pub mod merge_and_shrink;
mod relaxation;
mod transition_cache;

pub use blind::BlindHeuristic;
pub use causal_graph_heuristic::CausalGraphHeuristic;
pub use goal_count::GoalCountHeuristic;
pub use hadd::HspAddHeuristic;
pub use heuristic::{Heuristic, HeuristicName, HeuristicSlot, SharedHeuristic};
pub use hff::FfHeuristic;
pub use merge_and_shrink::MergeAndShrinkHeuristic;
pub use transition_cache::{TransitionCache, NOT_COMPUTED};
