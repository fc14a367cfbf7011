mod axioms;
mod causal_graph;
mod dtg;
mod errors;
pub mod evaluators;
mod goal;
pub mod heuristics;
pub mod open_lists;
mod plan;
pub mod search_engines;
mod search_node;
mod search_space;
mod search_statistics;
pub mod states;
pub mod successor_generators;
mod task;
mod verbosity;

pub use axioms::AxiomEvaluator;
pub use causal_graph::CausalGraph;
pub use dtg::{
    DomainTransitionGraph, LabelRef, LocalCondition, TransitionLabel, ValueNode, ValueTransition,
};
pub use errors::ConfigError;
pub use goal::Goal;
pub use heuristics::{Heuristic, HeuristicSlot, SharedHeuristic};
pub use plan::Plan;
pub use search_node::{SearchNode, SearchNodeStatus, StateId, NO_STATE};
pub use search_space::SearchSpace;
pub use search_statistics::SearchStatistics;
pub use states::State;
pub use successor_generators::SuccessorGenerator;
pub use task::{Condition, Operator, PrePost, Task, Variable};
pub use verbosity::Verbosity;

/// Sentinel standing in for infinity in integer distance arithmetic. Any
/// value at or above it means "unreachable".
pub const QUITE_A_LOT: i32 = 1_000_000_000;

/// Saturating addition capped at [`QUITE_A_LOT`].
#[inline]
pub fn capped_add(a: i32, b: i32) -> i32 {
    a.saturating_add(b).min(QUITE_A_LOT)
}
