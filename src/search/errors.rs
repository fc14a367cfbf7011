use thiserror::Error;

/// Configuration problems detected while assembling heuristics and search
/// engines. The binary maps these to a distinct exit code.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{heuristic} does not support axioms")]
    AxiomsUnsupported { heuristic: &'static str },
    #[error("{heuristic} does not support conditional effects")]
    ConditionalEffectsUnsupported { heuristic: &'static str },
    #[error("abstraction size bound must be at least 1, got {0}")]
    AbstractionSizeTooSmall(usize),
    #[error("only one heuristic is allowed in {engine}")]
    TooManyHeuristics { engine: &'static str },
    #[error("at least one heuristic is required")]
    NoHeuristic,
    #[error("label simplification requires orthogonal merges")]
    NonOrthogonalMerge,
}
