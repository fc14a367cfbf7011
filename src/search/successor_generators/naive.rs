use crate::search::{successor_generators::SuccessorGenerator, State, Task};

/// Fallback generator that tests every operator for applicability. Used as a
/// reference implementation in tests and for inputs without a generator
/// block worth trusting.
#[derive(Debug)]
pub struct NaiveGenerator {}

impl NaiveGenerator {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for NaiveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SuccessorGenerator for NaiveGenerator {
    fn applicable_operators(&self, state: &State, task: &Task) -> Vec<usize> {
        task.operators
            .iter()
            .filter(|op| op.is_applicable(state))
            .map(|op| op.id())
            .collect()
    }
}
