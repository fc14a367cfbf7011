use crate::search::{
    successor_generators::{DecisionTreeGenerator, NaiveGenerator},
    State, Task,
};

/// Yields the operators applicable in a state. Implementations must be
/// exact: every returned operator id is applicable, and no applicable
/// operator is missed.
pub trait SuccessorGenerator {
    fn applicable_operators(&self, state: &State, task: &Task) -> Vec<usize>;
}

#[derive(clap::ValueEnum, strum_macros::Display, Debug, Clone, Copy)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SuccessorGeneratorName {
    #[clap(help = "Decision tree over variable values, read from the input")]
    DecisionTree,
    #[clap(help = "Linear scan over all operators")]
    Naive,
}

impl SuccessorGeneratorName {
    pub fn create(&self, task: &Task) -> Box<dyn SuccessorGenerator> {
        match self {
            SuccessorGeneratorName::DecisionTree => {
                Box::new(DecisionTreeGenerator::new(task.successor_tree.clone()))
            }
            SuccessorGeneratorName::Naive => Box::new(NaiveGenerator::new()),
        }
    }
}
