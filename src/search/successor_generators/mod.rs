mod decision_tree;
mod naive;
mod successor_generator;

pub use decision_tree::{DecisionTreeGenerator, GeneratorNode};
pub use naive::NaiveGenerator;
pub use successor_generator::{SuccessorGenerator, SuccessorGeneratorName};
