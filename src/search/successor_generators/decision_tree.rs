use crate::search::{successor_generators::SuccessorGenerator, State, Task};

/// One node of the operator decision tree read from the input stream.
///
/// A `Switch` node tests one variable: its immediate child holds operators
/// whose remaining conditions do not mention the variable, the per-value
/// children hold operators requiring that value, and the default child
/// covers operators indifferent to it further down. Leaves (`Check`) list
/// applicable operator ids outright.
#[derive(Debug, Clone)]
pub enum GeneratorNode {
    Switch {
        var: usize,
        immediate: Box<GeneratorNode>,
        value_children: Vec<GeneratorNode>,
        default_child: Box<GeneratorNode>,
    },
    Check(Vec<usize>),
}

impl GeneratorNode {
    fn collect(&self, state: &State, out: &mut Vec<usize>) {
        match self {
            GeneratorNode::Check(operators) => out.extend_from_slice(operators),
            GeneratorNode::Switch {
                var,
                immediate,
                value_children,
                default_child,
            } => {
                immediate.collect(state, out);
                value_children[state[*var]].collect(state, out);
                default_child.collect(state, out);
            }
        }
    }
}

/// The decision-tree operator index. The tree encodes all prevail and pre
/// conditions, so the collected operators need no applicability re-check.
#[derive(Debug)]
pub struct DecisionTreeGenerator {
    root: GeneratorNode,
}

impl DecisionTreeGenerator {
    pub fn new(root: GeneratorNode) -> Self {
        Self { root }
    }
}

impl SuccessorGenerator for DecisionTreeGenerator {
    fn applicable_operators(&self, state: &State, _task: &Task) -> Vec<usize> {
        let mut operators = Vec::new();
        self.root.collect(state, &mut operators);
        operators
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::successor_generators::NaiveGenerator;
    use crate::test_utils::*;

    fn assert_matches_naive(task: &crate::search::Task, state: &State) {
        let tree = DecisionTreeGenerator::new(task.successor_tree.clone());
        let naive = NaiveGenerator::new();

        let mut from_tree = tree.applicable_operators(state, task);
        let mut from_scan = naive.applicable_operators(state, task);
        from_tree.sort_unstable();
        from_scan.sort_unstable();
        assert_eq!(from_tree, from_scan);
    }

    #[test]
    fn tree_is_exact_on_fixtures() {
        for text in [
            TRIVIAL_TASK_TEXT,
            UNSOLVABLE_TASK_TEXT,
            REOPENING_TASK_TEXT,
            AXIOM_TASK_TEXT,
            TWO_GOAL_TASK_TEXT,
        ] {
            let task = parse_fixture(text);
            assert_matches_naive(&task, &task.initial_state);

            // Also check the states one step away from the initial state.
            let naive = NaiveGenerator::new();
            for op in naive.applicable_operators(&task.initial_state, &task) {
                let successor = task
                    .initial_state
                    .successor(&task.operators[op], &task);
                assert_matches_naive(&task, &successor);
            }
        }
    }
}
