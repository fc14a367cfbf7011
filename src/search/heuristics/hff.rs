use crate::search::{
    heuristics::{relaxation::RelaxationCore, Heuristic},
    State, Task,
};
use tracing::info;

/// The FF heuristic: the size of a relaxed plan extracted from the additive
/// exploration's reached-by pointers. Collecting the plan also marks
/// helpful actions as preferred operators.
#[derive(Debug)]
pub struct FfHeuristic {
    core: RelaxationCore,
    plan_ops: Vec<bool>,
}

impl FfHeuristic {
    pub fn new(task: &Task) -> Self {
        info!("initializing FF heuristic");
        let core = RelaxationCore::new(task);
        let plan_ops = vec![false; core.num_operator_keys()];
        Self { core, plan_ops }
    }
}

impl Heuristic for FfHeuristic {
    fn compute(&mut self, state: &State, _task: &Task, preferred: &mut Vec<usize>) -> Option<i32> {
        self.core.explore(state);
        self.core.total_goal_cost()?;

        self.plan_ops.fill(false);
        let plan_size = self.core.collect_relaxed_plan(&mut self.plan_ops, preferred);
        Some(plan_size as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn h_ff(task: &Task, state: &State) -> (Option<i32>, Vec<usize>) {
        let mut heuristic = FfHeuristic::new(task);
        let mut preferred = Vec::new();
        let value = heuristic.compute(state, task, &mut preferred);
        (value, preferred)
    }

    #[test]
    fn counts_relaxed_plan_operators_once() {
        let task = parse_fixture(TWO_GOAL_TASK_TEXT);
        let (value, mut preferred) = h_ff(&task, &task.initial_state);
        assert_eq!(value, Some(2));
        preferred.sort_unstable();
        assert_eq!(preferred, vec![0, 1]);
    }

    #[test]
    fn chained_plan_prefers_the_applicable_step() {
        let task = parse_fixture(KEY_DOOR_TASK_TEXT);
        let (value, preferred) = h_ff(&task, &task.initial_state);
        assert_eq!(value, Some(2));
        // Only fetching the key has a cost-free precondition chain.
        assert_eq!(preferred, vec![0]);
    }

    #[test]
    fn dead_ends_are_reliable_and_detected() {
        let task = parse_fixture(UNSOLVABLE_TASK_TEXT);
        let heuristic = FfHeuristic::new(&task);
        assert!(heuristic.dead_ends_are_reliable());

        let (value, _) = h_ff(&task, &task.initial_state);
        assert_eq!(value, None);
    }

    #[test]
    fn axioms_count_in_the_plan_but_are_never_preferred() {
        let task = parse_fixture(AXIOM_TASK_TEXT);
        let (value, preferred) = h_ff(&task, &task.initial_state);
        // The collected set holds the v operator and the d axiom rule.
        assert_eq!(value, Some(2));
        assert_eq!(preferred, vec![0]);
    }
}
