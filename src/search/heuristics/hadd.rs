use crate::search::{
    heuristics::{relaxation::RelaxationCore, Heuristic},
    State, Task,
};
use tracing::info;

/// The additive delete-relaxation heuristic: the sum of the goal
/// propositions' reachability costs. Not admissible; dead ends are reliable
/// because unreachability in the relaxation is sound.
#[derive(Debug)]
pub struct HspAddHeuristic {
    core: RelaxationCore,
}

impl HspAddHeuristic {
    pub fn new(task: &Task) -> Self {
        info!("initializing additive heuristic");
        Self {
            core: RelaxationCore::new(task),
        }
    }
}

impl Heuristic for HspAddHeuristic {
    fn compute(&mut self, state: &State, _task: &Task, _preferred: &mut Vec<usize>) -> Option<i32> {
        self.core.explore(state);
        self.core.total_goal_cost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn h_add(task: &Task, state: &State) -> Option<i32> {
        let mut heuristic = HspAddHeuristic::new(task);
        let mut preferred = Vec::new();
        heuristic.compute(state, task, &mut preferred)
    }

    #[test]
    fn zero_exactly_on_goal_states() {
        let task = parse_fixture(TWO_GOAL_TASK_TEXT);
        assert_eq!(h_add(&task, &task.initial_state), Some(2));
        assert_eq!(h_add(&task, &State::new(vec![1, 0])), Some(1));
        assert_eq!(h_add(&task, &State::new(vec![1, 1])), Some(0));
    }

    #[test]
    fn dead_end_iff_relaxed_goal_unreachable() {
        let task = parse_fixture(UNSOLVABLE_TASK_TEXT);
        assert_eq!(h_add(&task, &task.initial_state), None);
        // Once the key is there, the relaxation solves the task.
        assert_eq!(h_add(&task, &State::new(vec![1, 0])), Some(1));
    }

    #[test]
    fn sums_over_chained_preconditions() {
        let task = parse_fixture(REOPENING_TASK_TEXT);
        // Shortest relaxed route a -> b -> c -> d.
        assert_eq!(h_add(&task, &task.initial_state), Some(3));
    }
}
