use crate::search::{heuristics::Heuristic, State, Task};

/// Number of unsatisfied goal conditions. Cheap, uninformed, never reports
/// dead ends.
#[derive(Debug)]
pub struct GoalCountHeuristic {}

impl GoalCountHeuristic {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for GoalCountHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl Heuristic for GoalCountHeuristic {
    fn compute(&mut self, state: &State, task: &Task, _preferred: &mut Vec<usize>) -> Option<i32> {
        Some(task.goal.count_unsatisfied(state) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn counts_disagreeing_goals() {
        let task = parse_fixture(TWO_GOAL_TASK_TEXT);
        let mut heuristic = GoalCountHeuristic::new();
        let mut preferred = Vec::new();

        assert_eq!(
            heuristic.compute(&task.initial_state, &task, &mut preferred),
            Some(2)
        );
        assert_eq!(
            heuristic.compute(&State::new(vec![1, 1]), &task, &mut preferred),
            Some(0)
        );
    }
}
