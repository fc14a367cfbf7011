use crate::search::{Condition, State};

/// The goal of a task: a partial assignment over the state variables.
#[derive(Debug, Clone)]
pub struct Goal {
    conditions: Vec<Condition>,
}

impl Goal {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns true if the goal is satisfied by the given state.
    pub fn is_satisfied(&self, state: &State) -> bool {
        self.conditions.iter().all(|c| c.is_satisfied(state))
    }

    /// Number of goal conditions that disagree with the given state.
    pub fn count_unsatisfied(&self, state: &State) -> usize {
        self.conditions
            .iter()
            .filter(|c| !c.is_satisfied(state))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn satisfaction() {
        let task = parse_fixture(TRIVIAL_TASK_TEXT);

        assert!(!task.goal.is_satisfied(&task.initial_state));
        assert_eq!(task.goal.count_unsatisfied(&task.initial_state), 1);

        let goal_state = task
            .initial_state
            .successor(&task.operators[0], &task);
        assert!(task.goal.is_satisfied(&goal_state));
        assert_eq!(task.goal.count_unsatisfied(&goal_state), 0);
    }
}
