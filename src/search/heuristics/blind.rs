use crate::search::{heuristics::Heuristic, State, Task};

/// Baseline heuristic: 0 on goal states, the minimum action cost (1 under
/// unit cost) everywhere else. Admissible.
#[derive(Debug)]
pub struct BlindHeuristic {}

impl BlindHeuristic {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for BlindHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl Heuristic for BlindHeuristic {
    fn compute(&mut self, state: &State, task: &Task, _preferred: &mut Vec<usize>) -> Option<i32> {
        if task.goal.is_satisfied(state) {
            Some(0)
        } else {
            Some(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn one_off_goal() {
        let task = parse_fixture(TRIVIAL_TASK_TEXT);
        let mut heuristic = BlindHeuristic::new();
        let mut preferred = Vec::new();

        assert_eq!(
            heuristic.compute(&task.initial_state, &task, &mut preferred),
            Some(1)
        );
        assert_eq!(
            heuristic.compute(&State::new(vec![1]), &task, &mut preferred),
            Some(0)
        );
    }
}
