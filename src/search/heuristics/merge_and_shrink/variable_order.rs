use crate::search::{heuristics::merge_and_shrink::MergeStrategy, Task};
use rand::rngs::StdRng;
use rand::Rng;

/// Produces the linear variable order for the merge schedule. The level of
/// a variable is its index: the translator numbers condition providers
/// before the variables they feed.
#[derive(Debug)]
pub(crate) struct VariableOrderFinder {
    merge_strategy: MergeStrategy,
    selected_vars: Vec<usize>,
    remaining_vars: Vec<usize>,
    is_goal_variable: Vec<bool>,
    is_causal_predecessor: Vec<bool>,
}

impl VariableOrderFinder {
    pub(crate) fn new(
        task: &Task,
        merge_strategy: MergeStrategy,
        is_first: bool,
        rng: &mut StdRng,
    ) -> Self {
        let num_vars = task.num_variables();
        let mut remaining_vars: Vec<usize> = (0..num_vars).collect();

        // Later abstractions of a multi-abstraction run start from a
        // different seed variable.
        if !is_first && num_vars > 1 {
            let offset = rng.gen_range(0..num_vars);
            remaining_vars.rotate_left(offset);
        }

        let mut is_goal_variable = vec![false; num_vars];
        for goal in task.goal.conditions() {
            is_goal_variable[goal.var] = true;
        }

        Self {
            merge_strategy,
            selected_vars: Vec::new(),
            remaining_vars,
            is_goal_variable,
            is_causal_predecessor: vec![false; num_vars],
        }
    }

    pub(crate) fn done(&self) -> bool {
        self.remaining_vars.is_empty()
    }

    fn select_next(&mut self, position: usize, task: &Task) -> usize {
        let var_no = self.remaining_vars.remove(position);
        for &predecessor in task.causal_graph.predecessors(var_no) {
            self.is_causal_predecessor[predecessor] = true;
        }
        self.selected_vars.push(var_no);
        var_no
    }

    fn pick<F: Fn(usize) -> bool>(&self, predicate: F, random: bool, rng: &mut StdRng) -> Option<usize> {
        let matches: Vec<usize> = self
            .remaining_vars
            .iter()
            .enumerate()
            .filter(|(_, &var)| predicate(var))
            .map(|(position, _)| position)
            .collect();
        if matches.is_empty() {
            None
        } else if random {
            Some(matches[rng.gen_range(0..matches.len())])
        } else {
            Some(matches[0])
        }
    }

    pub(crate) fn next(&mut self, task: &Task, rng: &mut StdRng) -> usize {
        debug_assert!(!self.done());
        let position = match self.merge_strategy {
            MergeStrategy::LinearRandom => rng.gen_range(0..self.remaining_vars.len()),
            MergeStrategy::LinearCgGoalLevel | MergeStrategy::LinearCgGoalRandom => {
                let random = self.merge_strategy == MergeStrategy::LinearCgGoalRandom;
                let connected_goal =
                    self.pick(|v| self.is_causal_predecessor[v] && self.is_goal_variable[v], random, rng);
                let connected = match connected_goal {
                    Some(p) => Some(p),
                    None => self.pick(|v| self.is_causal_predecessor[v], random, rng),
                };
                match connected {
                    Some(p) => p,
                    None => self
                        .pick(|v| self.is_goal_variable[v], random, rng)
                        .unwrap_or(0),
                }
            }
            MergeStrategy::LinearGoalCgLevel => {
                let goal = self.pick(|v| self.is_goal_variable[v], false, rng);
                match goal {
                    Some(p) => p,
                    None => self
                        .pick(|v| self.is_causal_predecessor[v], false, rng)
                        .unwrap_or(0),
                }
            }
        };
        self.select_next(position, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::heuristics::merge_and_shrink::abstraction::seeded_rng;
    use crate::test_utils::*;

    #[test]
    fn goal_variables_come_first() {
        let task = parse_fixture(KEY_DOOR_TASK_TEXT);
        let mut rng = seeded_rng();
        let mut order =
            VariableOrderFinder::new(&task, MergeStrategy::LinearCgGoalLevel, true, &mut rng);

        // door (var 1) is the goal variable, key (var 0) feeds it.
        assert_eq!(order.next(&task, &mut rng), 1);
        assert_eq!(order.next(&task, &mut rng), 0);
        assert!(order.done());
    }

    #[test]
    fn causal_feeders_follow_their_goals() {
        let task = parse_fixture(AXIOM_TASK_TEXT);
        let mut rng = seeded_rng();
        let mut order =
            VariableOrderFinder::new(&task, MergeStrategy::LinearGoalCgLevel, true, &mut rng);

        assert_eq!(order.next(&task, &mut rng), 1);
        assert_eq!(order.next(&task, &mut rng), 0);
    }

    #[test]
    fn every_variable_appears_exactly_once() {
        let task = parse_fixture(UNSOLVABLE_TASK_TEXT);
        for strategy in [
            MergeStrategy::LinearCgGoalLevel,
            MergeStrategy::LinearCgGoalRandom,
            MergeStrategy::LinearGoalCgLevel,
            MergeStrategy::LinearRandom,
        ] {
            let mut rng = seeded_rng();
            let mut order = VariableOrderFinder::new(&task, strategy, true, &mut rng);
            let mut seen = Vec::new();
            while !order.done() {
                seen.push(order.next(&task, &mut rng));
            }
            seen.sort_unstable();
            assert_eq!(seen, vec![0, 1]);
        }
    }
}
