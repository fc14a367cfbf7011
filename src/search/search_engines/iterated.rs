//! Iterated search: run a sequence of search phases over the same task and
//! keep the best plan. Typically used as an anytime configuration of
//! weighted A* phases with decreasing weights.

use crate::search::{
    search_engines::{SearchEngine, SearchResult},
    Plan, SearchStatistics, SuccessorGenerator, Task,
};
use tracing::info;

pub struct IteratedSearch {
    phases: Vec<Box<dyn SearchEngine>>,
    repeat_last_phase: bool,
    continue_on_fail: bool,
    continue_on_solve: bool,
}

impl std::fmt::Debug for IteratedSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IteratedSearch")
            .field("phases", &self.phases.len())
            .field("repeat_last_phase", &self.repeat_last_phase)
            .field("continue_on_fail", &self.continue_on_fail)
            .field("continue_on_solve", &self.continue_on_solve)
            .finish()
    }
}

impl IteratedSearch {
    pub fn new(
        phases: Vec<Box<dyn SearchEngine>>,
        repeat_last_phase: bool,
        continue_on_fail: bool,
        continue_on_solve: bool,
    ) -> Self {
        debug_assert!(!phases.is_empty());
        Self {
            phases,
            repeat_last_phase,
            continue_on_fail,
            continue_on_solve,
        }
    }
}

impl SearchEngine for IteratedSearch {
    fn search(
        &mut self,
        task: &Task,
        generator: &dyn SuccessorGenerator,
    ) -> (SearchResult, SearchStatistics) {
        let mut total = SearchStatistics::new();
        let mut best: Option<Plan> = None;
        let mut proved_unsolvable = false;
        let mut phase = 0;

        loop {
            let index = if phase < self.phases.len() {
                phase
            } else if self.repeat_last_phase && !self.phases.is_empty() {
                self.phases.len() - 1
            } else {
                break;
            };
            info!(phase, "starting search phase");
            let (result, statistics) = self.phases[index].search(task, generator);
            total.absorb(&statistics);
            phase += 1;

            match result {
                SearchResult::Solved(plan) => {
                    if best.as_ref().map_or(true, |b| plan.len() < b.len()) {
                        info!(cost = plan.len(), "best solution cost so far");
                        best = Some(plan);
                    }
                    if !self.continue_on_solve {
                        info!("solution found - stop searching");
                        break;
                    }
                    info!("solution found - keep searching");
                }
                other => {
                    proved_unsolvable |= other == SearchResult::ProvablyUnsolvable;
                    if !self.continue_on_fail {
                        info!("no solution found - stop searching");
                        break;
                    }
                    info!("no solution found - keep searching");
                }
            }
        }

        total.finalise_search();
        let result = match best {
            Some(plan) => SearchResult::Solved(plan),
            None if proved_unsolvable => SearchResult::ProvablyUnsolvable,
            None => SearchResult::IncompleteUnsolvable,
        };
        (result, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{
        heuristics::HeuristicName, search_engines::EagerBestFirstSearch,
        successor_generators::SuccessorGeneratorName, HeuristicSlot, State,
    };
    use crate::test_utils::*;

    #[test]
    fn keeps_the_best_plan_across_phases() {
        let task = parse_fixture(REOPENING_TASK_TEXT);
        // The misled greedy phase finds the detour (4 steps); the blind A*
        // phase finds the optimum (3 steps).
        let misled = TabledHeuristic::new(vec![
            (State::new(vec![1]), 3),
            (State::new(vec![2]), 0),
            (State::new(vec![3]), 0),
            (State::new(vec![4]), 0),
            (State::new(vec![5]), 0),
        ]);
        let phases: Vec<Box<dyn SearchEngine>> = vec![
            Box::new(
                EagerBestFirstSearch::greedy(
                    vec![HeuristicSlot::new(Box::new(misled)).shared()],
                    vec![],
                )
                .expect("config is valid"),
            ),
            Box::new(EagerBestFirstSearch::astar(
                HeuristicSlot::new(
                    HeuristicName::Blind
                        .create(&task)
                        .expect("blind accepts the task"),
                )
                .shared(),
            )),
        ];
        let mut engine = IteratedSearch::new(phases, false, false, true);

        let generator = SuccessorGeneratorName::DecisionTree.create(&task);
        let (result, _) = engine.search(&task, generator.as_ref());

        let SearchResult::Solved(plan) = result else {
            panic!("expected a plan");
        };
        assert_eq!(plan.len(), 3);
        assert!(plan.validate(&task).is_some());
    }

    #[test]
    fn stops_after_an_unsolvable_phase() {
        let task = parse_fixture(UNSOLVABLE_TASK_TEXT);
        let phases: Vec<Box<dyn SearchEngine>> = vec![Box::new(
            EagerBestFirstSearch::greedy(
                vec![HeuristicSlot::new(
                    HeuristicName::GoalCount
                        .create(&task)
                        .expect("goal count accepts the task"),
                )
                .shared()],
                vec![],
            )
            .expect("config is valid"),
        )];
        let mut engine = IteratedSearch::new(phases, false, false, true);

        let generator = SuccessorGeneratorName::DecisionTree.create(&task);
        let (result, _) = engine.search(&task, generator.as_ref());
        assert_eq!(result, SearchResult::ProvablyUnsolvable);
    }
}
