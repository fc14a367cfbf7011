//! Enforced hill climbing: keep a current state and run a breadth-first
//! search around it until a strictly better heuristic value appears, then
//! jump there and start over. Incomplete, but often fast with helpful
//! actions.

use crate::search::{
    evaluators::{GEvaluator, PrefEvaluator},
    open_lists::{OpenList, StandardScalarOpenList, TieBreakingOpenList},
    search_engines::{SearchEngine, SearchResult},
    SearchSpace, SearchStatistics, SharedHeuristic, State, StateId, SuccessorGenerator, Task,
};
use std::rc::Rc;
use tracing::info;

#[derive(clap::ValueEnum, strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PreferredUsage {
    #[clap(help = "Expand only operators some heuristic marked preferred")]
    PruneByPreferred,
    #[clap(help = "Expand all operators, preferred ones first")]
    RankPreferredFirst,
}

/// Open-list entries of the inner breadth-first search: the node the
/// pending operator applies in, the depth (or accumulated cost), and the
/// operator itself.
type EhcEntry = (StateId, i32, usize);

pub struct EnforcedHillClimbingSearch {
    heuristic: SharedHeuristic,
    preferred_heuristics: Vec<SharedHeuristic>,
    preferred_usage: PreferredUsage,
    use_cost_for_bfs: bool,
}

impl std::fmt::Debug for EnforcedHillClimbingSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnforcedHillClimbingSearch")
            .field("preferred_heuristics", &self.preferred_heuristics.len())
            .field("preferred_usage", &self.preferred_usage)
            .field("use_cost_for_bfs", &self.use_cost_for_bfs)
            .finish()
    }
}

impl EnforcedHillClimbingSearch {
    pub fn new(
        heuristic: SharedHeuristic,
        preferred_heuristics: Vec<SharedHeuristic>,
        preferred_usage: PreferredUsage,
        use_cost_for_bfs: bool,
    ) -> Self {
        Self {
            heuristic,
            preferred_heuristics,
            preferred_usage,
            use_cost_for_bfs,
        }
    }

    fn use_preferred(&self) -> bool {
        !self.preferred_heuristics.is_empty()
    }

    fn make_open_list(&self) -> Box<dyn OpenList<EhcEntry>> {
        if !self.use_preferred() || self.preferred_usage == PreferredUsage::PruneByPreferred {
            Box::new(StandardScalarOpenList::new(Box::new(GEvaluator::new()), false))
        } else {
            Box::new(TieBreakingOpenList::new(
                vec![Box::new(GEvaluator::new()), Box::new(PrefEvaluator::new())],
                false,
            ))
        }
    }

    fn evaluate(
        &self,
        parent: Option<(&State, usize)>,
        state: &State,
        task: &Task,
        statistics: &mut SearchStatistics,
    ) {
        statistics.inc_evaluated();
        {
            let mut slot = self.heuristic.borrow_mut();
            if let Some((parent_state, op)) = parent {
                slot.reach_state(parent_state, op, state);
            }
            slot.evaluate(state, task);
        }
        for preferred in &self.preferred_heuristics {
            if Rc::ptr_eq(preferred, &self.heuristic) {
                continue;
            }
            let mut slot = preferred.borrow_mut();
            if let Some((parent_state, op)) = parent {
                slot.reach_state(parent_state, op, state);
            }
            slot.evaluate(state, task);
        }
    }

    /// Applicable operators of `state` paired with their preferred flag.
    /// Under pruning only the union of the preferred sets is returned;
    /// under ranking all operators are returned with the preferred ones
    /// flagged for the tie-breaking list.
    fn successor_operators(
        &self,
        state: &State,
        task: &Task,
        generator: &dyn SuccessorGenerator,
    ) -> Vec<(usize, bool)> {
        let preferred_union = |state: &State| -> Vec<usize> {
            let mut union = Vec::new();
            for slot in &self.preferred_heuristics {
                for &op in slot.borrow().preferred() {
                    if !union.contains(&op) {
                        union.push(op);
                    }
                }
            }
            debug_assert!(
                union.iter().all(|&op| task.operators[op].is_applicable(state)),
                "preferred operators must be applicable"
            );
            union
        };

        if !self.use_preferred() {
            return generator
                .applicable_operators(state, task)
                .into_iter()
                .map(|op| (op, false))
                .collect();
        }
        match self.preferred_usage {
            PreferredUsage::PruneByPreferred => preferred_union(state)
                .into_iter()
                .map(|op| (op, true))
                .collect(),
            PreferredUsage::RankPreferredFirst => {
                let preferred = preferred_union(state);
                generator
                    .applicable_operators(state, task)
                    .into_iter()
                    .map(|op| (op, preferred.contains(&op)))
                    .collect()
            }
        }
    }
}

impl SearchEngine for EnforcedHillClimbingSearch {
    fn search(
        &mut self,
        task: &Task,
        generator: &dyn SuccessorGenerator,
    ) -> (SearchResult, SearchStatistics) {
        info!(
            use_preferred = self.use_preferred(),
            "conducting enforced hill climbing search"
        );
        let mut statistics = SearchStatistics::new();
        let mut space = SearchSpace::new(task);
        let mut open_list = self.make_open_list();

        let mut current_state = task.initial_state.clone();
        self.evaluate(None, &current_state, task, &mut statistics);
        if self.heuristic.borrow().is_dead_end() {
            info!("initial state is a dead end, no solution");
            statistics.finalise_search();
            let result = if self.heuristic.borrow().dead_ends_are_reliable() {
                SearchResult::ProvablyUnsolvable
            } else {
                SearchResult::IncompleteUnsolvable
            };
            return (result, statistics);
        }
        let mut current_h = self
            .heuristic
            .borrow()
            .value()
            .expect("checked for dead end above");
        let mut current_id = space.get_node_id(&current_state);
        space.node_mut(current_id).open_initial(current_h);
        info!(current_h, "starting EHC descent");

        'outer: loop {
            if task.goal.is_satisfied(&current_state) {
                info!("solution found");
                let plan = space.trace_path(current_id);
                statistics.finalise_search();
                return (SearchResult::Solved(plan), statistics);
            }

            // Seed the plateau search with the current state's successors.
            statistics.inc_expanded();
            space.node_mut(current_id).close();
            for (op_id, marked) in self.successor_operators(&current_state, task, generator)
            {
                let d = if self.use_cost_for_bfs {
                    task.operators[op_id].cost()
                } else {
                    1
                };
                open_list.evaluate(d, marked);
                open_list.insert((current_id, d, op_id));
            }

            // Breadth-first over the plateau until something improves.
            while let Some((parent_id, d, op_id)) = open_list.remove_min() {
                let parent_state = space.state(parent_id);
                let op = &task.operators[op_id];
                debug_assert!(op.is_applicable(&parent_state));
                let successor = parent_state.successor(op, task);
                statistics.inc_generated();

                let node_id = space.get_node_id(&successor);
                if !space.node(node_id).is_new() {
                    continue;
                }

                self.evaluate(
                    Some((&parent_state, op_id)),
                    &successor,
                    task,
                    &mut statistics,
                );
                if self.heuristic.borrow().is_dead_end() {
                    space.node_mut(node_id).mark_as_dead_end();
                    continue;
                }

                let h = self
                    .heuristic
                    .borrow()
                    .value()
                    .expect("checked for dead end above");
                let parent_g = space.node(parent_id).g();
                space
                    .node_mut(node_id)
                    .open(h, parent_id, parent_g, op_id, op.cost());

                if h < current_h {
                    current_h = h;
                    current_state = successor;
                    current_id = node_id;
                    open_list.clear();
                    info!(current_h, "improved state found");
                    statistics.report_h_progress(&[current_h]);
                    continue 'outer;
                }

                // No improvement: grow the plateau around this node.
                statistics.inc_expanded();
                space.node_mut(node_id).close();
                for (succ_op, marked) in
                    self.successor_operators(&successor, task, generator)
                {
                    let new_d = if self.use_cost_for_bfs {
                        d + task.operators[succ_op].cost()
                    } else {
                        d + 1
                    };
                    open_list.evaluate(new_d, marked);
                    open_list.insert((node_id, new_d, succ_op));
                }
            }

            info!("no solution - FAILED");
            statistics.finalise_search();
            return (SearchResult::IncompleteUnsolvable, statistics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{
        heuristics::HeuristicName, successor_generators::SuccessorGeneratorName, HeuristicSlot,
        Task,
    };
    use crate::test_utils::*;

    fn slot_for(name: HeuristicName, task: &Task) -> SharedHeuristic {
        HeuristicSlot::new(name.create(task).expect("heuristic accepts the task")).shared()
    }

    fn run_ehc(
        task: &Task,
        heuristic: SharedHeuristic,
        preferred: Vec<SharedHeuristic>,
        usage: PreferredUsage,
    ) -> (SearchResult, SearchStatistics) {
        let generator = SuccessorGeneratorName::DecisionTree.create(task);
        let mut engine = EnforcedHillClimbingSearch::new(heuristic, preferred, usage, false);
        engine.search(task, generator.as_ref())
    }

    #[test]
    fn descends_to_the_goal() {
        let task = parse_fixture(KEY_DOOR_TASK_TEXT);
        let (result, _) = run_ehc(
            &task,
            slot_for(HeuristicName::Ff, &task),
            vec![],
            PreferredUsage::RankPreferredFirst,
        );

        let SearchResult::Solved(plan) = result else {
            panic!("expected a plan");
        };
        assert_eq!(plan.steps(), &[0, 1]);
        assert!(plan.validate(&task).is_some());
    }

    #[test]
    fn fails_on_a_finite_plateau() {
        let task = parse_fixture(PLATEAU_TASK_TEXT);
        let (result, statistics) = run_ehc(
            &task,
            slot_for(HeuristicName::GoalCount, &task),
            vec![],
            PreferredUsage::RankPreferredFirst,
        );

        assert_eq!(result, SearchResult::IncompleteUnsolvable);
        // The wheel only has three positions to explore.
        assert!(statistics.expanded() <= 4);
    }

    #[test]
    fn pruning_by_preferred_still_solves_with_good_helpers() {
        let task = parse_fixture(KEY_DOOR_TASK_TEXT);
        let ff = slot_for(HeuristicName::Ff, &task);
        let (result, _) = run_ehc(
            &task,
            ff.clone(),
            vec![ff],
            PreferredUsage::PruneByPreferred,
        );

        let SearchResult::Solved(plan) = result else {
            panic!("expected a plan");
        };
        assert_eq!(plan.steps(), &[0, 1]);
    }

    #[test]
    fn ranking_preferred_first_keeps_completeness_of_the_plateau() {
        let task = parse_fixture(TWO_GOAL_TASK_TEXT);
        let cg = slot_for(HeuristicName::Cg, &task);
        let (result, _) = run_ehc(
            &task,
            cg.clone(),
            vec![cg],
            PreferredUsage::RankPreferredFirst,
        );

        let SearchResult::Solved(plan) = result else {
            panic!("expected a plan");
        };
        assert_eq!(plan.len(), 2);
        assert!(plan.validate(&task).is_some());
    }

    #[test]
    fn reliable_dead_end_at_the_initial_state() {
        let task = parse_fixture(UNSOLVABLE_TASK_TEXT);
        let (result, statistics) = run_ehc(
            &task,
            slot_for(HeuristicName::Add, &task),
            vec![],
            PreferredUsage::RankPreferredFirst,
        );

        assert_eq!(result, SearchResult::ProvablyUnsolvable);
        assert_eq!(statistics.expanded(), 0);
    }
}
