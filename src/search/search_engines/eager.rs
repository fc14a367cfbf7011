//! The eager best-first search family: greedy best-first search, A*, and
//! weighted A* are one engine with different weights, open lists and
//! reopening policies.

use crate::search::{
    evaluators::{GEvaluator, HeuristicEvaluator, SumEvaluator, WeightedEvaluator},
    open_lists::{AlternationOpenList, OpenList, StandardScalarOpenList, TieBreakingOpenList},
    search_engines::{SearchEngine, SearchResult},
    ConfigError, SearchSpace, SearchStatistics, SharedHeuristic, State, StateId,
    SuccessorGenerator, Task, QUITE_A_LOT,
};
use std::rc::Rc;
use tracing::info;

pub struct EagerBestFirstSearch {
    wg: i32,
    wh: i32,
    reopen_closed: bool,
    heuristics: Vec<SharedHeuristic>,
    preferred_operator_heuristics: Vec<SharedHeuristic>,
    open_list: Box<dyn OpenList<StateId>>,
    best_heuristic_values: Vec<Option<i32>>,
}

impl std::fmt::Debug for EagerBestFirstSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EagerBestFirstSearch")
            .field("wg", &self.wg)
            .field("wh", &self.wh)
            .field("reopen_closed", &self.reopen_closed)
            .field("heuristics", &self.heuristics.len())
            .finish()
    }
}

fn scalar_sublists(
    heuristics: &[SharedHeuristic],
    preferred: &[SharedHeuristic],
    weight: Option<i32>,
) -> Box<dyn OpenList<StateId>> {
    let keyed = |slot: &SharedHeuristic| -> Box<dyn crate::search::evaluators::Evaluator> {
        let h = Box::new(HeuristicEvaluator::new(slot.clone()));
        match weight {
            // f = g + w*h for the weighted configuration.
            Some(w) => Box::new(SumEvaluator::new(vec![
                Box::new(GEvaluator::new()),
                Box::new(WeightedEvaluator::new(h, w)),
            ])),
            None => h,
        }
    };

    if heuristics.len() + preferred.len() == 1 && preferred.is_empty() {
        return Box::new(StandardScalarOpenList::new(keyed(&heuristics[0]), false));
    }
    let mut sublists: Vec<Box<dyn OpenList<StateId>>> = Vec::new();
    for slot in heuristics {
        sublists.push(Box::new(StandardScalarOpenList::new(keyed(slot), false)));
    }
    for slot in preferred {
        sublists.push(Box::new(StandardScalarOpenList::new(keyed(slot), true)));
    }
    Box::new(AlternationOpenList::new(sublists))
}

impl EagerBestFirstSearch {
    /// Greedy best-first search: f = h, no reopening. With several
    /// heuristics or preferred-operator heuristics, the open list
    /// alternates between one scalar sublist per heuristic plus a
    /// preferred-only sublist per preferred-operator heuristic.
    pub fn greedy(
        heuristics: Vec<SharedHeuristic>,
        preferred: Vec<SharedHeuristic>,
    ) -> Result<Self, ConfigError> {
        if heuristics.is_empty() {
            return Err(ConfigError::NoHeuristic);
        }
        let open_list = scalar_sublists(&heuristics, &preferred, None);
        let best_heuristic_values = vec![None; heuristics.len()];
        Ok(Self {
            wg: 0,
            wh: 1,
            reopen_closed: false,
            heuristics,
            preferred_operator_heuristics: preferred,
            open_list,
            best_heuristic_values,
        })
    }

    /// A*: f = g + h with h as tie-breaker, reopening enabled. Exactly one
    /// heuristic is permitted.
    pub fn astar(heuristic: SharedHeuristic) -> Self {
        let f = SumEvaluator::new(vec![
            Box::new(GEvaluator::new()),
            Box::new(HeuristicEvaluator::new(heuristic.clone())),
        ]);
        let open_list: Box<dyn OpenList<StateId>> = Box::new(TieBreakingOpenList::new(
            vec![
                Box::new(f),
                Box::new(HeuristicEvaluator::new(heuristic.clone())),
            ],
            false,
        ));
        Self {
            wg: 1,
            wh: 1,
            reopen_closed: true,
            heuristics: vec![heuristic],
            preferred_operator_heuristics: Vec::new(),
            open_list,
            best_heuristic_values: vec![None],
        }
    }

    /// Weighted A*: f = g + w*h, reopening enabled.
    pub fn weighted_astar(
        heuristics: Vec<SharedHeuristic>,
        preferred: Vec<SharedHeuristic>,
        weight: i32,
    ) -> Result<Self, ConfigError> {
        if heuristics.is_empty() {
            return Err(ConfigError::NoHeuristic);
        }
        let open_list = scalar_sublists(&heuristics, &preferred, Some(weight));
        let best_heuristic_values = vec![None; heuristics.len()];
        Ok(Self {
            wg: 1,
            wh: weight,
            reopen_closed: true,
            heuristics,
            preferred_operator_heuristics: preferred,
            open_list,
            best_heuristic_values,
        })
    }

    /// All heuristic slots the engine must evaluate per state: the scoring
    /// heuristics plus any preferred-operator heuristics not among them.
    fn all_slots(&self) -> Vec<SharedHeuristic> {
        let mut slots = self.heuristics.clone();
        for slot in &self.preferred_operator_heuristics {
            if !slots.iter().any(|s| Rc::ptr_eq(s, slot)) {
                slots.push(slot.clone());
            }
        }
        slots
    }

    fn evaluate_slots(
        &self,
        slots: &[SharedHeuristic],
        state: &State,
        task: &Task,
        statistics: &mut SearchStatistics,
    ) {
        for slot in slots {
            slot.borrow_mut().evaluate(state, task);
        }
        statistics.inc_evaluated();
    }

    fn reliable_dead_end(&self) -> bool {
        self.heuristics.iter().any(|slot| {
            let slot = slot.borrow();
            slot.is_dead_end() && slot.dead_ends_are_reliable()
        })
    }

    fn representative_h(&self) -> i32 {
        self.heuristics[0].borrow().value().unwrap_or(QUITE_A_LOT)
    }

    /// Tracks the best value per heuristic; true when any of them strictly
    /// improved.
    fn check_progress(&mut self) -> bool {
        let mut progress = false;
        for (slot, best) in self
            .heuristics
            .iter()
            .zip(self.best_heuristic_values.iter_mut())
        {
            let Some(h) = slot.borrow().value() else {
                continue;
            };
            if best.map_or(true, |b| h < b) {
                *best = Some(h);
                progress = true;
            }
        }
        progress
    }

    fn report_progress(&self, statistics: &mut SearchStatistics) {
        let values: Vec<i32> = self
            .best_heuristic_values
            .iter()
            .map(|v| v.unwrap_or(QUITE_A_LOT))
            .collect();
        statistics.report_h_progress(&values);
    }

    fn f_value(&self, g: i32, h: i32) -> i32 {
        self.wg
            .saturating_mul(g)
            .saturating_add(self.wh.saturating_mul(h))
            .min(QUITE_A_LOT)
    }
}

impl SearchEngine for EagerBestFirstSearch {
    fn search(
        &mut self,
        task: &Task,
        generator: &dyn SuccessorGenerator,
    ) -> (SearchResult, SearchStatistics) {
        info!(
            wg = self.wg,
            wh = self.wh,
            reopen_closed = self.reopen_closed,
            "conducting eager best-first search"
        );
        let mut statistics = SearchStatistics::new();
        let mut space = SearchSpace::new(task);
        let slots = self.all_slots();

        let initial = task.initial_state.clone();
        self.evaluate_slots(&slots, &initial, task, &mut statistics);
        if self.reliable_dead_end() {
            info!("initial state is a dead end");
            statistics.finalise_search();
            return (SearchResult::ProvablyUnsolvable, statistics);
        }

        let initial_h = self.representative_h();
        info!(initial_h, "initial state evaluated");
        self.check_progress();
        let root = space.get_node_id(&initial);
        space.node_mut(root).open_initial(initial_h);
        self.open_list.evaluate(0, false);
        self.open_list.insert(root);

        loop {
            // Fetch the next node, skipping entries whose state has been
            // closed since they were enqueued.
            let id = loop {
                match self.open_list.remove_min() {
                    None => {
                        info!("completely explored state space -- no solution");
                        statistics.finalise_search();
                        return (SearchResult::ProvablyUnsolvable, statistics);
                    }
                    Some(id) if space.node(id).is_closed() => continue,
                    Some(id) => break id,
                }
            };

            let (g, h) = {
                let node = space.node_mut(id);
                debug_assert!(!node.is_dead_end());
                node.close();
                (node.g(), node.h())
            };
            let state = space.state(id);

            if task.goal.is_satisfied(&state) {
                info!("solution found");
                let plan = space.trace_path(id);
                statistics.finalise_search();
                return (SearchResult::Solved(plan), statistics);
            }

            statistics.report_f_jump(self.f_value(g, h));
            statistics.inc_expanded();

            // Preferred operators are judged at the expanded state.
            let mut preferred_ops: Vec<usize> = Vec::new();
            for slot in &self.preferred_operator_heuristics {
                let mut slot = slot.borrow_mut();
                slot.evaluate(&state, task);
                for &op in slot.preferred() {
                    if !preferred_ops.contains(&op) {
                        preferred_ops.push(op);
                    }
                }
            }

            for op_id in generator.applicable_operators(&state, task) {
                let op = &task.operators[op_id];
                let successor = state.successor(op, task);
                statistics.inc_generated();
                let succ_id = space.get_node_id(&successor);

                if space.node(succ_id).is_dead_end() {
                    // Previously encountered dead end; do not re-evaluate.
                    continue;
                }

                let preferred_flag = preferred_ops.contains(&op_id);

                if space.node(succ_id).is_new() {
                    for slot in &slots {
                        slot.borrow_mut().reach_state(&state, op_id, &successor);
                    }
                    self.evaluate_slots(&slots, &successor, task, &mut statistics);
                    if self.reliable_dead_end() {
                        space.node_mut(succ_id).mark_as_dead_end();
                        continue;
                    }
                    let succ_h = self.representative_h();
                    space.node_mut(succ_id).open(succ_h, id, g, op_id, op.cost());
                    if self.check_progress() {
                        self.report_progress(&mut statistics);
                        self.open_list.boost_preferred();
                    }
                    self.open_list.evaluate(g + op.cost(), preferred_flag);
                    self.open_list.insert(succ_id);
                } else if g + op.cost() < space.node(succ_id).g() {
                    // A strictly cheaper path to an open or closed state.
                    if space.node(succ_id).is_closed() {
                        if self.reopen_closed {
                            statistics.inc_reopened();
                            space.node_mut(succ_id).reopen(id, g, op_id, op.cost());
                            // Refresh the heuristic slots so the open-list
                            // keys describe this state again.
                            self.evaluate_slots(&slots, &successor, task, &mut statistics);
                            self.open_list.evaluate(g + op.cost(), preferred_flag);
                            self.open_list.insert(succ_id);
                        } else {
                            // Keep the cheaper parent for trace quality
                            // without reinserting.
                            space.node_mut(succ_id).update_parent(id, g, op_id, op.cost());
                        }
                    } else {
                        space.node_mut(succ_id).update_parent(id, g, op_id, op.cost());
                    }
                }
            }
        }
    }
}
