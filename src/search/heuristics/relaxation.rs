//! Shared delete-relaxation machinery: the unary-operator pool, the
//! exploration queue, and relaxed-plan extraction. [`HspAddHeuristic`] and
//! [`FfHeuristic`] are thin fronts over this core.
//!
//! [`HspAddHeuristic`]: crate::search::heuristics::HspAddHeuristic
//! [`FfHeuristic`]: crate::search::heuristics::FfHeuristic

use crate::search::{capped_add, Operator, State, Task};
use std::collections::HashMap;
use std::collections::VecDeque;
use tracing::info;

const UNREACHED: i32 = -1;

/// Unary operators with more preconditions than this are only deduplicated
/// during simplification, not checked for dominance; the subset enumeration
/// would get out of hand.
const DOMINANCE_PRECONDITION_LIMIT: usize = 5;

/// One effect of an original operator, with all requirements (prevails,
/// pre values of other effects, effect conditions) flattened into a single
/// precondition list of propositions.
#[derive(Debug, Clone)]
struct UnaryOperator {
    /// Key of the originating operator: operator ids first, axiom ids
    /// shifted behind them.
    op_key: usize,
    precondition: Vec<usize>,
    effect: usize,
    base_cost: i32,
    unsatisfied_preconditions: i32,
    h_add_cost: i32,
}

/// Bucket queue over proposition costs. Costs never decrease below the
/// cursor during exploration, so the cursor only moves forward; stale
/// entries are skipped by comparing against the proposition's current cost.
#[derive(Debug, Default)]
struct BucketQueue {
    buckets: Vec<VecDeque<usize>>,
    current: usize,
    size: usize,
}

impl BucketQueue {
    fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.current = 0;
        self.size = 0;
    }

    fn push(&mut self, cost: i32, prop: usize) {
        let slot = cost as usize;
        if slot >= self.buckets.len() {
            self.buckets.resize(slot + 1, VecDeque::new());
        }
        self.buckets[slot].push_back(prop);
        self.size += 1;
    }

    fn pop(&mut self) -> Option<(i32, usize)> {
        if self.size == 0 {
            return None;
        }
        while self.buckets[self.current].is_empty() {
            self.current += 1;
        }
        self.size -= 1;
        let prop = self.buckets[self.current]
            .pop_front()
            .expect("bucket cannot be empty here");
        Some((self.current as i32, prop))
    }
}

#[derive(Debug)]
pub(crate) struct RelaxationCore {
    prop_offset: Vec<usize>,
    num_props: usize,
    is_goal: Vec<bool>,
    goal_props: Vec<usize>,
    precondition_of: Vec<Vec<usize>>,
    unary_operators: Vec<UnaryOperator>,
    num_operators: usize,
    h_add: Vec<i32>,
    reached_by: Vec<Option<usize>>,
    queue: BucketQueue,
}

impl RelaxationCore {
    pub(crate) fn new(task: &Task) -> Self {
        let mut prop_offset = Vec::with_capacity(task.num_variables());
        let mut num_props = 0;
        for var in 0..task.num_variables() {
            prop_offset.push(num_props);
            num_props += task.domain_size(var);
        }

        let mut core = Self {
            prop_offset,
            num_props,
            is_goal: vec![false; num_props],
            goal_props: Vec::new(),
            precondition_of: Vec::new(),
            unary_operators: Vec::new(),
            num_operators: task.operators.len(),
            h_add: vec![UNREACHED; num_props],
            reached_by: vec![None; num_props],
            queue: BucketQueue::default(),
        };

        for goal in task.goal.conditions() {
            let prop = core.prop(goal.var, goal.value);
            core.is_goal[prop] = true;
            core.goal_props.push(prop);
        }

        for op in &task.operators {
            core.build_unary_operators(op, op.id());
        }
        for axiom in &task.axioms {
            core.build_unary_operators(axiom, task.operators.len() + axiom.id());
        }
        core.simplify();

        core.precondition_of = vec![Vec::new(); num_props];
        for (index, op) in core.unary_operators.iter().enumerate() {
            for &prop in &op.precondition {
                core.precondition_of[prop].push(index);
            }
        }

        core
    }

    #[inline]
    fn prop(&self, var: usize, value: usize) -> usize {
        self.prop_offset[var] + value
    }

    pub(crate) fn num_operator_keys(&self) -> usize {
        // Operators plus axioms; keys index the relaxed-plan membership
        // vector.
        self.unary_operators
            .iter()
            .map(|op| op.op_key + 1)
            .max()
            .unwrap_or(0)
            .max(self.num_operators)
    }

    fn build_unary_operators(&mut self, op: &Operator, op_key: usize) {
        let base_cost = op.cost();
        let mut precondition: Vec<usize> = op
            .prevail()
            .iter()
            .map(|c| self.prop(c.var, c.value))
            .collect();
        for effect in op.pre_post() {
            if effect.pre != -1 {
                precondition.push(self.prop(effect.var, effect.pre as usize));
            }
        }
        for effect in op.pre_post() {
            let mut full_precondition = precondition.clone();
            for c in &effect.conditions {
                full_precondition.push(self.prop(c.var, c.value));
            }
            self.unary_operators.push(UnaryOperator {
                op_key,
                precondition: full_precondition,
                effect: self.prop(effect.var, effect.post),
                base_cost,
                unsatisfied_preconditions: 0,
                h_add_cost: 0,
            });
        }
    }

    /// Discards duplicate and dominated unary operators: an operator
    /// dominates another with the same effect if its precondition set is a
    /// proper subset. Subset enumeration is capped by
    /// [`DOMINANCE_PRECONDITION_LIMIT`].
    fn simplify(&mut self) {
        info!(
            unary_operators = self.unary_operators.len(),
            "simplifying unary operators"
        );

        let mut index: HashMap<(Vec<usize>, usize), usize> =
            HashMap::with_capacity(self.unary_operators.len() * 2);
        for (i, op) in self.unary_operators.iter_mut().enumerate() {
            op.precondition.sort_unstable();
            op.precondition.dedup();
            index.insert((op.precondition.clone(), op.effect), i);
        }

        let mut keep: Vec<usize> = Vec::with_capacity(index.len());
        for ((precondition, effect), &op_no) in index.iter() {
            let mut dominated = false;
            if precondition.len() <= DOMINANCE_PRECONDITION_LIMIT {
                let full_mask = (1usize << precondition.len()) - 1;
                for mask in 0..full_mask {
                    let subset: Vec<usize> = precondition
                        .iter()
                        .enumerate()
                        .filter(|(bit, _)| mask & (1 << bit) != 0)
                        .map(|(_, &prop)| prop)
                        .collect();
                    if index.contains_key(&(subset, *effect)) {
                        dominated = true;
                        break;
                    }
                }
            }
            if !dominated {
                keep.push(op_no);
            }
        }
        keep.sort_unstable();

        let old = std::mem::take(&mut self.unary_operators);
        self.unary_operators = old
            .into_iter()
            .enumerate()
            .filter(|(i, _)| keep.binary_search(i).is_ok())
            .map(|(_, op)| op)
            .collect();

        info!(
            unary_operators = self.unary_operators.len(),
            "done simplifying"
        );
    }

    /// Runs the relaxed exploration from `state`: every proposition ends up
    /// with its h_add cost (or stays unreached) and the unary operator that
    /// first reached it at that cost.
    pub(crate) fn explore(&mut self, state: &State) {
        self.h_add.fill(UNREACHED);
        self.reached_by.fill(None);
        self.queue.clear();

        for op_no in 0..self.unary_operators.len() {
            let (unsatisfied, base_cost, effect) = {
                let op = &mut self.unary_operators[op_no];
                op.unsatisfied_preconditions = op.precondition.len() as i32;
                op.h_add_cost = op.base_cost;
                (op.unsatisfied_preconditions, op.base_cost, op.effect)
            };
            // Operators and axioms without preconditions fire right away.
            if unsatisfied == 0 && (self.h_add[effect] == UNREACHED || base_cost < self.h_add[effect])
            {
                self.h_add[effect] = base_cost;
                self.reached_by[effect] = Some(op_no);
                self.queue.push(base_cost, effect);
            }
        }

        for (var, &offset) in self.prop_offset.iter().enumerate() {
            let prop = offset + state[var];
            // Queue each proposition at most once per cost level.
            if self.h_add[prop] != 0 {
                self.queue.push(0, prop);
            }
            self.h_add[prop] = 0;
            self.reached_by[prop] = None;
        }

        let mut unsolved_goals = self.goal_props.len() as i32;
        while let Some((cost, prop)) = self.queue.pop() {
            if cost > self.h_add[prop] {
                continue; // stale entry
            }
            if self.is_goal[prop] {
                unsolved_goals -= 1;
                if unsolved_goals == 0 {
                    break;
                }
            }
            for k in 0..self.precondition_of[prop].len() {
                let op_no = self.precondition_of[prop][k];
                let op = &mut self.unary_operators[op_no];
                op.unsatisfied_preconditions -= 1;
                op.h_add_cost = capped_add(op.h_add_cost, cost);
                debug_assert!(op.unsatisfied_preconditions >= 0);
                if op.unsatisfied_preconditions == 0 {
                    let effect = op.effect;
                    let new_cost = op.h_add_cost;
                    if self.h_add[effect] == UNREACHED || new_cost < self.h_add[effect] {
                        self.h_add[effect] = new_cost;
                        self.reached_by[effect] = Some(op_no);
                        self.queue.push(new_cost, effect);
                    }
                }
            }
        }
    }

    /// Sums the goal propositions' costs; `None` if any goal stayed
    /// unreached (a reliable dead end in the relaxation).
    pub(crate) fn total_goal_cost(&self) -> Option<i32> {
        let mut total = 0;
        for &prop in &self.goal_props {
            let cost = self.h_add[prop];
            if cost == UNREACHED {
                return None;
            }
            total = capped_add(total, cost);
        }
        Some(total)
    }

    /// Chases the reached-by pointers from every goal proposition and
    /// collects the originating operators into `plan_ops`. An operator that
    /// was reached at its own base cost (all preconditions free) is marked
    /// preferred, axioms excepted. Returns the relaxed plan size.
    pub(crate) fn collect_relaxed_plan(
        &self,
        plan_ops: &mut [bool],
        preferred: &mut Vec<usize>,
    ) -> usize {
        let mut size = 0;
        for &goal in &self.goal_props {
            size += self.collect(goal, plan_ops, preferred);
        }
        size
    }

    fn collect(&self, prop: usize, plan_ops: &mut [bool], preferred: &mut Vec<usize>) -> usize {
        let Some(op_no) = self.reached_by[prop] else {
            return 0; // chained back to a start proposition
        };
        let op = &self.unary_operators[op_no];
        let mut added = 0;
        for &precondition in &op.precondition {
            added += self.collect(precondition, plan_ops, preferred);
        }
        if !plan_ops[op.op_key] {
            plan_ops[op.op_key] = true;
            added += 1;
            if op.h_add_cost == op.base_cost && op.op_key < self.num_operators {
                // Reached through a zero-cost precondition chain: helpful.
                preferred.push(op.op_key);
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn exploration_reaches_the_goal_layer_by_layer() {
        let task = parse_fixture(KEY_DOOR_TASK_TEXT);
        let mut core = RelaxationCore::new(&task);
        core.explore(&task.initial_state);

        // key=1 costs 1, door=1 costs 1 (door op) + 1 (key precondition).
        assert_eq!(core.h_add[core.prop(0, 1)], 1);
        assert_eq!(core.h_add[core.prop(1, 1)], 2);
        assert_eq!(core.total_goal_cost(), Some(2));
    }

    #[test]
    fn unreachable_goals_stay_unreached() {
        let task = parse_fixture(UNSOLVABLE_TASK_TEXT);
        let mut core = RelaxationCore::new(&task);
        core.explore(&task.initial_state);

        assert_eq!(core.h_add[core.prop(0, 1)], UNREACHED);
        assert_eq!(core.total_goal_cost(), None);
    }

    #[test]
    fn duplicate_unary_operators_are_merged() {
        let task = parse_fixture(TRIVIAL_TASK_TEXT);
        let core = RelaxationCore::new(&task);
        assert_eq!(core.unary_operators.len(), 1);
    }

    #[test]
    fn axioms_become_zero_cost_unary_operators() {
        let task = parse_fixture(AXIOM_TASK_TEXT);
        let mut core = RelaxationCore::new(&task);
        core.explore(&task.initial_state);

        // d=1 is reached via the zero-cost axiom after v=1 (cost 1).
        assert_eq!(core.h_add[core.prop(1, 1)], 1);
        assert_eq!(core.total_goal_cost(), Some(1));
    }
}
