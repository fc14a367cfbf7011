use crate::search::{
    capped_add,
    heuristics::{transition_cache::NOT_COMPUTED, Heuristic, TransitionCache},
    LabelRef, State, Task, QUITE_A_LOT,
};
use tracing::info;

/// Per-variable working storage for the transition-cost Dijkstra. The
/// distance and helpful-transition tables are indexed by the start value and
/// reset on every heuristic evaluation; the per-node fields belong to the
/// currently running Dijkstra on this graph.
#[derive(Debug)]
struct DtgWorkspace {
    distances: Vec<Vec<i32>>,
    helpful: Vec<Vec<Option<LabelRef>>>,
    children_state: Vec<Vec<usize>>,
    reached_from: Vec<usize>,
    reached_by: Vec<Option<LabelRef>>,
    /// Generation stamp of the last helpful-transition extraction that
    /// visited this graph.
    last_extraction: u32,
}

impl DtgWorkspace {
    fn new(num_values: usize) -> Self {
        Self {
            distances: vec![Vec::new(); num_values],
            helpful: vec![Vec::new(); num_values],
            children_state: vec![Vec::new(); num_values],
            reached_from: vec![0; num_values],
            reached_by: vec![None; num_values],
            last_extraction: 0,
        }
    }

    fn reset(&mut self) {
        for distances in &mut self.distances {
            distances.clear();
        }
        for helpful in &mut self.helpful {
            helpful.clear();
        }
    }
}

/// The causal graph heuristic: for each goal pair, the cost of moving the
/// goal variable to its target value in its domain transition graph, where
/// prevail conditions are priced by recursive lookups in the auxiliary
/// variables' graphs. Costs are summed over the goals.
///
/// Estimates are neither admissible nor are dead-end reports reliable.
#[derive(Debug)]
pub struct CausalGraphHeuristic {
    cache: TransitionCache,
    use_cache: bool,
    work: Vec<DtgWorkspace>,
    helpful_extraction_counter: u32,
}

impl CausalGraphHeuristic {
    pub fn new(task: &Task, use_cache: bool) -> Self {
        info!("initializing causal graph heuristic");
        Self {
            cache: TransitionCache::new(task),
            use_cache,
            work: task
                .dtgs
                .iter()
                .map(|dtg| DtgWorkspace::new(dtg.num_values()))
                .collect(),
            helpful_extraction_counter: 0,
        }
    }

    fn setup(&mut self) {
        for workspace in &mut self.work {
            workspace.reset();
        }
        self.helpful_extraction_counter += 1;
    }

    fn transition_cost(
        &mut self,
        task: &Task,
        state: &State,
        var: usize,
        from: usize,
        to: usize,
    ) -> i32 {
        if from == to {
            return 0;
        }

        if self.use_cache && self.cache.is_cached(var) {
            let cached = self.cache.lookup(var, state, from, to);
            if cached != NOT_COMPUTED {
                return cached;
            }
        }

        if self.work[var].distances[from].is_empty() {
            self.dijkstra(task, state, var, from);
        }
        let cost = self.work[var].distances[from][to];

        if self.use_cache && self.cache.is_cached(var) {
            let helpful = self.work[var].helpful[from][to];
            self.cache.store(var, state, from, to, cost);
            self.cache.store_helpful(var, state, from, to, helpful);
        }
        cost
    }

    /// Single-source shortest paths from `start` in `var`'s DTG under the
    /// context of `state`, with costs of prevail conditions computed
    /// recursively. Each node carries a children state: the values of the
    /// auxiliary variables as established along the path to it, so prevail
    /// lookups are resolved consistently without re-reading `state`.
    fn dijkstra(&mut self, task: &Task, state: &State, var: usize, start: usize) {
        let dtg = &task.dtgs[var];
        let num_values = dtg.num_values();
        let base_cost: i32 = if dtg.is_axiom { 0 } else { 1 };

        {
            let work = &mut self.work[var];
            work.distances[start] = vec![QUITE_A_LOT; num_values];
            work.helpful[start] = vec![None; num_values];
            work.distances[start][start] = 0;
            work.reached_from[start] = start;
            work.reached_by[start] = None;
            work.children_state[start] = dtg
                .local_to_global_child
                .iter()
                .map(|&global| state[global])
                .collect();
        }

        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); 10];
        buckets[0].push(start);
        let mut bucket_contents = 1usize;
        let mut source_distance = 0usize;

        while bucket_contents > 0 && source_distance < buckets.len() {
            // Zero-cost axiom edges can feed the bucket currently being
            // drained, so re-take it until it stays empty.
            loop {
                let bucket = std::mem::take(&mut buckets[source_distance]);
                if bucket.is_empty() {
                    break;
                }
                bucket_contents -= bucket.len();

                for source in bucket {
                    if self.work[var].distances[start][source] < source_distance as i32 {
                        continue;
                    }

                    // Establish the children state at this node: inherit from
                    // the node we came from, overwritten by the prevail values
                    // of the traversed label.
                    if source_distance > 0 {
                        let reached_from = self.work[var].reached_from[source];
                        let mut children = self.work[var].children_state[reached_from].clone();
                        if let Some(label_ref) = self.work[var].reached_by[source] {
                            for p in &dtg.label(label_ref).prevail {
                                children[p.local_var] = p.value;
                            }
                        }
                        self.work[var].children_state[source] = children;
                    }

                    let current_helpful = self.work[var].helpful[start][source];
                    let source_children = self.work[var].children_state[source].clone();

                    for (t_idx, transition) in dtg.nodes[source].transitions.iter().enumerate() {
                        let target = transition.target;
                        if self.work[var].distances[start][target]
                            <= source_distance as i32 + base_cost
                        {
                            continue;
                        }
                        for (l_idx, label) in transition.labels.iter().enumerate() {
                            let mut new_distance = source_distance as i32 + base_cost;
                            for p in &label.prevail {
                                if new_distance >= QUITE_A_LOT {
                                    break;
                                }
                                let current_val = source_children[p.local_var];
                                let aux_var = dtg.local_to_global_child[p.local_var];
                                let prevail_cost =
                                    self.transition_cost(task, state, aux_var, current_val, p.value);
                                new_distance = capped_add(new_distance, prevail_cost);
                            }
                            if new_distance == 0 {
                                new_distance = 1; // HACK for axioms
                            }

                            let work = &mut self.work[var];
                            if work.distances[start][target] > new_distance {
                                work.distances[start][target] = new_distance;
                                work.reached_from[target] = source;
                                let label_ref = LabelRef {
                                    node: source,
                                    transition: t_idx,
                                    label: l_idx,
                                };
                                work.reached_by[target] = Some(label_ref);
                                // A transition leaving the start node becomes
                                // its own helpful transition; deeper ones
                                // inherit the one recorded at their source.
                                work.helpful[start][target] =
                                    current_helpful.or(Some(label_ref));

                                if new_distance < QUITE_A_LOT {
                                    let slot = new_distance as usize;
                                    if slot >= buckets.len() {
                                        let new_len = (slot + 1).max(buckets.len() * 2);
                                        buckets.resize(new_len, Vec::new());
                                    }
                                    buckets[slot].push(target);
                                    bucket_contents += 1;
                                }
                            }
                        }
                    }
                }
            }
            source_distance += 1;
        }
    }

    /// Walks the helpful transitions recorded for the goal `(var, to)` and
    /// collects operators: a depth-one transition whose prevail conditions
    /// already hold contributes its operator, anything else recurses into
    /// the prevail conditions. The generation counter keeps each graph from
    /// being visited twice within one extraction.
    fn mark_helpful_transitions(
        &mut self,
        task: &Task,
        state: &State,
        var: usize,
        to: usize,
        preferred: &mut Vec<usize>,
    ) {
        let from = state[var];
        if from == to {
            return;
        }
        if self.work[var].last_extraction == self.helpful_extraction_counter {
            return;
        }
        self.work[var].last_extraction = self.helpful_extraction_counter;

        let mut helpful: Option<LabelRef> = None;
        let mut cost = 0;
        if self.use_cache && self.cache.is_cached(var) {
            helpful = self.cache.lookup_helpful(var, state, from, to);
            if helpful.is_some() {
                cost = self.cache.lookup(var, state, from, to);
            }
        }
        if helpful.is_none() {
            let work = &self.work[var];
            if work.distances[from].is_empty() {
                return;
            }
            helpful = work.helpful[from][to];
            cost = work.distances[from][to];
        }
        let Some(label_ref) = helpful else {
            return;
        };

        let dtg = &task.dtgs[var];
        let label = dtg.label(label_ref);
        if cost == 1 && !dtg.is_axiom && task.operators[label.op].is_applicable(state) {
            // Transition immediately applicable, all prevail conditions
            // already achieved.
            preferred.push(label.op);
        } else {
            for p in &label.prevail {
                let aux_var = dtg.local_to_global_child[p.local_var];
                self.mark_helpful_transitions(task, state, aux_var, p.value, preferred);
            }
        }
    }
}

impl Heuristic for CausalGraphHeuristic {
    fn compute(&mut self, state: &State, task: &Task, preferred: &mut Vec<usize>) -> Option<i32> {
        self.setup();

        let mut heuristic = 0;
        for goal in task.goal.conditions() {
            let from = state[goal.var];
            let cost = self.transition_cost(task, state, goal.var, from, goal.value);
            heuristic = capped_add(heuristic, cost);
            if heuristic >= QUITE_A_LOT {
                return None;
            }
            self.mark_helpful_transitions(task, state, goal.var, goal.value, preferred);
        }
        Some(heuristic)
    }

    fn dead_ends_are_reliable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn evaluate(task: &Task, state: &State, use_cache: bool) -> (Option<i32>, Vec<usize>) {
        let mut heuristic = CausalGraphHeuristic::new(task, use_cache);
        let mut preferred = Vec::new();
        let value = heuristic.compute(state, task, &mut preferred);
        (value, preferred)
    }

    #[test]
    fn zero_on_goal_states() {
        let task = parse_fixture(TRIVIAL_TASK_TEXT);
        let goal_state = State::new(vec![1]);
        assert_eq!(evaluate(&task, &goal_state, true).0, Some(0));
    }

    #[test]
    fn counts_a_single_transition() {
        let task = parse_fixture(TRIVIAL_TASK_TEXT);
        let (value, preferred) = evaluate(&task, &task.initial_state, true);
        assert_eq!(value, Some(1));
        // The flip operator is immediately applicable: exactly it is
        // preferred.
        assert_eq!(preferred, vec![0]);
    }

    #[test]
    fn prices_prevail_conditions_recursively() {
        let task = parse_fixture(KEY_DOOR_TASK_TEXT);
        let (value, preferred) = evaluate(&task, &task.initial_state, true);
        // Open the door (1) plus achieve its key prevail (1).
        assert_eq!(value, Some(2));
        // The door transition is not applicable yet, so the helpful
        // extraction recurses to the key.
        assert_eq!(preferred, vec![0]);

        let with_key = State::new(vec![1, 0]);
        let (value, preferred) = evaluate(&task, &with_key, true);
        assert_eq!(value, Some(1));
        assert_eq!(preferred, vec![1]);
    }

    #[test]
    fn unreachable_goal_is_a_dead_end() {
        let task = parse_fixture(UNSOLVABLE_TASK_TEXT);
        let (value, _) = evaluate(&task, &task.initial_state, true);
        assert_eq!(value, None);
    }

    #[test]
    fn at_least_goal_count() {
        let task = parse_fixture(TWO_GOAL_TASK_TEXT);
        let (value, preferred) = evaluate(&task, &task.initial_state, true);
        assert_eq!(value, Some(2));
        let mut preferred = preferred;
        preferred.sort_unstable();
        assert_eq!(preferred, vec![0, 1]);
    }

    #[test]
    fn chain_distances_add_up() {
        let task = parse_fixture(REOPENING_TASK_TEXT);
        // From a (value 0) to d (value 5): a -> b -> c -> d.
        let (value, _) = evaluate(&task, &task.initial_state, true);
        assert_eq!(value, Some(3));
    }

    #[test]
    fn cache_agrees_with_uncached_computation() {
        for text in [
            TRIVIAL_TASK_TEXT,
            KEY_DOOR_TASK_TEXT,
            REOPENING_TASK_TEXT,
            TWO_GOAL_TASK_TEXT,
            UNSOLVABLE_TASK_TEXT,
        ] {
            let task = parse_fixture(text);
            let mut states = vec![task.initial_state.clone()];
            for op in &task.operators {
                if op.is_applicable(&task.initial_state) {
                    states.push(task.initial_state.successor(op, &task));
                }
            }
            for state in &states {
                assert_eq!(
                    evaluate(&task, state, true).0,
                    evaluate(&task, state, false).0,
                );
            }
        }
    }

    #[test]
    fn cached_entries_match_fresh_dijkstra() {
        let task = parse_fixture(KEY_DOOR_TASK_TEXT);
        let mut heuristic = CausalGraphHeuristic::new(&task, true);
        let mut preferred = Vec::new();

        // First evaluation fills the cache; the second answers from it.
        let first = heuristic.compute(&task.initial_state, &task, &mut preferred);
        let second = heuristic.compute(&task.initial_state, &task, &mut preferred);
        assert_eq!(first, second);
        assert_eq!(
            heuristic.cache.lookup(1, &task.initial_state, 0, 1),
            2,
            "door transition under keyless projection costs 2"
        );
    }
}
