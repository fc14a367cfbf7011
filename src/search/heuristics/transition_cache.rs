use crate::search::{LabelRef, State, Task};

/// Distinguished sentinel for cache slots that were never filled.
pub const NOT_COMPUTED: i32 = -2;

const MAX_CACHE_SIZE: usize = 1_000_000;

/// Per-variable cache of DTG transition costs and the helpful transition
/// discovered alongside them, keyed by (from value, to value, values of the
/// variable's ancestors in the reduced causal graph).
///
/// A variable is cached iff the product of its own domain size (times
/// domain size minus one, for the from/to pair) and its ancestors' domain
/// sizes stays within the entry budget. Entries are monotone: once written
/// they stay fixed for the run, because they depend only on the key.
#[derive(Debug)]
pub struct TransitionCache {
    domains: Vec<usize>,
    depends_on: Vec<Vec<usize>>,
    cost: Vec<Vec<i32>>,
    helpful: Vec<Vec<Option<LabelRef>>>,
}

impl TransitionCache {
    pub fn new(task: &Task) -> Self {
        let num_vars = task.num_variables();
        let domains: Vec<usize> = (0..num_vars).map(|v| task.domain_size(v)).collect();
        let depends_on = task.causal_graph.reduced_ancestors();

        let mut cost = vec![Vec::new(); num_vars];
        let mut helpful = vec![Vec::new(); num_vars];
        for var in 0..num_vars {
            // The practical domain bound keeps the products below from
            // overflowing.
            debug_assert!(domains[var] <= 1000);
            let mut required = domains[var] * domains[var].saturating_sub(1);
            if required == 0 {
                continue;
            }
            if required <= MAX_CACHE_SIZE {
                for &dep in &depends_on[var] {
                    required = required.saturating_mul(domains[dep]);
                    if required > MAX_CACHE_SIZE {
                        break;
                    }
                }
            }
            if required <= MAX_CACHE_SIZE {
                cost[var] = vec![NOT_COMPUTED; required];
                helpful[var] = vec![None; required];
            }
        }

        Self {
            domains,
            depends_on,
            cost,
            helpful,
        }
    }

    /// Whether the cache budget admitted this variable. Absence is recorded
    /// explicitly as an empty table.
    pub fn is_cached(&self, var: usize) -> bool {
        !self.cost[var].is_empty()
    }

    /// The key uses only the projection of the state onto the variable's
    /// reduced-causal-graph ancestors; other variables cannot influence the
    /// transition cost.
    fn index(&self, var: usize, state: &State, from: usize, to: usize) -> usize {
        debug_assert!(self.is_cached(var));
        debug_assert!(from != to);
        let mut index = from;
        let mut multiplier = self.domains[var];
        for &dep in &self.depends_on[var] {
            index += state[dep] * multiplier;
            multiplier *= self.domains[dep];
        }
        let to_adjusted = if to > from { to - 1 } else { to };
        index + to_adjusted * multiplier
    }

    pub fn lookup(&self, var: usize, state: &State, from: usize, to: usize) -> i32 {
        self.cost[var][self.index(var, state, from, to)]
    }

    pub fn store(&mut self, var: usize, state: &State, from: usize, to: usize, cost: i32) {
        let index = self.index(var, state, from, to);
        self.cost[var][index] = cost;
    }

    pub fn lookup_helpful(
        &self,
        var: usize,
        state: &State,
        from: usize,
        to: usize,
    ) -> Option<LabelRef> {
        self.helpful[var][self.index(var, state, from, to)]
    }

    pub fn store_helpful(
        &mut self,
        var: usize,
        state: &State,
        from: usize,
        to: usize,
        label: Option<LabelRef>,
    ) {
        let index = self.index(var, state, from, to);
        self.helpful[var][index] = label;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn small_variables_are_cached() {
        let task = parse_fixture(KEY_DOOR_TASK_TEXT);
        let cache = TransitionCache::new(&task);

        assert!(cache.is_cached(0));
        assert!(cache.is_cached(1));
        // door (var 1) depends on key (var 0) in the reduced causal graph.
        assert_eq!(cache.depends_on[1], vec![0]);
        // 2 * 1 from/to pairs times the ancestor domain 2.
        assert_eq!(cache.cost[1].len(), 4);
    }

    #[test]
    fn keys_separate_ancestor_projections() {
        let task = parse_fixture(KEY_DOOR_TASK_TEXT);
        let mut cache = TransitionCache::new(&task);

        let without_key = State::new(vec![0, 0]);
        let with_key = State::new(vec![1, 0]);

        cache.store(1, &without_key, 0, 1, 2);
        assert_eq!(cache.lookup(1, &without_key, 0, 1), 2);
        assert_eq!(cache.lookup(1, &with_key, 0, 1), NOT_COMPUTED);
    }

    #[test]
    fn distinct_from_to_pairs_do_not_collide() {
        let task = parse_fixture(REOPENING_TASK_TEXT);
        let mut cache = TransitionCache::new(&task);
        assert!(cache.is_cached(0));

        let state = task.initial_state.clone();
        cache.store(0, &state, 0, 1, 11);
        cache.store(0, &state, 1, 0, 22);
        cache.store(0, &state, 0, 2, 33);
        assert_eq!(cache.lookup(0, &state, 0, 1), 11);
        assert_eq!(cache.lookup(0, &state, 1, 0), 22);
        assert_eq!(cache.lookup(0, &state, 0, 2), 33);
    }
}
