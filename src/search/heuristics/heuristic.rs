use crate::search::{
    heuristics::{
        merge_and_shrink::MergeAndShrinkConfig, BlindHeuristic, CausalGraphHeuristic, FfHeuristic,
        GoalCountHeuristic, HspAddHeuristic, MergeAndShrinkHeuristic,
    },
    ConfigError, State, Task,
};
use lru::LruCache;
use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroUsize;
use std::rc::Rc;

/// A heuristic evaluator over states.
///
/// `compute` returns `None` to signal a dead end; a dead end is only acted
/// upon when [`Heuristic::dead_ends_are_reliable`] holds. Preferred
/// operators are pushed into the `preferred` out-list, duplicates allowed
/// (the slot deduplicates).
pub trait Heuristic: fmt::Debug {
    fn compute(&mut self, state: &State, task: &Task, preferred: &mut Vec<usize>) -> Option<i32>;

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }

    /// Notification that `state` was reached from `parent` via `op`. A
    /// no-op for purely functional heuristics; path-dependent heuristics
    /// use it for online bookkeeping.
    fn reach_state(&mut self, _parent: &State, _op: usize, _state: &State) {}
}

/// Wraps a heuristic with the state shared between the search engine and
/// the evaluator layer: the most recent value, the most recent preferred
/// operators, and the optional per-state result cache.
pub struct HeuristicSlot {
    heuristic: Box<dyn Heuristic>,
    value: Option<i32>,
    preferred: Vec<usize>,
    result_cache: Option<LruCache<State, (Option<i32>, Vec<usize>)>>,
}

impl fmt::Debug for HeuristicSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeuristicSlot")
            .field("heuristic", &self.heuristic)
            .field("value", &self.value)
            .field("preferred", &self.preferred)
            .field("cached", &self.result_cache.is_some())
            .finish()
    }
}

pub type SharedHeuristic = Rc<RefCell<HeuristicSlot>>;

const RESULT_CACHE_CAPACITY: usize = 1 << 16;

impl HeuristicSlot {
    pub fn new(heuristic: Box<dyn Heuristic>) -> Self {
        Self {
            heuristic,
            value: None,
            preferred: Vec::new(),
            result_cache: None,
        }
    }

    /// Enables the per-state result cache. Purely an evaluation shortcut:
    /// results are identical with and without it.
    pub fn with_result_cache(mut self) -> Self {
        let capacity = NonZeroUsize::new(RESULT_CACHE_CAPACITY).expect("nonzero capacity");
        self.result_cache = Some(LruCache::new(capacity));
        self
    }

    pub fn shared(self) -> SharedHeuristic {
        Rc::new(RefCell::new(self))
    }

    pub fn evaluate(&mut self, state: &State, task: &Task) {
        if let Some(cache) = &mut self.result_cache {
            if let Some((value, preferred)) = cache.get(state) {
                self.value = *value;
                self.preferred = preferred.clone();
                return;
            }
        }

        let mut raw_preferred = Vec::new();
        let value = self.heuristic.compute(state, task, &mut raw_preferred);
        let mut preferred = Vec::with_capacity(raw_preferred.len());
        for op in raw_preferred {
            if !preferred.contains(&op) {
                preferred.push(op);
            }
        }

        if let Some(cache) = &mut self.result_cache {
            cache.put(state.clone(), (value, preferred.clone()));
        }
        self.value = value;
        self.preferred = preferred;
    }

    /// The most recent heuristic value; `None` marks a dead end.
    pub fn value(&self) -> Option<i32> {
        self.value
    }

    pub fn is_dead_end(&self) -> bool {
        self.value.is_none()
    }

    pub fn dead_ends_are_reliable(&self) -> bool {
        self.heuristic.dead_ends_are_reliable()
    }

    pub fn preferred(&self) -> &[usize] {
        &self.preferred
    }

    pub fn is_preferred(&self, op: usize) -> bool {
        self.preferred.contains(&op)
    }

    pub fn reach_state(&mut self, parent: &State, op: usize, state: &State) {
        self.heuristic.reach_state(parent, op, state);
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[clap(rename_all = "kebab-case")]
pub enum HeuristicName {
    #[clap(help = "Causal graph heuristic")]
    Cg,
    #[clap(help = "Additive delete-relaxation heuristic")]
    Add,
    #[clap(help = "FF relaxed-plan heuristic")]
    Ff,
    #[clap(help = "Merge-and-shrink abstraction heuristic")]
    Mas,
    #[clap(help = "Number of unsatisfied goals")]
    GoalCount,
    #[clap(help = "Constant-ish baseline: 0 on goals, 1 elsewhere")]
    Blind,
}

impl HeuristicName {
    pub fn create(&self, task: &Task) -> Result<Box<dyn Heuristic>, ConfigError> {
        Ok(match self {
            HeuristicName::Cg => Box::new(CausalGraphHeuristic::new(task, true)),
            HeuristicName::Add => Box::new(HspAddHeuristic::new(task)),
            HeuristicName::Ff => Box::new(FfHeuristic::new(task)),
            HeuristicName::Mas => Box::new(MergeAndShrinkHeuristic::new(
                task,
                MergeAndShrinkConfig::default(),
            )?),
            HeuristicName::GoalCount => Box::new(GoalCountHeuristic::new()),
            HeuristicName::Blind => Box::new(BlindHeuristic::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn slot_deduplicates_preferred_operators() {
        #[derive(Debug)]
        struct Repeater;
        impl Heuristic for Repeater {
            fn compute(
                &mut self,
                _state: &State,
                _task: &Task,
                preferred: &mut Vec<usize>,
            ) -> Option<i32> {
                preferred.extend([3, 1, 3, 1]);
                Some(7)
            }
        }

        let task = parse_fixture(TRIVIAL_TASK_TEXT);
        let mut slot = HeuristicSlot::new(Box::new(Repeater));
        slot.evaluate(&task.initial_state, &task);

        assert_eq!(slot.value(), Some(7));
        assert_eq!(slot.preferred(), &[3, 1]);
        assert!(slot.is_preferred(1));
        assert!(!slot.is_preferred(2));
    }

    #[test]
    fn result_cache_does_not_change_values() {
        let task = parse_fixture(KEY_DOOR_TASK_TEXT);

        let mut plain = HeuristicSlot::new(
            HeuristicName::Ff.create(&task).expect("ff accepts the task"),
        );
        let mut cached = HeuristicSlot::new(
            HeuristicName::Ff.create(&task).expect("ff accepts the task"),
        )
        .with_result_cache();

        for _ in 0..3 {
            plain.evaluate(&task.initial_state, &task);
            cached.evaluate(&task.initial_state, &task);
            assert_eq!(plain.value(), cached.value());
            assert_eq!(plain.preferred(), cached.preferred());
        }
    }
}
