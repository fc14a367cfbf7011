use crate::search::{
    states::{PackedState, StatePacker},
    Plan, SearchNode, State, StateId, Task, NO_STATE,
};
use segvec::{Linear, SegVec};
use std::collections::HashMap;

/// The search space maps packed state contents to per-state search records.
/// Registration is idempotent: the first lookup of a state makes it
/// permanent and returns a fresh NEW record, later lookups return the same
/// record.
#[derive(Debug)]
pub struct SearchSpace {
    packer: StatePacker,
    nodes: SegVec<SearchNode, Linear>,
    states: SegVec<PackedState, Linear>,
    registered: HashMap<PackedState, StateId>,
}

impl SearchSpace {
    pub fn new(task: &Task) -> Self {
        Self {
            packer: StatePacker::new(task),
            nodes: SegVec::new(),
            states: SegVec::new(),
            registered: HashMap::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the id of the node for `state`, registering the state if it
    /// has not been seen before.
    pub fn get_node_id(&mut self, state: &State) -> StateId {
        let packed = self.packer.pack(state);
        match self.registered.get(&packed) {
            Some(&id) => id,
            None => {
                let id = StateId(self.nodes.len() as u32);
                self.nodes.push(SearchNode::new());
                self.states.push(packed.clone());
                self.registered.insert(packed, id);
                id
            }
        }
    }

    #[inline(always)]
    pub fn node(&self, id: StateId) -> &SearchNode {
        self.nodes.get(id.index()).expect("invalid state id")
    }

    #[inline(always)]
    pub fn node_mut(&mut self, id: StateId) -> &mut SearchNode {
        self.nodes.get_mut(id.index()).expect("invalid state id")
    }

    pub fn state(&self, id: StateId) -> State {
        let packed = self.states.get(id.index()).expect("invalid state id");
        self.packer.unpack(packed)
    }

    /// Walks the parent pointers from `goal_id` back to the initial state
    /// and returns the operator sequence in execution order.
    pub fn trace_path(&self, goal_id: StateId) -> Plan {
        let mut steps = Vec::new();
        let mut current = goal_id;
        loop {
            let node = self.node(current);
            match node.creating_operator() {
                Some(op) => steps.push(op),
                None => break,
            }
            debug_assert!(node.parent() != NO_STATE);
            current = node.parent();
        }
        steps.reverse();
        Plan::new(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn get_node_id_is_idempotent() {
        let task = parse_fixture(TRIVIAL_TASK_TEXT);
        let mut space = SearchSpace::new(&task);

        let a = space.get_node_id(&task.initial_state);
        let b = space.get_node_id(&task.initial_state);
        assert_eq!(a, b);
        assert_eq!(space.size(), 1);

        let successor = task.initial_state.successor(&task.operators[0], &task);
        let c = space.get_node_id(&successor);
        assert_ne!(a, c);
        assert_eq!(space.size(), 2);
    }

    #[test]
    fn registered_states_round_trip() {
        let task = parse_fixture(UNSOLVABLE_TASK_TEXT);
        let mut space = SearchSpace::new(&task);

        let id = space.get_node_id(&task.initial_state);
        assert_eq!(space.state(id), task.initial_state);
    }

    #[test]
    fn trace_path_reverses_parent_pointers() {
        let task = parse_fixture(TRIVIAL_TASK_TEXT);
        let mut space = SearchSpace::new(&task);

        let root = space.get_node_id(&task.initial_state);
        space.node_mut(root).open_initial(1);

        let successor = task.initial_state.successor(&task.operators[0], &task);
        let child = space.get_node_id(&successor);
        space.node_mut(child).open(0, root, 0, 0, 1);

        let plan = space.trace_path(child);
        assert_eq!(plan.steps(), &[0]);
        assert_eq!(space.node(child).g(), 1);

        assert!(space.trace_path(root).is_empty());
    }

    #[test]
    #[should_panic(expected = "never opened")]
    fn reopen_on_new_node_fails_loudly() {
        let task = parse_fixture(TRIVIAL_TASK_TEXT);
        let mut space = SearchSpace::new(&task);
        let root = space.get_node_id(&task.initial_state);
        space.node_mut(root).reopen(NO_STATE, 0, 0, 1);
    }
}
