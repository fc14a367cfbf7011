use crate::search::QUITE_A_LOT;

/// Identifier of a registered state (and its search node) in the search
/// space arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(pub(crate) u32);

pub const NO_STATE: StateId = StateId(u32::MAX);

impl StateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The status of a search node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchNodeStatus {
    /// New node, not yet opened
    New,
    /// Node is in the open list
    Open,
    /// Node has been expanded
    Closed,
    /// Node is a dead end
    DeadEnd,
}

/// Per-state search bookkeeping: status, path cost, heuristic estimate, and
/// the parent pointer used for plan extraction.
#[derive(Debug, Clone)]
pub struct SearchNode {
    status: SearchNodeStatus,
    g: i32,
    h: i32,
    parent: StateId,
    /// Operator that created this node from its parent; `None` for the
    /// initial state.
    creating_operator: Option<usize>,
}

impl SearchNode {
    pub fn new() -> Self {
        Self {
            status: SearchNodeStatus::New,
            g: QUITE_A_LOT,
            h: QUITE_A_LOT,
            parent: NO_STATE,
            creating_operator: None,
        }
    }

    pub fn status(&self) -> SearchNodeStatus {
        self.status
    }

    pub fn is_new(&self) -> bool {
        self.status == SearchNodeStatus::New
    }

    pub fn is_open(&self) -> bool {
        self.status == SearchNodeStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        self.status == SearchNodeStatus::Closed
    }

    pub fn is_dead_end(&self) -> bool {
        self.status == SearchNodeStatus::DeadEnd
    }

    pub fn g(&self) -> i32 {
        self.g
    }

    pub fn h(&self) -> i32 {
        self.h
    }

    pub fn parent(&self) -> StateId {
        self.parent
    }

    pub fn creating_operator(&self) -> Option<usize> {
        self.creating_operator
    }

    pub fn open_initial(&mut self, h: i32) {
        debug_assert!(self.is_new());
        self.status = SearchNodeStatus::Open;
        self.g = 0;
        self.h = h;
        self.parent = NO_STATE;
        self.creating_operator = None;
    }

    pub fn open(&mut self, h: i32, parent: StateId, parent_g: i32, op: usize, op_cost: i32) {
        debug_assert!(self.is_new());
        self.status = SearchNodeStatus::Open;
        self.g = parent_g + op_cost;
        self.h = h;
        self.parent = parent;
        self.creating_operator = Some(op);
    }

    /// Moves an open or closed node back to the open list with a strictly
    /// cheaper path. Calling this on a NEW node is a programmer error.
    pub fn reopen(&mut self, parent: StateId, parent_g: i32, op: usize, op_cost: i32) {
        assert!(
            self.is_open() || self.is_closed(),
            "reopen on a node that was never opened"
        );
        self.status = SearchNodeStatus::Open;
        self.g = parent_g + op_cost;
        self.parent = parent;
        self.creating_operator = Some(op);
    }

    /// Like [`SearchNode::reopen`], but keeps the status. Used when closed
    /// nodes are not reopened, so that traced plans still benefit from the
    /// cheaper path.
    pub fn update_parent(&mut self, parent: StateId, parent_g: i32, op: usize, op_cost: i32) {
        debug_assert!(self.is_open() || self.is_closed());
        self.g = parent_g + op_cost;
        self.parent = parent;
        self.creating_operator = Some(op);
    }

    pub fn close(&mut self) {
        debug_assert!(self.is_open(), "node must be open to close it");
        self.status = SearchNodeStatus::Closed;
    }

    pub fn mark_as_dead_end(&mut self) {
        self.status = SearchNodeStatus::DeadEnd;
        self.h = QUITE_A_LOT;
    }
}

impl Default for SearchNode {
    fn default() -> Self {
        Self::new()
    }
}
