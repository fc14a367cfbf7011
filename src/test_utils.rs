//! Textual task fixtures shared across the test modules, plus small helpers
//! for building heuristics with known values.
//!
//! Fixture convention: condition-providing variables carry lower indices
//! than the variables they constrain, matching the variable order the
//! translator emits (the transition cache's reduced causal graph relies on
//! it).

use crate::parsers::parse_task;
use crate::search::{Heuristic, State, Task};
use std::collections::HashMap;

pub fn parse_fixture(text: &str) -> Task {
    parse_task(text).expect("fixture must parse")
}

/// One variable `switch` with domain {0, 1}, initially 0, goal 1, and a
/// single `flip` operator.
pub const TRIVIAL_TASK_TEXT: &str = "\
0
begin_variables
1
switch 2 -1
end_variables
begin_state
0
end_state
begin_goal
1
0 1
end_goal
1
begin_operator
flip
0
1
0 0 0 1
1
end_operator
0
begin_CG
0
end_CG
begin_SG
switch 0
check 0
check 1
0
check 0
check 0
end_SG
begin_DTG
1
1 0 0
0
end_DTG
";

/// Two variables `key` and `lock`. The single operator opens the lock but
/// requires the key, and nothing provides the key: the goal (both 1) is
/// unreachable.
pub const UNSOLVABLE_TASK_TEXT: &str = "\
0
begin_variables
2
key 2 -1
lock 2 -1
end_variables
begin_state
0 0
end_state
begin_goal
2
0 1
1 1
end_goal
1
begin_operator
open lock
1
0 1
1
0 1 0 1
1
end_operator
0
begin_CG
1
1 1
0
end_CG
begin_SG
switch 0
check 0
check 0
switch 1
check 0
check 1
0
check 0
check 0
check 0
end_SG
begin_DTG
0
0
end_DTG
begin_DTG
1
1 0 1 0 1
0
end_DTG
";

/// One position variable with values a=0, b=1, c=2, x1=3, x2=4, d=5 and the
/// edges a->b->c->d (the short route) and a->x1->x2->c (the detour). Goal d.
/// Useful for exercising reopening: an inconsistent heuristic can close c
/// via the detour before the short route reaches it.
pub const REOPENING_TASK_TEXT: &str = "\
0
begin_variables
1
pos 6 -1
end_variables
begin_state
0
end_state
begin_goal
1
0 5
end_goal
6
begin_operator
go a b
0
1
0 0 0 1
1
end_operator
begin_operator
go b c
0
1
0 0 1 2
1
end_operator
begin_operator
go a x1
0
1
0 0 0 3
1
end_operator
begin_operator
go x1 x2
0
1
0 0 3 4
1
end_operator
begin_operator
go x2 c
0
1
0 0 4 2
1
end_operator
begin_operator
go c d
0
1
0 0 2 5
1
end_operator
0
begin_CG
0
end_CG
begin_SG
switch 0
check 0
check 2
0 2
check 1
1
check 1
5
check 1
3
check 1
4
check 0
check 0
end_SG
begin_DTG
2
1 0 0
3 2 0
1
2 1 0
1
5 5 0
1
4 3 0
1
2 4 0
0
end_DTG
";

/// A non-derived variable v and a derived variable d whose axiom sets d=1
/// exactly when v=1. Goal d=1.
pub const AXIOM_TASK_TEXT: &str = "\
0
begin_variables
2
v 2 -1
d 2 0
end_variables
begin_state
0 0
end_state
begin_goal
1
1 1
end_goal
1
begin_operator
set v
0
1
0 0 0 1
1
end_operator
1
begin_axiom
d-rule
1
0 1
1
0 1 -1 1
end_axiom
begin_CG
1
1 1
0
end_CG
begin_SG
switch 0
check 0
check 1
0
check 0
check 0
end_SG
begin_DTG
1
1 0 0
0
end_DTG
begin_DTG
1
1 0 1 0 1
0
end_DTG
";

/// Two independent switches, both 0 initially and both 1 in the goal.
pub const TWO_GOAL_TASK_TEXT: &str = "\
0
begin_variables
2
left 2 -1
right 2 -1
end_variables
begin_state
0 0
end_state
begin_goal
2
0 1
1 1
end_goal
2
begin_operator
flip left
0
1
0 0 0 1
1
end_operator
begin_operator
flip right
0
1
0 1 0 1
1
end_operator
0
begin_CG
0
0
end_CG
begin_SG
switch 0
switch 1
check 0
check 1
1
check 0
check 0
check 1
0
check 0
check 0
end_SG
begin_DTG
1
1 0 0
0
end_DTG
begin_DTG
1
1 1 0
0
end_DTG
";

/// `key` must be fetched before `door` can be opened; goal is the open
/// door. The door's DTG edge carries a prevail condition on the key, which
/// exercises the causal-graph heuristic's recursion and its cache.
pub const KEY_DOOR_TASK_TEXT: &str = "\
0
begin_variables
2
key 2 -1
door 2 -1
end_variables
begin_state
0 0
end_state
begin_goal
1
1 1
end_goal
2
begin_operator
get key
0
1
0 0 0 1
1
end_operator
begin_operator
open door
1
0 1
1
0 1 0 1
1
end_operator
0
begin_CG
1
1 1
0
end_CG
begin_SG
switch 0
check 0
check 1
0
switch 1
check 0
check 1
1
check 0
check 0
check 0
end_SG
begin_DTG
1
1 0 0
0
end_DTG
begin_DTG
1
1 1 1 0 1
0
end_DTG
";

/// A wheel that rotates forever without affecting the unreachable flag
/// goal: a finite plateau on which enforced hill climbing must fail.
pub const PLATEAU_TASK_TEXT: &str = "\
0
begin_variables
2
wheel 3 -1
flag 2 -1
end_variables
begin_state
0 0
end_state
begin_goal
1
1 1
end_goal
3
begin_operator
rotate 0 1
0
1
0 0 0 1
1
end_operator
begin_operator
rotate 1 2
0
1
0 0 1 2
1
end_operator
begin_operator
rotate 2 0
0
1
0 0 2 0
1
end_operator
0
begin_CG
0
0
end_CG
begin_SG
switch 0
check 0
check 1
0
check 1
1
check 1
2
check 0
end_SG
begin_DTG
1
1 0 0
1
2 1 0
1
0 2 0
end_DTG
begin_DTG
0
0
end_DTG
";

/// Test heuristic with a fixed value per state, falling back to 0. Lets
/// engine tests pin down expansion orders, including inconsistent ones.
#[derive(Debug)]
pub struct TabledHeuristic {
    table: HashMap<State, i32>,
}

impl TabledHeuristic {
    pub fn new(entries: Vec<(State, i32)>) -> Self {
        Self {
            table: entries.into_iter().collect(),
        }
    }
}

impl Heuristic for TabledHeuristic {
    fn compute(
        &mut self,
        state: &State,
        _task: &Task,
        _preferred: &mut Vec<usize>,
    ) -> Option<i32> {
        Some(*self.table.get(state).unwrap_or(&0))
    }

    fn dead_ends_are_reliable(&self) -> bool {
        false
    }
}
