//! Abstract transition systems for the merge-and-shrink pipeline.
//!
//! Transitions are grouped by operator, not by source state: products are
//! then a per-operator cross product, and abstraction mappings apply in one
//! sweep. Distance computation builds its own adjacency lists on demand.

use crate::search::{
    heuristics::merge_and_shrink::ShrinkStrategy, ConfigError, State, Task, QUITE_A_LOT,
};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info};

const PRUNED: i32 = -1;
const INVALID: i32 = -2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct AbstractTransition {
    pub src: i32,
    pub target: i32,
}

/// Maps concrete states to abstract state ids (or -1 for states pruned from
/// the abstraction). Chained through the merge history: every product keeps
/// the lookup chains of its components.
#[derive(Debug)]
enum StateMap {
    Atomic {
        variable: usize,
        table: Vec<i32>,
    },
    Product {
        left: Box<StateMap>,
        right: Box<StateMap>,
        table: Vec<Vec<i32>>,
    },
}

impl StateMap {
    fn abstract_state(&self, state: &State) -> i32 {
        match self {
            StateMap::Atomic { variable, table } => table[state[*variable]],
            StateMap::Product { left, right, table } => {
                let s1 = left.abstract_state(state);
                let s2 = right.abstract_state(state);
                if s1 == PRUNED || s2 == PRUNED {
                    PRUNED
                } else {
                    table[s1 as usize][s2 as usize]
                }
            }
        }
    }

    fn apply_mapping(&mut self, mapping: &[i32]) {
        match self {
            StateMap::Atomic { table, .. } => {
                for entry in table.iter_mut() {
                    if *entry != PRUNED {
                        *entry = mapping[*entry as usize];
                    }
                }
            }
            StateMap::Product { table, .. } => {
                for row in table.iter_mut() {
                    for entry in row.iter_mut() {
                        if *entry != PRUNED {
                            *entry = mapping[*entry as usize];
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct Abstraction {
    varset: Vec<usize>,
    num_states: usize,
    transitions_by_op: Vec<Vec<AbstractTransition>>,
    relevant_operators: Vec<usize>,
    init_distances: Vec<i32>,
    goal_distances: Vec<i32>,
    init_state: i32,
    max_f: i32,
    max_g: i32,
    max_h: i32,
    map: StateMap,
}

fn breadth_first_search(graph: &[Vec<i32>], queue: &mut VecDeque<i32>, distances: &mut [i32]) {
    while let Some(state) = queue.pop_front() {
        for &successor in &graph[state as usize] {
            if distances[successor as usize] > distances[state as usize] + 1 {
                distances[successor as usize] = distances[state as usize] + 1;
                queue.push_back(successor);
            }
        }
    }
}

impl Abstraction {
    /// Builds the trivial per-variable abstractions: prevails become
    /// self-loops, pre/post entries become edges (from every value when the
    /// pre value is unrestricted).
    pub(crate) fn build_atomic(task: &Task) -> Vec<Abstraction> {
        info!("building atomic abstractions");
        let num_operators = task.operators.len();

        let mut result: Vec<Abstraction> = (0..task.num_variables())
            .map(|var| {
                let range = task.domain_size(var);
                let goal_value = task
                    .goal
                    .conditions()
                    .iter()
                    .find(|c| c.var == var)
                    .map(|c| c.value);

                let mut goal_distances = vec![INVALID; range];
                for value in 0..range {
                    if goal_value.is_none() || goal_value == Some(value) {
                        goal_distances[value] = 0;
                    }
                }

                Abstraction {
                    varset: vec![var],
                    num_states: range,
                    transitions_by_op: vec![Vec::new(); num_operators],
                    relevant_operators: Vec::new(),
                    init_distances: vec![INVALID; range],
                    goal_distances,
                    init_state: task.initial_state[var] as i32,
                    max_f: 0,
                    max_g: 0,
                    max_h: 0,
                    map: StateMap::Atomic {
                        variable: var,
                        table: (0..range as i32).collect(),
                    },
                }
            })
            .collect();

        for op in &task.operators {
            let op_no = op.id();
            for prevail in op.prevail() {
                let abs = &mut result[prevail.var];
                let value = prevail.value as i32;
                abs.transitions_by_op[op_no].push(AbstractTransition {
                    src: value,
                    target: value,
                });
                if abs.relevant_operators.last() != Some(&op_no) {
                    abs.relevant_operators.push(op_no);
                }
            }
            for effect in op.pre_post() {
                let abs = &mut result[effect.var];
                let (pre_min, pre_max) = if effect.pre == -1 {
                    (0, task.domain_size(effect.var))
                } else {
                    (effect.pre as usize, effect.pre as usize + 1)
                };
                for value in pre_min..pre_max {
                    abs.transitions_by_op[op_no].push(AbstractTransition {
                        src: value as i32,
                        target: effect.post as i32,
                    });
                }
                if abs.relevant_operators.last() != Some(&op_no) {
                    abs.relevant_operators.push(op_no);
                }
            }
        }

        for abstraction in &mut result {
            abstraction.compute_distances(&mut seeded_rng());
        }
        result
    }

    pub(crate) fn size(&self) -> usize {
        self.num_states
    }

    pub(crate) fn is_solvable(&self) -> bool {
        self.init_state != PRUNED
    }

    pub(crate) fn init_h(&self) -> i32 {
        if self.is_solvable() {
            self.goal_distances[self.init_state as usize]
        } else {
            QUITE_A_LOT
        }
    }

    /// Goal distance of the concrete state's abstract image; `None` when
    /// the state has no image under this abstraction.
    pub(crate) fn cost(&self, state: &State) -> Option<i32> {
        let abs_state = self.map.abstract_state(state);
        if abs_state == PRUNED {
            return None;
        }
        let cost = self.goal_distances[abs_state as usize];
        debug_assert!(cost != INVALID && cost != QUITE_A_LOT);
        Some(cost)
    }

    pub(crate) fn compute_distances(&mut self, rng: &mut StdRng) {
        self.compute_init_distances();
        self.compute_goal_distances();

        self.max_f = 0;
        self.max_g = 0;
        self.max_h = 0;

        let mut unreachable_count = 0;
        let mut irrelevant_count = 0;
        for state in 0..self.num_states {
            let g = self.init_distances[state];
            let h = self.goal_distances[state];
            if g == QUITE_A_LOT {
                unreachable_count += 1;
            } else if h == QUITE_A_LOT {
                irrelevant_count += 1;
            } else {
                self.max_f = self.max_f.max(g + h);
                self.max_g = self.max_g.max(g);
                self.max_h = self.max_h.max(h);
            }
        }
        if unreachable_count > 0 || irrelevant_count > 0 {
            debug!(unreachable_count, irrelevant_count, "pruning abstraction");
            // Forced shrink to the current size just drops the unreachable
            // and irrelevant states; the strategy does not matter.
            self.shrink(self.size(), ShrinkStrategy::HighFLowH, true, rng);
        }
    }

    fn compute_init_distances(&mut self) {
        let mut forward_graph: Vec<Vec<i32>> = vec![Vec::new(); self.num_states];
        for transitions in &self.transitions_by_op {
            for t in transitions {
                forward_graph[t.src as usize].push(t.target);
            }
        }

        let mut queue = VecDeque::new();
        for state in 0..self.num_states as i32 {
            if state == self.init_state {
                self.init_distances[state as usize] = 0;
                queue.push_back(state);
            } else {
                self.init_distances[state as usize] = QUITE_A_LOT;
            }
        }
        breadth_first_search(&forward_graph, &mut queue, &mut self.init_distances);
    }

    fn compute_goal_distances(&mut self) {
        let mut backward_graph: Vec<Vec<i32>> = vec![Vec::new(); self.num_states];
        for transitions in &self.transitions_by_op {
            for t in transitions {
                backward_graph[t.target as usize].push(t.src);
            }
        }

        let mut queue = VecDeque::new();
        for state in 0..self.num_states {
            if self.goal_distances[state] == 0 {
                queue.push_back(state as i32);
            } else {
                self.goal_distances[state] = QUITE_A_LOT;
            }
        }
        breadth_first_search(&backward_graph, &mut queue, &mut self.goal_distances);
    }

    /// Label normalization: replace operator ids by canonical
    /// representatives (when a label map is given) and drop duplicate
    /// transitions. Called on the older component right before a merge.
    fn normalize(&mut self, label_map: Option<&HashMap<usize, usize>>) {
        type StateBucket = Vec<(i32, usize)>;

        // First, partition by target state, replacing operators by their
        // canonical representative.
        let mut target_buckets: Vec<StateBucket> = vec![Vec::new(); self.num_states];
        for op_no in 0..self.transitions_by_op.len() {
            let transitions = std::mem::take(&mut self.transitions_by_op[op_no]);
            if transitions.is_empty() {
                continue;
            }
            let canon_op_no = match label_map {
                Some(map) => *map.get(&op_no).unwrap_or(&op_no),
                None => op_no,
            };
            for t in transitions {
                target_buckets[t.target as usize].push((t.src, canon_op_no));
            }
        }

        // Second, partition by source state.
        let mut src_buckets: Vec<StateBucket> = vec![Vec::new(); self.num_states];
        for (target, bucket) in target_buckets.into_iter().enumerate() {
            for (src, op_no) in bucket {
                src_buckets[src as usize].push((target as i32, op_no));
            }
        }

        // Finally, regroup by operator; equal transitions now arrive
        // consecutively and collapse.
        for (src, bucket) in src_buckets.into_iter().enumerate() {
            for (target, op_no) in bucket {
                let op_bucket = &mut self.transitions_by_op[op_no];
                let trans = AbstractTransition {
                    src: src as i32,
                    target,
                };
                if op_bucket.last() != Some(&trans) {
                    op_bucket.push(trans);
                }
            }
        }
    }

    /// Synchronized product of two abstractions. Operators relevant to
    /// neither side would contribute pure self-loops and are dropped.
    pub(crate) fn product(
        mut abs1: Abstraction,
        mut abs2: Abstraction,
        label_map: Option<&HashMap<usize, usize>>,
        simplify_labels: bool,
        rng: &mut StdRng,
    ) -> Result<Abstraction, ConfigError> {
        debug_assert!(abs1.is_solvable() && abs2.is_solvable());
        let num_operators = abs1.transitions_by_op.len();

        let mut varset: Vec<usize> = abs1.varset.iter().chain(abs2.varset.iter()).copied().collect();
        varset.sort_unstable();
        let orthogonal = {
            let mut deduped = varset.clone();
            deduped.dedup();
            deduped.len() == varset.len()
        };
        if simplify_labels && !orthogonal {
            return Err(ConfigError::NonOrthogonalMerge);
        }
        varset.dedup();

        let num_states = abs1.size() * abs2.size();
        let mut goal_distances = vec![INVALID; num_states];
        let mut init_state = PRUNED;

        let multiplier = abs2.size() as i32;
        let mut table = vec![vec![PRUNED; abs2.size()]; abs1.size()];
        for s1 in 0..abs1.size() {
            for s2 in 0..abs2.size() {
                let state = s1 as i32 * multiplier + s2 as i32;
                table[s1][s2] = state;
                if abs1.goal_distances[s1] == 0 && abs2.goal_distances[s2] == 0 {
                    goal_distances[state as usize] = 0;
                }
                if s1 as i32 == abs1.init_state && s2 as i32 == abs2.init_state {
                    init_state = state;
                }
            }
        }

        let mut relevant1 = vec![false; num_operators];
        for &op in &abs1.relevant_operators {
            relevant1[op] = true;
        }
        let mut relevant2 = vec![false; num_operators];
        for &op in &abs2.relevant_operators {
            relevant2[op] = true;
        }

        // Normalization is only needed on the side that has already been
        // merged; fresh atomic abstractions have no duplicates.
        if abs1.varset.len() > 1 {
            abs1.normalize(if simplify_labels { label_map } else { None });
        } else if abs2.varset.len() > 1 {
            abs2.normalize(if simplify_labels { label_map } else { None });
        }

        let mut transitions_by_op = vec![Vec::new(); num_operators];
        let mut relevant_operators = Vec::new();
        for op_no in 0..num_operators {
            let rel1 = relevant1[op_no];
            let rel2 = relevant2[op_no];
            if !rel1 && !rel2 {
                continue;
            }
            relevant_operators.push(op_no);
            let bucket1 = &abs1.transitions_by_op[op_no];
            let bucket2 = &abs2.transitions_by_op[op_no];
            let transitions: &mut Vec<AbstractTransition> = &mut transitions_by_op[op_no];
            if rel1 && rel2 {
                transitions.reserve(bucket1.len() * bucket2.len());
                for t1 in bucket1 {
                    for t2 in bucket2 {
                        transitions.push(AbstractTransition {
                            src: t1.src * multiplier + t2.src,
                            target: t1.target * multiplier + t2.target,
                        });
                    }
                }
            } else if rel1 {
                transitions.reserve(bucket1.len() * abs2.size());
                for t1 in bucket1 {
                    for s2 in 0..abs2.size() as i32 {
                        transitions.push(AbstractTransition {
                            src: t1.src * multiplier + s2,
                            target: t1.target * multiplier + s2,
                        });
                    }
                }
            } else {
                transitions.reserve(bucket2.len() * abs1.size());
                for t2 in bucket2 {
                    for s1 in 0..abs1.size() as i32 {
                        transitions.push(AbstractTransition {
                            src: s1 * multiplier + t2.src,
                            target: s1 * multiplier + t2.target,
                        });
                    }
                }
            }
        }

        let mut product = Abstraction {
            varset,
            num_states,
            transitions_by_op,
            relevant_operators,
            init_distances: vec![INVALID; num_states],
            goal_distances,
            init_state,
            max_f: 0,
            max_g: 0,
            max_h: 0,
            map: StateMap::Product {
                left: Box::new(abs1.map),
                right: Box::new(abs2.map),
                table,
            },
        };
        product.compute_distances(rng);
        Ok(product)
    }

    fn partition_into_buckets(&self, strategy: ShrinkStrategy) -> Vec<Vec<i32>> {
        let max_f = self.max_f as usize;
        let max_h = self.max_h as usize;
        let mut states_by_f_and_h: Vec<Vec<Vec<i32>>> = (0..=max_f)
            .map(|f| vec![Vec::new(); f.min(max_h) + 1])
            .collect();

        for state in 0..self.num_states {
            let g = self.init_distances[state];
            let h = self.goal_distances[state];
            if g == QUITE_A_LOT || h == QUITE_A_LOT {
                continue;
            }
            let (f, h) = if strategy == ShrinkStrategy::Random {
                (0, 0)
            } else {
                ((g + h) as usize, h as usize)
            };
            states_by_f_and_h[f][h].push(state as i32);
        }

        let mut buckets = Vec::new();
        let mut push = |bucket: &mut Vec<i32>| {
            if !bucket.is_empty() {
                buckets.push(std::mem::take(bucket));
            }
        };
        match strategy {
            ShrinkStrategy::HighFLowH | ShrinkStrategy::Random => {
                for f in (0..=max_f).rev() {
                    for h in 0..states_by_f_and_h[f].len() {
                        push(&mut states_by_f_and_h[f][h]);
                    }
                }
            }
            ShrinkStrategy::LowFLowH => {
                for f in 0..=max_f {
                    for h in 0..states_by_f_and_h[f].len() {
                        push(&mut states_by_f_and_h[f][h]);
                    }
                }
            }
            ShrinkStrategy::HighFHighH => {
                for f in (0..=max_f).rev() {
                    for h in (0..states_by_f_and_h[f].len()).rev() {
                        push(&mut states_by_f_and_h[f][h]);
                    }
                }
            }
            ShrinkStrategy::Dfp => unreachable!("DFP does not bucketize"),
        }
        buckets
    }

    /// Collapses bucketized states down to `target_size` groups: buckets
    /// within budget become singletons, over-budget buckets merge random
    /// group pairs until their share of the budget is met.
    fn collapse_buckets(
        &self,
        buckets: Vec<Vec<i32>>,
        target_size: usize,
        rng: &mut StdRng,
    ) -> Vec<Vec<i32>> {
        let mut collapsed_groups: Vec<Vec<i32>> = Vec::with_capacity(target_size);
        let mut states_to_go: i64 = buckets.iter().map(|b| b.len() as i64).sum();
        let num_buckets = buckets.len();

        for (bucket_no, bucket) in buckets.into_iter().enumerate() {
            let remaining_budget = target_size as i64 - collapsed_groups.len() as i64;
            states_to_go -= bucket.len() as i64;
            let bucket_budget = remaining_budget - states_to_go;

            if bucket_budget >= bucket.len() as i64 {
                for state in bucket {
                    collapsed_groups.push(vec![state]);
                }
            } else if bucket_budget <= 1 {
                // The whole bucket forms one group, possibly shared with
                // neighbouring buckets when the budget is very tight.
                let remaining_buckets = (num_buckets - bucket_no) as i64;
                if remaining_budget >= remaining_buckets || bucket_no == 0 {
                    collapsed_groups.push(Vec::new());
                }
                let group = collapsed_groups
                    .last_mut()
                    .expect("a group exists for the first bucket");
                group.extend(bucket);
            } else {
                let mut groups: Vec<Vec<i32>> = bucket.into_iter().map(|s| vec![s]).collect();
                debug_assert!(bucket_budget >= 2 && (bucket_budget as usize) < groups.len());
                while groups.len() as i64 > bucket_budget {
                    let pos1 = rng.gen_range(0..groups.len());
                    let mut pos2 = rng.gen_range(0..groups.len());
                    while pos1 == pos2 {
                        pos2 = rng.gen_range(0..groups.len());
                    }
                    let merged = std::mem::take(&mut groups[pos2]);
                    groups[pos1].extend(merged);
                    groups.swap_remove(pos2);
                }
                collapsed_groups.extend(groups);
            }
        }
        collapsed_groups
    }

    /// DFP-style refinement: start with one group per h value and split
    /// groups by their outgoing (operator, target group) signatures while
    /// the group count stays within the target size.
    fn collapse_dfp(&self, target_size: usize) -> Vec<Vec<i32>> {
        #[derive(PartialEq, Eq, PartialOrd, Ord)]
        struct Signature {
            h: i32,
            group: i32,
            succ_signature: Vec<(usize, i32)>,
            state: i32,
        }

        let max_h = self.max_h;
        let mut num_groups = (max_h + 1) as usize;

        let mut state_to_group = vec![PRUNED; self.num_states];
        for state in 0..self.num_states {
            let h = self.goal_distances[state];
            if h == QUITE_A_LOT || self.init_distances[state] == QUITE_A_LOT {
                state_to_group[state] = PRUNED;
            } else {
                debug_assert!(h >= 0 && h <= max_h);
                state_to_group[state] = h;
            }
        }

        let mut h_done = vec![false; (max_h + 1) as usize];

        let mut done = false;
        while !done {
            done = true;

            let mut signatures: Vec<Signature> = Vec::with_capacity(self.num_states + 2);
            signatures.push(Signature {
                h: -1,
                group: -1,
                succ_signature: Vec::new(),
                state: -1,
            });
            for state in 0..self.num_states {
                let mut h = self.goal_distances[state];
                if h == QUITE_A_LOT || self.init_distances[state] == QUITE_A_LOT {
                    h = -1;
                    debug_assert_eq!(state_to_group[state], PRUNED);
                }
                signatures.push(Signature {
                    h,
                    group: state_to_group[state],
                    succ_signature: Vec::new(),
                    state: state as i32,
                });
            }
            signatures.push(Signature {
                h: max_h + 1,
                group: -1,
                succ_signature: Vec::new(),
                state: -1,
            });

            for (op_no, transitions) in self.transitions_by_op.iter().enumerate() {
                for t in transitions {
                    let src_group = state_to_group[t.src as usize];
                    let target_group = state_to_group[t.target as usize];
                    if src_group != PRUNED && target_group != PRUNED {
                        signatures[t.src as usize + 1]
                            .succ_signature
                            .push((op_no, target_group));
                    }
                }
            }
            for signature in &mut signatures {
                signature.succ_signature.sort_unstable();
                signature.succ_signature.dedup();
            }
            signatures.sort_unstable();

            let mut sig_start = 0;
            loop {
                let h = signatures[sig_start].h;
                if h > max_h {
                    break;
                }
                if h == -1 || h_done[h as usize] {
                    while signatures[sig_start].h == h {
                        sig_start += 1;
                    }
                    continue;
                }

                let mut num_old_groups = 0;
                let mut num_new_groups = 0;
                let mut sig_end = sig_start;
                while signatures[sig_end].h == h {
                    let prev_sig = &signatures[sig_end - 1];
                    let curr_sig = &signatures[sig_end];
                    if prev_sig.group != curr_sig.group {
                        num_old_groups += 1;
                        num_new_groups += 1;
                    } else if prev_sig.succ_signature != curr_sig.succ_signature {
                        num_new_groups += 1;
                    }
                    sig_end += 1;
                }
                debug_assert!(sig_end > sig_start);

                if num_groups - num_old_groups + num_new_groups > target_size {
                    // Splitting this h layer would overrun the bound.
                    h_done[h as usize] = true;
                } else if num_new_groups != num_old_groups {
                    done = false;
                    let mut new_group_no = -1;
                    for i in sig_start..sig_end {
                        let prev_group = signatures[i - 1].group;
                        let same_succ =
                            signatures[i - 1].succ_signature == signatures[i].succ_signature;
                        let curr = &signatures[i];
                        if prev_group != curr.group {
                            new_group_no = curr.group;
                        } else if !same_succ {
                            new_group_no = num_groups as i32;
                            num_groups += 1;
                            debug_assert!(num_groups <= target_size);
                        }
                        debug_assert!(new_group_no != -1);
                        state_to_group[curr.state as usize] = new_group_no;
                    }
                }

                sig_start = sig_end;
            }
        }

        let mut collapsed_groups: Vec<Vec<i32>> = vec![Vec::new(); num_groups];
        for state in 0..self.num_states {
            let group = state_to_group[state];
            if group != PRUNED {
                collapsed_groups[group as usize].push(state as i32);
            }
        }
        collapsed_groups
    }

    fn apply_abstraction(&mut self, collapsed_groups: Vec<Vec<i32>>, rng: &mut StdRng) {
        let mut mapping = vec![PRUNED; self.num_states];
        for (group_no, group) in collapsed_groups.iter().enumerate() {
            for &state in group {
                debug_assert_eq!(mapping[state as usize], PRUNED);
                mapping[state as usize] = group_no as i32;
            }
        }

        let new_num_states = collapsed_groups.len();
        let mut new_init_distances = vec![INVALID; new_num_states];
        let mut new_goal_distances = vec![INVALID; new_num_states];

        let mut must_recompute = false;
        for (new_state, group) in collapsed_groups.iter().enumerate() {
            debug_assert!(!group.is_empty());
            let mut iter = group.iter();
            let first = *iter.next().expect("group is non-empty");
            let mut init_dist = self.init_distances[first as usize];
            let mut goal_dist = self.goal_distances[first as usize];
            for &state in iter {
                if self.init_distances[state as usize] < init_dist {
                    must_recompute = true;
                    init_dist = self.init_distances[state as usize];
                }
                if self.goal_distances[state as usize] < goal_dist {
                    must_recompute = true;
                    goal_dist = self.goal_distances[state as usize];
                }
            }
            new_init_distances[new_state] = init_dist;
            new_goal_distances[new_state] = goal_dist;
        }

        let old_transitions = std::mem::take(&mut self.transitions_by_op);
        self.transitions_by_op = old_transitions
            .into_iter()
            .map(|transitions| {
                let mut new_transitions = Vec::with_capacity(transitions.len());
                for t in transitions {
                    let src = mapping[t.src as usize];
                    let target = mapping[t.target as usize];
                    if src != PRUNED && target != PRUNED {
                        new_transitions.push(AbstractTransition { src, target });
                    }
                }
                new_transitions
            })
            .collect();

        self.num_states = new_num_states;
        self.init_distances = new_init_distances;
        self.goal_distances = new_goal_distances;
        self.init_state = mapping[self.init_state as usize];
        if self.init_state == PRUNED {
            debug!("initial state pruned; abstraction is unsolvable");
        }

        self.map.apply_mapping(&mapping);

        if self.init_state != PRUNED && must_recompute {
            debug!("shrinking was not distance-preserving; recomputing");
            self.compute_distances(rng);
        }
    }

    /// Shrinks the abstraction to at most `threshold` states, pruning all
    /// unreachable and irrelevant states along the way. Does nothing if the
    /// abstraction already fits, unless `force` is set (then it only
    /// prunes).
    pub(crate) fn shrink(
        &mut self,
        threshold: usize,
        strategy: ShrinkStrategy,
        force: bool,
        rng: &mut StdRng,
    ) {
        debug_assert!(threshold >= 1);
        debug_assert!(self.is_solvable());

        if self.size() > threshold {
            debug!(
                from = self.size(),
                to = threshold,
                %strategy,
                "shrinking abstraction"
            );
        } else if !force {
            return;
        }

        let collapsed_groups = if strategy == ShrinkStrategy::Dfp {
            self.collapse_dfp(threshold)
        } else {
            let buckets = self.partition_into_buckets(strategy);
            self.collapse_buckets(buckets, threshold, rng)
        };
        debug_assert!(collapsed_groups.len() <= threshold);

        self.apply_abstraction(collapsed_groups, rng);
        debug_assert!(self.size() <= threshold);
    }

    pub(crate) fn varset(&self) -> &[usize] {
        &self.varset
    }

    pub(crate) fn relevant_operators(&self) -> &[usize] {
        &self.relevant_operators
    }

    pub(crate) fn log_statistics(&self, task: &Task) {
        let total_transitions: usize = self.transitions_by_op.iter().map(|t| t.len()).sum();
        info!(
            vars = self.varset.len(),
            total_vars = task.num_variables(),
            states = self.size(),
            transitions = total_transitions,
            solvable = self.is_solvable(),
            init_h = self.init_h(),
            max_f = self.max_f,
            "abstraction"
        );
    }
}

/// Deterministic generator for the places that only use randomness under
/// the random strategies.
pub(crate) fn seeded_rng() -> StdRng {
    use rand::SeedableRng;
    StdRng::seed_from_u64(2011)
}
