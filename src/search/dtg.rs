/// A prevail condition of a transition label, expressed in the DTG's local
/// child numbering. The global variable is
/// `dtg.local_to_global_child[local_var]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCondition {
    pub local_var: usize,
    pub value: usize,
}

/// One label of a value transition: the operator (or axiom) causing it and
/// the flat, deduplicated prevail conditions under which it applies.
#[derive(Debug, Clone)]
pub struct TransitionLabel {
    /// Index into the task's operator list, or the axiom list if the DTG's
    /// variable is derived.
    pub op: usize,
    pub prevail: Vec<LocalCondition>,
}

/// A directed edge between two values of the variable, carrying one or more
/// labels.
#[derive(Debug, Clone)]
pub struct ValueTransition {
    pub target: usize,
    pub labels: Vec<TransitionLabel>,
}

#[derive(Debug, Clone, Default)]
pub struct ValueNode {
    pub transitions: Vec<ValueTransition>,
}

/// Identifies one label within a DTG by the node it leaves, the transition
/// index at that node, and the label index on that transition. This replaces
/// the pointer chains of the original representation with arena indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRef {
    pub node: usize,
    pub transition: usize,
    pub label: usize,
}

/// The domain transition graph of one variable: per-value nodes whose edges
/// describe how operators move the variable between values. Axiom DTGs treat
/// edges as zero-cost, all others as unit-cost.
#[derive(Debug, Clone)]
pub struct DomainTransitionGraph {
    pub var: usize,
    pub is_axiom: bool,
    pub nodes: Vec<ValueNode>,
    /// The global variables referenced by any prevail condition in this
    /// graph, in local numbering order.
    pub local_to_global_child: Vec<usize>,
}

impl DomainTransitionGraph {
    /// Assembles a DTG from raw per-value transitions whose prevail
    /// conditions still use global variable ids. Duplicated prevail pairs
    /// are dropped and the local child numbering is computed here.
    pub fn new(
        var: usize,
        is_axiom: bool,
        domain_size: usize,
        raw_transitions: Vec<Vec<(usize, usize, Vec<(usize, usize)>)>>,
    ) -> Self {
        let mut local_to_global_child = Vec::new();
        let mut local_index = |global: usize, table: &mut Vec<usize>| -> usize {
            match table.iter().position(|&v| v == global) {
                Some(index) => index,
                None => {
                    table.push(global);
                    table.len() - 1
                }
            }
        };

        let mut nodes = vec![ValueNode::default(); domain_size];
        for (value, transitions) in raw_transitions.into_iter().enumerate() {
            for (target, op, prevail) in transitions {
                let mut local_prevail: Vec<LocalCondition> = Vec::with_capacity(prevail.len());
                for (global_var, required) in prevail {
                    let condition = LocalCondition {
                        local_var: local_index(global_var, &mut local_to_global_child),
                        value: required,
                    };
                    if !local_prevail.contains(&condition) {
                        local_prevail.push(condition);
                    }
                }

                let node = &mut nodes[value];
                match node.transitions.iter_mut().find(|t| t.target == target) {
                    Some(transition) => transition.labels.push(TransitionLabel {
                        op,
                        prevail: local_prevail,
                    }),
                    None => node.transitions.push(ValueTransition {
                        target,
                        labels: vec![TransitionLabel {
                            op,
                            prevail: local_prevail,
                        }],
                    }),
                }
            }
        }

        Self {
            var,
            is_axiom,
            nodes,
            local_to_global_child,
        }
    }

    pub fn num_values(&self) -> usize {
        self.nodes.len()
    }

    pub fn label(&self, label_ref: LabelRef) -> &TransitionLabel {
        &self.nodes[label_ref.node].transitions[label_ref.transition].labels[label_ref.label]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn prevail_conditions_are_localized_and_deduped() {
        let dtg = DomainTransitionGraph::new(
            0,
            false,
            2,
            vec![
                vec![(1, 0, vec![(2, 1), (3, 0), (2, 1)])],
                vec![],
            ],
        );

        assert_eq!(dtg.local_to_global_child, vec![2, 3]);
        let label = &dtg.nodes[0].transitions[0].labels[0];
        assert_eq!(
            label.prevail,
            vec![
                LocalCondition {
                    local_var: 0,
                    value: 1
                },
                LocalCondition {
                    local_var: 1,
                    value: 0
                },
            ]
        );
    }

    #[test]
    fn parallel_labels_share_one_edge() {
        let dtg = DomainTransitionGraph::new(
            0,
            false,
            2,
            vec![vec![(1, 0, vec![]), (1, 1, vec![])], vec![]],
        );

        assert_eq!(dtg.nodes[0].transitions.len(), 1);
        assert_eq!(dtg.nodes[0].transitions[0].labels.len(), 2);
    }

    #[test]
    fn every_pre_post_has_a_dtg_edge() {
        let task = parse_fixture(REOPENING_TASK_TEXT);

        for op in &task.operators {
            for effect in op.pre_post() {
                if effect.pre == -1 || effect.pre as usize == effect.post {
                    continue;
                }
                let dtg = &task.dtgs[effect.var];
                let node = &dtg.nodes[effect.pre as usize];
                let edge = node
                    .transitions
                    .iter()
                    .find(|t| t.target == effect.post)
                    .expect("missing DTG edge for pre/post entry");
                assert!(edge.labels.iter().any(|l| l.op == op.id()));
            }
        }
    }
}
