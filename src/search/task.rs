use crate::search::{
    successor_generators::GeneratorNode, AxiomEvaluator, CausalGraph, DomainTransitionGraph, Goal,
    State,
};
use smallvec::SmallVec;

/// A state variable with a finite domain `0..domain_size`.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub domain_size: usize,
    /// Axiom layer of the variable, or -1 if the variable is not derived.
    pub axiom_layer: i32,
}

impl Variable {
    pub fn is_derived(&self) -> bool {
        self.axiom_layer != -1
    }
}

/// A (variable, required value) pair, used for prevail conditions, effect
/// conditions and goal atoms alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Condition {
    pub var: usize,
    pub value: usize,
}

impl Condition {
    pub fn is_satisfied(&self, state: &State) -> bool {
        state[self.var] == self.value
    }
}

/// A pre/post entry of an operator: the affected variable, the required old
/// value (-1 for "any"), the new value, and the effect conditions that must
/// additionally hold for the effect to fire.
#[derive(Debug, Clone)]
pub struct PrePost {
    pub var: usize,
    pub pre: i32,
    pub post: usize,
    pub conditions: SmallVec<[Condition; 2]>,
}

impl PrePost {
    /// Whether this effect fires in `state`, i.e. its effect conditions hold.
    /// The `pre` value is an applicability requirement checked separately.
    pub fn fires(&self, state: &State) -> bool {
        self.conditions.iter().all(|c| c.is_satisfied(state))
    }
}

/// A ground operator (or axiom rule). Operators are identified by their
/// position in the task's operator list.
#[derive(Debug, Clone)]
pub struct Operator {
    id: usize,
    name: String,
    prevail: Vec<Condition>,
    pre_post: Vec<PrePost>,
    is_axiom: bool,
}

impl Operator {
    pub fn new(
        id: usize,
        name: String,
        prevail: Vec<Condition>,
        pre_post: Vec<PrePost>,
        is_axiom: bool,
    ) -> Self {
        Self {
            id,
            name,
            prevail,
            pre_post,
            is_axiom,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prevail(&self) -> &[Condition] {
        &self.prevail
    }

    pub fn pre_post(&self) -> &[PrePost] {
        &self.pre_post
    }

    pub fn is_axiom(&self) -> bool {
        self.is_axiom
    }

    /// Unit action cost: 1 for operators, 0 for axioms. The cost field of the
    /// input format is advisory and ignored by the engine.
    pub fn cost(&self) -> i32 {
        if self.is_axiom {
            0
        } else {
            1
        }
    }

    pub fn is_applicable(&self, state: &State) -> bool {
        self.prevail.iter().all(|c| c.is_satisfied(state))
            && self
                .pre_post
                .iter()
                .all(|e| e.pre == -1 || state[e.var] == e.pre as usize)
    }
}

/// The immutable task model: variables, initial state, goal, operators,
/// axioms, and the derived structures read from the same input stream
/// (causal graph, successor generator tree, domain transition graphs).
///
/// The task is read-only for the whole run; every component borrows it.
#[derive(Debug)]
pub struct Task {
    pub variables: Vec<Variable>,
    pub initial_state: State,
    pub goal: Goal,
    pub operators: Vec<Operator>,
    pub axioms: Vec<Operator>,
    /// Whether the input declared non-unit action costs. Advisory only; the
    /// engine assumes unit cost throughout.
    pub uses_metric: bool,
    pub causal_graph: CausalGraph,
    pub axiom_evaluator: AxiomEvaluator,
    pub successor_tree: GeneratorNode,
    pub dtgs: Vec<DomainTransitionGraph>,
}

impl Task {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn domain_size(&self, var: usize) -> usize {
        self.variables[var].domain_size
    }

    /// Whether the task has any axioms or any operator with non-redundant
    /// effect conditions. Heuristics that cannot handle these reject the
    /// task at construction time.
    pub fn has_axioms(&self) -> bool {
        !self.axioms.is_empty()
    }

    pub fn has_conditional_effects(&self) -> bool {
        self.operators.iter().any(|op| {
            op.pre_post().iter().any(|e| {
                if e.conditions.is_empty() {
                    return false;
                }
                // A self-referential condition on a binary variable is
                // redundant and accepted; anything else counts.
                !(e.pre == -1
                    && e.conditions.len() == 1
                    && e.conditions[0].var == e.var
                    && e.conditions[0].value != e.post
                    && self.variables[e.var].domain_size == 2)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn trivial_task_shape() {
        let task = parse_fixture(TRIVIAL_TASK_TEXT);

        assert_eq!(task.num_variables(), 1);
        assert_eq!(task.variables[0].name, "switch");
        assert_eq!(task.domain_size(0), 2);
        assert_eq!(task.initial_state[0], 0);
        assert_eq!(task.goal.conditions().len(), 1);
        assert_eq!(task.operators.len(), 1);
        assert_eq!(task.operators[0].name(), "flip");
        assert!(task.axioms.is_empty());
        assert!(!task.uses_metric);
    }

    #[test]
    fn operator_applicability() {
        let task = parse_fixture(TRIVIAL_TASK_TEXT);
        let flip = &task.operators[0];

        assert!(flip.is_applicable(&task.initial_state));
        let successor = task.initial_state.successor(flip, &task);
        assert!(!flip.is_applicable(&successor));
        assert_eq!(flip.cost(), 1);
    }

    #[test]
    fn derived_variables_are_flagged() {
        let task = parse_fixture(AXIOM_TASK_TEXT);

        assert!(!task.variables[0].is_derived());
        assert!(task.variables[1].is_derived());
        assert!(task.has_axioms());
    }
}
