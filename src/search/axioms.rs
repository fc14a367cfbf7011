use crate::search::{Condition, Operator, State, Variable};

/// A flattened axiom rule: the conjunctive condition (prevails, the pre
/// value if any, and effect conditions) and the derived fact it sets.
#[derive(Debug, Clone)]
struct AxiomRule {
    conditions: Vec<Condition>,
    var: usize,
    value: usize,
}

/// Evaluates the derived variables of a state to a fixpoint.
///
/// Derived variables are first reset to their default values (their values
/// in the initial state), then the rules are applied layer by layer until no
/// rule changes the state anymore. Axioms never fire across layers: a rule
/// belongs to the layer of the variable it derives.
#[derive(Debug)]
pub struct AxiomEvaluator {
    layers: Vec<Vec<AxiomRule>>,
    /// Default value per variable; only the entries of derived variables are
    /// used.
    defaults: Vec<usize>,
    derived: Vec<bool>,
}

impl AxiomEvaluator {
    pub fn new(variables: &[Variable], axioms: &[Operator], initial_state: &State) -> Self {
        let num_layers = variables
            .iter()
            .map(|v| (v.axiom_layer + 1) as usize)
            .max()
            .unwrap_or(0);
        let mut layers = vec![Vec::new(); num_layers];

        for axiom in axioms {
            debug_assert!(axiom.is_axiom());
            for effect in axiom.pre_post() {
                let mut conditions: Vec<Condition> = axiom.prevail().to_vec();
                if effect.pre != -1 {
                    conditions.push(Condition {
                        var: effect.var,
                        value: effect.pre as usize,
                    });
                }
                conditions.extend(effect.conditions.iter().copied());

                let layer = variables[effect.var].axiom_layer;
                debug_assert!(layer >= 0, "axiom affects a non-derived variable");
                layers[layer as usize].push(AxiomRule {
                    conditions,
                    var: effect.var,
                    value: effect.post,
                });
            }
        }

        Self {
            layers,
            defaults: initial_state.values().to_vec(),
            derived: variables.iter().map(|v| v.is_derived()).collect(),
        }
    }

    /// Recomputes all derived variables of `state` in place.
    pub fn evaluate(&self, state: &mut State) {
        if self.layers.is_empty() {
            return;
        }

        for (var, &is_derived) in self.derived.iter().enumerate() {
            if is_derived {
                state.set(var, self.defaults[var]);
            }
        }

        for layer in &self.layers {
            loop {
                let mut changed = false;
                for rule in layer {
                    if state[rule.var] != rule.value
                        && rule.conditions.iter().all(|c| c.is_satisfied(state))
                    {
                        state.set(rule.var, rule.value);
                        changed = true;
                    }
                }
                if !changed {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn derived_variable_follows_its_rule() {
        let task = parse_fixture(AXIOM_TASK_TEXT);
        let mut state = task.initial_state.clone();

        state.set(0, 1);
        task.axiom_evaluator.evaluate(&mut state);
        assert_eq!(state[1], 1);
    }

    #[test]
    fn derived_variable_resets_to_default() {
        let task = parse_fixture(AXIOM_TASK_TEXT);

        // Start from a state where the derived variable is stale.
        let mut state = State::new(vec![0, 1]);
        task.axiom_evaluator.evaluate(&mut state);
        assert_eq!(state[1], 0, "stale derived value must not survive");
    }

    #[test]
    fn no_axioms_is_a_no_op() {
        let task = parse_fixture(TRIVIAL_TASK_TEXT);
        let mut state = task.initial_state.clone();
        task.axiom_evaluator.evaluate(&mut state);
        assert_eq!(state, task.initial_state);
    }
}
