use crate::parsers::{
    tokens::{magic, name_line, token_i32, token_usize, token_word},
    ParseError,
};
use crate::search::{
    successor_generators::GeneratorNode, AxiomEvaluator, CausalGraph, Condition,
    DomainTransitionGraph, Goal, Operator, PrePost, State, Task, Variable,
};
use nom::{character::complete::multispace0, IResult};
use smallvec::SmallVec;

/// Parses a complete task from the input text. Structural errors surface as
/// [`ParseError::Malformed`] with the offending context, range violations as
/// [`ParseError::Invalid`].
pub fn parse_task(input: &str) -> Result<Task, ParseError> {
    match task_body(input) {
        Ok((rest, task)) => {
            let (rest, _) = multispace0::<_, nom::error::Error<&str>>(rest)
                .map_err(|_| ParseError::from_remaining(rest))?;
            if !rest.is_empty() {
                return Err(ParseError::from_remaining(rest));
            }
            validate(&task)?;
            Ok(task)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(ParseError::from_remaining(e.input))
        }
        Err(nom::Err::Incomplete(_)) => Err(ParseError::Malformed {
            context: "unexpected end of input".to_string(),
        }),
    }
}

fn task_body(input: &str) -> IResult<&str, Task> {
    let (input, metric) = token_i32(input)?;

    let (input, variables) = variables_section(input)?;
    let domains: Vec<usize> = variables.iter().map(|v| v.domain_size).collect();

    let (input, initial_values) = state_section(input, variables.len())?;
    let (input, goal) = goal_section(input)?;
    let (input, operators) = operators_section(input)?;
    let (input, axioms) = axioms_section(input, operators.len())?;
    let (input, causal_graph) = causal_graph_section(input, variables.len())?;
    let (input, successor_tree) = successor_generator_section(input, &domains)?;
    let (input, dtgs) = dtg_sections(input, &variables)?;

    let mut initial_state = State::new(initial_values);
    let axiom_evaluator = AxiomEvaluator::new(&variables, &axioms, &initial_state);
    axiom_evaluator.evaluate(&mut initial_state);

    Ok((
        input,
        Task {
            variables,
            initial_state,
            goal,
            operators,
            axioms,
            uses_metric: metric != 0,
            causal_graph,
            axiom_evaluator,
            successor_tree,
            dtgs,
        },
    ))
}

fn variables_section(input: &str) -> IResult<&str, Vec<Variable>> {
    let (input, _) = magic("begin_variables")(input)?;
    let (mut input, count) = token_usize(input)?;
    let mut variables = Vec::with_capacity(count);
    for _ in 0..count {
        let (rest, name) = token_word(input)?;
        let (rest, domain_size) = token_usize(rest)?;
        let (rest, axiom_layer) = token_i32(rest)?;
        variables.push(Variable {
            name: name.to_string(),
            domain_size,
            axiom_layer,
        });
        input = rest;
    }
    let (input, _) = magic("end_variables")(input)?;
    Ok((input, variables))
}

fn state_section(input: &str, num_variables: usize) -> IResult<&str, Vec<usize>> {
    let (mut input, _) = magic("begin_state")(input)?;
    let mut values = Vec::with_capacity(num_variables);
    for _ in 0..num_variables {
        let (rest, value) = token_usize(input)?;
        values.push(value);
        input = rest;
    }
    let (input, _) = magic("end_state")(input)?;
    Ok((input, values))
}

fn condition(input: &str) -> IResult<&str, Condition> {
    let (input, var) = token_usize(input)?;
    let (input, value) = token_usize(input)?;
    Ok((input, Condition { var, value }))
}

fn goal_section(input: &str) -> IResult<&str, Goal> {
    let (input, _) = magic("begin_goal")(input)?;
    let (mut input, count) = token_usize(input)?;
    let mut conditions = Vec::with_capacity(count);
    for _ in 0..count {
        let (rest, c) = condition(input)?;
        conditions.push(c);
        input = rest;
    }
    let (input, _) = magic("end_goal")(input)?;
    Ok((input, Goal::new(conditions)))
}

fn pre_post_row(input: &str) -> IResult<&str, PrePost> {
    let (mut input, cond_count) = token_usize(input)?;
    let mut conditions = SmallVec::new();
    for _ in 0..cond_count {
        let (rest, c) = condition(input)?;
        conditions.push(c);
        input = rest;
    }
    let (input, var) = token_usize(input)?;
    let (input, pre) = token_i32(input)?;
    let (input, post) = token_usize(input)?;
    Ok((
        input,
        PrePost {
            var,
            pre,
            post,
            conditions,
        },
    ))
}

fn operator_body(input: &str) -> IResult<&str, (String, Vec<Condition>, Vec<PrePost>)> {
    let (input, name) = name_line(input)?;
    let (mut input, prevail_count) = token_usize(input)?;
    let mut prevail = Vec::with_capacity(prevail_count);
    for _ in 0..prevail_count {
        let (rest, c) = condition(input)?;
        prevail.push(c);
        input = rest;
    }
    let (mut input, pre_post_count) = token_usize(input)?;
    let mut pre_post = Vec::with_capacity(pre_post_count);
    for _ in 0..pre_post_count {
        let (rest, row) = pre_post_row(input)?;
        pre_post.push(row);
        input = rest;
    }
    Ok((input, (name.to_string(), prevail, pre_post)))
}

fn operators_section(input: &str) -> IResult<&str, Vec<Operator>> {
    let (mut input, count) = token_usize(input)?;
    let mut operators = Vec::with_capacity(count);
    for id in 0..count {
        let (rest, _) = magic("begin_operator")(input)?;
        let (rest, (name, prevail, pre_post)) = operator_body(rest)?;
        // The cost field is advisory; the engine uses unit cost.
        let (rest, _cost) = token_i32(rest)?;
        let (rest, _) = magic("end_operator")(rest)?;
        operators.push(Operator::new(id, name, prevail, pre_post, false));
        input = rest;
    }
    Ok((input, operators))
}

fn axioms_section(input: &str, _num_operators: usize) -> IResult<&str, Vec<Operator>> {
    let (mut input, count) = token_usize(input)?;
    let mut axioms = Vec::with_capacity(count);
    for id in 0..count {
        let (rest, _) = magic("begin_axiom")(input)?;
        let (rest, (name, prevail, pre_post)) = operator_body(rest)?;
        let (rest, _) = magic("end_axiom")(rest)?;
        axioms.push(Operator::new(id, name, prevail, pre_post, true));
        input = rest;
    }
    Ok((input, axioms))
}

fn causal_graph_section(input: &str, num_variables: usize) -> IResult<&str, CausalGraph> {
    let (mut input, _) = magic("begin_CG")(input)?;
    let mut arcs = Vec::with_capacity(num_variables);
    for _ in 0..num_variables {
        let (rest, count) = token_usize(input)?;
        let mut successors = Vec::with_capacity(count);
        input = rest;
        for _ in 0..count {
            let (rest, to) = token_usize(input)?;
            let (rest, weight) = token_i32(rest)?;
            successors.push((to, weight));
            input = rest;
        }
        arcs.push(successors);
    }
    let (input, _) = magic("end_CG")(input)?;
    Ok((input, CausalGraph::new(arcs)))
}

fn generator_node<'a>(input: &'a str, domains: &[usize]) -> IResult<&'a str, GeneratorNode> {
    let (input, word) = token_word(input)?;
    match word {
        "switch" => {
            let (input, var) = token_usize(input)?;
            let (mut input, immediate) = generator_node(input, domains)?;
            let mut value_children = Vec::with_capacity(domains[var]);
            for _ in 0..domains[var] {
                let (rest, child) = generator_node(input, domains)?;
                value_children.push(child);
                input = rest;
            }
            let (input, default_child) = generator_node(input, domains)?;
            Ok((
                input,
                GeneratorNode::Switch {
                    var,
                    immediate: Box::new(immediate),
                    value_children,
                    default_child: Box::new(default_child),
                },
            ))
        }
        "check" => {
            let (mut input, count) = token_usize(input)?;
            let mut operators = Vec::with_capacity(count);
            for _ in 0..count {
                let (rest, op) = token_usize(input)?;
                operators.push(op);
                input = rest;
            }
            Ok((input, GeneratorNode::Check(operators)))
        }
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        ))),
    }
}

fn successor_generator_section<'a>(
    input: &'a str,
    domains: &[usize],
) -> IResult<&'a str, GeneratorNode> {
    let (input, _) = magic("begin_SG")(input)?;
    let (input, root) = generator_node(input, domains)?;
    let (input, _) = magic("end_SG")(input)?;
    Ok((input, root))
}

fn dtg_sections<'a>(
    input: &'a str,
    variables: &[Variable],
) -> IResult<&'a str, Vec<DomainTransitionGraph>> {
    let mut input = input;
    let mut dtgs = Vec::with_capacity(variables.len());
    for (var, variable) in variables.iter().enumerate() {
        let (rest, _) = magic("begin_DTG")(input)?;
        input = rest;

        let mut raw_transitions = Vec::with_capacity(variable.domain_size);
        for _ in 0..variable.domain_size {
            let (rest, count) = token_usize(input)?;
            input = rest;
            let mut transitions = Vec::with_capacity(count);
            for _ in 0..count {
                let (rest, target) = token_usize(input)?;
                let (rest, op) = token_usize(rest)?;
                let (mut rest, prevail_count) = token_usize(rest)?;
                let mut prevail = Vec::with_capacity(prevail_count);
                for _ in 0..prevail_count {
                    let (r, aux_var) = token_usize(rest)?;
                    let (r, value) = token_usize(r)?;
                    prevail.push((aux_var, value));
                    rest = r;
                }
                transitions.push((target, op, prevail));
                input = rest;
            }
            raw_transitions.push(transitions);
        }

        let (rest, _) = magic("end_DTG")(input)?;
        input = rest;
        dtgs.push(DomainTransitionGraph::new(
            var,
            variable.is_derived(),
            variable.domain_size,
            raw_transitions,
        ));
    }
    Ok((input, dtgs))
}

fn validate(task: &Task) -> Result<(), ParseError> {
    let num_variables = task.num_variables();
    let check_condition = |c: &Condition, what: &str| -> Result<(), ParseError> {
        if c.var >= num_variables || c.value >= task.domain_size(c.var) {
            return Err(ParseError::Invalid(format!(
                "{what} references variable {} value {} out of range",
                c.var, c.value
            )));
        }
        Ok(())
    };

    for (var, &value) in task.initial_state.values().iter().enumerate() {
        if value >= task.domain_size(var) {
            return Err(ParseError::Invalid(format!(
                "initial value {value} out of range for variable {var}"
            )));
        }
    }
    for c in task.goal.conditions() {
        check_condition(c, "goal")?;
    }
    for op in task.operators.iter().chain(task.axioms.iter()) {
        for c in op.prevail() {
            check_condition(c, op.name())?;
        }
        for e in op.pre_post() {
            if e.var >= num_variables || e.post >= task.domain_size(e.var) {
                return Err(ParseError::Invalid(format!(
                    "effect of {} out of range",
                    op.name()
                )));
            }
            if e.pre != -1 && e.pre as usize >= task.domain_size(e.var) {
                return Err(ParseError::Invalid(format!(
                    "pre value of {} out of range",
                    op.name()
                )));
            }
            for c in &e.conditions {
                check_condition(c, op.name())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn parses_the_trivial_fixture() {
        let task = parse_task(TRIVIAL_TASK_TEXT).expect("fixture must parse");

        assert_eq!(task.num_variables(), 1);
        assert_eq!(task.operators.len(), 1);
        assert_eq!(task.goal.conditions()[0], Condition { var: 0, value: 1 });
    }

    #[test]
    fn initial_state_round_trips() {
        let task = parse_task(REOPENING_TASK_TEXT).expect("fixture must parse");
        // Variable order is preserved exactly as written.
        assert_eq!(task.initial_state.values(), &[0]);

        let task = parse_task(UNSOLVABLE_TASK_TEXT).expect("fixture must parse");
        assert_eq!(task.initial_state.values(), &[0, 0]);
    }

    #[test]
    fn operator_names_keep_spaces() {
        let task = parse_task(REOPENING_TASK_TEXT).expect("fixture must parse");
        let names: Vec<&str> = task.operators.iter().map(|op| op.name()).collect();
        assert!(names.contains(&"go a b"));
    }

    #[test]
    fn truncated_input_is_rejected() {
        let text = "0\nbegin_variables\n1\nswitch 2 -1\n";
        assert!(parse_task(text).is_err());
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let mut text = TRIVIAL_TASK_TEXT.to_string();
        text.push_str("\nunexpected");
        assert!(parse_task(&text).is_err());
    }

    #[test]
    fn out_of_range_goal_is_rejected() {
        let text = TRIVIAL_TASK_TEXT.replace("begin_goal\n1\n0 1\nend_goal", "begin_goal\n1\n0 7\nend_goal");
        assert!(matches!(parse_task(&text), Err(ParseError::Invalid(_))));
    }
}
