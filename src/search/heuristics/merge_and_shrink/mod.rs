//! The merge-and-shrink abstraction heuristic: iteratively compose atomic
//! projections into a product abstraction, shrinking it to a bounded size
//! between merges. Admissible under unit cost; dead-end reports are
//! reliable.

pub(crate) mod abstraction;
mod variable_order;

use crate::search::{heuristics::Heuristic, ConfigError, State, Task};
use abstraction::{seeded_rng, Abstraction};
use rand::rngs::StdRng;
use std::collections::HashMap;
use tracing::info;
use variable_order::VariableOrderFinder;

#[derive(clap::ValueEnum, strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MergeStrategy {
    #[clap(help = "Linear: causal predecessors of goals first, by level")]
    LinearCgGoalLevel,
    #[clap(help = "Linear: causal predecessors of goals first, random ties")]
    LinearCgGoalRandom,
    #[clap(help = "Linear: goal variables first, by level")]
    LinearGoalCgLevel,
    #[clap(help = "Linear: random order")]
    LinearRandom,
}

#[derive(
    clap::ValueEnum, strum_macros::Display, strum_macros::EnumIter, Debug, Clone, Copy, PartialEq, Eq,
)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ShrinkStrategy {
    #[clap(help = "Collapse high-f states first, low h first within a level")]
    HighFLowH,
    #[clap(help = "Collapse low-f states first, low h first within a level")]
    LowFLowH,
    #[clap(help = "Collapse high-f states first, high h first within a level")]
    HighFHighH,
    #[clap(help = "Collapse random states")]
    Random,
    #[clap(help = "Signature-based refinement (Draeger/Finkbeiner/Podelski)")]
    Dfp,
}

#[derive(Debug, Clone)]
pub struct MergeAndShrinkConfig {
    pub max_abstract_states: usize,
    /// When set, the size bound budgets the product: the accumulated and
    /// the atomic abstraction share it in a balanced (square-root) split.
    pub bound_is_for_product: bool,
    pub abstraction_count: usize,
    pub merge_strategy: MergeStrategy,
    pub shrink_strategy: ShrinkStrategy,
    pub simplify_labels: bool,
}

impl Default for MergeAndShrinkConfig {
    fn default() -> Self {
        Self {
            max_abstract_states: 1000,
            bound_is_for_product: true,
            abstraction_count: 1,
            merge_strategy: MergeStrategy::LinearCgGoalLevel,
            shrink_strategy: ShrinkStrategy::HighFLowH,
            simplify_labels: true,
        }
    }
}

#[derive(Debug)]
pub struct MergeAndShrinkHeuristic {
    abstractions: Vec<Abstraction>,
}

impl MergeAndShrinkHeuristic {
    pub fn new(task: &Task, config: MergeAndShrinkConfig) -> Result<Self, ConfigError> {
        const NAME: &str = "merge-and-shrink heuristic";
        if config.max_abstract_states < 1 {
            return Err(ConfigError::AbstractionSizeTooSmall(
                config.max_abstract_states,
            ));
        }
        if task.has_axioms() {
            return Err(ConfigError::AxiomsUnsupported { heuristic: NAME });
        }
        if task.has_conditional_effects() {
            return Err(ConfigError::ConditionalEffectsUnsupported { heuristic: NAME });
        }

        info!(
            max_abstract_states = config.max_abstract_states,
            merge_strategy = %config.merge_strategy,
            shrink_strategy = %config.shrink_strategy,
            "initializing merge-and-shrink heuristic"
        );

        let mut rng = seeded_rng();
        let mut abstractions = Vec::with_capacity(config.abstraction_count);
        for i in 0..config.abstraction_count {
            let abstraction = Self::build_abstraction(task, &config, i == 0, &mut rng)?;
            abstraction.log_statistics(task);
            let solvable = abstraction.is_solvable();
            abstractions.push(abstraction);
            if !solvable {
                break;
            }
        }

        Ok(Self { abstractions })
    }

    fn build_abstraction(
        task: &Task,
        config: &MergeAndShrinkConfig,
        is_first: bool,
        rng: &mut StdRng,
    ) -> Result<Abstraction, ConfigError> {
        let mut atomics: Vec<Option<Abstraction>> = Abstraction::build_atomic(task)
            .into_iter()
            .map(Some)
            .collect();
        let threshold = config.max_abstract_states;

        let mut order = VariableOrderFinder::new(task, config.merge_strategy, is_first, rng);
        let first_var = order.next(task, rng);
        let mut abstraction = atomics[first_var]
            .take()
            .expect("every variable is merged at most once");

        while !order.done() && abstraction.is_solvable() {
            let var_no = order.next(task, rng);
            let mut atomic = atomics[var_no]
                .take()
                .expect("every variable is merged at most once");

            let (max_allowed_size, atomic_target_size) = if config.bound_is_for_product {
                let balanced_size = (threshold as f64).sqrt() as usize;
                let atomic_target = atomic.size().min(balanced_size.max(1));
                (threshold / atomic_target.max(1), atomic_target)
            } else {
                (threshold, atomic.size().min(threshold))
            };

            if atomic_target_size != atomic.size() {
                info!("atomic abstraction too big; must shrink");
                atomic.shrink(atomic_target_size, config.shrink_strategy, false, rng);
            }
            if abstraction.size() > max_allowed_size {
                abstraction.shrink(max_allowed_size, config.shrink_strategy, false, rng);
            }

            let label_map = if config.simplify_labels {
                Some(canonical_label_map(
                    task,
                    abstraction.relevant_operators(),
                    abstraction.varset(),
                ))
            } else {
                None
            };
            abstraction = Abstraction::product(
                abstraction,
                atomic,
                label_map.as_ref(),
                config.simplify_labels,
                rng,
            )?;
        }
        Ok(abstraction)
    }
}

/// Canonical representative per operator, where two operators are
/// equivalent iff they behave identically on every variable outside the
/// abstraction's varset. Such operators keep inducing identical
/// transitions in everything merged in later, so their labels can share
/// one bucket. Only correct for orthogonal merges, which the product
/// construction enforces.
fn canonical_label_map(
    task: &Task,
    relevant_operators: &[usize],
    varset: &[usize],
) -> HashMap<usize, usize> {
    let mut inside = vec![false; task.num_variables()];
    for &var in varset {
        inside[var] = true;
    }

    let mut canonical_by_signature: HashMap<Vec<(usize, i32, i32)>, usize> = HashMap::new();
    let mut label_map = HashMap::with_capacity(relevant_operators.len());
    for &op_no in relevant_operators {
        let op = &task.operators[op_no];
        let mut signature: Vec<(usize, i32, i32)> = Vec::new();
        for c in op.prevail() {
            if !inside[c.var] {
                signature.push((c.var, c.value as i32, c.value as i32));
            }
        }
        for e in op.pre_post() {
            if !inside[e.var] {
                signature.push((e.var, e.pre, e.post as i32));
            }
        }
        signature.sort_unstable();
        let canonical = *canonical_by_signature.entry(signature).or_insert(op_no);
        label_map.insert(op_no, canonical);
    }
    label_map
}

impl Heuristic for MergeAndShrinkHeuristic {
    fn compute(&mut self, state: &State, task: &Task, _preferred: &mut Vec<usize>) -> Option<i32> {
        let mut cost = 0;
        for abstraction in &self.abstractions {
            cost = cost.max(abstraction.cost(state)?);
        }
        if cost == 0 && !task.goal.is_satisfied(state) {
            // Aggressive shrinking can map non-goal states onto goal
            // states; keep the estimate positive for them.
            cost = 1;
        }
        Some(cost)
    }
}
