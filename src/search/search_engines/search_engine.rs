use crate::search::{
    search_engines::{
        EagerBestFirstSearch, EnforcedHillClimbingSearch, IteratedSearch, PreferredUsage,
    },
    ConfigError, Plan, SearchStatistics, SharedHeuristic, SuccessorGenerator, Task,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    /// A plan was found
    Solved(Plan),
    /// The reachable state space holds no solution
    ProvablyUnsolvable,
    /// The engine gave up without a proof (incomplete search)
    IncompleteUnsolvable,
}

pub trait SearchEngine {
    fn search(
        &mut self,
        task: &Task,
        generator: &dyn SuccessorGenerator,
    ) -> (SearchResult, SearchStatistics);
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[clap(rename_all = "kebab-case")]
pub enum SearchEngineName {
    #[clap(help = "Eager greedy best-first search (f = h)")]
    Greedy,
    #[clap(help = "A* (f = g + h, reopening enabled)")]
    Astar,
    #[clap(help = "Weighted A* (f = g + w*h, reopening enabled)")]
    Wastar,
    #[clap(help = "Enforced hill climbing")]
    Ehc,
    #[clap(help = "Weighted A* phases with decreasing weights")]
    Iterated,
}

impl SearchEngineName {
    pub fn create(
        &self,
        heuristics: Vec<SharedHeuristic>,
        preferred: Vec<SharedHeuristic>,
        weight: i32,
        preferred_usage: PreferredUsage,
    ) -> Result<Box<dyn SearchEngine>, ConfigError> {
        match self {
            SearchEngineName::Greedy => Ok(Box::new(EagerBestFirstSearch::greedy(
                heuristics, preferred,
            )?)),
            SearchEngineName::Astar => {
                if heuristics.len() > 1 {
                    return Err(ConfigError::TooManyHeuristics { engine: "A*" });
                }
                let heuristic = heuristics.into_iter().next().ok_or(ConfigError::NoHeuristic)?;
                Ok(Box::new(EagerBestFirstSearch::astar(heuristic)))
            }
            SearchEngineName::Wastar => Ok(Box::new(EagerBestFirstSearch::weighted_astar(
                heuristics, preferred, weight,
            )?)),
            SearchEngineName::Ehc => {
                if heuristics.len() > 1 {
                    return Err(ConfigError::TooManyHeuristics {
                        engine: "enforced hill climbing",
                    });
                }
                let heuristic = heuristics.into_iter().next().ok_or(ConfigError::NoHeuristic)?;
                Ok(Box::new(EnforcedHillClimbingSearch::new(
                    heuristic,
                    preferred,
                    preferred_usage,
                    false,
                )))
            }
            SearchEngineName::Iterated => {
                // Anytime configuration: repeat weighted A* with shrinking
                // weights, keeping the best plan found.
                let start = weight.max(1);
                let mut phases: Vec<Box<dyn SearchEngine>> = Vec::new();
                let mut last = i32::MAX;
                for w in [start, (start + 1) / 2, 2, 1] {
                    if w < last {
                        phases.push(Box::new(EagerBestFirstSearch::weighted_astar(
                            heuristics.clone(),
                            preferred.clone(),
                            w,
                        )?));
                        last = w;
                    }
                }
                Ok(Box::new(IteratedSearch::new(phases, false, false, true)))
            }
        }
    }
}
