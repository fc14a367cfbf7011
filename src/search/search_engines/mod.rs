mod eager;
mod enforced_hill_climbing;
mod iterated;
mod search_engine;

pub use eager::EagerBestFirstSearch;
pub use enforced_hill_climbing::{EnforcedHillClimbingSearch, PreferredUsage};
pub use iterated::IteratedSearch;
pub use search_engine::{SearchEngine, SearchEngineName, SearchResult};
