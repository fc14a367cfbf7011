use clap::Parser;
use sasplan::parsers::parse_task;
use sasplan::search::{
    heuristics::HeuristicName,
    search_engines::{PreferredUsage, SearchEngine, SearchEngineName, SearchResult},
    successor_generators::SuccessorGeneratorName,
    ConfigError, HeuristicSlot, SharedHeuristic, Task, Verbosity,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version)]
/// Run the sasplan planner on a translated task file.
struct Args {
    #[arg(help = "The translated task file")]
    task: PathBuf,
    #[arg(
        value_enum,
        help = "The search algorithm to use",
        short = 's',
        long = "search",
        id = "SEARCH"
    )]
    search_engine_name: SearchEngineName,
    #[arg(
        value_enum,
        help = "The heuristic evaluator(s) to use",
        short = 'e',
        long = "heuristic",
        id = "HEURISTIC",
        required = true,
        num_args = 1..
    )]
    heuristic_names: Vec<HeuristicName>,
    #[arg(
        value_enum,
        help = "Heuristics whose preferred operators bias the search. A \
        name also given to --heuristic shares its evaluator.",
        short = 'p',
        long = "preferred",
        id = "PREFERRED"
    )]
    preferred_names: Vec<HeuristicName>,
    #[arg(
        value_enum,
        help = "How enforced hill climbing treats preferred operators",
        long = "preferred-usage",
        id = "USAGE",
        default_value_t = PreferredUsage::PruneByPreferred
    )]
    preferred_usage: PreferredUsage,
    #[arg(
        help = "The weight for weighted A*",
        short = 'w',
        long = "weight",
        id = "WEIGHT",
        default_value_t = 5
    )]
    weight: i32,
    #[arg(
        value_enum,
        help = "The successor generator to use",
        short = 'g',
        long = "generator",
        id = "GENERATOR",
        default_value_t = SuccessorGeneratorName::DecisionTree
    )]
    successor_generator_name: SuccessorGeneratorName,
    #[arg(
        help = "Cache heuristic results per state",
        long = "cache-evaluations"
    )]
    cache_evaluations: bool,
    #[arg(
        value_enum,
        help = "The verbosity level",
        short = 'v',
        long = "verbosity",
        id = "VERBOSITY",
        default_value_t = Verbosity::Normal
    )]
    verbosity: Verbosity,
    #[arg(help = "Whether to use coloured output", short = 'c', long = "colour")]
    colour: bool,
}

/// Builds the heuristic slots and the search engine. A slot is shared
/// between the scoring and the preferred-operator roles when the same name
/// appears in both lists.
fn build_engine(args: &Args, task: &Task) -> Result<Box<dyn SearchEngine>, ConfigError> {
    let mut slots: HashMap<String, SharedHeuristic> = HashMap::new();
    let mut make_slot = |name: HeuristicName| -> Result<SharedHeuristic, ConfigError> {
        let key = format!("{name:?}");
        if let Some(slot) = slots.get(&key) {
            return Ok(slot.clone());
        }
        let mut slot = HeuristicSlot::new(name.create(task)?);
        if args.cache_evaluations {
            slot = slot.with_result_cache();
        }
        let shared = slot.shared();
        slots.insert(key, shared.clone());
        Ok(shared)
    };

    let mut heuristics = Vec::new();
    for &name in &args.heuristic_names {
        heuristics.push(make_slot(name)?);
    }
    let mut preferred = Vec::new();
    for &name in &args.preferred_names {
        preferred.push(make_slot(name)?);
    }
    args.search_engine_name
        .create(heuristics, preferred, args.weight, args.preferred_usage)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level: tracing::Level = args.verbosity.into();
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(args.colour)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let text = match std::fs::read_to_string(&args.task) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("cannot read {}: {error}", args.task.display());
            return ExitCode::from(2);
        }
    };
    let task = match parse_task(&text) {
        Ok(task) => task,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::from(2);
        }
    };

    let mut engine = match build_engine(&args, &task) {
        Ok(engine) => engine,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::from(2);
        }
    };

    let generator = args.successor_generator_name.create(&task);
    let (result, statistics) = engine.search(&task, generator.as_ref());

    match result {
        SearchResult::Solved(plan) => {
            println!("{}", plan.to_string(&task));
            println!("; cost = {} (unit cost)", plan.cost(&task));
            println!(
                "; expanded = {}, evaluated = {}, generated = {}, reopened = {}",
                statistics.expanded(),
                statistics.evaluated(),
                statistics.generated(),
                statistics.reopened(),
            );
            println!(
                "; search time = {}",
                humantime::format_duration(statistics.search_duration())
            );
            ExitCode::SUCCESS
        }
        SearchResult::ProvablyUnsolvable | SearchResult::IncompleteUnsolvable => {
            println!("; no solution: {result:?}");
            ExitCode::from(1)
        }
    }
}
