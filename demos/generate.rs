use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use liars_rs::cache::TruthTable;
use liars_rs::config::GenerationConfig;
use liars_rs::generate::Generator;
use liars_rs::library::Library;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of villagers.
    #[arg(value_name = "INT", default_value = "6")]
    n: usize,

    /// Minimum statements per villager.
    #[clap(long, value_name = "INT", default_value = "2")]
    min_statements: usize,

    /// Maximum statements per villager.
    #[clap(long, value_name = "INT", default_value = "2")]
    max_statements: usize,

    /// Make one truthful villager a shill.
    #[clap(long)]
    shill: bool,

    /// Require every villager to add a new kind of statement.
    #[clap(long)]
    diverse: bool,

    /// Let villagers mention themselves.
    #[clap(long)]
    self_reference: bool,

    /// Candidate bundles sampled per size and per greedy step.
    #[clap(long, value_name = "INT", default_value = "50")]
    pool_size: usize,

    /// Leave count and parity statements out.
    #[clap(long)]
    no_counts: bool,

    #[clap(long, value_name = "INT")]
    min_liars: Option<usize>,

    #[clap(long, value_name = "INT")]
    max_liars: Option<usize>,

    /// Greedy randomness in [0, 1].
    #[clap(long, value_name = "FLOAT", default_value = "0.0")]
    randomness: f64,

    #[clap(long, value_name = "INT", default_value = "100")]
    attempts: usize,

    /// Number of puzzles.
    #[clap(long, value_name = "INT", default_value = "1")]
    count: usize,

    /// Worker threads for more than one puzzle.
    #[clap(long, value_name = "INT", default_value = "1")]
    workers: usize,

    #[clap(long, value_name = "INT", default_value = "0")]
    seed: u64,

    /// Truth table cache file.
    #[clap(long, value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Rebuild the cache even if it exists.
    #[clap(long)]
    rebuild: bool,

    /// Print JSON records instead of text.
    #[clap(long)]
    json: bool,

    /// Hide the answer.
    #[clap(long)]
    hide: bool,

    /// Log search steps.
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let config = GenerationConfig::new(args.n)
        .with_statements(args.min_statements, args.max_statements)
        .with_self_reference(args.self_reference)
        .with_pool_size(args.pool_size)
        .with_shill(args.shill)
        .with_diversity(args.diverse)
        .with_count_statements(!args.no_counts)
        .with_liars(args.min_liars, args.max_liars)
        .with_randomness(args.randomness)
        .with_max_attempts(args.attempts);
    config.validate()?;

    let library = Library::build(&config);
    let table = match &args.cache {
        Some(path) => TruthTable::load_or_build(path, &library, args.rebuild)?,
        None => TruthTable::build(&library),
    };
    eprintln!("Library: {} statements over {} villagers", library.len(), library.num_people());

    let generator = Generator::new(config, &library, &table)?;
    let puzzles = if args.count == 1 {
        let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
        vec![generator.generate(&mut rng)]
    } else {
        generator.generate_batch(args.count, args.workers, args.seed)
    };

    for (i, puzzle) in puzzles.into_iter().enumerate() {
        let Some(puzzle) = puzzle else {
            eprintln!("Puzzle #{}: none found", i);
            continue;
        };
        let puzzle = if args.hide { puzzle.without_solution() } else { puzzle };
        if args.json {
            println!("{}", puzzle.to_json()?);
        } else {
            println!("Puzzle #{} (difficulty {:.2}): {}", i, puzzle.difficulty, puzzle.to_short_string());
            print!("{}", puzzle.render());
            if let Some(solution) = &puzzle.solution {
                println!("Answer: {} (L = liar, T = truthful)", solution);
            }
            if let Some(shill) = puzzle.shill {
                println!("Shill: {}", puzzle.people[shill].name);
            }
            println!();
        }
    }

    let time_total = time_total.elapsed();
    eprintln!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_flags() {
        let args = Cli::try_parse_from(["generate", "5", "--self-reference", "--pool-size", "80"]).unwrap();
        assert_eq!(args.n, 5);
        assert!(args.self_reference);
        assert_eq!(args.pool_size, 80);

        let defaults = Cli::try_parse_from(["generate"]).unwrap();
        assert!(!defaults.self_reference);
        assert_eq!(defaults.pool_size, GenerationConfig::default().pool_size);
    }
}
