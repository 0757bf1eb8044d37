mod config;

use clap::{Parser, Subcommand};
use config::{PocketConfig, ScrambleConfig};
use env_logger::TimestampPrecision;
use itertools::Itertools;
use log::{LevelFilter, info, warn};
use mcts::{Mcts, UniformOracle};
use owo_colors::OwoColorize;
use pocket_core::{
    Action, CubeState,
    facelets::{Color, Face},
    notation::{format_sequence, parse_sequence},
    scramble::{random_rotation, scramble},
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file in TOML format, with optional [search] and
    /// [scramble] tables.
    #[arg(long, short = 'c', value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a random scramble and the cube it produces.
    Scramble {
        /// Number of quarter turns.
        #[arg(long, short)]
        depth: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the facelets of the solved cube after a move sequence.
    Show {
        /// The move sequence to apply, e.g. "R U2 f".
        moves: String,
    },
    /// Solve a cube with Monte-Carlo tree search.
    Solve {
        /// The move sequence that scrambled the cube. A random scramble is used
        /// when omitted.
        moves: Option<String>,
        /// Number of quarter turns of the random scramble.
        #[arg(long, short)]
        depth: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        max_iterations: Option<u64>,
        /// Wall-clock budget in seconds.
        #[arg(long)]
        time_limit: Option<f64>,
        /// Leaves evaluated per oracle call.
        #[arg(long)]
        leaves: Option<usize>,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let config = PocketConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scramble { depth, seed } => {
            let settings = ScrambleConfig {
                depth: depth.unwrap_or(config.scramble.depth),
                seed: seed.or(config.scramble.seed),
                ..config.scramble
            };
            let (state, rotation, actions) = random_scramble(&settings);
            print_scramble(&rotation, &actions);
            print_net(&state);
        }
        Commands::Show { moves } => {
            let state = CubeState::SOLVED.apply_all(&parse_sequence(&moves)?);
            println!("{state}");
            print_net(&state);
        }
        Commands::Solve {
            moves,
            depth,
            seed,
            max_iterations,
            time_limit,
            leaves,
        } => {
            let (root, rotation, actions) = match moves {
                Some(moves) => {
                    let actions = parse_sequence(&moves)?;
                    (CubeState::SOLVED.apply_all(&actions), vec![], actions)
                }
                None => random_scramble(&ScrambleConfig {
                    depth: depth.unwrap_or(config.scramble.depth),
                    seed: seed.or(config.scramble.seed),
                    ..config.scramble
                }),
            };
            print_scramble(&rotation, &actions);
            print_net(&root);

            let mut search = config.search;
            search.max_iterations = max_iterations.or(search.max_iterations);
            search.time_limit_secs = time_limit.or(search.time_limit_secs);
            search.leaves_per_iteration = leaves.unwrap_or(search.leaves_per_iteration);
            search.seed = seed.or(search.seed);

            let mut mcts = Mcts::new(root, UniformOracle, search)?;
            let found = mcts.solve()?;
            let solution = shorten(&mcts, found);
            if !root.apply_all(&solution).is_solved() {
                warn!("Solution {} does not solve {root}", format_sequence(&solution));
            }

            let stats = mcts.stats();
            println!(
                "Solution ({} moves): {}",
                solution.len(),
                format_sequence(&solution)
            );
            println!(
                "{} iterations, {} nodes, {} oracle calls in {:.3}s",
                stats.iterations,
                mcts.tree().len(),
                stats.oracle_calls,
                stats.elapsed.as_secs_f64()
            );
        }
    }

    Ok(())
}

/// A random scramble, returned with the whole-cube rotation applied before
/// it (empty unless `random_orientation` is set) and the scrambling moves.
fn random_scramble(settings: &ScrambleConfig) -> (CubeState, Vec<Action>, Vec<Action>) {
    let mut rng = settings
        .seed
        .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let rotation = if settings.random_orientation {
        random_rotation(&mut rng)
    } else {
        vec![]
    };
    let start = CubeState::SOLVED.apply_all(&rotation);
    let (state, actions) = scramble(&start, settings.depth, &mut rng);
    (state, rotation, actions)
}

/// The move sequence that reproduces a scramble from the solved cube, as
/// accepted by `pocket show`.
fn replay_sequence(rotation: &[Action], actions: &[Action]) -> String {
    [format_sequence(rotation), format_sequence(actions)]
        .into_iter()
        .filter(|part| !part.is_empty())
        .join(" ")
}

fn print_scramble(rotation: &[Action], actions: &[Action]) {
    if !rotation.is_empty() {
        println!("Rotation (whole cube): {}", format_sequence(rotation));
    }
    println!("Scramble: {}", format_sequence(actions));
    if !rotation.is_empty() {
        println!("Replay: {}", replay_sequence(rotation, actions));
    }
}

/// Replace the search path by the shortest path through the explored tree
/// when that is shorter.
fn shorten(mcts: &Mcts<UniformOracle>, found: Vec<Action>) -> Vec<Action> {
    match mcts.shortest_known_solution() {
        Some(shortest) if shortest.len() < found.len() => {
            info!(
                "Shortened the search path from {} to {} moves",
                found.len(),
                shortest.len()
            );
            shortest
        }
        _ => found,
    }
}

fn print_net(state: &CubeState) {
    let faces = state.face_colors();
    let row = |face: Face, row: usize| {
        faces[face as usize][2 * row..2 * row + 2]
            .iter()
            .map(|&color| paint(color))
            .join(" ")
    };
    for r in 0..2 {
        println!("     {}", row(Face::Up, r));
    }
    for r in 0..2 {
        println!(
            "{}",
            [Face::Left, Face::Front, Face::Right, Face::Back]
                .into_iter()
                .map(|face| row(face, r))
                .join("  ")
        );
    }
    for r in 0..2 {
        println!("     {}", row(Face::Down, r));
    }
}

fn paint(color: Color) -> String {
    let letter = color.letter();
    match color {
        Color::White => letter.white().to_string(),
        Color::Green => letter.green().to_string(),
        Color::Orange => letter.truecolor(255, 140, 0).to_string(),
        Color::Red => letter.red().to_string(),
        Color::Blue => letter.blue().to_string(),
        Color::Yellow => letter.bright_yellow().to_string(),
    }
}
