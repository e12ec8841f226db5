//! CLI entry point for the puzzle search engine.
//!
//! Usage:
//!   puzzle-search solve <puzzle.json> [options]
//!   puzzle-search solve --stdin [options]
//!   puzzle-search algorithms
//!
//! Options:
//!   --algorithm <name>  Search strategy (default: a-star-sequential)
//!   --workers <n>       Worker threads for concurrent strategies
//!   --bias <f>          Exploration bias in (0, 1], overrides the preset
//!   --timeout <seconds> Interrupt the search after this long

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;

use puzzle_search::puzzles::{BridgePuzzle, PailsPuzzle, SliderPuzzle};
use puzzle_search::{
    Algorithm, ExplorationBias, Interrupt, Puzzle, PuzzleConfig, SearchStats, SolverOptions,
};

#[derive(Parser)]
#[command(name = "puzzle-search")]
#[command(about = "Generic state-space search over puzzle descriptions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a solution to a puzzle
    Solve {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,

        /// Search strategy
        #[arg(long, value_enum, default_value_t = Algorithm::AStarSequential)]
        algorithm: Algorithm,

        /// Worker threads for concurrent strategies
        #[arg(long)]
        workers: Option<usize>,

        /// Exploration bias for concurrent strategies, in (0, 1]
        #[arg(long)]
        bias: Option<f64>,

        /// Interrupt the search after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List the available search strategies
    Algorithms,
}

/// Output format for a solve
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput<M> {
    puzzle: &'static str,
    algorithm: Algorithm,
    solved: bool,
    interrupted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<M>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    move_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_cost: Option<u64>,
    #[serde(flatten)]
    stats: SearchStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AlgorithmOutput {
    name: Algorithm,
    label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    exploration_bias: Option<f64>,
}

/// Everything needed to run one solve, independent of the puzzle kind
struct SolveRequest {
    kind: &'static str,
    algorithm: Algorithm,
    options: SolverOptions,
    timeout: Option<Duration>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(1);
        }
    }
}

/// Returns whether a solution was found
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Solve {
            file,
            stdin,
            algorithm,
            workers,
            bias,
            timeout,
        } => {
            let config = read_config(file, stdin)?;
            let bias = bias
                .map(ExplorationBias::new)
                .transpose()
                .context("invalid --bias")?;
            if bias.is_some() && !algorithm.is_concurrent() {
                warn!("--bias has no effect on {}", algorithm.label());
            }

            let request = SolveRequest {
                kind: config.kind(),
                algorithm,
                options: SolverOptions {
                    workers,
                    bias,
                    interrupt: None,
                },
                timeout: timeout.map(Duration::from_secs),
            };
            solve_config(config, &request)
        }
        Commands::Algorithms => {
            let listing: Vec<AlgorithmOutput> = Algorithm::ALL
                .iter()
                .map(|&algorithm| AlgorithmOutput {
                    name: algorithm,
                    label: algorithm.label(),
                    exploration_bias: algorithm.exploration_bias().map(ExplorationBias::value),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
            Ok(true)
        }
    }
}

fn read_config(file: Option<PathBuf>, stdin: bool) -> Result<PuzzleConfig> {
    let json_content = if stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read puzzle from stdin")?;
        buffer
    } else if let Some(path) = file {
        fs::read_to_string(&path)
            .with_context(|| format!("failed to read puzzle file {}", path.display()))?
    } else {
        bail!("must provide either a file path or --stdin");
    };

    serde_json::from_str(&json_content).context("failed to parse puzzle JSON")
}

fn solve_config(config: PuzzleConfig, request: &SolveRequest) -> Result<bool> {
    match config {
        PuzzleConfig::Bridge { speeds } => {
            let puzzle = BridgePuzzle::new(speeds).context("invalid bridge puzzle")?;
            solve_puzzle(&puzzle, request)
        }
        PuzzleConfig::Slider { size, tiles } => {
            let puzzle = SliderPuzzle::new(size, tiles).context("invalid slider puzzle")?;
            solve_puzzle(&puzzle, request)
        }
        PuzzleConfig::Pails {
            first_pail,
            second_pail,
            target,
        } => {
            let puzzle =
                PailsPuzzle::new(first_pail, second_pail, target).context("invalid pails puzzle")?;
            solve_puzzle(&puzzle, request)
        }
    }
}

fn solve_puzzle<P>(puzzle: &P, request: &SolveRequest) -> Result<bool>
where
    P: Puzzle + Sync,
    P::Position: Send + Sync,
    P::Move: Send + Sync + Serialize,
{
    info!(
        "solving {} puzzle with {}",
        request.kind,
        request.algorithm.label()
    );
    let mut solver = request.algorithm.configure(puzzle, &request.options);
    let outcome = match request.timeout {
        Some(limit) => with_watchdog(solver.interrupt_handle(), limit, || solver.solve()),
        None => solver.solve(),
    }
    .context("search failed")?;
    let stats = solver.stats();

    let interrupted = outcome.is_interrupted();
    let moves = outcome.into_moves();
    let solved = moves.is_some();
    let output = SolveOutput {
        puzzle: request.kind,
        algorithm: request.algorithm,
        solved,
        interrupted,
        move_count: moves.as_ref().map(Vec::len),
        total_cost: moves
            .as_ref()
            .map(|moves| path_cost(puzzle, moves)),
        moves,
        stats,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(solved)
}

/// Total cost of a move sequence, clamped at `u64::MAX`
fn path_cost<P: Puzzle>(puzzle: &P, moves: &[P::Move]) -> u64 {
    moves
        .iter()
        .fold(0u64, |total, mv| total.saturating_add(puzzle.move_cost(mv)))
}

/// Run `work`, tripping `interrupt` if it is still running after `limit`
fn with_watchdog<T>(interrupt: Interrupt, limit: Duration, work: impl FnOnce() -> T) -> T {
    let (done, finished) = mpsc::channel::<()>();
    thread::scope(|scope| {
        scope.spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = finished.recv_timeout(limit) {
                warn!("search still running after {:?}, interrupting", limit);
                interrupt.interrupt();
            }
        });
        let result = work();
        drop(done);
        result
    })
}
