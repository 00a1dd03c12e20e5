//! # backbone-sat
//!
//! `backbone-sat` is a command-line front end for a CDCL SAT solver that also
//! reasons about *all* models of a formula. Besides deciding satisfiability it
//! can shrink a model to a prime implicant and compute the backbone, the set
//! of literals that hold in every model.
//!
//! ## Features
//!
//! -   **Multiple Input Formats**:
//!     -   DIMACS CNF files (`.cnf`)
//!     -   Formulas as text, e.g. `"a|!b & b|c"`
//!     -   Sudoku puzzles in the pipe format (`.sudoku`)
//! -   **Configurable Solver**: CDCL or DPLL, watched or plain clauses, two
//!     watch schemes and three decision phases.
//! -   **Prime Implicants**: watched-literal extraction from a CDCL trail, or a
//!     reference extraction by completion checks.
//! -   **Backbones**: the Kaiser-Küchlin forced-negation algorithm, with or
//!     without its optimisations, and the intersection algorithm.
//! -   **Verification**: models, implicants and backbones can be re-checked.
//! -   **Statistics**: parse time, solve time, conflicts, decisions,
//!     propagations and jemalloc memory usage.
//! -   **Logging**: `tracing` output on stderr, `--debug` or `RUST_LOG` to
//!     raise the level.
//!
//! ## Example Invocations
//!
//! ```sh
//! # Solve a DIMACS file with the default CDCL solver
//! backbone-sat problem.cnf
//!
//! # Solve with DPLL on plain clauses and print the model
//! backbone-sat file problem.cnf --solver dpll --clauses plain -p
//!
//! # Backbone of a text formula by intersection
//! backbone-sat backbone --text "!a & a|b" --algorithm intersection
//!
//! # Prime implicant of a DIMACS file, verified
//! backbone-sat implicant --file problem.cnf --verify
//!
//! # Solve a Sudoku puzzle and export its clauses
//! backbone-sat sudoku puzzle.sudoku --export-dimacs
//! ```

use crate::command_line::cli::{
    Cli, Commands, find_backbone, find_implicant, load_dimacs, solve_and_report, solve_dir,
    solve_sudoku,
};
use backbone_sat::sat::formula::parse_formula;
use clap::{CommandFactory, Parser};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

mod command_line;

/// Installs the stderr log subscriber. `RUST_LOG` wins over `debug`.
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Some(Commands::File { path, common }) => {
            let time = Instant::now();
            let raw = load_dimacs(&path)?;
            solve_and_report(&raw, &common, Some(path.as_path()), time.elapsed())
        }
        Some(Commands::Text { input, common }) => {
            let time = Instant::now();
            let raw = parse_formula(&input).map_err(|e| e.to_string())?;
            solve_and_report(&raw, &common, None, time.elapsed())
        }
        Some(Commands::Dir { path, common }) => solve_dir(&path, &common),
        Some(Commands::Sudoku {
            path,
            export_dimacs,
            common,
        }) => solve_sudoku(&path, export_dimacs, &common),
        Some(Commands::Implicant {
            input,
            reference,
            common,
        }) => find_implicant(&input, reference, &common),
        Some(Commands::Backbone {
            input,
            algorithm,
            no_optimisations,
            common,
        }) => find_backbone(&input, algorithm, no_optimisations, &common),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_owned();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => match cli.path {
            Some(path) => {
                let time = Instant::now();
                let raw = load_dimacs(&path)?;
                solve_and_report(&raw, &cli.common, Some(path.as_path()), time.elapsed())
            }
            None => Err("No command provided. Use --help for more information.".to_owned()),
        },
    }
}

/// Main entry point.
///
/// Parses command-line arguments, dispatches to the command handler and exits
/// with status 1 on error.
fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
