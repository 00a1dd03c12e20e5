#![allow(clippy::cast_precision_loss)]

use backbone_sat::sat::backbone::{self, Algorithm};
use backbone_sat::sat::cdcl::{self, Cdcl};
use backbone_sat::sat::clause::{Clause, ClauseKind};
use backbone_sat::sat::clause_set::{ClauseSet, WatchedClauseSet};
use backbone_sat::sat::dimacs::{read_dimacs, write_dimacs};
use backbone_sat::sat::dpll::Dpll;
use backbone_sat::sat::formula::{RawClause, parse_formula};
use backbone_sat::sat::implicant;
use backbone_sat::sat::literal::LiteralSet;
use backbone_sat::sat::phase_saving::Phase;
use backbone_sat::sat::solver::{SolutionStats, Solutions, Solver};
use backbone_sat::sat::watch::{WatchScheme, WatchedClause};
use backbone_sat::sudoku::solver::Sudoku;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};
use tracing::{debug, info};

/// Defines the command-line interface for the solver application.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "backbone-sat",
    version,
    about = "A CDCL SAT solver with prime implicants and backbones"
)]
pub(crate) struct Cli {
    /// Path to a DIMACS .cnf file, solved when no subcommand is given.
    pub path: Option<PathBuf>,

    /// Log solver internals at debug level. `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, default_value_t = false)]
    pub debug: bool,

    /// Specifies the subcommand to execute.
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Options used when solving the global path.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a formula written as text, e.g. "a|!b & b|c".
    Text {
        /// Clauses separated by `&`, literals by `|`, `!` negates.
        input: String,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every .cnf and .sudoku file below a directory.
    Dir {
        /// Root directory to walk.
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a Sudoku puzzle written in the pipe format, e.g. "1 3|  2 |...".
    Sudoku {
        /// Path to the puzzle file.
        path: PathBuf,

        /// Write the generated clauses as DIMACS next to the puzzle.
        #[arg(short, long, default_value_t = false)]
        export_dimacs: bool,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Find a prime implicant of a formula.
    Implicant {
        #[command(flatten)]
        input: InputArgs,

        /// Use the reference extraction instead of the watched one.
        #[arg(long, default_value_t = false)]
        reference: bool,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Compute the backbone of a formula.
    Backbone {
        #[command(flatten)]
        input: InputArgs,

        /// Backbone algorithm.
        #[arg(short, long, value_enum, default_value_t = Algorithm::KaiserKuechlin)]
        algorithm: Algorithm,

        /// Test every literal of the base model, level 0 included.
        #[arg(long, default_value_t = false)]
        no_optimisations: bool,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Where a formula comes from: a DIMACS file or text.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub(crate) struct InputArgs {
    /// DIMACS file.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Formula text.
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum SolverType {
    #[default]
    Cdcl,
    Dpll,
}

/// Clause representation used by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum ClauseType {
    /// Two watched literals per clause.
    #[default]
    Watched,
    /// Full scan on every query.
    Plain,
}

/// Defines command-line options shared across subcommands.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Check the model against the input clauses.
    #[arg(short, long, default_value_t = false)]
    pub(crate) verify: bool,

    /// Print problem and search statistics after solving.
    #[arg(short, long, default_value_t = false)]
    pub(crate) stats: bool,

    /// Print the satisfying assignment.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    #[arg(long, value_enum, default_value_t = SolverType::Cdcl)]
    pub(crate) solver: SolverType,

    #[arg(long, value_enum, default_value_t = ClauseType::Watched)]
    pub(crate) clauses: ClauseType,

    /// Watch movement of watched clauses.
    #[arg(long, value_enum, default_value_t = WatchScheme::ToMiddle)]
    pub(crate) scheme: WatchScheme,

    /// Polarity of CDCL decisions.
    #[arg(long, value_enum, default_value_t = Phase::Saved)]
    pub(crate) phase: Phase,
}

/// Reads a DIMACS file into raw clauses.
///
/// # Errors
///
/// If the file cannot be opened or is malformed.
pub(crate) fn load_dimacs(path: &Path) -> Result<Vec<RawClause>, String> {
    let file = File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    read_dimacs(BufReader::new(file)).map_err(|e| format!("{}: {e}", path.display()))
}

/// Reads the formula named by `input`.
///
/// # Errors
///
/// If the file or the text cannot be parsed.
pub(crate) fn load_input(input: &InputArgs) -> Result<Vec<RawClause>, String> {
    match (&input.file, &input.text) {
        (Some(path), _) => load_dimacs(path),
        (None, Some(text)) => parse_formula(text).map_err(|e| e.to_string()),
        (None, None) => Err("no formula given, use --file or --text".to_owned()),
    }
}

fn build<C: ClauseKind>(raw: &[RawClause], scheme: WatchScheme) -> Result<ClauseSet<C>, String> {
    ClauseSet::with_scheme(raw.to_vec(), scheme).map_err(|e| e.to_string())
}

/// Solves every .cnf and .sudoku file below `path`.
///
/// # Errors
///
/// If `path` is not a directory or some file fails to parse.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!("Provided path is not a directory: {}", path.display()));
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }

        if file_path.extension().is_some_and(|ext| ext == "sudoku") {
            solve_sudoku(file_path, false, common)?;
            continue;
        }

        if file_path.extension().is_none_or(|ext| ext != "cnf") {
            eprintln!("Skipping non-CNF file: {}", file_path.display());
            continue;
        }

        let time = Instant::now();
        let raw = load_dimacs(file_path)?;
        solve_and_report(&raw, common, Some(file_path), time.elapsed())?;
    }

    Ok(())
}

/// Whether the current settings of `cs` satisfy every input clause.
/// Tautologies count as satisfied since the clause set drops them.
pub(crate) fn verify_model<C: ClauseKind>(raw: &[RawClause], cs: &ClauseSet<C>) -> bool {
    raw.iter().all(|clause| {
        let tautology = clause
            .iter()
            .any(|(name, pol)| clause.iter().any(|(other, p)| other == name && p != pol));
        tautology
            || clause.iter().any(|(name, pol)| {
                cs.find_variable(name).and_then(|v| cs.value(v)) == Some(*pol)
            })
    })
}

/// Runs the selected solver on `cs`, returning the clause set with the final
/// assignment.
pub(crate) fn run_solver<C: ClauseKind>(
    cs: ClauseSet<C>,
    common: &CommonOptions,
) -> (Option<Solutions>, Duration, SolutionStats, ClauseSet<C>) {
    let time = Instant::now();
    match common.solver {
        SolverType::Cdcl => {
            let mut solver = Cdcl::with_phase(cs, common.phase);
            let sol = solver.solve();
            let elapsed = time.elapsed();
            (sol, elapsed, solver.stats(), solver.into_inner())
        }
        SolverType::Dpll => {
            let mut solver = Dpll::new(cs);
            let sol = solver.solve();
            let elapsed = time.elapsed();
            (sol, elapsed, solver.stats(), solver.clauses)
        }
    }
}

/// Solves `raw` with the configured clause type and reports the result.
///
/// # Errors
///
/// If the clauses cannot be built or the model fails verification.
pub(crate) fn solve_and_report(
    raw: &[RawClause],
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<(), String> {
    match common.clauses {
        ClauseType::Watched => {
            solve_and_report_with::<WatchedClause>(raw, common, label, parse_time)
        }
        ClauseType::Plain => solve_and_report_with::<Clause>(raw, common, label, parse_time),
    }
}

fn solve_and_report_with<C: ClauseKind>(
    raw: &[RawClause],
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<(), String> {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }
    let cs: ClauseSet<C> = build(raw, common.scheme)?;
    debug!(vars = cs.num_vars(), clauses = cs.len(), "formula loaded");

    let (sol, elapsed, solver_stats, cs) = run_solver(cs, common);
    info!(sat = sol.is_some(), ?elapsed, "solver finished");

    if common.verify {
        verify_solution(raw, &cs, sol.as_ref())?;
    }

    if common.stats {
        let (allocated, resident) = memory_usage()?;
        print_stats(parse_time, elapsed, &cs, &solver_stats, allocated, resident);
    }

    print_outcome(&cs, sol.as_ref(), common.print_solution);
    Ok(())
}

/// Checks a model against the input clauses.
///
/// # Errors
///
/// If the model leaves some clause unsatisfied.
pub(crate) fn verify_solution<C: ClauseKind>(
    raw: &[RawClause],
    cs: &ClauseSet<C>,
    sol: Option<&Solutions>,
) -> Result<(), String> {
    if sol.is_none() {
        println!("Verified: UNSAT, nothing to check");
        return Ok(());
    }
    let ok = verify_model(raw, cs);
    println!("Verified: {ok:?}");
    if ok {
        Ok(())
    } else {
        Err("Solution failed verification!".to_owned())
    }
}

/// Allocated and resident memory in MiB, as reported by jemalloc.
///
/// # Errors
///
/// If the allocator statistics cannot be read.
pub(crate) fn memory_usage() -> Result<(f64, f64), String> {
    epoch::advance().map_err(|e| e.to_string())?;
    let allocated = stats::allocated::read().map_err(|e| e.to_string())?;
    let resident = stats::resident::read().map_err(|e| e.to_string())?;
    Ok((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
pub(crate) fn print_stats<C: ClauseKind>(
    parse_time: Duration,
    elapsed: Duration,
    cs: &ClauseSet<C>,
    s: &SolutionStats,
    allocated: f64,
    resident: f64,
) {
    let elapsed_secs = elapsed.as_secs_f64();
    let literals: usize = cs.original_clauses().map(|c| c.literals().len()).sum();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cs.num_vars());
    stat_line("Clauses (original)", cs.original_len());
    stat_line("Literals (original)", literals);

    println!("========================[ Search Statistics ]========================");
    stat_line("Learnt clauses", s.learnt_clauses);
    stat_line("Total clauses (incl. learnt)", cs.len());
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

fn print_outcome<C: ClauseKind>(cs: &ClauseSet<C>, sol: Option<&Solutions>, print_solution: bool) {
    match sol {
        Some(model) => {
            if print_solution {
                println!("Solution: {}", cs.display_literals(model));
            }
            println!("\nSATISFIABLE");
        }
        None => println!("\nUNSATISFIABLE"),
    }
}

/// Solves a Sudoku file.
///
/// # Errors
///
/// If the file cannot be read, the puzzle is malformed or the decoded board
/// breaks the rules.
pub(crate) fn solve_sudoku(
    path: &Path,
    export_dimacs: bool,
    common: &CommonOptions,
) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!("Provided path is not a file: {}", path.display()));
    }

    let time = Instant::now();
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let sudoku: Sudoku = text
        .trim_end_matches(['\n', '\r'])
        .parse()
        .map_err(|e| format!("Error parsing Sudoku file: {e}"))?;
    println!("Parsed Sudoku:\n{}", sudoku.board);

    match common.clauses {
        ClauseType::Watched => {
            solve_sudoku_with::<WatchedClause>(&sudoku, path, export_dimacs, common, time)
        }
        ClauseType::Plain => solve_sudoku_with::<Clause>(&sudoku, path, export_dimacs, common, time),
    }
}

fn solve_sudoku_with<C: ClauseKind>(
    sudoku: &Sudoku,
    path: &Path,
    export_dimacs: bool,
    common: &CommonOptions,
    time: Instant,
) -> Result<(), String> {
    let cs: ClauseSet<C> = build(&sudoku.to_clauses(), common.scheme)?;

    if export_dimacs {
        let dimacs_path = PathBuf::from(format!("{}.cnf", path.display()));
        let file = File::create(&dimacs_path)
            .map_err(|e| format!("Unable to write {}: {e}", dimacs_path.display()))?;
        write_dimacs(&cs, std::io::BufWriter::new(file))
            .map_err(|e| format!("Unable to write {}: {e}", dimacs_path.display()))?;
        println!("DIMACS written to: {}", dimacs_path.display());
    }

    let parse_time = time.elapsed();
    let (sol, elapsed, solver_stats, cs) = run_solver(cs, common);

    if common.stats {
        let (allocated, resident) = memory_usage()?;
        print_stats(parse_time, elapsed, &cs, &solver_stats, allocated, resident);
    }

    if sol.is_none() {
        println!("No solution found");
        return Ok(());
    }

    let board = sudoku.decode(&cs);
    if common.verify {
        let ok = sudoku.is_solution(&board);
        println!("Verified: {ok:?}");
        if !ok {
            return Err("Decoded board breaks the rules".to_owned());
        }
    }
    println!("Solution:\n{board}");
    Ok(())
}

/// Finds and prints a prime implicant.
///
/// # Errors
///
/// If the input cannot be read or the implicant fails verification.
pub(crate) fn find_implicant(
    input: &InputArgs,
    reference: bool,
    common: &CommonOptions,
) -> Result<(), String> {
    let raw = load_input(input)?;
    let mut cs: WatchedClauseSet = build(&raw, common.scheme)?;

    let time = Instant::now();
    let found = if reference {
        implicant::prime_implicant(&mut cs)
    } else {
        implicant::find_prime_implicant(&mut cs)
    };
    let elapsed = time.elapsed();
    info!(?elapsed, reference, "implicant search finished");

    let Some(found) = found else {
        println!("UNSATISFIABLE");
        return Ok(());
    };

    if common.verify {
        let ok = implicant::is_prime_implicant(&mut cs, &found);
        println!("Verified: {ok:?}");
        if !ok {
            return Err("Result is not a prime implicant".to_owned());
        }
    }

    println!("Prime implicant ({} literals): {}", found.len(), cs.display_literals(&found));
    if common.stats {
        stat_line("Variables", cs.num_vars());
        stat_line("Implicant size", found.len());
        stat_line("CPU time (s)", format!("{:.3}", elapsed.as_secs_f64()));
    }
    Ok(())
}

/// Whether forcing the negation of every literal in `literals` makes `cs`
/// unsatisfiable.
fn verify_backbone(cs: &WatchedClauseSet, literals: &LiteralSet) -> bool {
    literals.iter().all(|&lit| {
        let mut forced = cs.fork();
        forced.add_clause([!lit]);
        !cdcl::solve(&mut forced)
    })
}

/// Computes and prints the backbone.
///
/// # Errors
///
/// If the input cannot be read or a backbone literal fails verification.
pub(crate) fn find_backbone(
    input: &InputArgs,
    algorithm: Algorithm,
    no_optimisations: bool,
    common: &CommonOptions,
) -> Result<(), String> {
    let raw = load_input(input)?;
    let mut cs: WatchedClauseSet = build(&raw, common.scheme)?;
    let original = cs.fork();

    let time = Instant::now();
    let result = backbone::compute(&mut cs, algorithm, !no_optimisations);
    let elapsed = time.elapsed();

    if common.verify {
        let ok = verify_backbone(&original, &result.literals);
        println!("Verified: {ok:?}");
        if !ok {
            return Err("Backbone contains a non-backbone literal".to_owned());
        }
    }

    println!(
        "Backbone ({} literals): {}",
        result.literals.len(),
        cs.display_literals(&result.literals)
    );
    if common.stats {
        stat_line("Variables", cs.num_vars());
        stat_line("Backbone size", result.literals.len());
        stat_line("CDCL runs", result.cdcl_runs);
        stat_line("CPU time (s)", format!("{:.3}", elapsed.as_secs_f64()));
    }
    Ok(())
}
