#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A reader for the DIMACS CNF file format.
//!
//! The format typically includes:
//! - Comment lines starting with 'c'.
//! - A problem line 'p cnf <`num_variables`> <`num_clauses`>'. Its counts are
//!   ignored; variables and clauses are taken from the data itself.
//! - Clauses as whitespace-separated non-zero integers (negative for a negated
//!   variable), each terminated by '0'. A clause may span several lines.
//! - An optional '%' line marking the end of the data.
//!
//! Variables are named by their decimal index, so `-3` becomes the literal
//! `!3` of the variable named `"3"`. [`write_dimacs`] goes the other way and
//! numbers variables by their position, listing the names in comments.

use crate::sat::clause::ClauseKind;
use crate::sat::clause_set::ClauseSet;
use crate::sat::error::{Error, Result};
use crate::sat::formula::RawClause;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Reads raw clauses from DIMACS text.
///
/// A lone `0` (an empty clause) is skipped. Literals after the last `0` form a
/// final clause.
///
/// # Errors
///
/// [`Error::Io`] if reading fails, [`Error::InvalidLiteral`] for a token that
/// is not an integer.
pub fn read_dimacs<R: BufRead>(reader: R) -> Result<Vec<RawClause>> {
    let mut clauses = Vec::new();
    let mut current: RawClause = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let mut parts = line.split_whitespace().peekable();

        match parts.peek() {
            Some(&"%") => break,
            None | Some(&"c" | &"p") => continue,
            Some(_) => {}
        }

        for token in parts {
            let value: i64 = token.parse().map_err(|_| Error::InvalidLiteral {
                line: number + 1,
                token: token.to_owned(),
            })?;
            if value == 0 {
                if !current.is_empty() {
                    clauses.push(std::mem::take(&mut current));
                }
            } else {
                current.push((value.unsigned_abs().to_string(), value > 0));
            }
        }
    }

    if !current.is_empty() {
        clauses.push(current);
    }
    Ok(clauses)
}

/// Parses DIMACS text into a clause set.
///
/// # Errors
///
/// See [`read_dimacs`].
pub fn parse_dimacs<R: BufRead, C: ClauseKind>(reader: R) -> Result<ClauseSet<C>> {
    ClauseSet::from_clauses(read_dimacs(reader)?)
}

/// Opens and parses a DIMACS file.
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be opened, otherwise see [`read_dimacs`].
pub fn parse_file<C: ClauseKind>(path: impl AsRef<Path>) -> Result<ClauseSet<C>> {
    let file = std::fs::File::open(path)?;
    parse_dimacs(io::BufReader::new(file))
}

/// Writes the original clauses of `cs` as DIMACS. Variable `v` is written as
/// `v + 1`, and a `c <index> <name>` comment line records each name.
///
/// # Errors
///
/// Any error of the underlying writer.
pub fn write_dimacs<C: ClauseKind, W: Write>(cs: &ClauseSet<C>, mut writer: W) -> io::Result<()> {
    let vars = cs.variables();
    for (id, var) in vars.iter() {
        writeln!(writer, "c {} {}", id + 1, var.name)?;
    }
    writeln!(writer, "p cnf {} {}", vars.len(), cs.original_len())?;
    for clause in cs.original_clauses() {
        for lit in clause.literals() {
            let index = i64::from(lit.variable()) + 1;
            write!(writer, "{} ", if lit.polarity() { index } else { -index })?;
        }
        writeln!(writer, "0")?;
    }
    writer.flush()
}
