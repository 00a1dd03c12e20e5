#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The textual formula syntax: `a|!b & c`.
//!
//! Clauses are separated by `&`, literals by `|`, and a leading `!` negates.
//! Whitespace around tokens is ignored. Input consisting only of whitespace
//! is the empty (trivially satisfiable) formula.

use crate::sat::clause::ClauseKind;
use crate::sat::clause_set::ClauseSet;
use crate::sat::error::{Error, Result};
use std::str::FromStr;

/// One clause as `(identifier, polarity)` pairs, before registration.
pub type RawClause = Vec<(String, bool)>;

/// Splits formula text into raw clauses.
///
/// # Errors
///
/// [`Error::EmptyClause`] for a clause with no text between separators,
/// [`Error::BlankIdentifier`] for a literal with no identifier.
pub fn parse_formula(text: &str) -> Result<Vec<RawClause>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    text.split('&')
        .enumerate()
        .map(|(idx, clause)| {
            if clause.trim().is_empty() {
                return Err(Error::EmptyClause { clause: idx });
            }
            clause
                .split('|')
                .map(|token| parse_literal(token).ok_or(Error::BlankIdentifier { clause: idx }))
                .collect::<Result<RawClause>>()
        })
        .collect()
}

fn parse_literal(token: &str) -> Option<(String, bool)> {
    let mut rest = token.trim();
    let mut polarity = true;
    while let Some(stripped) = rest.strip_prefix('!') {
        polarity = !polarity;
        rest = stripped.trim_start();
    }
    (!rest.is_empty()).then(|| (rest.to_owned(), polarity))
}

impl<C: ClauseKind> FromStr for ClauseSet<C> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_clauses(parse_formula(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(name: &str, polarity: bool) -> (String, bool) {
        (name.to_owned(), polarity)
    }

    #[test]
    fn test_parse_simple_formula() {
        let clauses = parse_formula("a|!b & c").unwrap();
        assert_eq!(
            clauses,
            vec![vec![lit("a", true), lit("b", false)], vec![lit("c", true)]]
        );
    }

    #[test]
    fn test_whitespace_and_double_negation() {
        let clauses = parse_formula("  x1 |  ! y2&!!z ").unwrap();
        assert_eq!(
            clauses,
            vec![vec![lit("x1", true), lit("y2", false)], vec![lit("z", true)]]
        );
    }

    #[test]
    fn test_empty_input_is_empty_formula() {
        assert!(parse_formula("").unwrap().is_empty());
        assert!(parse_formula(" \n ").unwrap().is_empty());
    }

    #[test]
    fn test_errors_name_the_clause() {
        assert!(matches!(
            parse_formula("a & & b"),
            Err(Error::EmptyClause { clause: 1 })
        ));
        assert!(matches!(
            parse_formula("a & b|!"),
            Err(Error::BlankIdentifier { clause: 1 })
        ));
        assert!(matches!(
            parse_formula("a||b"),
            Err(Error::BlankIdentifier { clause: 0 })
        ));
    }
}
