#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Random formulas for tests and benchmarks.
//!
//! Variables are named `x0`, `x1`, ... Every generator is driven by a caller
//! supplied [`fastrand::Rng`], so a seed reproduces the same formula.

use crate::sat::formula::RawClause;

fn name(var: usize) -> String {
    format!("x{var}")
}

/// Clauses of random length `1..=max_len` over `num_vars` variables. The
/// same variable may appear twice in a clause, so duplicates and tautologies
/// are produced too.
///
/// # Panics
///
/// If `num_vars` or `max_len` is zero.
#[must_use]
pub fn random_formula(
    rng: &mut fastrand::Rng,
    num_vars: usize,
    num_clauses: usize,
    max_len: usize,
) -> Vec<RawClause> {
    assert!(num_vars > 0 && max_len > 0, "need variables and non-empty clauses");
    (0..num_clauses)
        .map(|_| {
            let len = rng.usize(1..=max_len);
            (0..len)
                .map(|_| (name(rng.usize(..num_vars)), rng.bool()))
                .collect()
        })
        .collect()
}

/// Uniform random k-SAT: each clause has `k` distinct variables with random
/// polarities.
///
/// # Panics
///
/// If `k` is zero or exceeds `num_vars`.
#[must_use]
pub fn random_k_sat(
    rng: &mut fastrand::Rng,
    num_vars: usize,
    num_clauses: usize,
    k: usize,
) -> Vec<RawClause> {
    assert!(k > 0 && k <= num_vars, "k must be in 1..=num_vars");
    (0..num_clauses)
        .map(|_| {
            let mut vars: Vec<usize> = Vec::with_capacity(k);
            while vars.len() < k {
                let v = rng.usize(..num_vars);
                if !vars.contains(&v) {
                    vars.push(v);
                }
            }
            vars.into_iter().map(|v| (name(v), rng.bool())).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_reproduces_formula() {
        let a = random_formula(&mut fastrand::Rng::with_seed(3), 6, 10, 4);
        let b = random_formula(&mut fastrand::Rng::with_seed(3), 6, 10, 4);
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        assert!(a.iter().all(|c| (1..=4).contains(&c.len())));
    }

    #[test]
    fn test_k_sat_variables_are_distinct() {
        let mut rng = fastrand::Rng::with_seed(5);
        for clause in random_k_sat(&mut rng, 5, 50, 3) {
            assert_eq!(clause.len(), 3);
            let mut names: Vec<&String> = clause.iter().map(|(n, _)| n).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), 3);
        }
    }
}
