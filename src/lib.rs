#![deny(missing_docs)]
//! This crate provides a CDCL SAT solver together with algorithms that reason about all models of a
//! formula: prime implicant extraction and backbone computation.

/// The `sat` module implements the solver: clause sets with watched literals, the CDCL loop,
/// prime implicants and backbones, plus formula readers and a DPLL reference solver.
pub mod sat;

/// The `sudoku` module encodes Sudoku puzzles of size 4, 9, 16 or 25 as clause sets and decodes
/// solved clause sets back into boards.
pub mod sudoku;
