#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! This module provides functionality for solving Sudoku puzzles.

/// The `sudoku` module contains the core logic for solving Sudoku puzzles.
pub mod solver;
