#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod backbone;
pub mod cdcl;
pub mod clause;
pub mod clause_set;
pub mod conflict_analysis;
pub mod dimacs;
pub mod dpll;
pub mod error;
pub mod formula;
pub mod generator;
pub mod heap;
pub mod implicant;
pub mod literal;
pub mod phase_saving;
pub mod propagation;
pub mod solver;
pub mod trail;
pub mod variable;
pub mod watch;
