//! Argument parsing and the command handlers of the binary.

pub(crate) mod cli;
