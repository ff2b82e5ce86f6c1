//! Subcommand implementations.

pub mod bench;
pub mod solve;
pub mod sudoku;
pub mod sweep;
