//! # satbench-format
//!
//! File format parsing and serialization for satbench.
//!
//! Supports:
//! - **DIMACS CNF**: Standard SAT competition format
//! - **Sudoku**: n×n puzzles encoded to CNF and decoded back from models

pub mod dimacs;
pub mod sudoku;

pub use dimacs::{write_dimacs, DimacsCnf};
pub use sudoku::SudokuGrid;
