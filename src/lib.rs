pub mod core;
pub mod engine;
pub mod driver;
pub mod grid;
pub mod puzzle;
pub mod sudoku;
pub mod pathfind;
pub mod backtrack;
pub mod debug;
