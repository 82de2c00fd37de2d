//! CLI entry points

pub mod parser;

pub use parser::Cli;
