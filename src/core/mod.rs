//! Core process logic
//!
//! Process table access, target discovery and tree termination

pub mod locator;
pub mod models;
pub mod process_table;
pub mod terminator;

#[cfg(test)]
pub(crate) mod testing;
