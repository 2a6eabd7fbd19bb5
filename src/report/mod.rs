//! Reporting: estimate outcomes, areas and the cost table.

pub mod format;

pub use format::*;
