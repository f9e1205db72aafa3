//! Resolver CLI
//!
//! Loads process records from JSON files, indexes them and prints summaries,
//! level-order walks and merged trees.

#![warn(missing_docs)]

pub mod commands;
pub mod config;

pub use commands::{build_tree, load_nodes, merge_trees, render_level_order, render_summary};
pub use config::{CliConfig, LogConfig};
