//! Meeting notes CLI library.
//!
//! This crate provides the CLI interface for browsing meeting notes.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::{Config, SourceConfig};
