//! orchay-graph: command-line access to an orchay project's dependency graph.
//!
//! The binary reads a JSON task file (`{"tasks": [...], "groups": [...]}`),
//! runs one graph query, and prints the result as JSON on stdout. Logs go
//! to stderr.
//!
//! # Modules
//!
//! - [`cli`]: argument parsing, error type, exit codes and output envelopes
//! - [`commands`]: command execution
//! - [`config`]: `orchay-graph.toml` defaults
//! - [`tracing`]: log subscriber setup

pub mod cli;
pub mod commands;
pub mod config;
pub mod tracing;
