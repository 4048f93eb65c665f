use crate::commands::Command;
use crate::config::{Config, ConfigError};
use crate::tracing::{LogLevel, TracingFormat};
use clap::{Args, Parser, Subcommand, ValueEnum};
use miette::{Diagnostic, Report};
use orchay_graph_view::{GraphFilter, HierarchyMode, MAX_FOCUS_DEPTH, MIN_FOCUS_DEPTH};
use orchay_task_graph::FocusDepth;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Task input or graph query error exit code
pub const EXIT_INPUT: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(orchay_graph::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Task file or graph query error (exit code 3)
    #[error("Task input error: {message}")]
    #[diagnostic(code(orchay_graph::cli::input))]
    Input {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Other unexpected error (exit code 3)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(orchay_graph::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new input error
    #[must_use]
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new input error with help text
    #[must_use]
    pub fn input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: None,
        }
    }

    /// Add help text to an existing error, returning a new error with the help text set.
    #[must_use]
    pub fn with_help(self, help_text: impl Into<String>) -> Self {
        let help = Some(help_text.into());
        match self {
            Self::Config { message, .. } => Self::Config { message, help },
            Self::Input { message, .. } => Self::Input { message, help },
            Self::Other { message, .. } => Self::Other { message, help },
        }
    }
}

/// Bad query arguments are the caller's mistake; broken input is the task
/// file's.
impl From<orchay_task_graph::Error> for CliError {
    fn from(err: orchay_task_graph::Error) -> Self {
        match err {
            orchay_task_graph::Error::InvalidDepth { .. } => {
                Self::config_with_help(err.to_string(), "Pass a depth of 0 or more")
            }
            orchay_task_graph::Error::CycleDetected { .. } => Self::input(err.to_string()),
        }
    }
}

impl From<orchay_graph_view::Error> for CliError {
    fn from(err: orchay_graph_view::Error) -> Self {
        match err {
            orchay_graph_view::Error::Parse(source) => Self::input_with_help(
                format!("Failed to parse task file: {source}"),
                r#"Expected {"tasks": [...], "groups": [...]}"#,
            ),
            orchay_graph_view::Error::DuplicateTask { .. } => Self::input(err.to_string()),
            orchay_graph_view::Error::InvalidHierarchyMode { .. } => Self::config(err.to_string()),
            orchay_graph_view::Error::Graph(inner) => inner.into(),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::config_with_help(
            err.to_string(),
            "Check the keys in orchay-graph.toml: tasks, focus-depth, hierarchy-mode, output, log-level, log-format",
        )
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Input { .. } | CliError::Other { .. } => EXIT_INPUT,
    }
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": match err {
                CliError::Config { .. } => "config",
                CliError::Input { .. } => "input",
                CliError::Other { .. } => "other",
            },
            "message": err.to_string()
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Output format for command results
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[must_use]
pub enum OutputFormat {
    /// Single-line JSON
    #[default]
    Json,
    /// Indented JSON
    Pretty,
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Write a command result to stdout.
///
/// With `envelope` set the value is wrapped in an [`OkEnvelope`].
///
/// # Errors
///
/// Fails when serialization or the write fails.
pub fn write_output<T: Serialize>(
    value: &T,
    format: OutputFormat,
    envelope: bool,
) -> Result<(), CliError> {
    let text = if envelope {
        encode(&OkEnvelope::new(value), format)
    } else {
        encode(value, format)
    }
    .map_err(|e| CliError::other(format!("Failed to serialize output: {e}")))?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}")
        .and_then(|()| stdout.flush())
        .map_err(|e| CliError::other(format!("Failed to write output: {e}")))
}

fn encode<T: Serialize>(value: &T, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(value),
        OutputFormat::Pretty => serde_json::to_string_pretty(value),
    }
}

/// Query an orchay task file's dependency graph.
#[derive(Parser, Debug)]
#[command(name = "orchay-graph")]
#[command(about = "Query the dependency graph of an orchay task file")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Task file to read.
    #[arg(long, short = 't', global = true, env = "ORCHAY_TASKS")]
    pub tasks: Option<PathBuf>,

    /// Config file; defaults to ./orchay-graph.toml when present.
    #[arg(long, short = 'c', global = true, env = "ORCHAY_GRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        env = "ORCHAY_LEVEL",
        value_enum
    )]
    pub level: Option<LogLevel>,

    /// Log output format.
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<TracingFormat>,

    /// Result output format.
    #[arg(long, short = 'o', global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Emit JSON envelopes for results and errors.
    #[arg(long, global = true, help = "Emit JSON envelope for results and errors")]
    pub json: bool,
}

impl Cli {
    /// Task file from the flag, env or config file.
    ///
    /// # Errors
    ///
    /// Fails when none of them names one.
    pub fn tasks_path(&self, config: &Config) -> Result<PathBuf, CliError> {
        self.tasks
            .clone()
            .or_else(|| config.tasks.clone())
            .ok_or_else(|| {
                CliError::config_with_help(
                    "No task file given",
                    "Pass --tasks <PATH>, set ORCHAY_TASKS, or add `tasks = \"...\"` to orchay-graph.toml",
                )
            })
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tasks within N hops of a task, in either direction.
    Focus {
        /// Task at the centre of the view.
        task: String,
        /// Hop bound.
        #[arg(long, short = 'd', allow_negative_numbers = true)]
        depth: Option<i64>,
    },
    /// Topological level of every task.
    Levels {
        /// Fail with an input error when dependencies form a cycle.
        #[arg(long)]
        strict: bool,
    },
    /// Positioned nodes and edges for the graph canvas.
    View(ViewArgs),
    /// Highlight classes relative to a selected task.
    Highlight {
        /// The selected task.
        task: String,
    },
    /// Task and dependency counts.
    Stats,
    /// Encode a filter as a shareable URL query string.
    FilterUrl(FilterArgs),
}

/// Filter flags shared by `view` and `filter-url`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Start from this URL query string; other flags override its fields.
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// Categories to keep.
    #[arg(long = "category", value_delimiter = ',')]
    pub categories: Vec<String>,

    /// Status codes to keep, with or without brackets (`im` or `[im]`).
    #[arg(long = "status", value_delimiter = ',')]
    pub statuses: Vec<String>,

    /// Grouping: full, wp or act.
    #[arg(long)]
    pub hierarchy: Option<String>,

    /// Task to focus on.
    #[arg(long)]
    pub focus: Option<String>,

    /// Focus depth, clamped to 1..=3.
    #[arg(long, short = 'd', allow_negative_numbers = true)]
    pub depth: Option<i64>,
}

impl FilterArgs {
    /// Build the filter: query string first, then config defaults, then flags.
    ///
    /// The focus depth is clamped to the range a shared query string can
    /// carry, so the encoded filter parses back unchanged.
    ///
    /// # Errors
    ///
    /// Fails for an unknown hierarchy mode or a negative depth.
    pub fn to_filter(&self, config: &Config) -> Result<GraphFilter, CliError> {
        let mut filter = match &self.query {
            Some(query) => GraphFilter::parse_query(query),
            None => GraphFilter {
                hierarchy_mode: config.hierarchy_mode,
                focus_depth: config.focus_depth,
                ..GraphFilter::default()
            },
        };

        if !self.categories.is_empty() {
            filter.categories.clone_from(&self.categories);
        }
        if !self.statuses.is_empty() {
            filter.statuses = self.statuses.iter().map(|s| bracket_status(s)).collect();
        }
        if let Some(mode) = &self.hierarchy {
            filter.hierarchy_mode = mode.parse::<HierarchyMode>()?;
        }
        if let Some(depth) = self.depth {
            filter.focus_depth = FocusDepth::try_from(depth)?.get();
        }
        if let Some(task) = &self.focus {
            filter.focus_task = Some(task.clone());
        }

        let clamped = filter.focus_depth.clamp(MIN_FOCUS_DEPTH, MAX_FOCUS_DEPTH);
        if clamped != filter.focus_depth {
            warn!(
                requested = filter.focus_depth,
                depth = clamped,
                "Filter focus depth out of range, clamping"
            );
            filter.focus_depth = clamped;
        }
        Ok(filter)
    }
}

fn bracket_status(status: &str) -> String {
    let code = status.trim().trim_start_matches('[').trim_end_matches(']');
    format!("[{code}]")
}

/// `view` arguments.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Filter flags.
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Groups to draw collapsed.
    #[arg(long = "collapse", value_delimiter = ',')]
    pub collapse: Vec<String>,
}

impl Commands {
    /// Resolve flags against config defaults.
    ///
    /// # Errors
    ///
    /// Fails when a flag value is invalid.
    pub fn into_command(self, config: &Config) -> Result<Command, CliError> {
        Ok(match self {
            Self::Focus { task, depth } => Command::Focus {
                task,
                depth: match depth {
                    Some(depth) => FocusDepth::try_from(depth)?.get(),
                    None => config.focus_depth,
                },
            },
            Self::Levels { strict } => Command::Levels { strict },
            Self::View(args) => Command::View {
                filter: args.filter.to_filter(config)?,
                collapsed: args.collapse,
            },
            Self::Highlight { task } => Command::Highlight { task },
            Self::Stats => Command::Stats,
            Self::FilterUrl(args) => Command::FilterUrl {
                filter: args.to_filter(config)?,
            },
        })
    }
}

/// Parse process arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
