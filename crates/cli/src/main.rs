//! orchay-graph CLI entry point.

// Panic output bypasses tracing on purpose
#![allow(clippy::print_stderr)]

use orchay_graph::cli::{self, Cli, CliError, EXIT_OK, exit_code_for, render_error};
use orchay_graph::commands::{self, TaskInput};
use orchay_graph::config::Config;
use orchay_graph::tracing::{TracingConfig, init_tracing};

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    let json_mode = cli.json;

    let exit_code = match run(cli) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            render_error(&err, json_mode);
            exit_code_for(&err)
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<(), CliError> {
    let cwd = std::env::current_dir()
        .map_err(|e| CliError::other(format!("Cannot determine working directory: {e}")))?;
    let config = Config::discover(cli.config.as_deref(), &cwd)?;

    init_tracing(&TracingConfig {
        format: cli.log_format.unwrap_or(config.log_format),
        level: cli.level.unwrap_or(config.log_level),
        filter: None,
    })
    .map_err(|e| CliError::config(e.to_string()))?;

    let format = cli.output.unwrap_or(config.output);
    let tasks_path = cli.tasks_path(&config);
    let command = cli.command.into_command(&config)?;

    let input = if command.needs_tasks() {
        Some(TaskInput::load(&tasks_path?)?)
    } else {
        None
    };

    let output = commands::execute(&command, input.as_ref())?;
    cli::write_output(&output, format, cli.json)
}
