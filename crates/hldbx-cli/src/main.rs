// crates/hldbx-cli/src/main.rs
// ============================================================================
// Module: hldbx CLI Entry Point
// Description: Command dispatcher for the hldbx setup tool.
// Purpose: Own the process boundary: logging, exit codes, and stderr output.
// Dependencies: clap, hldbx-cli, hldbx-config, hldbx-workspace, tracing-subscriber
// ============================================================================

//! ## Overview
//! The binary builds its root command from an explicit [`COMMANDS`] table,
//! initializes diagnostics, and runs the selected handler. Every failure
//! from the setup core ends up here as a localized message on stderr and a
//! failing exit code; nothing below this file terminates the process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;

use hldbx_cli::Console;
use hldbx_cli::SetupContext;
use hldbx_cli::commands::CliError;
use hldbx_cli::commands::CliResult;
use hldbx_cli::commands::CommandSpec;
use hldbx_cli::commands::GlobalArgs;
use hldbx_cli::commands::Selection;
use hldbx_cli::commands::root_command;
use hldbx_cli::commands::select;
use hldbx_cli::run_autoscan;
use hldbx_cli::t;
use hldbx_cli::token_cache::default_token_cache_path;
use hldbx_config::AutoscanConfig;
use hldbx_workspace::HttpScannerAuthenticator;
use hldbx_workspace::HttpWorkspaceConnector;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ============================================================================
// SECTION: Command Table
// ============================================================================

/// Subcommands in display order.
const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "autoscan",
        about_key: "command.autoscan.about",
        handler: command_autoscan,
    },
    CommandSpec {
        name: "version",
        about_key: "command.version.about",
        handler: command_version,
    },
];

/// Release version reported by `version` and used for notebook paths.
const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let matches = root_command(COMMANDS).get_matches();
    match select(COMMANDS, &matches)? {
        Selection::Help => {
            show_help()?;
            Ok(ExitCode::SUCCESS)
        }
        Selection::Run {
            command,
            globals,
        } => {
            init_logging(&globals.log_level)?;
            (command.handler)(&globals)
        }
    }
}

/// Installs the stderr diagnostic subscriber.
fn init_logging(level: &str) -> CliResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|err| CliError::new(t!("logging.invalid_level", value = level, error = err)))?,
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .map_err(|err| CliError::new(t!("logging.init_failed", error = err)))
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `autoscan` command.
fn command_autoscan(globals: &GlobalArgs) -> CliResult<ExitCode> {
    let mut config = match AutoscanConfig::load(globals.config.as_deref()) {
        Ok(config) => config,
        Err(err) if err.is_not_found() => {
            info!(error = %err, "starting from an empty configuration");
            write_stderr_line(&t!("config.defaults"))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            AutoscanConfig::default()
        }
        Err(err) => return Err(CliError::new(t!("config.load_failed", error = err))),
    };

    let connector = HttpWorkspaceConnector::default();
    let authenticator = HttpScannerAuthenticator::default();
    let token_cache = default_token_cache_path();
    let context = SetupContext {
        connector: &connector,
        authenticator: &authenticator,
        token_cache: token_cache.as_deref(),
        version: VERSION,
    };
    let mut console = Console::stdio();
    run_autoscan(&mut console, &mut config, &context)
        .map_err(|err| CliError::new(t!("autoscan.failed", error = err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `version` command.
fn command_version(_globals: &GlobalArgs) -> CliResult<ExitCode> {
    write_stdout_line(&t!("main.version", version = VERSION))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints root usage.
fn show_help() -> CliResult<()> {
    let mut command = root_command(COMMANDS);
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
