// crates/hldbx-cli/src/commands.rs
// ============================================================================
// Module: Command Table
// Description: Explicit subcommand table and root dispatcher construction.
// Purpose: Build the command tree once from plain data, without registries.
// Dependencies: clap, thiserror
// ============================================================================

//! ## Overview
//! Each subcommand is a [`CommandSpec`] value: a name, a catalog key for its
//! description, and a handler. The binary passes its table to
//! [`root_command`] to build the clap tree and to [`select`] to pick the
//! handler for parsed arguments. Global flags live in [`GlobalArgs`] and are
//! accepted before or after the subcommand name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgMatches;
use clap::Args;
use clap::Command;
use clap::FromArgMatches;
use thiserror::Error;

use crate::i18n::translate;
use crate::t;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Binary name shown in usage output.
pub const BINARY_NAME: &str = "hldbx";

/// Default diagnostic log level.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    #[must_use]
    pub const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Command Types
// ============================================================================

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Configuration file path (defaults to `HLDBX_CONFIG` or ~/.hl/hldbx.yaml).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
    /// Diagnostic log level or filter directive; `RUST_LOG` takes precedence.
    #[arg(long, value_name = "LEVEL", default_value = DEFAULT_LOG_LEVEL, global = true)]
    pub log_level: String,
}

/// Handler invoked for a selected subcommand.
pub type CommandHandler = fn(&GlobalArgs) -> CliResult<ExitCode>;

/// One subcommand of the root dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    /// Subcommand name.
    pub name: &'static str,
    /// Catalog key for the subcommand description.
    pub about_key: &'static str,
    /// Handler run when the subcommand is selected.
    pub handler: CommandHandler,
}

/// What the parsed arguments ask for.
#[derive(Debug)]
pub enum Selection<'a> {
    /// No subcommand was given.
    Help,
    /// Run the handler of `command` with `globals`.
    Run {
        /// Selected subcommand.
        command: &'a CommandSpec,
        /// Parsed global flags.
        globals: GlobalArgs,
    },
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Builds the root command from `commands`.
#[must_use]
pub fn root_command(commands: &[CommandSpec]) -> Command {
    let root = Command::new(BINARY_NAME)
        .about(t!("main.about"))
        .disable_help_subcommand(true)
        .disable_version_flag(true);
    let root = GlobalArgs::augment_args(root);
    commands.iter().fold(root, |root, spec| {
        root.subcommand(Command::new(spec.name).about(translate(spec.about_key, Vec::new())))
    })
}

/// Maps parsed arguments onto an entry of `commands`.
///
/// # Errors
///
/// Returns [`CliError`] when the global flags cannot be extracted or the
/// subcommand is not in `commands`.
pub fn select<'a>(commands: &'a [CommandSpec], matches: &ArgMatches) -> CliResult<Selection<'a>> {
    let globals =
        GlobalArgs::from_arg_matches(matches).map_err(|err| CliError::new(err.to_string()))?;
    let Some(name) = matches.subcommand_name() else {
        return Ok(Selection::Help);
    };
    commands
        .iter()
        .find(|spec| spec.name == name)
        .map(|command| Selection::Run {
            command,
            globals,
        })
        .ok_or_else(|| CliError::new(t!("command.unknown", name = name)))
}
