//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialize logging
//! - Delegate to command handlers
//! - Map failures to exit statuses
//!
//! # Exit Status
//!
//! - `0`: success
//! - `2`: configuration or input error (after waiting for ENTER when
//!   interactive)
//! - `1`: any other failure

pub mod args;
pub mod commands;

pub use args::{Cli, ClearTarget, Command, ReportArgs};

use std::process::ExitCode;

use anyhow::Result;
use log::debug;
use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::paths::AppPaths;
use crate::core::types::TypeError;
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts::{PromptError, Prompter};

/// Exit status for configuration and input errors.
pub const EXIT_USAGE: u8 = 2;

/// Exit status for every other failure.
pub const EXIT_FAILURE: u8 = 1;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags and the environment.
#[derive(Debug, Clone)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
    /// Where settings and secrets are stored.
    pub paths: AppPaths,
}

impl Context {
    /// Output verbosity for this run.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Invalid or missing user input.
#[derive(Debug, Error)]
pub enum InputError {
    /// A required value was not supplied and could not be prompted for.
    #[error("{what} is required; pass {flag} or run interactively")]
    Missing {
        what: &'static str,
        flag: &'static str,
    },

    /// A required value was entered empty.
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// The work item ID is not a positive integer.
    #[error("{0}. A valid ADO work item ID (e.g. 3421) is required to continue.")]
    InvalidItemId(TypeError),

    /// Input ended before a value was given.
    #[error("input cancelled")]
    Cancelled,
}

impl InputError {
    /// Translate a prompt failure for the value `what` (flag `flag`).
    pub fn from_prompt(err: PromptError, what: &'static str, flag: &'static str) -> anyhow::Error {
        match err {
            PromptError::NotInteractive => InputError::Missing { what, flag }.into(),
            PromptError::Cancelled => InputError::Cancelled.into(),
            other => anyhow::Error::new(other).context(format!("failed to read {}", what)),
        }
    }
}

/// Initialize the `log` backend.
///
/// Defaults to warnings only; `--debug` enables this crate's debug output.
/// `RUST_LOG` overrides both.
pub fn init_logging(debug: bool) {
    let default = if debug { "warn,ado_history=debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}

/// Pick the exit status for a failed run.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    let usage = err
        .chain()
        .any(|cause| cause.is::<InputError>() || cause.is::<ConfigError>());
    if usage {
        EXIT_USAGE
    } else {
        EXIT_FAILURE
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let interactive = cli.interactive();
    debug!("interactive: {}", interactive);

    match execute(cli, interactive) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            let code = exit_code_for(&err);
            if code == EXIT_USAGE && interactive {
                let _ = Prompter::stdio(true).wait_for_enter();
            }
            ExitCode::from(code)
        }
    }
}

fn execute(cli: Cli, interactive: bool) -> Result<()> {
    let paths = AppPaths::from_env().ok_or(ConfigError::NoHomeDir)?;
    debug!("config file: {}", paths.config_path().display());

    let ctx = Context {
        debug: cli.debug,
        quiet: cli.quiet,
        interactive,
        paths,
    };

    commands::dispatch(cli.command, &cli.report, &ctx)
}
