//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Invocation
//!
//! - no arguments: interactive run, prompting for anything not remembered
//! - `help` / `?` (any case): usage
//! - `clear [org|pat|loc]` (any case): forget remembered values
//!
//! Every prompt has a flag counterpart so runs can be scripted with
//! `--no-interactive`.

use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::core::config::MAX_PAGE_SIZE;

const AFTER_HELP: &str = "\
Note that you will need to supply a Personal Access Token (PAT) the first time you use the utility.
The PAT will be saved locally for subsequent use unless you opt out of storing it (in which case you'll be asked for it on each run).";

/// DevOps History Reporter - readable change logs from work item revisions
#[derive(Parser, Debug)]
#[command(name = "ado-history")]
#[command(author, version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Cli {
    #[command(flatten)]
    pub report: ReportArgs,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Never prompt; missing values are errors
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Values for a history run. Anything left out is taken from saved
/// settings or prompted for.
#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Work item ID (e.g. 3421)
    #[arg(long, value_name = "ID")]
    pub item: Option<String>,

    /// Azure DevOps organization
    #[arg(long, value_name = "ORG")]
    pub org: Option<String>,

    /// Folder the change log is written to
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Personal access token
    #[arg(long, env = "ADO_HISTORY_PAT", hide_env_values = true, value_name = "PAT")]
    pub token: Option<String>,

    /// Only report the first and last value of this field
    #[arg(long, value_name = "FIELD")]
    pub track_field: Option<String>,

    /// Also dump every revision's fields to {ID}-{REV}_Details.txt
    #[arg(long)]
    pub detail: bool,

    /// Revisions per page (at most 200) instead of inferring it from the
    /// first response
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..=MAX_PAGE_SIZE as u64))]
    pub page_size: Option<u64>,

    /// API base URL for Azure DevOps Server installations
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Forget remembered settings (all of them when no target is given)
    Clear {
        /// Which setting to forget
        #[arg(value_enum, ignore_case = true)]
        target: Option<ClearTarget>,
    },
}

/// A remembered setting.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    /// The organization
    Org,
    /// The personal access token
    Pat,
    /// The output folder location
    Loc,
}

impl Cli {
    /// Parse command-line arguments from the process environment.
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Interactive unless `--no-interactive` or `--quiet` is set or stdin is
    /// not a terminal.
    pub fn interactive(&self) -> bool {
        !(self.no_interactive || self.quiet) && io::stdin().is_terminal()
    }
}

/// Make the first argument case-insensitive for `help` and `clear`, and map
/// `?` to `help`.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    if let Some(first) = args.get_mut(1) {
        let replacement = match first.to_str() {
            Some("?") => Some("help".to_string()),
            Some(s) if s.eq_ignore_ascii_case("help") || s.eq_ignore_ascii_case("clear") => {
                Some(s.to_ascii_lowercase())
            }
            _ => None,
        };
        if let Some(replacement) = replacement {
            *first = replacement.into();
        }
    }

    args
}
