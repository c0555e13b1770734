//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves its inputs (flags, saved settings, prompts)
//! 2. Calls into the library modules to do the work
//! 3. Formats and displays output
//!
//! # Async
//!
//! Fetching revisions is async because it involves network I/O. The report
//! handler builds a tokio runtime and blocks on the fetch.

mod clear;
mod report;

pub use clear::clear;
pub use report::report;

use super::args::{Command, ReportArgs};
use super::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
///
/// `clear` forgets the chosen settings; when interactive it then continues
/// into a normal run so the values can be entered again.
pub fn dispatch(command: Option<Command>, args: &ReportArgs, ctx: &Context) -> Result<()> {
    match command {
        None => report::report(ctx, args),
        Some(Command::Clear { target }) => {
            clear::clear(ctx, target)?;
            if ctx.interactive {
                report::report(ctx, args)?;
            }
            Ok(())
        }
    }
}
