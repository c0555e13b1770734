//! ui::prompts
//!
//! Interactive prompts.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! every prompt fails with [`PromptError::NotInteractive`] so the caller can
//! report which value is missing instead of blocking on stdin.
//!
//! The reader and writer are generic so tests can drive a [`Prompter`] with
//! in-memory buffers.
//!
//! # Example
//!
//! ```
//! use ado_history::ui::prompts::Prompter;
//!
//! let input = b"contoso\nyes\n";
//! let mut out = Vec::new();
//! let mut prompter = Prompter::new(&input[..], &mut out, true);
//!
//! let org = prompter.input("Enter your organization: ").unwrap();
//! assert_eq!(org, "contoso");
//! assert!(prompter.confirm_remember("organization").unwrap());
//! ```

use std::io::{self, BufRead, IsTerminal, StdinLock, Stdout, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<io::Error> for PromptError {
    fn from(e: io::Error) -> Self {
        PromptError::IoError(e.to_string())
    }
}

/// Line-oriented prompter over a reader/writer pair.
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
    interactive: bool,
    /// Read passwords from the terminal without echo
    mask_passwords: bool,
}

impl Prompter<StdinLock<'static>, Stdout> {
    /// Prompter on the process's stdin/stdout.
    ///
    /// Password input is masked when stdin is a terminal.
    pub fn stdio(interactive: bool) -> Self {
        let stdin = io::stdin();
        let mask_passwords = stdin.is_terminal();
        Self {
            reader: stdin.lock(),
            writer: io::stdout(),
            interactive,
            mask_passwords,
        }
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Create a prompter over arbitrary streams. Passwords are echoed.
    pub fn new(reader: R, writer: W, interactive: bool) -> Self {
        Self {
            reader,
            writer,
            interactive,
            mask_passwords: false,
        }
    }

    /// Prompt for a line of text.
    ///
    /// Returns the line without its terminator. End of input is
    /// [`PromptError::Cancelled`].
    pub fn input(&mut self, message: &str) -> Result<String, PromptError> {
        if !self.interactive {
            return Err(PromptError::NotInteractive);
        }
        write!(self.writer, "{}", message)?;
        self.writer.flush()?;
        self.read_line()
    }

    /// Prompt for masked input (tokens).
    pub fn password(&mut self, message: &str) -> Result<String, PromptError> {
        if !self.interactive {
            return Err(PromptError::NotInteractive);
        }
        if self.mask_passwords {
            return Ok(rpassword::prompt_password(message)?);
        }
        self.input(message)
    }

    /// Ask whether to remember a value; only `YES` (any case) agrees.
    ///
    /// End of input counts as declining.
    pub fn confirm_remember(&mut self, what: &str) -> Result<bool, PromptError> {
        let message = format!("Type \"YES\" to remember your {}: ", what);
        match self.input(&message) {
            Ok(answer) => Ok(answer.trim().eq_ignore_ascii_case("yes")),
            Err(PromptError::Cancelled) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Block until the user presses ENTER. No-op when not interactive.
    pub fn wait_for_enter(&mut self) -> Result<(), PromptError> {
        if !self.interactive {
            return Ok(());
        }
        writeln!(self.writer)?;
        write!(self.writer, "Press ENTER to exit.")?;
        self.writer.flush()?;
        match self.read_line() {
            Ok(_) | Err(PromptError::Cancelled) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn read_line(&mut self) -> Result<String, PromptError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
