// crates/hldbx-cli/src/prompt.rs
// ============================================================================
// Module: Input Prompter
// Description: Line and masked-secret prompts over a pluggable console.
// Purpose: Collect one trimmed value per prompt with blank-input policies.
// Dependencies: rpassword
// ============================================================================

//! ## Overview
//! [`Console`] pairs an input [`LineSource`] with an output writer. A
//! [`Prompt`] describes one question: its label, whether input is masked,
//! an optional default, and what a blank answer means.
//!
//! ## Invariants
//! - Returned values are trimmed.
//! - A blank answer yields the default when one is set, regardless of the
//!   blank policy.
//! - Read errors are reported and the same prompt is shown again; end of
//!   input is the only way [`Console::ask`] fails besides output errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::BufRead;
use std::io::IsTerminal;
use std::io::Write;

use crate::error::SetupError;
use crate::error::SetupResult;
use crate::t;

// ============================================================================
// SECTION: Input Sources
// ============================================================================

/// Source of operator input lines.
pub trait LineSource {
    /// Reads one line with echo; `Ok(None)` signals end of input.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the read fails.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Reads one line without echo; `Ok(None)` signals end of input.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the read fails.
    fn read_secret(&mut self) -> io::Result<Option<String>>;
}

/// Line source over a buffered reader.
///
/// Secrets are read from the terminal with echo disabled only when the
/// reader is attached to one; piped input supplies secrets like any other
/// line.
#[derive(Debug)]
pub struct ReaderSource<R> {
    /// Operator input.
    reader: R,
    /// Whether `reader` is an interactive terminal.
    terminal: bool,
}

impl<R: BufRead> ReaderSource<R> {
    /// Wraps `reader`; `terminal` selects no-echo secret reads.
    pub const fn new(reader: R, terminal: bool) -> Self {
        Self {
            reader,
            terminal,
        }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn read_secret(&mut self) -> io::Result<Option<String>> {
        if !self.terminal {
            return self.read_line();
        }
        match rpassword::read_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(err) => Err(err),
        }
    }
}

// ============================================================================
// SECTION: Prompt
// ============================================================================

/// What a blank answer means when no default is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlankPolicy {
    /// Ask again.
    Reprompt,
    /// Accept an empty value and say so.
    Optional,
    /// Accept an empty value silently; the caller treats it as "done".
    Finish,
}

/// A single question for the operator.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Label shown after "Enter".
    label: String,
    /// Disable echo while reading.
    masked: bool,
    /// Value returned for a blank answer.
    default: Option<String>,
    /// Blank-answer handling without a default.
    blank: BlankPolicy,
}

impl Prompt {
    /// Creates a required, echoed prompt.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            masked: false,
            default: None,
            blank: BlankPolicy::Reprompt,
        }
    }

    /// Reads the answer without echo.
    #[must_use]
    pub const fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    /// Accepts a blank answer as an empty optional value.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.blank = BlankPolicy::Optional;
        self
    }

    /// Accepts a blank answer as the operator finishing or exiting.
    #[must_use]
    pub const fn finish_on_blank(mut self) -> Self {
        self.blank = BlankPolicy::Finish;
        self
    }

    /// Returns `default` for a blank answer.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Renders the prompt text.
    fn text(&self) -> String {
        if self.masked {
            t!("prompt.masked", label = self.label)
        } else {
            t!("prompt.plain", label = self.label)
        }
    }
}

// ============================================================================
// SECTION: Console
// ============================================================================

/// Operator console: an input source plus an output writer.
pub struct Console {
    /// Operator input.
    input: Box<dyn LineSource>,
    /// Operator output.
    output: Box<dyn Write>,
}

impl Console {
    /// Creates a console over explicit input and output.
    #[must_use]
    pub fn new(input: Box<dyn LineSource>, output: Box<dyn Write>) -> Self {
        Self {
            input,
            output,
        }
    }

    /// Creates a console over the process standard streams.
    #[must_use]
    pub fn stdio() -> Self {
        let stdin = io::stdin();
        let terminal = stdin.is_terminal();
        Self::new(Box::new(ReaderSource::new(stdin.lock(), terminal)), Box::new(io::stdout()))
    }

    /// Writes one line of operator output.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Output`] when the write fails.
    pub fn say(&mut self, message: &str) -> SetupResult<()> {
        writeln!(self.output, "{message}").map_err(|err| SetupError::Output(err.to_string()))
    }

    /// Writes prompt text without a newline and flushes it.
    fn show(&mut self, text: &str) -> SetupResult<()> {
        write!(self.output, "{text}")
            .and_then(|()| self.output.flush())
            .map_err(|err| SetupError::Output(err.to_string()))
    }

    /// Asks `prompt` until it yields an acceptable value.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InputClosed`] at end of input and
    /// [`SetupError::Output`] when the prompt cannot be written.
    pub fn ask(&mut self, prompt: &Prompt) -> SetupResult<String> {
        loop {
            self.show(&prompt.text())?;
            let read = if prompt.masked { self.input.read_secret() } else { self.input.read_line() };
            if prompt.masked {
                self.say("")?;
            }
            let line = match read {
                Ok(Some(line)) => line,
                Ok(None) => return Err(SetupError::InputClosed),
                Err(err) => {
                    self.say(&t!("prompt.read_failed", label = prompt.label, error = err))?;
                    continue;
                }
            };
            let value = line.trim();
            if !value.is_empty() {
                return Ok(value.to_string());
            }
            if let Some(default) = &prompt.default {
                return Ok(default.clone());
            }
            match prompt.blank {
                BlankPolicy::Reprompt => {}
                BlankPolicy::Optional => {
                    self.say(&t!("prompt.optional_skipped"))?;
                    return Ok(String::new());
                }
                BlankPolicy::Finish => return Ok(String::new()),
            }
        }
    }
}
