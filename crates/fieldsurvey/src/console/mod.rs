//! Line-oriented terminal front-end for the screens.
//!
//! Each screen has a small command language parsed from one input line. The
//! drivers are generic over the input and output streams so they can be
//! exercised with scripted input.

mod home;
mod login;
mod survey;

use std::io::{BufRead, Write};

use thiserror::Error;

use crate::error::Result;

pub use home::{render_archive, run_home};
pub use login::{run_login, AuthCommand};
pub use survey::{run_survey, WizardCommand};

/// A console line that did not parse as a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseCommandError(pub String);

impl ParseCommandError {
    fn unknown(line: &str) -> Self {
        Self(format!("unknown command '{line}' (type 'help')"))
    }
}

/// Split a line into a lowercase keyword and the untouched remainder.
fn split_command(line: &str) -> (String, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_ascii_lowercase(), rest.trim()),
        None => (line.to_ascii_lowercase(), ""),
    }
}

/// Paired input and output streams.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Wrap the given streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one line. `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the streams fail.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Mutable access to the output stream.
    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    /// Consume the console and return the output stream.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl Console<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Console over the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}
