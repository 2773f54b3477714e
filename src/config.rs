//! Run configuration threaded from the command line
//!
//! There is no global state: the binary builds one [`Config`] and passes it
//! to the printers, the parser and the fatal-error reporter.

use crate::parser::error::{FatalError, MAX_PARSE_ERRORS};
use crate::printer::PrintOptions;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub show_whitespace: bool,
    pub show_comments: bool,
    pub color: bool,
    /// How many recorded parse errors are kept before new ones are dropped
    pub max_errors: usize,
    /// Where fatal errors are appended, in addition to stderr
    pub error_log: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_whitespace: true,
            show_comments: true,
            color: false,
            max_errors: MAX_PARSE_ERRORS,
            error_log: None,
        }
    }
}

impl Config {
    pub fn print_options(&self) -> PrintOptions {
        PrintOptions {
            show_whitespace: self.show_whitespace,
            show_comments: self.show_comments,
            color: self.color,
        }
    }

    /// Report a fatal parse error for `path`.
    ///
    /// The error always goes to the log; when `error_log` is set it is also
    /// appended there, one line per failure.
    pub fn report_fatal(&self, path: &Path, err: &FatalError) -> io::Result<()> {
        let line = fatal_line(path, err);
        error!("{line}");

        if let Some(log_path) = &self.error_log {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;
            writeln!(file, "{line}")?;
        }
        Ok(())
    }
}

fn fatal_line(path: &Path, err: &FatalError) -> String {
    let location = err.location();
    format!(
        "{}:{}:{}: {}",
        path.display(),
        location.line,
        location.column,
        err
    )
}
