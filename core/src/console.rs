//! Prefixed console lines.
//!
//! `ERROR:` lines go to the error stream; `INFO:`, `SUCCESS:` and plain help
//! lines go to the output stream. Lines are unstyled.

use std::fmt::Display;
use std::io::{self, Stderr, Stdout, Write};

/// A pair of output and error writers.
///
/// # Examples
///
/// ```
/// use cmdtree_core::Console;
///
/// let mut console = Console::new(Vec::new(), Vec::new());
/// console.info("building").unwrap();
/// console.error("boom").unwrap();
///
/// let (out, err) = console.into_parts();
/// assert_eq!(String::from_utf8(out).unwrap(), "INFO: building\n");
/// assert_eq!(String::from_utf8(err).unwrap(), "ERROR: boom\n");
/// ```
#[derive(Debug)]
pub struct Console<O, E> {
    out: O,
    err: E,
}

impl Console<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Console<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn error(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.err, "ERROR: {message}")
    }

    pub fn info(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.out, "INFO: {message}")
    }

    pub fn success(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.out, "SUCCESS: {message}")
    }

    /// Writes `text` to the output stream as is.
    pub fn write_raw(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    pub fn into_parts(self) -> (O, E) {
        (self.out, self.err)
    }
}
