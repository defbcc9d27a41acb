//! Line-oriented shell loop

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use super::dispatch::{Control, Interpreter};
use super::output::Output;

/// Marker echoed around commands when input is not a terminal
pub const BATCH_MARKER: &str = "(hbnb) ";

/// Where console lines come from
pub trait LineSource {
    /// Reads the next line without its terminator, `None` at end of input
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Returns true if the source shows the prompt itself
    fn is_interactive(&self) -> bool;
}

/// Piped input, read line by line
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub struct BatchSource<R> {
    input: R,
    buf: Vec<u8>,
}

impl<R: BufRead> BatchSource<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> LineSource for BatchSource<R> {
    fn next_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        self.buf.clear();
        let read = self
            .input
            .read_until(b'\n', &mut self.buf)
            .context("Failed to read console input")?;
        if read == 0 {
            return Ok(None);
        }

        while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
            self.buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Console session over an interpreter
pub struct Console {
    interpreter: Interpreter,
    prompt: String,
}

impl Console {
    pub fn new(interpreter: Interpreter, prompt: impl Into<String>) -> Self {
        Self {
            interpreter,
            prompt: prompt.into(),
        }
    }

    /// Reads and executes lines until `quit`, `EOF` or end of input
    ///
    /// An interactive source shows the configured prompt before every read.
    /// Otherwise a bare marker opens the session and the fixed
    /// [`BATCH_MARKER`] is echoed after each command.
    pub fn run<S: LineSource, W: Write>(&mut self, source: &mut S, out: &mut Output<W>) -> Result<()> {
        let batch = !source.is_interactive();
        if batch {
            out.line(BATCH_MARKER.trim_end())?;
        }

        loop {
            out.flush()?;

            let control = match source.next_line(&self.prompt)? {
                Some(line) => self.interpreter.onecmd(&line, out)?,
                None => {
                    out.verbose("end of input");
                    self.interpreter.onecmd("EOF", out)?
                }
            };

            if batch && control != Control::Eof {
                out.text(BATCH_MARKER)?;
            }
            if control != Control::Continue {
                break;
            }
        }

        out.flush()?;
        Ok(())
    }
}
