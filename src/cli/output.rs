//! Output handling for console commands
//!
//! Command results and usage errors go to the wrapped writer (stdout in
//! the binary). Verbose diagnostics go to stderr so batch output stays
//! stable.

use std::fmt::Display;
use std::io::{self, Write};

/// Output helper for consistent formatting
pub struct Output<W: Write> {
    out: W,
    verbose: bool,
}

impl<W: Write> Output<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    /// Prints a line of command output
    pub fn line(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.out, "{}", message)
    }

    /// Prints text without a trailing newline (prompts and markers)
    pub fn text(&mut self, message: &str) -> io::Result<()> {
        write!(self.out, "{}", message)
    }

    /// Prints a list of items as `[a, b, c]`
    pub fn list<I, T>(&mut self, items: I) -> io::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let rendered: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
        writeln!(self.out, "[{}]", rendered.join(", "))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Returns true if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(output: Output<Vec<u8>>) -> String {
        String::from_utf8(output.into_inner()).unwrap()
    }

    #[test]
    fn line_and_text() {
        let mut output = Output::new(Vec::new(), false);
        output.text("(hbnb) ").unwrap();
        output.line(42).unwrap();
        assert_eq!(captured(output), "(hbnb) 42\n");
    }

    #[test]
    fn list_formatting() {
        let mut output = Output::new(Vec::new(), false);
        output.list(Vec::<String>::new()).unwrap();
        output.list(["a", "b"]).unwrap();
        assert_eq!(captured(output), "[]\n[a, b]\n");
    }

    #[test]
    fn verbose_never_touches_stdout() {
        let output = Output::new(Vec::new(), true);
        output.verbose("hello");
        output.verbose_ctx("create", "hello");
        assert!(output.is_verbose());
        assert!(output.get_ref().is_empty());
    }
}
