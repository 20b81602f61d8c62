//! Coloured operator output.

use crossterm::style::{Color, Stylize};
use std::io::{self, Write};

/// Orange used for question banners
const BANNER: Color = Color::Rgb {
    r: 0xFF,
    g: 0xA5,
    b: 0x00,
};

/// Writes progress, results and warnings for the operator.
///
/// `quiet` suppresses everything except errors; `verbose` enables detail
/// lines.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Create an output manager.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Whether detail lines are printed
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Plain informational line
    pub fn info(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(io::stdout().lock(), "{}", message)
    }

    /// Detail line, only in verbose mode
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.is_verbose() {
            return Ok(());
        }
        writeln!(io::stdout().lock(), "{}", message.with(Color::DarkGrey))
    }

    /// Step in progress
    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(io::stdout().lock(), "{} {}", "→".with(Color::Cyan), message)
    }

    /// Completed step
    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(io::stdout().lock(), "{} {}", "✓".with(Color::Green), message)
    }

    /// Warning, on stderr
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(io::stderr().lock(), "{}", message.with(Color::Yellow))
    }

    /// Error, on stderr, printed even in quiet mode
    pub fn error(&self, message: &str) -> io::Result<()> {
        writeln!(io::stderr().lock(), "{}", message.with(Color::Red))
    }

    /// Question banner shown above a menu
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(
            io::stdout().lock(),
            "\n{}",
            title.with(Color::Black).on(BANNER).bold()
        )
    }

    /// Indented line, used for streamed subprocess output
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(io::stdout().lock(), "   {}", message)
    }

    /// A labelled value with the value highlighted
    pub fn field(&self, label: &str, value: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(
            io::stdout().lock(),
            "{} {}",
            label.with(Color::Green),
            value
        )
    }
}

impl Default for OutputManager {
    fn default() -> Self {
        Self::new(false, false)
    }
}
