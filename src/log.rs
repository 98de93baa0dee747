//! Leveled diagnostics on stderr.
//!
//! Each line starts with a colored badge. Errors are always shown; warnings
//! and info need one `-v`, debug lines need two.

use std::fmt;
use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Style;

use crate::theme::catppuccin::Mocha;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    fn badge(self) -> &'static str {
        match self {
            Level::Error => " ERROR ",
            Level::Warn => " WARN ",
            Level::Info => " INFO ",
            Level::Debug => " DBUG ",
        }
    }

    fn style(self) -> Style {
        match self {
            Level::Error => Mocha::CRUST.on(Mocha::RED),
            Level::Warn => Mocha::CRUST.on(Mocha::YELLOW),
            Level::Info => Mocha::CRUST.on(Mocha::BLUE),
            Level::Debug => Mocha::TEXT.on(Mocha::SURFACE2),
        }
    }

    /// Lowest verbosity at which this level is shown.
    fn min_verbosity(self) -> u8 {
        match self {
            Level::Error => 0,
            Level::Warn | Level::Info => 1,
            Level::Debug => 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Logger {
    verbosity: u8,
    color: bool,
}

impl Logger {
    /// Colors follow the terminal: off when stderr is redirected or
    /// `NO_COLOR` is set.
    pub fn new(verbosity: u8) -> Self {
        let color = io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self { verbosity, color }
    }

    pub fn plain(verbosity: u8) -> Self {
        Self { verbosity, color: false }
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.verbosity >= level.min_verbosity()
    }

    /// The full line for `msg`, without the trailing newline.
    pub fn format_line(&self, level: Level, msg: &dyn fmt::Display) -> String {
        if self.color {
            format!("{} {msg}", level.style().paint(level.badge()))
        } else {
            format!("{} {msg}", level.badge().trim())
        }
    }

    pub fn log(&self, level: Level, msg: impl fmt::Display) {
        if !self.enabled(level) {
            return;
        }
        let line = self.format_line(level, &msg);
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
        let _ = stderr.flush();
    }

    pub fn error(&self, msg: impl fmt::Display) {
        self.log(Level::Error, msg);
    }

    pub fn warn(&self, msg: impl fmt::Display) {
        self.log(Level::Warn, msg);
    }

    pub fn info(&self, msg: impl fmt::Display) {
        self.log(Level::Info, msg);
    }

    pub fn debug(&self, msg: impl fmt::Display) {
        self.log(Level::Debug, msg);
    }
}
