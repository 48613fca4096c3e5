//! Leveled, timestamped, colored console output.
//!
//! Every component reports through one [`Reporter`]. Lines look like
//! `[2025-01-31 14:02:11] [WARN] message`; banners and phase headers are
//! plain colored lines. Console write failures are ignored: losing a log line
//! must never abort a cleanup.

#![allow(missing_docs)]

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

use colored::{Color, Colorize};

use crate::logger::jsonl::{ActivityEvent, ActivityLog};

const RULE: &str = "========================================";

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Success,
}

impl LogLevel {
    const fn color(self) -> Color {
        match self {
            Self::Info => Color::Green,
            Self::Warn => Color::Yellow,
            Self::Error => Color::Red,
            Self::Success => Color::Cyan,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Success => "SUCCESS",
        };
        f.write_str(label)
    }
}

/// Console sink plus the optional activity log.
pub struct Reporter {
    out: Box<dyn Write>,
    activity: Option<ActivityLog>,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("activity", &self.activity)
            .finish_non_exhaustive()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Reporter {
    /// Reporter writing to the process stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::with_sink(Box::new(io::stdout()))
    }

    /// Reporter writing to an arbitrary sink.
    #[must_use]
    pub fn with_sink(out: Box<dyn Write>) -> Self {
        Self {
            out,
            activity: None,
        }
    }

    /// Attach an activity log; subsequent [`Reporter::record`] calls append to it.
    pub fn attach_activity_log(&mut self, log: ActivityLog) {
        self.activity = Some(log);
    }

    /// Timestamped line at the given level.
    pub fn log(&mut self, level: LogLevel, message: impl AsRef<str>) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{timestamp}] [{level}] {}", message.as_ref());
        self.colored_line(&line, level.color());
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }

    pub fn success(&mut self, message: impl AsRef<str>) {
        self.log(LogLevel::Success, message);
    }

    /// Untimestamped line in a given color.
    pub fn colored_line(&mut self, text: &str, color: Color) {
        let _ = writeln!(self.out, "{}", text.color(color));
    }

    pub fn blank(&mut self) {
        let _ = writeln!(self.out);
    }

    /// `====` rule, optionally with a title framed between two rules.
    pub fn separator(&mut self, title: Option<&str>) {
        self.colored_line(RULE, Color::Cyan);
        if let Some(title) = title {
            self.colored_line(&format!("    {title}"), Color::Cyan);
            self.colored_line(RULE, Color::Cyan);
        }
    }

    /// Blank line followed by `=== title ===`.
    pub fn phase_header(&mut self, title: &str, color: Color) {
        self.blank();
        self.colored_line(&format!("=== {title} ==="), color);
    }

    /// Question text without a trailing newline, flushed so it shows before
    /// input is read.
    pub fn prompt(&mut self, question: &str) {
        let _ = write!(self.out, "{question}");
        let _ = self.out.flush();
    }

    /// Append an event to the activity log, if one is attached. A failing
    /// activity log is reported once and then dropped.
    pub fn record(&mut self, event: &ActivityEvent) {
        let Some(log) = self.activity.as_mut() else {
            return;
        };
        if let Err(err) = log.append(event) {
            let path = log.path().display().to_string();
            self.activity = None;
            self.warn(format!("activity log {path} disabled: {err}"));
        }
    }
}

/// Cloneable in-memory sink; lets callers read back what a [`Reporter`] wrote.
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl CaptureSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).into_owned()
    }
}

impl Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
