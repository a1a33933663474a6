use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// Verbosity of the run-level event log, separate from the `log` facade used
/// for diagnostics.
#[derive(PartialEq, PartialOrd, Debug, Default, Clone, Copy)]
pub enum LogLevel {
    #[default]
    None,
    Warn,
    Info,
    Debug,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogLevel::None => "NONE",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        })
    }
}

impl From<u64> for LogLevel {
    fn from(ulevel: u64) -> Self {
        match ulevel {
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::None,
        }
    }
}

enum Sink {
    Stdout,
    Discard,
    Capture(Mutex<Vec<String>>),
}

pub struct Logger {
    level: LogLevel,
    sink: Sink,
}

impl Logger {
    pub fn new(ulevel: u64) -> Self {
        Logger { level: ulevel.into(), sink: Sink::Stdout }
    }

    /// Drops every line, including the ones `always` emits.
    pub fn silent() -> Self {
        Logger { level: LogLevel::None, sink: Sink::Discard }
    }

    /// Keeps lines in memory instead of printing them.
    pub fn capturing(level: LogLevel) -> Self {
        Logger { level, sink: Sink::Capture(Mutex::new(Vec::new())) }
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::None && level <= self.level
    }

    pub fn log(&self, level: LogLevel, args: std::fmt::Arguments<'_>) {
        if self.enabled(level) {
            self.emit(level, args);
        }
    }

    /// Bypasses the level filter. Used for run completion and stalls, which
    /// are shown even with logging off.
    pub fn always(&self, level: LogLevel, args: std::fmt::Arguments<'_>) {
        self.emit(level, args);
    }

    fn emit(&self, level: LogLevel, args: std::fmt::Arguments<'_>) {
        let line = format!("[{}] {}", level, args);
        match &self.sink {
            Sink::Stdout => println!("{}", line),
            Sink::Discard => {}
            Sink::Capture(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(line);
                }
            }
        }
    }

    pub fn captured(&self) -> Vec<String> {
        match &self.sink {
            Sink::Capture(lines) => lines.lock().map(|l| l.clone()).unwrap_or_default(),
            Sink::Stdout | Sink::Discard => Vec::new(),
        }
    }
}

#[macro_export]
macro_rules! log {
    // usage: log!(logger, LogLevel::Info, "pc {} halted", pc)
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        $logger.log($level, format_args!($($arg)+));
    }};
}
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => (
        $crate::log!($logger, $crate::sim::log::LogLevel::Info, $($arg)+);
    )
}
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => (
        $crate::log!($logger, $crate::sim::log::LogLevel::Debug, $($arg)+);
    )
}
