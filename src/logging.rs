use std::fmt;
use std::str::FromStr;
use colored::Colorize;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    ERROR,
    WARN,
    INFO,
    DEBUG,
    VERBOSE,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::INFO
    }
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::ERROR => LevelFilter::Error,
            LogLevel::WARN => LevelFilter::Warn,
            LogLevel::INFO => LevelFilter::Info,
            LogLevel::DEBUG => LevelFilter::Debug,
            LogLevel::VERBOSE => LevelFilter::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::ERROR),
            "warn" | "warning" => Ok(LogLevel::WARN),
            "info" => Ok(LogLevel::INFO),
            "debug" => Ok(LogLevel::DEBUG),
            "verbose" | "trace" => Ok(LogLevel::VERBOSE),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Installs the global logger. Fails if a logger is already set.
///
/// The dispatcher itself passes everything; the active level is the global max
/// level, so `set_level` can change it while running.
pub fn init(level: LogLevel) -> Result<(), log::SetLoggerError> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::BrightBlack);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Trace)
        .chain(std::io::stderr())
        .apply()?;

    set_level(level);
    Ok(())
}

pub fn set_level(level: LogLevel) {
    log::set_max_level(level.to_level_filter());
}
