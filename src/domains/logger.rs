use log::{debug as log_debug, error as log_error, info as log_info, warn as log_warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Domain-level logging port.
/// Non-fallible from the caller's point of view; decision code never fails because logging did.
pub trait DomainLogger: Send + Sync + 'static {
    fn debug(&self, msg: &str);
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn DomainLogger>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

/// Writes through the `log` facade into a `fast_log` file appender.
pub struct FileLogger;

impl FileLogger {
    /// Initialize the fast_log backend. May only succeed once per process.
    pub fn init(path: &str, level: LogLevel) -> Result<(), Box<dyn std::error::Error>> {
        fast_log::init(
            fast_log::config::Config::new()
                .file(path)
                .level(level.as_filter()),
        )?;
        Ok(())
    }
}

impl DomainLogger for FileLogger {
    fn debug(&self, msg: &str) {
        log_debug!("{}", msg);
    }

    fn info(&self, msg: &str) {
        log_info!("{}", msg);
    }

    fn warn(&self, msg: &str) {
        log_warn!("{}", msg);
    }

    fn error(&self, msg: &str) {
        log_error!("{}", msg);
    }
}
