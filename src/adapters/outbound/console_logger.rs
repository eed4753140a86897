use crate::domains::logger::{DomainLogger, LogLevel};
use std::sync::Arc;

struct ConsoleBridge {
    min_level: LogLevel,
}

impl ConsoleBridge {
    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }
}

impl DomainLogger for ConsoleBridge {
    fn debug(&self, msg: &str) {
        if self.enabled(LogLevel::Debug) {
            println!("DEBUG: {}", msg);
        }
    }
    fn info(&self, msg: &str) {
        if self.enabled(LogLevel::Info) {
            println!("{}", msg);
        }
    }
    fn warn(&self, msg: &str) {
        if self.enabled(LogLevel::Warn) {
            println!("WARN: {}", msg);
        }
    }
    fn error(&self, msg: &str) {
        eprintln!("ERROR: {}", msg);
    }
}

/// Console-backed DomainLogger; messages below `min_level` are dropped.
pub fn init_console_logger(min_level: LogLevel) -> Arc<dyn DomainLogger> {
    Arc::new(ConsoleBridge { min_level })
}
