use crate::domains::logger::{DomainLogger, LogLevel};
use std::sync::Arc;

/// Forwards every message to each of its targets in order.
pub struct MultiLogger {
    targets: Vec<Arc<dyn DomainLogger>>,
}

impl MultiLogger {
    pub fn new(targets: Vec<Arc<dyn DomainLogger>>) -> Self {
        Self { targets }
    }
}

impl DomainLogger for MultiLogger {
    fn debug(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.debug(msg));
    }

    fn info(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.error(msg));
    }
}

/// File logger with console echo; falls back to the console alone when fast_log cannot start.
pub fn init_combined_logger(path: &str, level: LogLevel) -> Arc<dyn DomainLogger> {
    let console = crate::adapters::outbound::init_console_logger(level);
    match crate::adapters::outbound::file_logger::init_file_logger(path, level) {
        Ok(file_logger) => Arc::new(MultiLogger::new(vec![file_logger, console])) as Arc<dyn DomainLogger>,
        Err(e) => {
            console.warn(&e);
            console
        }
    }
}
