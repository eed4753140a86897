use crate::domains::logger::{DomainLogger, FileLogger, LogLevel};
use std::sync::Arc;

/// Initialize fast_log and return a domain logger instance the application can inject.
pub fn init_file_logger(path: &str, level: LogLevel) -> Result<Arc<dyn DomainLogger>, String> {
    FileLogger::init(path, level).map_err(|e| format!("Failed to initialize fast_log: {}", e))?;
    Ok(Arc::new(FileLogger))
}
