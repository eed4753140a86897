use crate::domains::logger::{DomainLogger, LogLevel};
use std::sync::Mutex;

/// Keeps every message in memory so tests can assert on what was logged.
#[derive(Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: LogLevel, msg: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.push((level, msg.to_string()));
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|(_, m)| m.contains(needle))
    }
}

impl DomainLogger for MemoryLogger {
    fn debug(&self, msg: &str) {
        self.push(LogLevel::Debug, msg);
    }
    fn info(&self, msg: &str) {
        self.push(LogLevel::Info, msg);
    }
    fn warn(&self, msg: &str) {
        self.push(LogLevel::Warn, msg);
    }
    fn error(&self, msg: &str) {
        self.push(LogLevel::Error, msg);
    }
}
