//! Diagnostics sinks shared by the host shim and actions.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

/// Destination for user-facing messages produced during a lifecycle event.
pub trait Diagnostics: Send + Sync + std::fmt::Debug {
    fn write(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.write(Level::Info, message);
    }

    fn warning(&self, message: &str) {
        self.write(Level::Warning, message);
    }

    fn error(&self, message: &str) {
        self.write(Level::Error, message);
    }
}

/// Forwards every message to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn write(&self, level: Level, message: &str) {
        match level {
            Level::Info => tracing::info!("{message}"),
            Level::Warning => tracing::warn!("{message}"),
            Level::Error => tracing::error!("{message}"),
        }
    }
}

/// Keeps messages in memory so frontends can print a summary.
#[derive(Debug, Default)]
pub struct CollectedDiagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|d| d.level == level)
            .map(|d| d.message)
            .collect()
    }
}

impl Diagnostics for CollectedDiagnostics {
    fn write(&self, level: Level, message: &str) {
        tracing::debug!(?level, "{message}");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Diagnostic {
                level,
                message: message.to_string(),
            });
    }
}
