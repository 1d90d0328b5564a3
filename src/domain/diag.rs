//! Leveled diagnostics collected during a build.
//!
//! The core never aborts content generation: failures degrade to "leave the
//! original markup" or "contribute zero duration" plus a diagnostic here.
//! Entries are mirrored through `tracing` as they are recorded, and kept in
//! order so the surrounding tooling can surface them after the build.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Error,
    Warning,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A single leveled message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

/// Ordered collection of diagnostics for one build session
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error-level diagnostic
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        self.entries.push(Diagnostic {
            level: Level::Error,
            message,
        });
    }

    /// Record a warning-level diagnostic
    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.entries.push(Diagnostic {
            level: Level::Warning,
            message,
        });
    }

    /// All recorded diagnostics, in the order they occurred
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Whether any error-level diagnostic was recorded
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.level == Level::Error)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
