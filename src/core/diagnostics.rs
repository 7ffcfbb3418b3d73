//! Categorized, non-fatal diagnostics
//!
//! Every rejected operation and every silent correction in the lifecycle core
//! ends up here. Entries are logged through `tracing` when recorded and kept
//! in order so callers (and tests) can inspect what happened.

use ahash::AHashSet;

use super::error::ThingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub error: ThingError,
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    once_keys: AHashSet<u64>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, error: ThingError) {
        tracing::error!("{}", error);
        self.entries.push(Diagnostic { severity: Severity::Error, error });
    }

    pub fn warning(&mut self, error: ThingError) {
        tracing::warn!("{}", error);
        self.entries.push(Diagnostic { severity: Severity::Warning, error });
    }

    /// Record an error only the first time `key` is seen
    pub fn error_once(&mut self, key: u64, error: ThingError) {
        if self.once_keys.insert(key) {
            self.error(error);
        }
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn errors(&self) -> impl Iterator<Item = &ThingError> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ThingError> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.error)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop recorded entries; once-keys are kept
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
