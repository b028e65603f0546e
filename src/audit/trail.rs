//! In-memory log sink.
//!
//! `AuditTrail` records every line written to it together with its severity,
//! which makes reports easy to inspect in tests and dry runs.

use parking_lot::Mutex;

use super::Severity;
use crate::error::SinkError;
use crate::sink::LogSink;

/// A line recorded by an [`AuditTrail`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailEntry {
    /// Severity the line was written at
    pub severity: Severity,
    /// The line itself
    pub message: String,
}

/// In-memory recorder implementing [`LogSink`].
///
/// # Example
///
/// ```
/// use futures_audit::LogSink;
/// use futures_audit::audit::{AuditTrail, Severity};
///
/// let trail = AuditTrail::new();
/// trail.write("placed").unwrap();
/// trail.write_error("failed").unwrap();
///
/// assert_eq!(trail.len(), 2);
/// assert_eq!(trail.with_severity(Severity::Error), vec!["failed"]);
/// ```
#[derive(Debug, Default)]
pub struct AuditTrail {
    entries: Mutex<Vec<TrailEntry>>,
}

impl AuditTrail {
    /// Creates a new empty audit trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded entries, oldest first.
    pub fn entries(&self) -> Vec<TrailEntry> {
        self.entries.lock().clone()
    }

    /// Returns the messages recorded at `severity`, oldest first.
    pub fn with_severity(&self, severity: Severity) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.severity == severity)
            .map(|e| e.message.clone())
            .collect()
    }

    /// Returns the number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Clears all recorded entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn record(&self, severity: Severity, message: &str) {
        self.entries.lock().push(TrailEntry {
            severity,
            message: message.to_string(),
        });
    }
}

impl LogSink for AuditTrail {
    fn write(&self, message: &str) -> Result<(), SinkError> {
        self.record(Severity::Normal, message);
        Ok(())
    }

    fn write_error(&self, message: &str) -> Result<(), SinkError> {
        self.record(Severity::Error, message);
        Ok(())
    }
}
