//! Per-call envelope and the report derived from it.

use std::fmt;

use super::extract::Fields;
use super::format::{format_failure, format_success};

/// Severity of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The operation succeeded
    Normal,
    /// The operation failed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Normal => write!(f, "normal"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Outcome of an audited call as far as reporting is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The underlying call has not returned yet
    Pending,
    /// The underlying call returned normally
    Succeeded,
    /// The underlying call failed with the given description
    Failed(String),
}

/// Ephemeral record of one audited invocation.
///
/// Created when the call is entered, completed once the underlying call has
/// returned, and consumed into a [`Report`]. It never outlives the call.
#[derive(Debug, Clone)]
pub struct CallEnvelope {
    operation: String,
    fields: Fields,
    outcome: CallOutcome,
}

impl CallEnvelope {
    /// Opens an envelope for a call to `operation`.
    pub fn new(operation: impl Into<String>, fields: Fields) -> Self {
        Self {
            operation: operation.into(),
            fields,
            outcome: CallOutcome::Pending,
        }
    }

    /// Returns the operation name.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns the extracted fields.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Returns the current outcome.
    pub fn outcome(&self) -> &CallOutcome {
        &self.outcome
    }

    /// Marks the underlying call as successful.
    pub fn succeed(mut self) -> Self {
        self.outcome = CallOutcome::Succeeded;
        self
    }

    /// Marks the underlying call as failed.
    pub fn fail(mut self, error: &dyn std::error::Error) -> Self {
        self.outcome = CallOutcome::Failed(error.to_string());
        self
    }

    /// Consumes the envelope into a report.
    ///
    /// Returns `None` while the outcome is still pending.
    pub fn into_report(self) -> Option<Report> {
        let (summary, severity, error) = match self.outcome {
            CallOutcome::Pending => return None,
            CallOutcome::Succeeded => (
                format_success(&self.operation, &self.fields),
                Severity::Normal,
                None,
            ),
            CallOutcome::Failed(error) => (
                format_failure(&self.operation, &self.fields),
                Severity::Error,
                Some(error),
            ),
        };

        Some(Report {
            severity,
            summary,
            details: self.fields,
            error,
        })
    }
}

/// A formatted report about one audited call.
///
/// # Example
///
/// ```
/// use futures_audit::CallArgs;
/// use futures_audit::audit::{extract, CallEnvelope, Severity};
///
/// let args = CallArgs::new().arg("BTCUSDT").arg("long");
/// let envelope = CallEnvelope::new("close_position", extract("close_position", &args));
/// let report = envelope.succeed().into_report().unwrap();
///
/// assert_eq!(report.severity(), Severity::Normal);
/// assert_eq!(report.summary(), "Closed long position for BTCUSDT");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    severity: Severity,
    summary: String,
    details: Fields,
    error: Option<String>,
}

impl Report {
    /// Returns the report severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the one-line summary.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Returns the extracted fields.
    pub fn details(&self) -> &Fields {
        &self.details
    }

    /// Returns the description of the underlying error, if the call failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Renders the text sent to the sinks.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Normal => write!(f, "✅ SUCCESS: {}", self.summary)?,
            Severity::Error => write!(f, "❌ ERROR: {}", self.summary)?,
        }

        if !self.details.is_empty() {
            let details = serde_json::to_string(&self.details).map_err(|_| fmt::Error)?;
            write!(f, "\nDetails: {}", details)?;
        }
        if let Some(error) = &self.error {
            write!(f, "\nError: {}", error)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{CallArgs, Value};
    use crate::audit::extract;

    #[derive(Debug)]
    struct Timeout;

    impl fmt::Display for Timeout {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "timeout")
        }
    }

    impl std::error::Error for Timeout {}

    #[test]
    fn pending_envelope_has_no_report() {
        let envelope = CallEnvelope::new("cancel_order", Fields::new());
        assert_eq!(envelope.outcome(), &CallOutcome::Pending);
        assert!(envelope.into_report().is_none());
    }

    #[test]
    fn success_report_renders_details() {
        let args = CallArgs::new().arg("BTCUSDT").arg("long");
        let report = CallEnvelope::new("close_position", extract("close_position", &args))
            .succeed()
            .into_report()
            .unwrap();

        assert_eq!(report.error(), None);
        assert_eq!(
            report.render(),
            "✅ SUCCESS: Closed long position for BTCUSDT\n\
             Details: {\"position\":\"long\",\"symbol\":\"BTCUSDT\"}"
        );
    }

    #[test]
    fn failure_report_carries_error() {
        let mut fields = Fields::new();
        fields.insert("symbol", Value::from("ETHUSDT"));

        let report = CallEnvelope::new("cancel_order", fields)
            .fail(&Timeout)
            .into_report()
            .unwrap();

        assert_eq!(report.severity(), Severity::Error);
        assert_eq!(report.summary(), "Failed to cancel orders for ETHUSDT");
        assert_eq!(report.error(), Some("timeout"));
        assert!(report.render().starts_with("❌ ERROR: Failed to cancel orders for ETHUSDT"));
        assert!(report.render().ends_with("\nError: timeout"));
    }

    #[test]
    fn empty_details_are_omitted() {
        let report = CallEnvelope::new("cancel_order", Fields::new())
            .succeed()
            .into_report()
            .unwrap();

        assert_eq!(report.render(), "✅ SUCCESS: Cancelled orders for unknown");
    }

    #[test]
    fn severity_display() {
        assert_eq!(Severity::Normal.to_string(), "normal");
        assert_eq!(Severity::Error.to_string(), "error");
    }
}
