//! Audit reporting for state-changing trading operations.
//!
//! This module provides:
//! - `classify`: decides whether an operation is audited or passed through
//! - `extract`: derives report fields from a call's arguments
//! - `format`: turns fields and an outcome into a one-line summary
//! - `Instrumented`: wraps a [`FuturesApi`](crate::FuturesApi) and reports
//!   every audited call to a log sink and an optional notifier
//! - `AuditTrail`: in-memory log sink for inspecting reports
//!
//! Reporting never changes what the caller sees: an audited call returns the
//! same value, or the same error, as the unwrapped call would.

mod classify;
mod extract;
mod format;
mod interceptor;
mod report;
mod trail;

pub use classify::{classify, Category, AUDITED_OPERATIONS, PASSTHROUGH_OPERATIONS};
pub use extract::{extract, Fields};
pub use format::{format_failure, format_success};
pub use interceptor::{Audited, Dispatch, Instrumented, NotifyStatus};
pub use report::{CallEnvelope, CallOutcome, Report, Severity};
pub use trail::{AuditTrail, TrailEntry};
