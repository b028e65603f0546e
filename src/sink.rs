//! Report sinks.
//!
//! Two independent sinks receive every report:
//! - a [`LogSink`], which records it durably,
//! - an optional [`Notifier`], which forwards it on a best-effort basis.
//!
//! Both are shared for the lifetime of an [`Instrumented`](crate::Instrumented)
//! wrapper and may be called from several threads at once, so implementations
//! must be `Send + Sync` and do their own synchronization.

use chrono::Utc;
use chrono_tz::Tz;
use parking_lot::Mutex;

use crate::error::SinkError;
use crate::logging::{format_log_time, format_timestamp, LogTime, DEFAULT_TIMEZONE};

/// Target of report lines written through [`TracingLog::write`].
pub const GENERAL_TARGET: &str = "futures_audit::general";

/// Target of report lines written through [`TracingLog::write_error`].
pub const ERROR_TARGET: &str = "futures_audit::error";

/// Durable destination for report text.
pub trait LogSink: Send + Sync {
    /// Writes a report at normal severity.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the line could not be recorded.
    fn write(&self, message: &str) -> Result<(), SinkError>;

    /// Writes a report at error severity.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the line could not be recorded.
    fn write_error(&self, message: &str) -> Result<(), SinkError>;
}

/// Best-effort delivery of report text to a fixed destination.
pub trait Notifier: Send + Sync {
    /// Attempts to deliver `message`.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if delivery failed. The caller records the failure
    /// and carries on.
    fn send(&self, message: &str) -> Result<(), SinkError>;
}

/// Log sink backed by `tracing`.
///
/// Normal reports are emitted at `INFO` under [`GENERAL_TARGET`], error
/// reports at `ERROR` under [`ERROR_TARGET`]. File output, rotation and
/// timestamps are configured by [`logging::init`](crate::logging::init).
///
/// [`write_at`](TracingLog::write_at) and
/// [`write_error_at`](TracingLog::write_error_at) attach a caller-supplied
/// time as a `log_time` field, normalised to this sink's timezone. A time
/// that cannot be read is replaced by the current time and a warning goes
/// to the error log.
///
/// # Examples
///
/// ```
/// use futures_audit::{LogSink, TracingLog};
///
/// let log = TracingLog::new();
/// log.write("✅ SUCCESS: Closed long position for BTCUSDT").unwrap();
/// log.write_at("✅ SUCCESS: Filled", 1_704_067_200_000_i64).unwrap();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TracingLog {
    tz: Tz,
}

impl Default for TracingLog {
    fn default() -> Self {
        Self::with_timezone(DEFAULT_TIMEZONE)
    }
}

impl TracingLog {
    /// Creates a tracing-backed log sink using [`DEFAULT_TIMEZONE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that renders caller-supplied times in `tz`.
    pub fn with_timezone(tz: Tz) -> Self {
        Self { tz }
    }

    /// Timezone used for `log_time` fields.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Writes a normal report stamped with `time`.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` matches [`LogSink::write`].
    pub fn write_at(&self, message: &str, time: impl Into<LogTime>) -> Result<(), SinkError> {
        let stamp = self.stamp(&time.into(), "write_at");
        tracing::info!(target: GENERAL_TARGET, log_time = %stamp, "{}", message);
        Ok(())
    }

    /// Writes an error report stamped with `time`.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` matches [`LogSink::write_error`].
    pub fn write_error_at(&self, message: &str, time: impl Into<LogTime>) -> Result<(), SinkError> {
        let stamp = self.stamp(&time.into(), "write_error_at");
        tracing::error!(target: ERROR_TARGET, log_time = %stamp, "{}", message);
        Ok(())
    }

    fn stamp(&self, time: &LogTime, caller: &str) -> String {
        match format_log_time(time, self.tz) {
            Ok(stamp) => stamp,
            Err(_) => {
                let now = format_timestamp(Utc::now(), self.tz);
                tracing::error!(
                    target: ERROR_TARGET,
                    log_time = %now,
                    "[WARNING] Invalid time format in {}: {}. Using current time instead.",
                    caller,
                    time
                );
                now
            }
        }
    }
}

impl LogSink for TracingLog {
    fn write(&self, message: &str) -> Result<(), SinkError> {
        tracing::info!(target: GENERAL_TARGET, "{}", message);
        Ok(())
    }

    fn write_error(&self, message: &str) -> Result<(), SinkError> {
        tracing::error!(target: ERROR_TARGET, "{}", message);
        Ok(())
    }
}

/// Notifier that keeps delivered messages in memory.
///
/// Useful for tests and dry runs where no external channel is available.
///
/// # Examples
///
/// ```
/// use futures_audit::{MemoryNotifier, Notifier};
///
/// let notifier = MemoryNotifier::new();
/// notifier.send("hello").unwrap();
/// assert_eq!(notifier.messages(), vec!["hello"]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    /// Creates an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the delivered messages.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Returns the number of delivered messages.
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Returns `true` if nothing was delivered.
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl Notifier for MemoryNotifier {
    fn send(&self, message: &str) -> Result<(), SinkError> {
        self.messages.lock().push(message.to_string());
        Ok(())
    }
}
