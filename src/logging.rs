//! Log file setup for [`TracingLog`](crate::TracingLog).
//!
//! [`init`] installs a global `tracing` subscriber writing to two daily
//! rotated files under the configured directory:
//!
//! ```text
//! {dir}/general_logs/general.YYYY-MM-DD.log   INFO and WARN
//! {dir}/error_logs/error.YYYY-MM-DD.log       ERROR
//! ```
//!
//! plus an optional stderr layer filtered by `RUST_LOG`. The files only
//! receive report lines written through [`TracingLog`](crate::TracingLog);
//! the crate's own diagnostics and events from other crates go to the
//! console layer alone. Timestamps are written as `YYYY-MM-DD HH:MM:SS` in
//! the configured timezone.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::error::Error;
use crate::sink::{ERROR_TARGET, GENERAL_TARGET};

/// Timestamp layout used in every log line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats `at` in `tz` using [`TIMESTAMP_FORMAT`].
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use futures_audit::logging::format_timestamp;
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 1, 16, 30, 0).unwrap();
/// assert_eq!(format_timestamp(at, chrono_tz::Asia::Taipei), "2024-03-02 00:30:00");
/// ```
pub fn format_timestamp(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format(TIMESTAMP_FORMAT).to_string()
}

/// Timezone used when none is configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Taipei;

/// Epoch values above this are taken as milliseconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e10;

/// A caller-supplied time for a log line.
///
/// Exchange payloads carry times in several shapes; each converts into a
/// `LogTime` and is normalised by [`format_log_time`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LogTime {
    /// The current time
    #[default]
    Now,
    /// Seconds since the Unix epoch; milliseconds are detected by magnitude
    Epoch(f64),
    /// `YYYY-MM-DD HH:MM:SS` (kept as is) or an ISO-8601 string
    Text(String),
    /// An instant in UTC
    Utc(DateTime<Utc>),
    /// An instant with a fixed offset
    Zoned(DateTime<FixedOffset>),
    /// A wall-clock time without offset, taken as UTC
    Naive(NaiveDateTime),
}

impl From<i64> for LogTime {
    fn from(value: i64) -> Self {
        LogTime::Epoch(value as f64)
    }
}

impl From<u64> for LogTime {
    fn from(value: u64) -> Self {
        LogTime::Epoch(value as f64)
    }
}

impl From<f64> for LogTime {
    fn from(value: f64) -> Self {
        LogTime::Epoch(value)
    }
}

impl From<&str> for LogTime {
    fn from(value: &str) -> Self {
        LogTime::Text(value.to_string())
    }
}

impl From<String> for LogTime {
    fn from(value: String) -> Self {
        LogTime::Text(value)
    }
}

impl From<DateTime<Utc>> for LogTime {
    fn from(value: DateTime<Utc>) -> Self {
        LogTime::Utc(value)
    }
}

impl From<DateTime<FixedOffset>> for LogTime {
    fn from(value: DateTime<FixedOffset>) -> Self {
        LogTime::Zoned(value)
    }
}

impl From<NaiveDateTime> for LogTime {
    fn from(value: NaiveDateTime) -> Self {
        LogTime::Naive(value)
    }
}

impl fmt::Display for LogTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogTime::Now => f.write_str("now"),
            LogTime::Epoch(value) => write!(f, "{}", value),
            LogTime::Text(text) => f.write_str(text),
            LogTime::Utc(at) => f.write_str(&at.to_rfc3339()),
            LogTime::Zoned(at) => f.write_str(&at.to_rfc3339()),
            LogTime::Naive(at) => write!(f, "{}", at),
        }
    }
}

/// Returns true for text shaped like `YYYY-MM-DD HH:MM:SS`.
fn is_log_format(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 19
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b' ',
            13 | 16 => *b == b':',
            _ => b.is_ascii_digit(),
        })
}

fn from_epoch(value: f64) -> Result<DateTime<Utc>, Error> {
    let invalid = || Error::InvalidTime(value.to_string());
    if !value.is_finite() {
        return Err(invalid());
    }

    let secs = if value > EPOCH_MILLIS_THRESHOLD {
        value / 1000.0
    } else {
        value
    };
    let whole = secs.floor();
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);

    DateTime::from_timestamp(whole as i64, nanos).ok_or_else(invalid)
}

fn parse_iso(text: &str) -> Result<DateTime<Utc>, Error> {
    let text = text.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
        if let Ok(at) = DateTime::parse_from_str(text, format) {
            return Ok(at.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(at.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
        .ok_or_else(|| Error::InvalidTime(text.to_string()))
}

/// Normalises `time` to [`TIMESTAMP_FORMAT`] in `tz`.
///
/// Text already in that layout is returned unchanged. Naive times are taken
/// as UTC.
///
/// # Errors
///
/// Returns [`Error::InvalidTime`] for unparseable text and for epoch values
/// that are not finite or out of range.
///
/// # Examples
///
/// ```
/// use futures_audit::logging::{format_log_time, LogTime};
///
/// let tz = chrono_tz::Asia::Taipei;
/// assert_eq!(format_log_time(&LogTime::from(1_704_067_200_000_i64), tz).unwrap(), "2024-01-01 08:00:00");
/// assert_eq!(format_log_time(&"2024-01-01T00:00:00Z".into(), tz).unwrap(), "2024-01-01 08:00:00");
/// assert!(format_log_time(&"yesterday".into(), tz).is_err());
/// ```
pub fn format_log_time(time: &LogTime, tz: Tz) -> Result<String, Error> {
    let at = match time {
        LogTime::Now => Utc::now(),
        LogTime::Epoch(value) => from_epoch(*value)?,
        LogTime::Text(text) if is_log_format(text) => return Ok(text.clone()),
        LogTime::Text(text) => parse_iso(text)?,
        LogTime::Utc(at) => *at,
        LogTime::Zoned(at) => at.with_timezone(&Utc),
        LogTime::Naive(at) => at.and_utc(),
    };
    Ok(format_timestamp(at, tz))
}

/// Timer writing wall-clock time in a fixed timezone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedTimer {
    tz: Tz,
}

impl ZonedTimer {
    /// Creates a timer for `tz`.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl FormatTime for ZonedTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", format_timestamp(Utc::now(), self.tz))
    }
}

/// Keeps the background log writers alive.
///
/// Dropping the guard flushes buffered lines; hold it for the lifetime of
/// the process.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _general: WorkerGuard,
    _error: WorkerGuard,
}

impl fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingGuard").finish_non_exhaustive()
    }
}

fn rolling(dir: &Path, prefix: &str, keep: usize) -> Result<RollingFileAppender, Error> {
    std::fs::create_dir_all(dir)?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(keep)
        .build(dir)
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if the timezone is unknown, the log directories cannot
/// be created, or a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard, Error> {
    let timer = ZonedTimer::new(config.tz()?);

    let general = rolling(&config.dir.join("general_logs"), "general", config.backup_count)?;
    let error = rolling(&config.dir.join("error_logs"), "error", config.backup_count)?;
    let (general_writer, general_guard) = tracing_appender::non_blocking(general);
    let (error_writer, error_guard) = tracing_appender::non_blocking(error);

    let general_layer = tracing_subscriber::fmt::layer()
        .with_writer(general_writer)
        .with_ansi(false)
        .with_target(false)
        .with_timer(timer)
        .with_filter(filter_fn(|meta| {
            let level = *meta.level();
            meta.target() == GENERAL_TARGET && level <= Level::INFO && level != Level::ERROR
        }));

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_writer)
        .with_ansi(false)
        .with_target(false)
        .with_timer(timer)
        .with_filter(filter_fn(|meta| {
            meta.target() == ERROR_TARGET && *meta.level() == Level::ERROR
        }));

    let console_layer = config.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_timer(timer)
            .with_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
    });

    tracing_subscriber::registry()
        .with(general_layer)
        .with(error_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    tracing::info!(
        dir = %config.dir.display(),
        timezone = %config.timezone,
        backup_count = config.backup_count,
        "audit logging initialised"
    );

    Ok(LoggingGuard {
        _general: general_guard,
        _error: error_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_use_configured_zone() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(format_timestamp(at, chrono_tz::UTC), "2024-01-01 00:00:00");
        assert_eq!(
            format_timestamp(at, chrono_tz::Asia::Taipei),
            "2024-01-01 08:00:00"
        );
        assert_eq!(
            format_timestamp(at, chrono_tz::America::New_York),
            "2023-12-31 19:00:00"
        );
    }

    fn taipei(time: impl Into<LogTime>) -> Result<String, Error> {
        format_log_time(&time.into(), chrono_tz::Asia::Taipei)
    }

    #[test]
    fn epoch_seconds_and_millis() {
        assert_eq!(taipei(1_704_067_200_i64).unwrap(), "2024-01-01 08:00:00");
        assert_eq!(taipei(1_704_067_200_000_i64).unwrap(), "2024-01-01 08:00:00");
        assert_eq!(taipei(1_704_067_200.75_f64).unwrap(), "2024-01-01 08:00:00");
        assert_eq!(taipei(0_u64).unwrap(), "1970-01-01 08:00:00");
    }

    #[test]
    fn epoch_out_of_range_is_invalid() {
        assert!(matches!(taipei(f64::NAN), Err(Error::InvalidTime(_))));
        assert!(matches!(taipei(f64::INFINITY), Err(Error::InvalidTime(_))));
        assert!(matches!(taipei(1e300_f64), Err(Error::InvalidTime(_))));
    }

    #[test]
    fn log_layout_text_is_kept_verbatim() {
        assert_eq!(taipei("2023-06-30 23:59:59").unwrap(), "2023-06-30 23:59:59");
        assert!(is_log_format("2023-06-30 23:59:59"));
        assert!(!is_log_format("2023-06-30T23:59:59"));
        assert!(!is_log_format("2023-06-30 23:59"));
    }

    #[test]
    fn iso_text_is_converted() {
        assert_eq!(taipei("2024-01-01T00:00:00Z").unwrap(), "2024-01-01 08:00:00");
        assert_eq!(
            taipei("2024-01-01T09:30:00+09:00").unwrap(),
            "2024-01-01 08:30:00"
        );
        assert_eq!(
            taipei("2024-01-01T00:00:00.123456").unwrap(),
            "2024-01-01 08:00:00"
        );
        assert_eq!(taipei("2024-01-01").unwrap(), "2024-01-01 08:00:00");
    }

    #[test]
    fn unparseable_text_is_invalid() {
        assert!(matches!(taipei("yesterday"), Err(Error::InvalidTime(_))));
        assert!(matches!(taipei(""), Err(Error::InvalidTime(_))));
    }

    #[test]
    fn datetimes_are_converted() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(taipei(utc).unwrap(), "2024-01-01 08:00:00");

        let tokyo = FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
            .unwrap();
        assert_eq!(taipei(tokyo).unwrap(), "2024-01-01 08:00:00");

        let naive = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(taipei(naive).unwrap(), "2024-01-01 08:00:00");
    }

    #[test]
    fn now_is_well_formed() {
        let now = taipei(LogTime::Now).unwrap();
        assert!(is_log_format(&now), "{now}");
        assert_eq!(LogTime::default(), LogTime::Now);
    }

    #[test]
    fn rolling_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("general_logs");

        let appender = rolling(&nested, "general", 3);

        assert!(appender.is_ok());
        assert!(nested.is_dir());
    }
}
