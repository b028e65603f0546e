use thiserror::Error;

/// Error returned when a report could not be written to a sink.
///
/// Sink errors never reach the caller of an instrumented operation. They are
/// surfaced through [`Dispatch`](crate::audit::Dispatch) and, for notifier
/// failures, written to the error log.
#[derive(Debug, Error)]
pub enum SinkError {
    /// I/O error while writing the report.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport failed before the remote end answered.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote end answered but refused the message.
    #[error("rejected by {service}: {reason}")]
    Rejected {
        /// Service that refused the message
        service: &'static str,
        /// Reason reported by the service
        reason: String,
    },

    /// The sink no longer accepts reports.
    #[error("sink closed")]
    Closed,
}

impl SinkError {
    /// Creates a transport error from any displayable cause.
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        SinkError::Transport(cause.to_string())
    }
}

/// Errors produced while setting up the audit layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or incomplete configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A JSON document could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The tracing subscriber could not be installed
    #[error("failed to initialise logging: {0}")]
    Logging(String),

    /// A log time could not be interpreted
    #[error("unsupported log time: {0}")]
    InvalidTime(String),
}

impl Error {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }
}
