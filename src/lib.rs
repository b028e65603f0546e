//! Audit reporting for a USDT-margined futures trading API.
//!
//! Wrap any [`FuturesApi`] implementation in [`Instrumented`] and every
//! state-changing call (placing, closing, cancelling orders, setting stop
//! loss / take profit) produces a one-line report. The report is written to
//! a log sink and, when configured, pushed to a notifier such as Telegram.
//! Read-only calls pass straight through.
//!
//! Reporting is a side channel: an instrumented call returns exactly what the
//! wrapped call returned, including its error, whatever happens to the log
//! or the notification.
//!
//! # Core Types
//!
//! - [`FuturesApi`]: the trading operations, with typed request structs
//! - [`Instrumented`]: the reporting wrapper
//! - [`LogSink`] / [`Notifier`]: report destinations
//! - [`TracingLog`], [`TelegramNotifier`]: production sinks
//! - [`AuditTrail`], [`MemoryNotifier`]: in-memory sinks for tests
//! - [`Config`]: file and environment configuration
//!
//! # Examples
//!
//! ```
//! use futures_audit::audit::{classify, extract, format_success, Category};
//! use futures_audit::CallArgs;
//!
//! assert_eq!(classify("close_position"), Category::Audited);
//! assert_eq!(classify("get_price"), Category::Passthrough);
//!
//! let args = CallArgs::new().arg("ETHUSDT").arg("short").arg(2.5);
//! let fields = extract("set_stop_loss_take_profit", &args);
//! assert_eq!(
//!     format_success("set_stop_loss_take_profit", &fields),
//!     "Set SL/TP for ETHUSDT (short)"
//! );
//! ```
//!
//! In a service, build the wrapper from configuration and keep the logging
//! guard alive:
//!
//! ```no_run
//! # fn run<A: futures_audit::FuturesApi>(exchange: A) -> Result<(), futures_audit::Error> {
//! use futures_audit::{logging, Config, Instrumented};
//!
//! let config = Config::load(Some("audit.toml".as_ref()))?;
//! let _guard = logging::init(&config.logging)?;
//! let api = Instrumented::from_config(exchange, &config)?;
//! # let _ = api;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod args;
pub mod audit;
pub mod config;
mod error;
mod exclusion;
pub mod logging;
mod models;
pub mod request;
mod secret;
mod sink;
mod telegram;

pub use api::{FuturesApi, Operation};
pub use args::{render_value, CallArgs, Value};
pub use audit::{AuditTrail, Audited, Dispatch, Instrumented, NotifyStatus, Report, Severity};
pub use config::Config;
pub use error::{Error, SinkError};
pub use exclusion::ExclusionRecord;
pub use logging::LogTime;
pub use models::{Balance, Candle, OpenOrder, OrderAck, Position, PositionSide};
pub use request::{
    AuditedRequest, CancelOrderRequest, ClosePositionRequest, HistoryRequest, LimitOrderRequest,
    MarketOrderRequest, ProtectiveLevelsRequest,
};
pub use secret::Secret;
pub use sink::{LogSink, MemoryNotifier, Notifier, TracingLog, ERROR_TARGET, GENERAL_TARGET};
pub use telegram::TelegramNotifier;
