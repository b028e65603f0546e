//! The call interceptor.
//!
//! [`Instrumented`] wraps a [`FuturesApi`] and implements the same trait.
//! Read-only operations are forwarded as-is. Audited operations run through
//! the following sequence on the calling thread:
//!
//! ```text
//! Entered -> Extracted -> Invoked -> Reported-Success | Reported-Failure -> Returned
//! ```
//!
//! Reports go to the log sink first and then, if configured, to the notifier.
//! Neither sink can change what the caller receives.

use std::fmt;
use std::sync::Arc;

use super::classify::{classify, Category};
use super::extract::extract;
use super::report::{CallEnvelope, Report, Severity};
use crate::api::FuturesApi;
use crate::args::CallArgs;
use crate::config::Config;
use crate::error::{Error, SinkError};
use crate::models::{Balance, Candle, OpenOrder, OrderAck, Position};
use crate::request::{
    AuditedRequest, CancelOrderRequest, ClosePositionRequest, HistoryRequest, LimitOrderRequest,
    MarketOrderRequest, ProtectiveLevelsRequest,
};
use crate::sink::{LogSink, Notifier, TracingLog};
use crate::telegram::TelegramNotifier;

/// What happened to the notification of a report.
#[derive(Debug)]
pub enum NotifyStatus {
    /// No notifier is configured
    Skipped,
    /// The notifier accepted the report
    Delivered,
    /// The notifier failed; the failure was written to the error log
    Failed(SinkError),
}

impl NotifyStatus {
    /// Returns true if the notifier accepted the report.
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotifyStatus::Delivered)
    }
}

/// How a report was dispatched to the sinks.
#[derive(Debug)]
pub struct Dispatch {
    /// Severity the report was logged at
    pub severity: Severity,
    /// Result of writing the report to the log sink
    pub log: Result<(), SinkError>,
    /// Result of the notification attempt
    pub notify: NotifyStatus,
}

/// Result of a call made through [`Instrumented::audit`].
///
/// Keeps the caller-visible outcome apart from the reporting outcome so the
/// two can be inspected independently.
#[derive(Debug)]
#[must_use]
pub struct Audited<T, E> {
    /// What the underlying operation returned, untouched
    pub outcome: Result<T, E>,
    /// Report dispatch, or `None` for passthrough operations
    pub dispatch: Option<Dispatch>,
}

impl<T, E> Audited<T, E> {
    /// Returns the underlying outcome, discarding the dispatch details.
    pub fn into_result(self) -> Result<T, E> {
        self.outcome
    }

    /// Returns true if a report was produced.
    pub fn is_reported(&self) -> bool {
        self.dispatch.is_some()
    }
}

/// A [`FuturesApi`] whose state-changing operations are logged and notified.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use futures_audit::{AuditTrail, Instrumented, MemoryNotifier};
/// # use futures_audit::{FuturesApi, OrderAck, Position, OpenOrder, Balance, Candle, PositionSide};
/// # use futures_audit::request::*;
/// # #[derive(Debug)] struct Never;
/// # impl std::fmt::Display for Never { fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { Ok(()) } }
/// # impl std::error::Error for Never {}
/// # struct Paper;
/// # impl FuturesApi for Paper {
/// #     type Error = Never;
/// #     fn set_stop_loss_take_profit(&self, r: ProtectiveLevelsRequest) -> Result<OrderAck, Never> { Ok(OrderAck::single(r.symbol, "1")) }
/// #     fn place_market_order(&self, r: MarketOrderRequest) -> Result<OrderAck, Never> { Ok(OrderAck::single(r.symbol, "1")) }
/// #     fn place_limit_order(&self, r: LimitOrderRequest) -> Result<OrderAck, Never> { Ok(OrderAck::single(r.symbol, "1")) }
/// #     fn close_position(&self, r: ClosePositionRequest) -> Result<OrderAck, Never> { Ok(OrderAck::single(r.symbol, "1")) }
/// #     fn cancel_order(&self, r: CancelOrderRequest) -> Result<OrderAck, Never> { Ok(OrderAck::single(r.symbol, "1")) }
/// #     fn get_positions(&self) -> Result<Vec<Position>, Never> { Ok(vec![]) }
/// #     fn get_open_orders(&self, _: Option<&str>) -> Result<Vec<OpenOrder>, Never> { Ok(vec![]) }
/// #     fn fetch_usdt_balance(&self) -> Result<Balance, Never> { Ok(Balance { total: 0.0, available: 0.0 }) }
/// #     fn get_price(&self, _: &str) -> Result<f64, Never> { Ok(1.0) }
/// #     fn get_historical_data(&self, _: HistoryRequest) -> Result<Vec<Candle>, Never> { Ok(vec![]) }
/// # }
///
/// let trail = Arc::new(AuditTrail::new());
/// let notifier = Arc::new(MemoryNotifier::new());
/// let api = Instrumented::new(Paper, trail.clone()).with_notifier(notifier.clone());
///
/// let request = LimitOrderRequest::new("BTCUSDT", PositionSide::Long, 65000.0);
/// api.place_limit_order(request).unwrap();
///
/// assert_eq!(trail.len(), 1);
/// assert!(notifier.messages()[0].contains("Placed limit long order for BTCUSDT at 65000"));
/// ```
#[derive(Clone)]
pub struct Instrumented<A> {
    inner: A,
    log: Arc<dyn LogSink>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl<A> Instrumented<A> {
    /// Wraps `inner`, reporting to `log` only.
    pub fn new(inner: A, log: Arc<dyn LogSink>) -> Self {
        Self {
            inner,
            log,
            notifier: None,
        }
    }

    /// Adds a notifier that receives every report after it is logged.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Wraps `inner` with sinks built from configuration.
    ///
    /// Reports are logged through [`TracingLog`] in the configured timezone;
    /// a [`TelegramNotifier`] is attached when both a bot token and a chat id
    /// are configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone is unknown or the Telegram client
    /// cannot be built.
    pub fn from_config(inner: A, config: &Config) -> Result<Self, Error> {
        let log = TracingLog::with_timezone(config.logging.tz()?);
        let instrumented = Self::new(inner, Arc::new(log));

        match TelegramNotifier::from_config(&config.telegram)? {
            Some(notifier) => Ok(instrumented.with_notifier(Arc::new(notifier))),
            None => {
                tracing::info!("telegram notifications disabled: no bot token or chat id");
                Ok(instrumented)
            }
        }
    }

    /// Returns the wrapped API.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Unwraps the API, dropping the sinks.
    pub fn into_inner(self) -> A {
        self.inner
    }

    /// Returns true if a notifier is attached.
    pub fn has_notifier(&self) -> bool {
        self.notifier.is_some()
    }

    /// Runs `call` against the wrapped API under the audit policy of `operation`.
    ///
    /// This is how operations outside the [`FuturesApi`] trait, such as
    /// exchange-specific extensions of `A`, are routed through the audit layer.
    /// Names that do not classify as audited run without any report.
    pub fn audit<T, E, F>(&self, operation: &str, args: &CallArgs, call: F) -> Audited<T, E>
    where
        E: std::error::Error,
        F: FnOnce(&A) -> Result<T, E>,
    {
        if classify(operation) == Category::Passthrough {
            return Audited {
                outcome: call(&self.inner),
                dispatch: None,
            };
        }

        let envelope = CallEnvelope::new(operation, extract(operation, args));
        let outcome = call(&self.inner);

        let envelope = match &outcome {
            Ok(_) => envelope.succeed(),
            Err(error) => envelope.fail(error),
        };
        let dispatch = envelope.into_report().map(|report| self.dispatch(&report));

        Audited { outcome, dispatch }
    }

    fn run<R, T, E, F>(&self, request: R, call: F) -> Result<T, E>
    where
        R: AuditedRequest,
        E: std::error::Error,
        F: FnOnce(&A, R) -> Result<T, E>,
    {
        let args = request.call_args();
        self.audit(R::OPERATION.name(), &args, |api| call(api, request))
            .into_result()
    }

    fn dispatch(&self, report: &Report) -> Dispatch {
        let text = report.render();
        tracing::debug!(severity = %report.severity(), summary = report.summary(), "dispatching audit report");

        let log = match report.severity() {
            Severity::Normal => self.log.write(&text),
            Severity::Error => self.log.write_error(&text),
        };
        if let Err(e) = &log {
            tracing::warn!(error = %e, "audit report was not written to the log sink");
        }

        let notify = match &self.notifier {
            None => NotifyStatus::Skipped,
            Some(notifier) => match notifier.send(&text) {
                Ok(()) => NotifyStatus::Delivered,
                Err(e) => {
                    let note = format!("Failed to send notification: {}", e);
                    if let Err(log_err) = self.log.write_error(&note) {
                        tracing::warn!(error = %log_err, "notification failure was not logged");
                    }
                    NotifyStatus::Failed(e)
                }
            },
        };

        Dispatch {
            severity: report.severity(),
            log,
            notify,
        }
    }
}

impl<A> fmt::Debug for Instrumented<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumented")
            .field("api", &std::any::type_name::<A>())
            .field("notifier", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}

impl<A: FuturesApi> FuturesApi for Instrumented<A> {
    type Error = A::Error;

    fn set_stop_loss_take_profit(
        &self,
        request: ProtectiveLevelsRequest,
    ) -> Result<OrderAck, Self::Error> {
        self.run(request, A::set_stop_loss_take_profit)
    }

    fn place_market_order(&self, request: MarketOrderRequest) -> Result<OrderAck, Self::Error> {
        self.run(request, A::place_market_order)
    }

    fn place_limit_order(&self, request: LimitOrderRequest) -> Result<OrderAck, Self::Error> {
        self.run(request, A::place_limit_order)
    }

    fn close_position(&self, request: ClosePositionRequest) -> Result<OrderAck, Self::Error> {
        self.run(request, A::close_position)
    }

    fn cancel_order(&self, request: CancelOrderRequest) -> Result<OrderAck, Self::Error> {
        self.run(request, A::cancel_order)
    }

    fn get_positions(&self) -> Result<Vec<Position>, Self::Error> {
        self.inner.get_positions()
    }

    fn get_open_orders(&self, symbol: Option<&str>) -> Result<Vec<OpenOrder>, Self::Error> {
        self.inner.get_open_orders(symbol)
    }

    fn fetch_usdt_balance(&self) -> Result<Balance, Self::Error> {
        self.inner.fetch_usdt_balance()
    }

    fn get_price(&self, symbol: &str) -> Result<f64, Self::Error> {
        self.inner.get_price(symbol)
    }

    fn get_historical_data(&self, request: HistoryRequest) -> Result<Vec<Candle>, Self::Error> {
        self.inner.get_historical_data(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditTrail;
    use crate::sink::MemoryNotifier;

    #[derive(Debug, PartialEq)]
    struct Rejected(&'static str);

    impl fmt::Display for Rejected {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for Rejected {}

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn send(&self, _message: &str) -> Result<(), SinkError> {
            Err(SinkError::transport("network unreachable"))
        }
    }

    struct ClosedLog;

    impl LogSink for ClosedLog {
        fn write(&self, _message: &str) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }

        fn write_error(&self, _message: &str) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    fn wrap(trail: &Arc<AuditTrail>) -> Instrumented<()> {
        Instrumented::new((), trail.clone())
    }

    #[test]
    fn audited_success_is_logged_once() {
        let trail = Arc::new(AuditTrail::new());
        let api = wrap(&trail);
        let args = CallArgs::new().arg("BTCUSDT").arg("long");

        let audited = api.audit("close_position", &args, |_| Ok::<_, Rejected>(7));

        assert_eq!(audited.outcome, Ok(7));
        let dispatch = audited.dispatch.expect("audited call is reported");
        assert_eq!(dispatch.severity, Severity::Normal);
        assert!(dispatch.log.is_ok());
        assert!(matches!(dispatch.notify, NotifyStatus::Skipped));
        assert_eq!(
            trail.with_severity(Severity::Normal),
            vec!["✅ SUCCESS: Closed long position for BTCUSDT\nDetails: {\"position\":\"long\",\"symbol\":\"BTCUSDT\"}"]
        );
    }

    #[test]
    fn audited_failure_returns_original_error() {
        let trail = Arc::new(AuditTrail::new());
        let api = wrap(&trail);
        let args = CallArgs::new().arg("ETHUSDT");

        let audited = api.audit("cancel_order", &args, |_| Err::<(), _>(Rejected("timeout")));

        assert_eq!(audited.outcome, Err(Rejected("timeout")));
        let errors = trail.with_severity(Severity::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("❌ ERROR: Failed to cancel orders for ETHUSDT"));
        assert!(errors[0].ends_with("Error: timeout"));
    }

    #[test]
    fn passthrough_names_are_not_reported() {
        let trail = Arc::new(AuditTrail::new());
        let api = wrap(&trail);

        let audited = api.audit("get_price", &CallArgs::new().arg("BTCUSDT"), |_| {
            Ok::<_, Rejected>(42.0)
        });
        let unknown = api.audit("set_leverage", &CallArgs::new(), |_| {
            Err::<(), _>(Rejected("nope"))
        });

        assert!(!audited.is_reported());
        assert_eq!(audited.outcome, Ok(42.0));
        assert!(!unknown.is_reported());
        assert_eq!(unknown.outcome, Err(Rejected("nope")));
        assert!(trail.is_empty());
    }

    #[test]
    fn notifier_failure_is_logged_and_contained() {
        let trail = Arc::new(AuditTrail::new());
        let api = wrap(&trail).with_notifier(Arc::new(FailingNotifier));

        let audited = api.audit(
            "place_market_order",
            &CallArgs::new().arg("SOLUSDT").arg("short"),
            |_| Ok::<_, Rejected>("ack"),
        );

        assert_eq!(audited.outcome, Ok("ack"));
        let dispatch = audited.dispatch.unwrap();
        assert!(matches!(dispatch.notify, NotifyStatus::Failed(SinkError::Transport(_))));
        assert_eq!(trail.with_severity(Severity::Normal).len(), 1);
        assert_eq!(
            trail.with_severity(Severity::Error),
            vec!["Failed to send notification: transport error: network unreachable"]
        );
    }

    #[test]
    fn notifier_receives_the_logged_text() {
        let trail = Arc::new(AuditTrail::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let api = wrap(&trail).with_notifier(notifier.clone());

        let audited = api.audit("cancel_order", &CallArgs::new().arg("BTCUSDT"), |_| {
            Ok::<_, Rejected>(())
        });

        assert!(audited.dispatch.unwrap().notify.is_delivered());
        assert_eq!(notifier.messages(), trail.with_severity(Severity::Normal));
    }

    #[test]
    fn broken_log_sink_does_not_affect_outcome() {
        let notifier = Arc::new(MemoryNotifier::new());
        let api = Instrumented::new((), Arc::new(ClosedLog)).with_notifier(notifier.clone());

        let audited = api.audit("close_position", &CallArgs::new().arg("BTCUSDT"), |_| {
            Ok::<_, Rejected>(1)
        });

        assert_eq!(audited.outcome, Ok(1));
        let dispatch = audited.dispatch.unwrap();
        assert!(matches!(dispatch.log, Err(SinkError::Closed)));
        assert!(dispatch.notify.is_delivered());
        assert_eq!(notifier.len(), 1);
    }

    #[test]
    fn debug_does_not_require_debug_api() {
        struct Opaque;
        let trail = Arc::new(AuditTrail::new());
        let api = Instrumented::new(Opaque, trail);
        let debug = format!("{:?}", api);
        assert!(debug.contains("Instrumented"));
        assert!(debug.contains("notifier: false"));
    }
}
