//! Typed requests for [`FuturesApi`](crate::FuturesApi) operations.
//!
//! Every state-changing request implements [`AuditedRequest`], which renders
//! the request in the call shape of the exchange API: required parameters
//! positionally in signature order, optional ones as keywords. The audit layer
//! extracts its report fields from that shape.

use serde::{Deserialize, Serialize};

use crate::api::Operation;
use crate::args::CallArgs;
use crate::models::PositionSide;

/// A request whose invocation is audited.
pub trait AuditedRequest {
    /// Operation the request is passed to.
    const OPERATION: Operation;

    /// Renders the request as positional and keyword arguments.
    fn call_args(&self) -> CallArgs;
}

/// Stop-loss / take-profit levels for an open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectiveLevelsRequest {
    /// Trading pair
    pub symbol: String,
    /// Side of the position being protected
    pub side: PositionSide,
    /// Quantity covered by the protective orders
    pub quantity: f64,
    /// Stop-loss trigger price
    pub stop_loss_price: Option<f64>,
    /// Take-profit trigger price
    pub take_profit_price: Option<f64>,
}

impl ProtectiveLevelsRequest {
    /// Creates a request with no levels set.
    pub fn new(symbol: impl Into<String>, side: PositionSide, quantity: f64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            stop_loss_price: None,
            take_profit_price: None,
        }
    }

    /// Sets the stop-loss trigger price.
    pub fn stop_loss(mut self, price: f64) -> Self {
        self.stop_loss_price = Some(price);
        self
    }

    /// Sets the take-profit trigger price.
    pub fn take_profit(mut self, price: f64) -> Self {
        self.take_profit_price = Some(price);
        self
    }
}

impl AuditedRequest for ProtectiveLevelsRequest {
    const OPERATION: Operation = Operation::SetStopLossTakeProfit;

    fn call_args(&self) -> CallArgs {
        CallArgs::new()
            .arg(self.symbol.as_str())
            .arg(self.side.as_str())
            .arg(self.quantity)
            .kwarg_opt("stop_loss_price", self.stop_loss_price)
            .kwarg_opt("take_profit_price", self.take_profit_price)
    }
}

/// Market order opening a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrderRequest {
    /// Trading pair
    pub symbol: String,
    /// Direction of the new position
    pub position_type: PositionSide,
    /// Leverage to apply
    pub leverage: u32,
    /// Margin in USDT; `None` lets the exchange client size the order
    pub amount: Option<f64>,
    /// Stop-loss trigger price placed with the order
    pub stop_loss_price: Option<f64>,
    /// Take-profit trigger price placed with the order
    pub take_profit_price: Option<f64>,
}

impl MarketOrderRequest {
    /// Creates a 1x market order without protective levels.
    pub fn new(symbol: impl Into<String>, position_type: PositionSide) -> Self {
        Self {
            symbol: symbol.into(),
            position_type,
            leverage: 1,
            amount: None,
            stop_loss_price: None,
            take_profit_price: None,
        }
    }

    /// Sets the leverage.
    pub fn leverage(mut self, leverage: u32) -> Self {
        self.leverage = leverage;
        self
    }

    /// Sets the margin amount.
    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the stop-loss trigger price.
    pub fn stop_loss(mut self, price: f64) -> Self {
        self.stop_loss_price = Some(price);
        self
    }

    /// Sets the take-profit trigger price.
    pub fn take_profit(mut self, price: f64) -> Self {
        self.take_profit_price = Some(price);
        self
    }
}

impl AuditedRequest for MarketOrderRequest {
    const OPERATION: Operation = Operation::PlaceMarketOrder;

    fn call_args(&self) -> CallArgs {
        let args = CallArgs::new()
            .arg(self.symbol.as_str())
            .arg(self.position_type.as_str())
            .arg(self.leverage);
        let args = match self.amount {
            Some(amount) => args.arg(amount),
            None => args,
        };
        args.kwarg_opt("stop_loss_price", self.stop_loss_price)
            .kwarg_opt("take_profit_price", self.take_profit_price)
    }
}

/// Limit order opening a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitOrderRequest {
    /// Trading pair
    pub symbol: String,
    /// Direction of the new position
    pub position_type: PositionSide,
    /// Limit price
    pub price: f64,
    /// Leverage to apply
    pub leverage: u32,
    /// Margin in USDT; `None` lets the exchange client size the order
    pub amount: Option<f64>,
    /// Stop-loss trigger price placed with the order
    pub stop_loss_price: Option<f64>,
    /// Take-profit trigger price placed with the order
    pub take_profit_price: Option<f64>,
}

impl LimitOrderRequest {
    /// Creates a 1x limit order without protective levels.
    pub fn new(symbol: impl Into<String>, position_type: PositionSide, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            position_type,
            price,
            leverage: 1,
            amount: None,
            stop_loss_price: None,
            take_profit_price: None,
        }
    }

    /// Sets the leverage.
    pub fn leverage(mut self, leverage: u32) -> Self {
        self.leverage = leverage;
        self
    }

    /// Sets the margin amount.
    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the stop-loss trigger price.
    pub fn stop_loss(mut self, price: f64) -> Self {
        self.stop_loss_price = Some(price);
        self
    }

    /// Sets the take-profit trigger price.
    pub fn take_profit(mut self, price: f64) -> Self {
        self.take_profit_price = Some(price);
        self
    }
}

impl AuditedRequest for LimitOrderRequest {
    const OPERATION: Operation = Operation::PlaceLimitOrder;

    fn call_args(&self) -> CallArgs {
        let args = CallArgs::new()
            .arg(self.symbol.as_str())
            .arg(self.position_type.as_str())
            .arg(self.price)
            .arg(self.leverage);
        let args = match self.amount {
            Some(amount) => args.arg(amount),
            None => args,
        };
        args.kwarg_opt("stop_loss_price", self.stop_loss_price)
            .kwarg_opt("take_profit_price", self.take_profit_price)
    }
}

/// Market close of an open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosePositionRequest {
    /// Trading pair
    pub symbol: String,
    /// Side of the position to close
    pub position_type: PositionSide,
}

impl ClosePositionRequest {
    /// Creates a close request.
    pub fn new(symbol: impl Into<String>, position_type: PositionSide) -> Self {
        Self {
            symbol: symbol.into(),
            position_type,
        }
    }
}

impl AuditedRequest for ClosePositionRequest {
    const OPERATION: Operation = Operation::ClosePosition;

    fn call_args(&self) -> CallArgs {
        CallArgs::new()
            .arg(self.symbol.as_str())
            .arg(self.position_type.as_str())
    }
}

/// Cancellation of open orders for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelOrderRequest {
    /// Trading pair
    pub symbol: String,
    /// Order type to cancel (`limit`, `stop`, ...); `None` cancels every order
    pub order_type: Option<String>,
}

impl CancelOrderRequest {
    /// Cancels every open order for `symbol`.
    pub fn all(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            order_type: None,
        }
    }

    /// Cancels open orders of one type for `symbol`.
    pub fn of_type(symbol: impl Into<String>, order_type: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            order_type: Some(order_type.into()),
        }
    }
}

impl AuditedRequest for CancelOrderRequest {
    const OPERATION: Operation = Operation::CancelOrder;

    fn call_args(&self) -> CallArgs {
        CallArgs::new()
            .arg(self.symbol.as_str())
            .kwarg_opt("type", self.order_type.as_deref())
    }
}

/// Historical candle query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRequest {
    /// Trading pair
    pub symbol: String,
    /// Candle interval, e.g. `1h`
    pub interval: String,
    /// Maximum number of candles
    pub limit: u32,
}

impl HistoryRequest {
    /// Creates a history query.
    pub fn new(symbol: impl Into<String>, interval: impl Into<String>, limit: u32) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            limit,
        }
    }
}
