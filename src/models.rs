//! Value types returned by a [`FuturesApi`](crate::FuturesApi).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of a futures position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    /// Profits when the price rises
    Long,
    /// Profits when the price falls
    Short,
}

impl PositionSide {
    /// Returns the wire name of the side.
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionSide::Long => "long",
            PositionSide::Short => "short",
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acknowledgement returned by state-changing operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    /// Symbol the operation applied to
    pub symbol: String,
    /// Exchange identifiers of the orders created or affected
    pub order_ids: Vec<String>,
}

impl OrderAck {
    /// Creates an acknowledgement for a single order.
    pub fn single(symbol: impl Into<String>, order_id: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            order_ids: vec![order_id.into()],
        }
    }
}

/// An open futures position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Trading pair, e.g. `BTCUSDT`
    pub symbol: String,
    /// Position direction
    pub side: PositionSide,
    /// Contract quantity
    pub quantity: f64,
    /// Average entry price
    pub entry_price: f64,
    /// Leverage applied to the position
    pub leverage: u32,
    /// Unrealised profit and loss in USDT
    pub unrealized_pnl: f64,
}

/// An order resting on the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenOrder {
    /// Exchange order identifier
    pub order_id: String,
    /// Trading pair
    pub symbol: String,
    /// Order type as reported by the exchange (`LIMIT`, `STOP_MARKET`, ...)
    pub order_type: String,
    /// Position side the order belongs to
    pub side: PositionSide,
    /// Limit or trigger price
    pub price: f64,
    /// Order quantity
    pub quantity: f64,
}

/// USDT wallet balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Total wallet balance
    pub total: f64,
    /// Balance available for new orders
    pub available: f64,
}

/// One OHLCV candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle open time, milliseconds since the Unix epoch
    pub open_time: i64,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Traded volume
    pub volume: f64,
}
