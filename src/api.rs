//! The capability surface wrapped by the audit layer.

use std::fmt;

use crate::audit::{classify, Category};
use crate::models::{Balance, Candle, OpenOrder, OrderAck, Position};
use crate::request::{
    CancelOrderRequest, ClosePositionRequest, HistoryRequest, LimitOrderRequest,
    MarketOrderRequest, ProtectiveLevelsRequest,
};

/// A futures exchange client.
///
/// Implementations talk to a concrete exchange. The audit layer wraps any
/// implementation in [`Instrumented`](crate::Instrumented), which implements
/// this trait again with the same error type, so callers can swap one for the
/// other without changing a line.
///
/// The first five methods change exchange state and are audited; the rest are
/// read-only and pass straight through.
pub trait FuturesApi {
    /// Error returned by every operation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Attaches stop-loss and take-profit orders to a position.
    fn set_stop_loss_take_profit(
        &self,
        request: ProtectiveLevelsRequest,
    ) -> Result<OrderAck, Self::Error>;

    /// Opens a position with a market order.
    fn place_market_order(&self, request: MarketOrderRequest) -> Result<OrderAck, Self::Error>;

    /// Opens a position with a limit order.
    fn place_limit_order(&self, request: LimitOrderRequest) -> Result<OrderAck, Self::Error>;

    /// Closes an open position at market.
    fn close_position(&self, request: ClosePositionRequest) -> Result<OrderAck, Self::Error>;

    /// Cancels open orders for a symbol.
    fn cancel_order(&self, request: CancelOrderRequest) -> Result<OrderAck, Self::Error>;

    /// Lists open positions.
    fn get_positions(&self) -> Result<Vec<Position>, Self::Error>;

    /// Lists open orders, optionally for one symbol.
    fn get_open_orders(&self, symbol: Option<&str>) -> Result<Vec<OpenOrder>, Self::Error>;

    /// Returns the USDT wallet balance.
    fn fetch_usdt_balance(&self) -> Result<Balance, Self::Error>;

    /// Returns the last traded price of a symbol.
    fn get_price(&self, symbol: &str) -> Result<f64, Self::Error>;

    /// Returns historical candles.
    fn get_historical_data(&self, request: HistoryRequest) -> Result<Vec<Candle>, Self::Error>;
}

/// Identifier of each [`FuturesApi`] method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`FuturesApi::set_stop_loss_take_profit`]
    SetStopLossTakeProfit,
    /// [`FuturesApi::place_market_order`]
    PlaceMarketOrder,
    /// [`FuturesApi::place_limit_order`]
    PlaceLimitOrder,
    /// [`FuturesApi::close_position`]
    ClosePosition,
    /// [`FuturesApi::cancel_order`]
    CancelOrder,
    /// [`FuturesApi::get_positions`]
    GetPositions,
    /// [`FuturesApi::get_open_orders`]
    GetOpenOrders,
    /// [`FuturesApi::fetch_usdt_balance`]
    FetchUsdtBalance,
    /// [`FuturesApi::get_price`]
    GetPrice,
    /// [`FuturesApi::get_historical_data`]
    GetHistoricalData,
}

impl Operation {
    /// Every operation of the capability surface.
    pub const ALL: [Operation; 10] = [
        Operation::SetStopLossTakeProfit,
        Operation::PlaceMarketOrder,
        Operation::PlaceLimitOrder,
        Operation::ClosePosition,
        Operation::CancelOrder,
        Operation::GetPositions,
        Operation::GetOpenOrders,
        Operation::FetchUsdtBalance,
        Operation::GetPrice,
        Operation::GetHistoricalData,
    ];

    /// Returns the method name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SetStopLossTakeProfit => "set_stop_loss_take_profit",
            Operation::PlaceMarketOrder => "place_market_order",
            Operation::PlaceLimitOrder => "place_limit_order",
            Operation::ClosePosition => "close_position",
            Operation::CancelOrder => "cancel_order",
            Operation::GetPositions => "get_positions",
            Operation::GetOpenOrders => "get_open_orders",
            Operation::FetchUsdtBalance => "fetch_usdt_balance",
            Operation::GetPrice => "get_price",
            Operation::GetHistoricalData => "get_historical_data",
        }
    }

    /// Looks up an operation by method name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Returns whether calls to this operation are audited.
    pub fn category(&self) -> Category {
        classify(self.name())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::from_name("withdraw"), None);
    }

    #[test]
    fn state_changing_operations_are_audited() {
        let audited: Vec<_> = Operation::ALL
            .into_iter()
            .filter(|op| op.category() == Category::Audited)
            .collect();

        assert_eq!(
            audited,
            vec![
                Operation::SetStopLossTakeProfit,
                Operation::PlaceMarketOrder,
                Operation::PlaceLimitOrder,
                Operation::ClosePosition,
                Operation::CancelOrder,
            ]
        );
    }
}
