//! Operation classification.

use std::fmt;

/// Operations that change exchange state and must be reported.
pub const AUDITED_OPERATIONS: [&str; 5] = [
    "set_stop_loss_take_profit",
    "place_market_order",
    "place_limit_order",
    "close_position",
    "cancel_order",
];

/// Read-only operations forwarded without reporting.
pub const PASSTHROUGH_OPERATIONS: [&str; 5] = [
    "get_positions",
    "get_open_orders",
    "fetch_usdt_balance",
    "get_price",
    "get_historical_data",
];

/// How calls to an operation are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Logged and notified
    Audited,
    /// Forwarded unchanged
    Passthrough,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Audited => write!(f, "audited"),
            Category::Passthrough => write!(f, "passthrough"),
        }
    }
}

/// Classifies an operation by name.
///
/// Names outside both tables are passed through.
///
/// # Examples
///
/// ```
/// use futures_audit::audit::{classify, Category};
///
/// assert_eq!(classify("place_limit_order"), Category::Audited);
/// assert_eq!(classify("get_price"), Category::Passthrough);
/// assert_eq!(classify("transfer_margin"), Category::Passthrough);
/// ```
pub fn classify(name: &str) -> Category {
    if AUDITED_OPERATIONS.contains(&name) {
        Category::Audited
    } else {
        Category::Passthrough
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audited_table_is_audited() {
        for name in AUDITED_OPERATIONS {
            assert_eq!(classify(name), Category::Audited, "{name}");
        }
    }

    #[test]
    fn passthrough_table_is_passthrough() {
        for name in PASSTHROUGH_OPERATIONS {
            assert_eq!(classify(name), Category::Passthrough, "{name}");
        }
    }

    #[test]
    fn tables_are_disjoint() {
        for name in AUDITED_OPERATIONS {
            assert!(!PASSTHROUGH_OPERATIONS.contains(&name));
        }
    }

    #[test]
    fn unknown_names_pass_through() {
        assert_eq!(classify(""), Category::Passthrough);
        assert_eq!(classify("PLACE_LIMIT_ORDER"), Category::Passthrough);
        assert_eq!(classify("set_leverage"), Category::Passthrough);
    }

    #[test]
    fn category_display() {
        assert_eq!(Category::Audited.to_string(), "audited");
        assert_eq!(Category::Passthrough.to_string(), "passthrough");
    }
}
