//! Report field extraction from call arguments.
//!
//! Exchange signatures differ per operation, so each audited operation has a
//! table mapping argument positions and keyword names onto a shared field
//! vocabulary: `symbol`, `side`, `quantity`, `stop_loss`, `take_profit`,
//! `position`, `price`, `leverage`, `amount` and `type`.

use std::collections::BTreeMap;

use crate::args::{CallArgs, Value};

/// Extracted report fields keyed by canonical name.
pub type Fields = BTreeMap<&'static str, Value>;

struct Rule {
    /// Positional index to field. Position 0 is always the symbol.
    positions: &'static [(usize, &'static str)],
    /// Keyword to field. Applied in order, so canonical names listed after
    /// their aliases take precedence.
    keywords: &'static [(&'static str, &'static str)],
}

const PROTECTIVE_LEVELS: Rule = Rule {
    positions: &[(1, "side"), (2, "quantity"), (3, "stop_loss"), (4, "take_profit")],
    keywords: &[
        ("stop_loss_price", "stop_loss"),
        ("take_profit_price", "take_profit"),
        ("side", "side"),
        ("quantity", "quantity"),
        ("stop_loss", "stop_loss"),
        ("take_profit", "take_profit"),
    ],
};

const ORDER_KEYWORDS: &[(&str, &str)] = &[
    ("position_type", "position"),
    ("stop_loss_price", "stop_loss"),
    ("take_profit_price", "take_profit"),
    ("position", "position"),
    ("price", "price"),
    ("leverage", "leverage"),
    ("amount", "amount"),
    ("stop_loss", "stop_loss"),
    ("take_profit", "take_profit"),
];

const MARKET_ORDER: Rule = Rule {
    positions: &[
        (1, "position"),
        (2, "leverage"),
        (3, "amount"),
        (4, "stop_loss"),
        (5, "take_profit"),
    ],
    keywords: ORDER_KEYWORDS,
};

const LIMIT_ORDER: Rule = Rule {
    positions: &[(1, "position"), (2, "price"), (3, "leverage"), (4, "amount")],
    keywords: ORDER_KEYWORDS,
};

const CLOSE_POSITION: Rule = Rule {
    positions: &[(1, "position")],
    keywords: &[("position_type", "position"), ("position", "position")],
};

const CANCEL_ORDER: Rule = Rule {
    positions: &[(1, "type")],
    keywords: &[("type", "type")],
};

const SYMBOL_ONLY: Rule = Rule {
    positions: &[],
    keywords: &[],
};

fn rule_for(name: &str) -> &'static Rule {
    match name {
        "set_stop_loss_take_profit" => &PROTECTIVE_LEVELS,
        "place_market_order" => &MARKET_ORDER,
        "place_limit_order" => &LIMIT_ORDER,
        "close_position" => &CLOSE_POSITION,
        "cancel_order" => &CANCEL_ORDER,
        _ => &SYMBOL_ONLY,
    }
}

/// Extracts report fields for a call to `name`.
///
/// Keyword arguments override positional ones for the same field. Missing
/// arguments and `null` values leave the field out; extraction never fails.
///
/// # Examples
///
/// ```
/// use futures_audit::CallArgs;
/// use futures_audit::audit::extract;
///
/// let args = CallArgs::new()
///     .arg("BTCUSDT")
///     .arg("long")
///     .arg(0.5)
///     .arg(100.0)
///     .kwarg("stop_loss_price", 90.0);
///
/// let fields = extract("set_stop_loss_take_profit", &args);
/// assert_eq!(fields["symbol"], "BTCUSDT");
/// assert_eq!(fields["stop_loss"], 90.0);
/// ```
pub fn extract(name: &str, args: &CallArgs) -> Fields {
    let rule = rule_for(name);
    let mut fields = Fields::new();

    let positions = std::iter::once(&(0, "symbol")).chain(rule.positions);
    for &(index, field) in positions {
        if let Some(value) = args.get(index).filter(|v| !v.is_null()) {
            fields.insert(field, value.clone());
        }
    }

    let keywords = std::iter::once(&("symbol", "symbol")).chain(rule.keywords);
    for &(keyword, field) in keywords {
        if let Some(value) = args.keyword(keyword).filter(|v| !v.is_null()) {
            fields.insert(field, value.clone());
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protective_levels_positional() {
        let args = CallArgs::new()
            .arg("BTCUSDT")
            .arg("long")
            .arg(0.5)
            .arg(60000.0)
            .arg(70000.0);

        let fields = extract("set_stop_loss_take_profit", &args);

        assert_eq!(fields["symbol"], "BTCUSDT");
        assert_eq!(fields["side"], "long");
        assert_eq!(fields["quantity"], 0.5);
        assert_eq!(fields["stop_loss"], 60000.0);
        assert_eq!(fields["take_profit"], 70000.0);
    }

    #[test]
    fn keyword_overrides_positional() {
        let args = CallArgs::new()
            .arg("BTCUSDT")
            .arg("long")
            .arg(1.0)
            .arg(100)
            .kwarg("stop_loss_price", 90);

        let fields = extract("set_stop_loss_take_profit", &args);
        assert_eq!(fields["stop_loss"], 90);
    }

    #[test]
    fn aliases_are_normalised() {
        let args = CallArgs::new()
            .kwarg("symbol", "SOLUSDT")
            .kwarg("stop_loss_price", 120.0)
            .kwarg("take_profit_price", 180.0);

        let fields = extract("set_stop_loss_take_profit", &args);

        assert!(fields.contains_key("stop_loss"));
        assert!(fields.contains_key("take_profit"));
        assert!(!fields.contains_key("stop_loss_price"));
        assert!(!fields.contains_key("take_profit_price"));
    }

    #[test]
    fn canonical_keyword_beats_alias() {
        let args = CallArgs::new()
            .kwarg("stop_loss_price", 1.0)
            .kwarg("stop_loss", 2.0);

        let fields = extract("set_stop_loss_take_profit", &args);
        assert_eq!(fields["stop_loss"], 2.0);
    }

    #[test]
    fn symbol_keyword_overrides_positional() {
        let args = CallArgs::new().arg("BTCUSDT").kwarg("symbol", "ETHUSDT");
        let fields = extract("close_position", &args);
        assert_eq!(fields["symbol"], "ETHUSDT");
    }

    #[test]
    fn market_order_positions() {
        let args = CallArgs::new()
            .arg("ETHUSDT")
            .arg("short")
            .arg(10)
            .arg(250.0)
            .arg(3900.0)
            .arg(3100.0);

        let fields = extract("place_market_order", &args);

        assert_eq!(fields["position"], "short");
        assert_eq!(fields["leverage"], 10);
        assert_eq!(fields["amount"], 250.0);
        assert_eq!(fields["stop_loss"], 3900.0);
        assert_eq!(fields["take_profit"], 3100.0);
        assert!(!fields.contains_key("price"));
    }

    #[test]
    fn limit_order_positions_and_keywords() {
        let args = CallArgs::new()
            .arg("BTCUSDT")
            .arg("long")
            .arg(65000.0)
            .arg(3)
            .kwarg("amount", 50.0)
            .kwarg("position_type", "short");

        let fields = extract("place_limit_order", &args);

        assert_eq!(fields["position"], "short");
        assert_eq!(fields["price"], 65000.0);
        assert_eq!(fields["leverage"], 3);
        assert_eq!(fields["amount"], 50.0);
    }

    #[test]
    fn close_and_cancel() {
        let close = extract("close_position", &CallArgs::new().arg("BTCUSDT").arg("long"));
        assert_eq!(close["position"], "long");

        let cancel = extract(
            "cancel_order",
            &CallArgs::new().arg("BTCUSDT").arg("limit").kwarg("type", "stop"),
        );
        assert_eq!(cancel["type"], "stop");
    }

    #[test]
    fn unknown_operation_keeps_symbol_only() {
        let args = CallArgs::new()
            .arg("BTCUSDT")
            .arg(20)
            .kwarg("leverage", 20);

        let fields = extract("set_leverage", &args);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields["symbol"], "BTCUSDT");
    }

    #[test]
    fn empty_arguments_yield_empty_fields() {
        for name in ["place_limit_order", "cancel_order", "anything"] {
            assert!(extract(name, &CallArgs::new()).is_empty());
        }
    }

    #[test]
    fn null_values_are_omitted() {
        let args = CallArgs::new()
            .arg("BTCUSDT")
            .arg(Value::Null)
            .kwarg("type", Value::Null);

        let fields = extract("cancel_order", &args);
        assert!(!fields.contains_key("type"));
    }
}
