//! Human-readable summaries of audited calls.

use super::extract::Fields;
use crate::args::render_value;

const UNKNOWN: &str = "unknown";

fn field(fields: &Fields, name: &str) -> String {
    fields
        .get(name)
        .map(render_value)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Renders the optional ` {type}` clause of cancel messages.
fn type_clause(fields: &Fields) -> String {
    match fields.get("type").map(render_value) {
        Some(t) if !t.is_empty() => format!(" {}", t),
        _ => String::new(),
    }
}

/// Summarises a successful call to `operation`.
///
/// Missing fields render as `unknown`; formatting never fails.
///
/// # Examples
///
/// ```
/// use futures_audit::CallArgs;
/// use futures_audit::audit::{extract, format_success};
///
/// let args = CallArgs::new()
///     .kwarg("symbol", "BTCUSDT")
///     .kwarg("position_type", "long")
///     .kwarg("price", 65000);
/// let fields = extract("place_limit_order", &args);
///
/// assert_eq!(
///     format_success("place_limit_order", &fields),
///     "Placed limit long order for BTCUSDT at 65000"
/// );
/// ```
pub fn format_success(operation: &str, fields: &Fields) -> String {
    let symbol = field(fields, "symbol");

    match operation {
        "set_stop_loss_take_profit" => {
            format!("Set SL/TP for {} ({})", symbol, field(fields, "side"))
        }
        "place_market_order" => format!(
            "Placed market {} order for {}",
            field(fields, "position"),
            symbol
        ),
        "place_limit_order" => format!(
            "Placed limit {} order for {} at {}",
            field(fields, "position"),
            symbol,
            field(fields, "price")
        ),
        "close_position" => format!(
            "Closed {} position for {}",
            field(fields, "position"),
            symbol
        ),
        "cancel_order" => format!("Cancelled{} orders for {}", type_clause(fields), symbol),
        other => format!("Executed {} for {}", other, symbol),
    }
}

/// Summarises a failed call to `operation`.
///
/// The error description is not part of the summary; the report carries it
/// separately.
pub fn format_failure(operation: &str, fields: &Fields) -> String {
    let symbol = field(fields, "symbol");

    match operation {
        "set_stop_loss_take_profit" => {
            format!("Failed to set SL/TP for {} ({})", symbol, field(fields, "side"))
        }
        "place_market_order" => format!(
            "Failed to place market {} order for {}",
            field(fields, "position"),
            symbol
        ),
        "place_limit_order" => format!(
            "Failed to place limit {} order for {}",
            field(fields, "position"),
            symbol
        ),
        "close_position" => format!(
            "Failed to close {} position for {}",
            field(fields, "position"),
            symbol
        ),
        "cancel_order" => format!(
            "Failed to cancel{} orders for {}",
            type_clause(fields),
            symbol
        ),
        other => format!("Failed to execute {} for {}", other, symbol),
    }
}
