//! Positional and keyword arguments of a single call.

use std::collections::BTreeMap;

pub use serde_json::Value;

/// The arguments an operation was invoked with.
///
/// Positions are zero-based and do not include the receiver: position 0 is
/// the first real parameter (the symbol for every trading operation).
///
/// # Examples
///
/// ```
/// use futures_audit::CallArgs;
///
/// let args = CallArgs::new()
///     .arg("BTCUSDT")
///     .arg("long")
///     .kwarg("stop_loss_price", 61_000.0);
///
/// assert_eq!(args.get(0).and_then(|v| v.as_str()), Some("BTCUSDT"));
/// assert!(args.keyword("stop_loss_price").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a keyword argument, replacing any previous value.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Sets a keyword argument only when a value is present.
    pub fn kwarg_opt<V: Into<Value>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.kwarg(name, value),
            None => self,
        }
    }

    /// Returns the positional argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Returns the keyword argument called `name`.
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keyword.get(name)
    }

    /// Returns all positional arguments.
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Iterates keyword arguments in name order.
    pub fn keywords(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.keyword.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns true if no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

/// Renders an argument value for a human-readable message.
///
/// Strings are written without quotes and integral floats without a
/// fractional part, so `65000.0` renders as `65000`.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
