use std::fmt;

/// A wrapper that keeps credentials out of logs.
///
/// The Telegram bot token is embedded in every request URL, so it is held in
/// a `Secret` and only read through [`expose_secret`](Self::expose_secret)
/// when the URL is built.
///
/// # Examples
///
/// ```
/// use futures_audit::Secret;
///
/// let token = Secret::new("123456:ABC-DEF".to_string());
///
/// assert_eq!(format!("{:?}", token), "[REDACTED]");
/// assert_eq!(format!("{}", token), "[REDACTED]");
/// assert_eq!(token.expose_secret(), "123456:ABC-DEF");
/// ```
// Do not derive Clone, Debug or Serialize: each would copy or print the value.
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// The result must not be logged or displayed.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}
