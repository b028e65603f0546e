//! Configuration for the audit layer.
//!
//! Values are resolved in this order, later sources winning:
//! 1. built-in defaults,
//! 2. a TOML file,
//! 3. a `.env` file in the working directory (if present),
//! 4. process environment variables.
//!
//! ```toml
//! [logging]
//! dir = "logs"
//! timezone = "Asia/Taipei"
//! backup_count = 30
//! console = true
//!
//! [telegram]
//! bot_token = "123456:ABC-DEF"
//! chat_id = "-1001234567890"
//! timeout_secs = 10
//! ```

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::Error;

/// Environment variable overriding [`TelegramConfig::bot_token`].
pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
/// Environment variable overriding [`TelegramConfig::chat_id`].
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
/// Environment variable overriding [`LoggingConfig::dir`].
pub const ENV_LOG_DIR: &str = "FUTURES_AUDIT_LOG_DIR";
/// Environment variable overriding [`LoggingConfig::timezone`].
pub const ENV_TIMEZONE: &str = "FUTURES_AUDIT_TIMEZONE";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log file settings
    pub logging: LoggingConfig,
    /// Notification channel settings
    pub telegram: TelegramConfig,
}

/// Log file settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base directory; general and error logs go to subdirectories of it
    pub dir: PathBuf,
    /// IANA timezone used for log timestamps
    pub timezone: String,
    /// Number of rotated files kept per log
    pub backup_count: usize,
    /// Also log to stderr, filtered by `RUST_LOG`
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            timezone: "Asia/Taipei".to_string(),
            backup_count: 30,
            console: true,
        }
    }
}

impl LoggingConfig {
    /// Parses the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the name is not a known IANA timezone.
    pub fn tz(&self) -> Result<Tz, Error> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| Error::config(format!("unknown timezone '{}': {}", self.timezone, e)))
    }
}

/// Telegram settings.
///
/// Notifications are enabled only when both the token and the chat id are set.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    pub bot_token: Option<String>,
    /// Destination chat id
    pub chat_id: Option<String>,
    /// Bot API base URL
    pub api_base: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
            timeout_secs: 10,
        }
    }
}

impl TelegramConfig {
    /// Returns true if both the token and the chat id are present.
    pub fn is_enabled(&self) -> bool {
        self.bot_token.as_deref().is_some_and(|t| !t.is_empty())
            && self.chat_id.as_deref().is_some_and(|c| !c.is_empty())
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Loads configuration from defaults, an optional TOML file, `.env` and
    /// the environment, then validates it.
    ///
    /// A missing file at `path` is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!(error = %e, "no .env file loaded");
        }
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Loads configuration from defaults, an optional TOML file and a
    /// variable lookup, then validates it.
    ///
    /// [`load`](Self::load) calls this with the process environment after
    /// reading `.env`.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading configuration file");
                Self::from_toml_str(&std::fs::read_to_string(path)?)?
            }
            Some(path) => {
                tracing::debug!(path = %path.display(), "configuration file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env(lookup);
        config.validate()?;

        Ok(config)
    }

    /// Parses configuration from TOML text without consulting the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Toml`] if the text is not valid configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    /// Applies overrides from a variable lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_BOT_TOKEN) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat_id) = get(ENV_CHAT_ID) {
            self.telegram.chat_id = Some(chat_id);
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            self.logging.dir = PathBuf::from(dir);
        }
        if let Some(tz) = get(ENV_TIMEZONE) {
            self.logging.timezone = tz;
        }
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown timezone, a zero backup count,
    /// a zero timeout, or a Telegram section with only one of token / chat id.
    pub fn validate(&self) -> Result<(), Error> {
        self.logging.tz()?;

        if self.logging.backup_count == 0 {
            return Err(Error::config("logging.backup_count must be at least 1"));
        }
        if self.telegram.timeout_secs == 0 {
            return Err(Error::config("telegram.timeout_secs must be at least 1"));
        }

        let has_token = self.telegram.bot_token.as_deref().is_some_and(|t| !t.is_empty());
        let has_chat = self.telegram.chat_id.as_deref().is_some_and(|c| !c.is_empty());
        if has_token != has_chat {
            return Err(Error::config(
                "telegram.bot_token and telegram.chat_id must be set together",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();

        assert_eq!(config.logging.dir, PathBuf::from("logs"));
        assert_eq!(config.logging.timezone, "Asia/Taipei");
        assert_eq!(config.logging.backup_count, 30);
        assert!(!config.telegram.is_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [logging]
            dir = "/var/log/trader"
            backup_count = 7

            [telegram]
            bot_token = "123:abc"
            chat_id = "-100"
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.dir, PathBuf::from("/var/log/trader"));
        assert_eq!(config.logging.backup_count, 7);
        assert_eq!(config.logging.timezone, "Asia/Taipei");
        assert!(config.telegram.is_enabled());
        assert_eq!(config.telegram.timeout_secs, 10);
    }

    #[test]
    fn rejects_malformed_toml() {
        let result = Config::from_toml_str("[logging\ndir = 1");
        assert!(matches!(result, Err(Error::Toml(_))));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config::from_toml_str("[telegram]\nchat_id = \"-1\"").unwrap();

        config.apply_env(lookup(&[
            (ENV_BOT_TOKEN, "999:xyz"),
            (ENV_CHAT_ID, "-2"),
            (ENV_TIMEZONE, "UTC"),
            (ENV_LOG_DIR, "  "),
        ]));

        assert_eq!(config.telegram.bot_token.as_deref(), Some("999:xyz"));
        assert_eq!(config.telegram.chat_id.as_deref(), Some("-2"));
        assert_eq!(config.logging.timezone, "UTC");
        assert_eq!(config.logging.dir, PathBuf::from("logs"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.logging.timezone = "Mars/Olympus".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.logging.backup_count = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.telegram.bot_token = Some("123:abc".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_token() {
        let mut config = TelegramConfig::default();
        config.bot_token = Some("123:supersecret".to_string());

        let debug = format!("{:?}", config);
        assert!(!debug.contains("supersecret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            Config::load_with(Some(&dir.path().join("absent.toml")), lookup(&[])).unwrap();

        assert_eq!(config.logging.backup_count, 30);
        assert!(!config.telegram.is_enabled());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.toml");
        std::fs::write(&path, "[logging]\nbackup_count = 3\nconsole = false\n").unwrap();

        let config = Config::load_with(Some(&path), lookup(&[])).unwrap();

        assert_eq!(config.logging.backup_count, 3);
        assert!(!config.logging.console);
    }

    #[test]
    fn load_applies_lookup_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.toml");
        std::fs::write(&path, "[logging]\ntimezone = \"UTC\"\n").unwrap();

        let config = Config::load_with(
            Some(&path),
            lookup(&[
                (ENV_BOT_TOKEN, "123:abc"),
                (ENV_CHAT_ID, "-100"),
                (ENV_TIMEZONE, "Europe/London"),
            ]),
        )
        .unwrap();

        assert!(config.telegram.is_enabled());
        assert_eq!(config.logging.timezone, "Europe/London");
    }

    #[test]
    fn load_validates_after_lookup() {
        let result = Config::load_with(None, lookup(&[(ENV_BOT_TOKEN, "123:abc")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
