//! Persistent list of coins a strategy should skip.
//!
//! Stored as pretty-printed JSON:
//!
//! ```json
//! {
//!   "stable_coins": ["USDC", "DAI"],
//!   "problematic_coins": ["XYZ"]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

const QUOTE: &str = "USDT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Lists {
    #[serde(default)]
    stable_coins: Vec<String>,
    #[serde(default)]
    problematic_coins: Vec<String>,
}

/// Stable and problematic coin lists backed by a JSON file.
///
/// Every successful addition is written to disk before returning.
///
/// # Examples
///
/// ```
/// use futures_audit::ExclusionRecord;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("exclusion_coins.json");
///
/// let mut record = ExclusionRecord::open(&path).unwrap();
/// record.add_stable_coin("USDCUSDT").unwrap();
/// record.add_problematic_coin("XYZ").unwrap();
///
/// let coins = vec!["BTC".to_string(), "USDC".to_string(), "XYZ".to_string()];
/// assert_eq!(record.filter_coins(&coins), vec!["BTC".to_string()]);
///
/// // A fresh handle sees the persisted lists.
/// let reopened = ExclusionRecord::open(&path).unwrap();
/// assert!(reopened.is_excluded("USDC"));
/// ```
#[derive(Debug, Clone)]
pub struct ExclusionRecord {
    path: PathBuf,
    lists: Lists,
}

/// Strips the quote currency from a trading pair, leaving bare `USDT` alone.
fn base_coin(symbol: &str) -> &str {
    let symbol = symbol.trim();
    if symbol == QUOTE {
        return symbol;
    }
    symbol.strip_suffix(QUOTE).unwrap_or(symbol)
}

impl ExclusionRecord {
    /// Loads the record at `path`. A missing file yields empty lists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        let lists = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            serde_json::from_str(&text)?
        } else {
            Lists::default()
        };

        Ok(Self { path, lists })
    }

    /// Adds a stable coin. Returns `true` if the list changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn add_stable_coin(&mut self, symbol: &str) -> Result<bool, Error> {
        let coin = base_coin(symbol).to_string();
        let added = Self::insert(&mut self.lists.stable_coins, coin);
        if added {
            self.save()?;
        }
        Ok(added)
    }

    /// Adds a coin that should be avoided. Returns `true` if the list changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn add_problematic_coin(&mut self, symbol: &str) -> Result<bool, Error> {
        let coin = base_coin(symbol).to_string();
        let added = Self::insert(&mut self.lists.problematic_coins, coin);
        if added {
            self.save()?;
        }
        Ok(added)
    }

    fn insert(list: &mut Vec<String>, coin: String) -> bool {
        if coin.is_empty() || list.contains(&coin) {
            return false;
        }
        list.push(coin);
        true
    }

    /// Returns `coins` without any stable or problematic entries, preserving order.
    pub fn filter_coins<S: AsRef<str> + Clone>(&self, coins: &[S]) -> Vec<S> {
        coins
            .iter()
            .filter(|coin| !self.is_excluded(coin.as_ref()))
            .cloned()
            .collect()
    }

    /// Returns true if `coin` is on either list.
    pub fn is_excluded(&self, coin: &str) -> bool {
        self.lists.stable_coins.iter().any(|c| c == coin)
            || self.lists.problematic_coins.iter().any(|c| c == coin)
    }

    /// Stable coins in insertion order.
    pub fn stable_coins(&self) -> &[String] {
        &self.lists.stable_coins
    }

    /// Problematic coins in insertion order.
    pub fn problematic_coins(&self) -> &[String] {
        &self.lists.problematic_coins
    }

    /// Backing file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn save(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        // Stage beside the record and rename over it; readers never see a
        // half-written file.
        let staging = self.staging_path();
        std::fs::write(&staging, serde_json::to_string_pretty(&self.lists)?)?;
        if let Err(e) = std::fs::rename(&staging, &self.path) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }

        tracing::debug!(
            path = %self.path.display(),
            stable = self.lists.stable_coins.len(),
            problematic = self.lists.problematic_coins.len(),
            "exclusion record saved"
        );
        Ok(())
    }
}
