//! Build-time client configuration.
//!
//! Values come from environment variables captured when the WASM bundle is
//! compiled (`option_env!`), so a deployment is configured by its build.
//! [`ClientConfig::from_lookup`] takes any lookup function, which keeps the
//! parsing rules testable without touching the real environment.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

/// Default brick price in US dollars.
pub const DEFAULT_PRICE_USD: f64 = 1.0;

pub const STORE_URL_VAR: &str = "BRICKWALL_STORE_URL";
pub const STORE_ANON_KEY_VAR: &str = "BRICKWALL_STORE_ANON_KEY";
pub const MERCHANT_WALLET_VAR: &str = "BRICKWALL_MERCHANT_WALLET";
pub const USDC_MINT_VAR: &str = "BRICKWALL_USDC_MINT";
pub const PRICE_USD_VAR: &str = "BRICKWALL_PRICE_USD";

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{0} is not an http(s) URL: {1}")]
    InvalidUrl(&'static str, String),
    #[error("{PRICE_USD_VAR} must be a positive number, got {0:?}")]
    InvalidPrice(String),
}

/// Everything the client needs to reach its backing services.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the hosted brick store, without a trailing slash.
    pub store_url: String,
    /// Public (anonymous) API key sent with every store request.
    pub store_anon_key: String,
    /// Wallet that receives payments. `None` disables buying.
    pub merchant_wallet: Option<String>,
    /// Token mint for USDC payments. `None` disables the USDC option.
    pub usdc_mint: Option<String>,
    pub price_usd: f64,
}

impl ClientConfig {
    /// Read configuration captured at compile time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the store is not configured or a value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            let value = match key {
                STORE_URL_VAR => option_env!("BRICKWALL_STORE_URL"),
                STORE_ANON_KEY_VAR => option_env!("BRICKWALL_STORE_ANON_KEY"),
                MERCHANT_WALLET_VAR => option_env!("BRICKWALL_MERCHANT_WALLET"),
                USDC_MINT_VAR => option_env!("BRICKWALL_USDC_MINT"),
                PRICE_USD_VAR => option_env!("BRICKWALL_PRICE_USD"),
                _ => None,
            };
            value.map(str::to_owned)
        })
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Wallet and mint keys that are not plausible base58 public keys are
    /// logged and treated as unset rather than failing the whole app.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the store URL or anon key is missing, the
    /// URL is not http(s), or the price is not a positive number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let store_url = read(STORE_URL_VAR).ok_or(ConfigError::Missing(STORE_URL_VAR))?;
        if !(store_url.starts_with("https://") || store_url.starts_with("http://")) {
            return Err(ConfigError::InvalidUrl(STORE_URL_VAR, store_url));
        }
        let store_url = store_url.trim_end_matches('/').to_owned();
        let store_anon_key = read(STORE_ANON_KEY_VAR).ok_or(ConfigError::Missing(STORE_ANON_KEY_VAR))?;

        let price_usd = match read(PRICE_USD_VAR) {
            None => DEFAULT_PRICE_USD,
            Some(raw) => match raw.parse::<f64>() {
                Ok(price) if price.is_finite() && price > 0.0 => price,
                _ => return Err(ConfigError::InvalidPrice(raw)),
            },
        };

        Ok(Self {
            store_url,
            store_anon_key,
            merchant_wallet: read(MERCHANT_WALLET_VAR).and_then(|key| checked_public_key(MERCHANT_WALLET_VAR, key)),
            usdc_mint: read(USDC_MINT_VAR).and_then(|key| checked_public_key(USDC_MINT_VAR, key)),
            price_usd,
        })
    }
}

fn checked_public_key(var: &str, key: String) -> Option<String> {
    if is_plausible_public_key(&key) {
        Some(key)
    } else {
        log::error!("{var} is not a valid public key; treating it as unset");
        None
    }
}

/// Whether `key` looks like a base58-encoded 32-byte public key.
pub fn is_plausible_public_key(key: &str) -> bool {
    (32..=44).contains(&key.len()) && key.chars().all(|c| BASE58_ALPHABET.contains(c))
}
