//! SOL/USD quote used to price bricks in SOL.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "price_test.rs"]
mod price_test;

use serde_json::Value;

pub const PRICE_URL: &str = "https://api.coingecko.com/api/v3/simple/price?ids=solana&vs_currencies=usd";
/// Rate used until (or whenever) the price API cannot be reached.
pub const FALLBACK_SOL_PRICE_USD: f64 = 150.0;
pub const PRICE_POLL_INTERVAL_MS: u32 = 5 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PriceError {
    #[error("price response is not valid JSON: {0}")]
    Json(String),
    #[error("price response has no solana.usd value")]
    Missing,
    #[error("price must be a positive number, got {0}")]
    NotPositive(f64),
    #[error("price request failed: {0}")]
    Request(String),
}

/// Latest known rate, or the fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolPrice {
    pub usd: f64,
    pub is_fallback: bool,
}

impl Default for SolPrice {
    fn default() -> Self {
        Self { usd: FALLBACK_SOL_PRICE_USD, is_fallback: true }
    }
}

impl SolPrice {
    pub fn live(usd: f64) -> Self {
        Self { usd, is_fallback: false }
    }

    /// Fold a fetch result in: a failure keeps a previous live rate.
    #[must_use]
    pub fn update(self, fetched: Result<f64, PriceError>) -> Self {
        match fetched {
            Ok(usd) => Self::live(usd),
            Err(e) => {
                log::warn!("SOL price unavailable: {e}");
                self
            }
        }
    }
}

/// Read `solana.usd` from the price API response.
///
/// # Errors
///
/// Returns [`PriceError`] when the body is not JSON, lacks the field, or
/// holds a non-positive value.
pub fn parse_sol_price(body: &str) -> Result<f64, PriceError> {
    let value: Value = serde_json::from_str(body).map_err(|e| PriceError::Json(e.to_string()))?;
    let usd = value.pointer("/solana/usd").and_then(Value::as_f64).ok_or(PriceError::Missing)?;
    if usd.is_finite() && usd > 0.0 { Ok(usd) } else { Err(PriceError::NotPositive(usd)) }
}

/// Fetch the current SOL/USD rate.
///
/// # Errors
///
/// Returns [`PriceError`] on transport or parse failure.
pub async fn fetch_sol_price() -> Result<f64, PriceError> {
    #[cfg(feature = "csr")]
    {
        let resp = gloo_net::http::Request::get(PRICE_URL)
            .send()
            .await
            .map_err(|e| PriceError::Request(e.to_string()))?;
        if !resp.ok() {
            return Err(PriceError::Request(format!("status {}", resp.status())));
        }
        let body = resp.text().await.map_err(|e| PriceError::Request(e.to_string()))?;
        parse_sol_price(&body)
    }
    #[cfg(not(feature = "csr"))]
    {
        Err(PriceError::Request("unavailable in this build".to_owned()))
    }
}
