//! Paying for a brick through the visitor's Solana wallet.
//!
//! The wallet itself (adapter selection, transaction building, signing and
//! confirmation) lives in page-provided JavaScript exposed as
//! `window.brickwall`. This module prices the brick, describes the transfer
//! the wallet must make, and classifies what comes back.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`PaymentRail`] is the seam the purchase flow depends on; the browser
//! build uses [`ExternalSigner`] and tests use fakes.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "payment_test.rs"]
mod payment_test;

use serde::Serialize;

use crate::config::ClientConfig;

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;
/// USDC has six decimals.
pub const USDC_UNITS_PER_DOLLAR: f64 = 1_000_000.0;

/// Currency the visitor pays with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentToken {
    #[default]
    Sol,
    Usdc,
}

impl PaymentToken {
    pub fn label(self) -> &'static str {
        match self {
            Self::Sol => "SOL",
            Self::Usdc => "USDC",
        }
    }
}

/// Brick price expressed in both payment tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub price_usd: f64,
    pub sol_usd: f64,
    pub lamports: u64,
    pub usdc_units: u64,
}

impl Quote {
    /// Price `price_usd` at a SOL rate of `sol_usd`.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Failed`] for a non-positive price or rate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(price_usd: f64, sol_usd: f64) -> Result<Self, PaymentError> {
        if !(price_usd.is_finite() && price_usd > 0.0 && sol_usd.is_finite() && sol_usd > 0.0) {
            return Err(PaymentError::Failed(format!("cannot price a brick at ${price_usd} with SOL at ${sol_usd}")));
        }
        Ok(Self {
            price_usd,
            sol_usd,
            lamports: (price_usd / sol_usd * LAMPORTS_PER_SOL).round() as u64,
            usdc_units: (price_usd * USDC_UNITS_PER_DOLLAR).round() as u64,
        })
    }

    pub fn sol_per_brick(&self) -> f64 {
        self.price_usd / self.sol_usd
    }

    /// Amount in the token's smallest unit.
    pub fn amount(&self, token: PaymentToken) -> u64 {
        match token {
            PaymentToken::Sol => self.lamports,
            PaymentToken::Usdc => self.usdc_units,
        }
    }
}

/// Transfer the wallet is asked to make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    pub token: PaymentToken,
    /// Base units: lamports for SOL, micro-USDC for USDC.
    pub amount: u64,
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint: Option<String>,
}

impl PaymentRequest {
    /// Build the transfer for `token`, checking the merchant setup first.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::NotConfigured`] when the merchant wallet, or
    /// for USDC the mint, is missing.
    pub fn build(token: PaymentToken, quote: &Quote, config: &ClientConfig) -> Result<Self, PaymentError> {
        let recipient = config.merchant_wallet.clone().ok_or(PaymentError::NotConfigured("Merchant wallet"))?;
        let mint = match token {
            PaymentToken::Sol => None,
            PaymentToken::Usdc => Some(config.usdc_mint.clone().ok_or(PaymentError::NotConfigured("USDC mint"))?),
        };
        Ok(Self { token, amount: quote.amount(token), recipient, mint })
    }
}

/// Confirmed payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProof {
    pub signature: String,
    pub token: PaymentToken,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("Connect your Solana wallet first.")]
    NotConnected,
    #[error("{0} is not configured.")]
    NotConfigured(&'static str),
    #[error("Payment was cancelled in your wallet.")]
    Rejected,
    #[error("Your wallet doesn't have enough funds for this brick.")]
    InsufficientFunds,
    #[error("The payment was not confirmed in time. Check your wallet before trying again.")]
    ConfirmationTimeout,
    #[error("Payment failed: {0}")]
    Failed(String),
}

/// Something that can move money and report the confirmed signature.
#[allow(async_fn_in_trait)]
pub trait PaymentRail {
    /// Send the transfer and wait for confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] when the wallet is missing, the visitor
    /// declines, or the transfer fails or is not confirmed.
    async fn pay(&self, request: &PaymentRequest) -> Result<PaymentProof, PaymentError>;
}

/// Map a wallet error message onto a [`PaymentError`].
pub fn classify_wallet_error(message: &str) -> PaymentError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("rejected") || lower.contains("cancel") || lower.contains("declined") {
        PaymentError::Rejected
    } else if lower.contains("not connected") || lower.contains("no wallet") || lower.contains("walletnotconnected") {
        PaymentError::NotConnected
    } else if lower.contains("insufficient") || lower.contains("no record of a prior credit") {
        PaymentError::InsufficientFunds
    } else if lower.contains("timeout") || lower.contains("timed out") || lower.contains("not confirmed") || lower.contains("expired")
    {
        PaymentError::ConfirmationTimeout
    } else {
        PaymentError::Failed(message.trim().to_owned())
    }
}

/// Short form of a wallet address for display, e.g. `9xQe…VFin`.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_owned();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

#[cfg(feature = "csr")]
mod bridge {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(catch, js_namespace = brickwall, js_name = connect)]
        pub async fn connect() -> Result<JsValue, JsValue>;

        #[wasm_bindgen(catch, js_namespace = brickwall, js_name = pay)]
        pub async fn pay(request: JsValue) -> Result<JsValue, JsValue>;
    }

    /// Whether the page installed `window.brickwall`.
    pub fn installed() -> bool {
        web_sys::window()
            .is_some_and(|w| js_sys::Reflect::has(&w, &JsValue::from_str("brickwall")).unwrap_or(false))
    }

    /// Best-effort message text from a thrown JS value.
    pub fn error_text(err: &JsValue) -> String {
        if let Some(text) = err.as_string() {
            return text;
        }
        js_sys::Reflect::get(err, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string())
            .unwrap_or_else(|| format!("{err:?}"))
    }
}

/// Wallet bridge backed by the page's `window.brickwall` object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalSigner {
    /// Connected wallet address, if any.
    pub address: Option<String>,
}

impl ExternalSigner {
    pub fn connected(address: String) -> Self {
        Self { address: Some(address) }
    }

    /// Ask the wallet to connect and return its address.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] when no wallet is installed or the visitor declines.
    pub async fn connect() -> Result<String, PaymentError> {
        #[cfg(feature = "csr")]
        {
            if !bridge::installed() {
                return Err(PaymentError::NotConnected);
            }
            let value = bridge::connect().await.map_err(|e| classify_wallet_error(&bridge::error_text(&e)))?;
            value.as_string().filter(|a| !a.is_empty()).ok_or(PaymentError::NotConnected)
        }
        #[cfg(not(feature = "csr"))]
        {
            Err(PaymentError::NotConnected)
        }
    }
}

impl PaymentRail for ExternalSigner {
    async fn pay(&self, request: &PaymentRequest) -> Result<PaymentProof, PaymentError> {
        if self.address.is_none() {
            return Err(PaymentError::NotConnected);
        }
        #[cfg(feature = "csr")]
        {
            if !bridge::installed() {
                return Err(PaymentError::NotConnected);
            }
            let json = serde_json::to_string(request).map_err(|e| PaymentError::Failed(e.to_string()))?;
            let arg = js_sys::JSON::parse(&json).map_err(|e| PaymentError::Failed(bridge::error_text(&e)))?;
            let value = bridge::pay(arg).await.map_err(|e| classify_wallet_error(&bridge::error_text(&e)))?;
            let signature = value
                .as_string()
                .or_else(|| {
                    js_sys::Reflect::get(&value, &wasm_bindgen::JsValue::from_str("signature"))
                        .ok()
                        .and_then(|s| s.as_string())
                })
                .filter(|s| !s.is_empty())
                .ok_or_else(|| PaymentError::Failed("wallet returned no signature".to_owned()))?;
            log::debug!("payment confirmed: {signature}");
            Ok(PaymentProof { signature, token: request.token })
        }
        #[cfg(not(feature = "csr"))]
        {
            Err(PaymentError::Failed(format!("no wallet bridge for {} payment", request.token.label())))
        }
    }
}
