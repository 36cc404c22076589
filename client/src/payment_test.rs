use futures::executor::block_on;

use super::*;

const WALLET: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";
const MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

fn config(merchant: Option<&str>, mint: Option<&str>) -> ClientConfig {
    ClientConfig {
        store_url: "https://s.example".to_owned(),
        store_anon_key: "anon".to_owned(),
        merchant_wallet: merchant.map(str::to_owned),
        usdc_mint: mint.map(str::to_owned),
        price_usd: 1.0,
    }
}

// =============================================================
// Quote
// =============================================================

#[test]
fn quote_converts_dollars_to_base_units() {
    let quote = Quote::new(1.0, 150.0).unwrap();
    assert_eq!(quote.lamports, 6_666_667);
    assert_eq!(quote.usdc_units, 1_000_000);
    assert_eq!(quote.amount(PaymentToken::Sol), 6_666_667);
    assert_eq!(quote.amount(PaymentToken::Usdc), 1_000_000);
    assert!((quote.sol_per_brick() - 0.006_666_666).abs() < 1e-6);
}

#[test]
fn quote_scales_with_price() {
    let quote = Quote::new(2.5, 100.0).unwrap();
    assert_eq!(quote.lamports, 25_000_000);
    assert_eq!(quote.usdc_units, 2_500_000);
}

#[test]
fn quote_rejects_bad_inputs() {
    assert!(Quote::new(0.0, 150.0).is_err());
    assert!(Quote::new(1.0, 0.0).is_err());
    assert!(Quote::new(1.0, f64::NAN).is_err());
}

// =============================================================
// PaymentRequest
// =============================================================

#[test]
fn sol_request_needs_merchant_only() {
    let quote = Quote::new(1.0, 150.0).unwrap();
    let req = PaymentRequest::build(PaymentToken::Sol, &quote, &config(Some(WALLET), None)).unwrap();
    assert_eq!(req.amount, 6_666_667);
    assert_eq!(req.recipient, WALLET);
    assert_eq!(req.mint, None);
}

#[test]
fn usdc_request_carries_mint() {
    let quote = Quote::new(1.0, 150.0).unwrap();
    let req = PaymentRequest::build(PaymentToken::Usdc, &quote, &config(Some(WALLET), Some(MINT))).unwrap();
    assert_eq!(req.amount, 1_000_000);
    assert_eq!(req.mint.as_deref(), Some(MINT));
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["token"], "USDC");
}

#[test]
fn missing_setup_is_reported() {
    let quote = Quote::new(1.0, 150.0).unwrap();
    let err = PaymentRequest::build(PaymentToken::Sol, &quote, &config(None, Some(MINT))).unwrap_err();
    assert_eq!(err.to_string(), "Merchant wallet is not configured.");
    let err = PaymentRequest::build(PaymentToken::Usdc, &quote, &config(Some(WALLET), None)).unwrap_err();
    assert_eq!(err.to_string(), "USDC mint is not configured.");
}

// =============================================================
// Wallet errors
// =============================================================

#[test]
fn wallet_errors_are_classified() {
    assert_eq!(classify_wallet_error("User rejected the request."), PaymentError::Rejected);
    assert_eq!(classify_wallet_error("WalletNotConnectedError"), PaymentError::NotConnected);
    assert_eq!(classify_wallet_error("insufficient lamports 10, need 20"), PaymentError::InsufficientFunds);
    assert_eq!(
        classify_wallet_error("Transaction was not confirmed in 30.00 seconds"),
        PaymentError::ConfirmationTimeout
    );
    assert_eq!(classify_wallet_error(" blockhash mismatch "), PaymentError::Failed("blockhash mismatch".to_owned()));
}

#[test]
fn not_connected_message_matches_ui_copy() {
    assert_eq!(PaymentError::NotConnected.to_string(), "Connect your Solana wallet first.");
}

#[test]
fn signer_without_address_refuses_to_pay() {
    let quote = Quote::new(1.0, 150.0).unwrap();
    let req = PaymentRequest::build(PaymentToken::Sol, &quote, &config(Some(WALLET), None)).unwrap();
    let result = block_on(ExternalSigner::default().pay(&req));
    assert_eq!(result, Err(PaymentError::NotConnected));
}

#[test]
fn short_address_keeps_ends() {
    assert_eq!(short_address(WALLET), "9xQe…VFin");
    assert_eq!(short_address("short"), "short");
}
