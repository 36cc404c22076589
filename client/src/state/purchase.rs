//! Buy-a-brick form and the two-phase purchase flow.
//!
//! Phase one asks the wallet to pay and waits for a confirmed signature.
//! Phase two submits that proof with the brick's attributes to the store's
//! reserve procedure. Nothing is recorded as owned until phase two returns
//! the stored row, and a payment failure never reaches the store.

#[cfg(test)]
#[path = "purchase_test.rs"]
mod purchase_test;

use uuid::Uuid;
use wall::grid::Grid;
use wall::sold::{BrickRecord, SocialLinks};

use crate::net::store::{StoreClient, StoreError};
use crate::net::types::ReserveRequest;
use crate::payment::{PaymentError, PaymentRail, PaymentRequest, PaymentToken};

/// Palette offered by the buy form, as (label, color).
pub const BRICK_COLORS: [(&str, &str); 5] = [
    ("Yellow", "#FFD352"),
    ("Blue", "#8FD3FF"),
    ("Pink", "#FF9BD0"),
    ("Green", "#8BE7B2"),
    ("Orange", "#FF9F6E"),
];

pub const MESSAGE_MAX_CHARS: usize = 280;

/// The brick being bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub index: u32,
    pub x: u32,
    pub y: u32,
}

impl Target {
    pub fn from_index(grid: Grid, index: u32) -> Option<Self> {
        grid.checked_xy(index).map(|cell| Self { index, x: cell.x, y: cell.y })
    }
}

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseForm {
    pub color: String,
    pub message: String,
    pub facebook_url: String,
    pub instagram_url: String,
    pub youtube_url: String,
    pub tiktok_url: String,
    pub x_url: String,
    pub is_gift: bool,
    pub recipient_name: String,
    pub recipient_email: String,
    pub gift_note: String,
    pub token: PaymentToken,
}

impl Default for PurchaseForm {
    fn default() -> Self {
        Self {
            color: BRICK_COLORS[0].1.to_owned(),
            message: String::new(),
            facebook_url: String::new(),
            instagram_url: String::new(),
            youtube_url: String::new(),
            tiktok_url: String::new(),
            x_url: String::new(),
            is_gift: false,
            recipient_name: String::new(),
            recipient_email: String::new(),
            gift_note: String::new(),
            token: PaymentToken::default(),
        }
    }
}

/// Validation failures, worded for the visitor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please pick a brick color.")]
    MissingColor,
    #[error("Messages can be at most {MESSAGE_MAX_CHARS} characters.")]
    MessageTooLong,
    /// Not a hard error: the visitor may confirm and continue.
    #[error("You didn't write a message. Do you want to continue anyway?")]
    EmptyMessage,
    #[error("Please enter a recipient email for the gift.")]
    MissingRecipientEmail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gift {
    pub recipient_name: Option<String>,
    pub recipient_email: String,
    pub note: Option<String>,
}

/// Form input that passed validation, with blanks normalized to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPurchase {
    pub color: String,
    pub message: Option<String>,
    pub links: SocialLinks,
    pub gift: Option<Gift>,
    pub token: PaymentToken,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

impl PurchaseForm {
    pub fn message_len(&self) -> usize {
        self.message.chars().count()
    }

    /// Replace the message, cut to [`MESSAGE_MAX_CHARS`].
    pub fn set_message(&mut self, text: &str) {
        self.message = text.chars().take(MESSAGE_MAX_CHARS).collect();
    }

    /// Check the form in the order the visitor sees it.
    ///
    /// An empty message yields [`FormError::EmptyMessage`] unless
    /// `empty_message_confirmed` is set.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] that applies.
    pub fn validate(&self, empty_message_confirmed: bool) -> Result<ValidatedPurchase, FormError> {
        let color = non_blank(&self.color).ok_or(FormError::MissingColor)?;
        if self.message_len() > MESSAGE_MAX_CHARS {
            return Err(FormError::MessageTooLong);
        }
        let message = non_blank(&self.message);
        if message.is_none() && !empty_message_confirmed {
            return Err(FormError::EmptyMessage);
        }
        let gift = if self.is_gift {
            let recipient_email = non_blank(&self.recipient_email).ok_or(FormError::MissingRecipientEmail)?;
            Some(Gift {
                recipient_name: non_blank(&self.recipient_name),
                recipient_email,
                note: non_blank(&self.gift_note),
            })
        } else {
            None
        };
        Ok(ValidatedPurchase {
            color,
            message,
            links: SocialLinks {
                facebook_url: non_blank(&self.facebook_url),
                instagram_url: non_blank(&self.instagram_url),
                youtube_url: non_blank(&self.youtube_url),
                tiktok_url: non_blank(&self.tiktok_url),
                x_url: non_blank(&self.x_url),
            },
            gift,
            token: self.token,
        })
    }
}

impl ValidatedPurchase {
    /// Reserve-procedure arguments for `target`, carrying the payment proof.
    pub fn reserve_request(&self, target: Target, signature: &str) -> ReserveRequest {
        let gift = self.gift.as_ref();
        ReserveRequest {
            p_brick_index: target.index,
            p_x: target.x,
            p_y: target.y,
            p_color: self.color.clone(),
            p_message: self.message.clone(),
            p_facebook_url: self.links.facebook_url.clone(),
            p_instagram_url: self.links.instagram_url.clone(),
            p_youtube_url: self.links.youtube_url.clone(),
            p_tiktok_url: self.links.tiktok_url.clone(),
            p_x_url: self.links.x_url.clone(),
            p_is_gift: gift.is_some(),
            p_recipient_name: gift.and_then(|g| g.recipient_name.clone()),
            p_recipient_email: gift.map(|g| g.recipient_email.clone()),
            p_gift_note: gift.and_then(|g| g.note.clone()),
            p_tx_signature: signature.to_owned(),
            p_payment_token: self.token.label().to_owned(),
        }
    }
}

/// The store side of a purchase.
#[allow(async_fn_in_trait)]
pub trait BrickReserver {
    /// Atomically claim the brick described by `request`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the brick is already held.
    async fn reserve(&self, request: &ReserveRequest) -> Result<BrickRecord, StoreError>;
}

impl BrickReserver for StoreClient {
    async fn reserve(&self, request: &ReserveRequest) -> Result<BrickRecord, StoreError> {
        StoreClient::reserve(self, request).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseError {
    #[error("You need to be logged in to buy a brick.")]
    NotSignedIn,
    #[error("{0}")]
    Payment(#[from] PaymentError),
    #[error("Brick #{index} was just claimed by someone else. Try another brick. Payment signature: {signature}")]
    Conflict { index: u32, signature: String },
    #[error("Purchase failed after payment: {source}")]
    Store { source: StoreError, signature: String },
}

/// A completed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    /// Stored row, with the buyer recorded as owner.
    pub record: BrickRecord,
    pub token: PaymentToken,
    pub signature: String,
    pub is_gift: bool,
}

/// Pay, then reserve.
///
/// # Errors
///
/// Returns [`PurchaseError`]. Payment failures stop before the store is
/// contacted; store failures carry the payment signature for support.
pub async fn run_purchase<R, S>(
    rail: &R,
    store: &S,
    owner: Option<Uuid>,
    target: Target,
    purchase: &ValidatedPurchase,
    payment: &PaymentRequest,
) -> Result<PurchaseReceipt, PurchaseError>
where
    R: PaymentRail,
    S: BrickReserver,
{
    let owner = owner.ok_or(PurchaseError::NotSignedIn)?;
    let proof = rail.pay(payment).await?;
    log::debug!("brick #{} paid with {}: {}", target.index, proof.token.label(), proof.signature);

    let request = purchase.reserve_request(target, &proof.signature);
    let mut record = match store.reserve(&request).await {
        Ok(record) => record,
        Err(StoreError::Conflict) => {
            log::warn!("brick #{} was claimed after payment {}", target.index, proof.signature);
            return Err(PurchaseError::Conflict { index: target.index, signature: proof.signature });
        }
        Err(source) => {
            log::warn!("reserve failed after payment {}: {source}", proof.signature);
            return Err(PurchaseError::Store { source, signature: proof.signature });
        }
    };
    record.fields.owner_id = Some(owner);
    Ok(PurchaseReceipt { record, token: proof.token, signature: proof.signature, is_gift: purchase.gift.is_some() })
}

/// Confirmation shown after a purchase.
pub fn success_message(receipt: &PurchaseReceipt, grid: Grid) -> String {
    let index = receipt.record.brick_index;
    let label = receipt.token.label();
    if receipt.is_gift {
        return format!(
            "Gift brick purchased with {label}! Brick #{index} is reserved and the recipient will get an email."
        );
    }
    let cell = grid.to_xy(index);
    format!("Success! You paid with {label}. Brick #{index} is now yours (x={}, y={}).", cell.x, cell.y)
}
