//! Purchase dialog: brick styling, optional gift details, and checkout.
//!
//! SYSTEM CONTEXT
//! ==============
//! Opened from a tap on an unsold brick by a signed-in visitor. Submitting
//! validates the form, pays through the connected wallet, then reserves the
//! brick in the store. Payment and reservation live in
//! `state::purchase::run_purchase`; this component only gathers input and
//! reports the outcome.

#[cfg(test)]
#[path = "buy_brick_modal_test.rs"]
mod buy_brick_modal_test;

use leptos::prelude::*;

use crate::config::ClientConfig;
use crate::net::store::StoreClient;
use crate::payment::{ExternalSigner, PaymentRequest, PaymentToken, short_address};
use crate::state::auth::AuthState;
use crate::state::purchase::{BRICK_COLORS, FormError, MESSAGE_MAX_CHARS, PurchaseForm, Target, run_purchase, success_message};
use crate::state::wall::{WallState, price_label};

const PAYMENT_TOKENS: [PaymentToken; 2] = [PaymentToken::Sol, PaymentToken::Usdc];

fn submit_label(submitting: bool, is_gift: bool) -> &'static str {
    match (submitting, is_gift) {
        (true, _) => "Processing...",
        (false, true) => "Confirm & send gift",
        (false, false) => "Confirm & buy",
    }
}

fn links_toggle_label(open: bool) -> &'static str {
    if open { "Hide social links" } else { "Add social links (optional)" }
}

fn message_counter(form: &PurchaseForm) -> String {
    format!("{}/{MESSAGE_MAX_CHARS}", form.message_len())
}

/// Ask the visitor to confirm buying a brick without a message.
fn confirm_empty_message() -> bool {
    #[cfg(feature = "csr")]
    {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(&FormError::EmptyMessage.to_string()).ok())
            .unwrap_or(false)
    }
    #[cfg(not(feature = "csr"))]
    {
        false
    }
}

fn text_field(
    form: RwSignal<PurchaseForm>,
    placeholder: &'static str,
    read: fn(&PurchaseForm) -> String,
    write: fn(&mut PurchaseForm, String),
) -> impl IntoView {
    view! {
        <input
            class="buy-modal__input"
            type="text"
            placeholder=placeholder
            prop:value=move || form.with(read)
            on:input=move |ev| {
                let value = event_target_value(&ev);
                form.update(|f| write(f, value));
            }
        />
    }
}

/// Modal for buying `target`.
#[component]
pub fn BuyBrickModal(target: Target, on_close: Callback<()>) -> impl IntoView {
    let wall = expect_context::<RwSignal<WallState>>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let wallet = expect_context::<RwSignal<ExternalSigner>>();
    let base_store = expect_context::<StoreClient>();
    let config = expect_context::<ClientConfig>();

    let form = RwSignal::new(PurchaseForm::default());
    let show_links = RwSignal::new(false);
    let submitting = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    let price_usd = config.price_usd;
    let quote_line = move || {
        wall.with(|w| w.quote(price_usd).map(|q| price_label(&q, w.price.is_fallback)))
    };

    let on_connect = move |_| {
        leptos::task::spawn_local(async move {
            match ExternalSigner::connect().await {
                Ok(address) => {
                    log::debug!("wallet connected: {}", short_address(&address));
                    wallet.set(ExternalSigner::connected(address));
                }
                Err(e) => {
                    let _ = error.try_set(Some(e.to_string()));
                }
            }
        });
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let draft = form.get_untracked();
        let validated = match draft.validate(false) {
            Ok(valid) => valid,
            Err(FormError::EmptyMessage) => {
                if !confirm_empty_message() {
                    return;
                }
                match draft.validate(true) {
                    Ok(valid) => valid,
                    Err(e) => {
                        error.set(Some(e.to_string()));
                        return;
                    }
                }
            }
            Err(e) => {
                error.set(Some(e.to_string()));
                return;
            }
        };
        let Some(quote) = wall.with_untracked(|w| w.quote(price_usd)) else {
            error.set(Some("The brick price is unavailable right now.".to_owned()));
            return;
        };
        let payment = match PaymentRequest::build(validated.token, &quote, &config) {
            Ok(payment) => payment,
            Err(e) => {
                error.set(Some(e.to_string()));
                return;
            }
        };

        let signer = wallet.get_untracked();
        let store = auth.with_untracked(|a| a.store(&base_store));
        let owner = auth.with_untracked(AuthState::user_id);
        error.set(None);
        submitting.set(true);
        leptos::task::spawn_local(async move {
            let result = run_purchase(&signer, &store, owner, target, &validated, &payment).await;
            let _ = submitting.try_set(false);
            match result {
                Ok(receipt) => wall.update(|w| {
                    let notice = success_message(&receipt, w.grid());
                    w.commit_purchase(receipt.record);
                    w.notice = Some(notice);
                }),
                Err(e) => {
                    let _ = error.try_set(Some(e.to_string()));
                }
            }
        });
    };

    let on_backdrop = move |_| {
        if !submitting.get_untracked() {
            on_close.run(());
        }
    };
    let on_close_click = move |_| on_close.run(());
    let on_keydown = Callback::new(move |ev: leptos::ev::KeyboardEvent| {
        if ev.key() == "Escape" && !submitting.get_untracked() {
            ev.prevent_default();
            on_close.run(());
        }
    });

    view! {
        <div class="modal__backdrop" on:click=on_backdrop>
            <div
                class="modal buy-modal"
                on:click=move |ev| ev.stop_propagation()
                on:keydown=move |ev| on_keydown.run(ev)
                tabindex="0"
            >
                <div class="modal__header">
                    <div>
                        <h2 class="modal__title">"Buy a brick"</h2>
                        <div class="modal__eyebrow">
                            {format!("Brick #{} · x={}, y={}", target.index, target.x, target.y)}
                        </div>
                        <p class="modal__subtitle">
                            "Pick a color, write something unhinged, optionally link your socials, and claim your spot on the wall."
                        </p>
                    </div>
                    <button class="modal__close" on:click=on_close_click disabled=move || submitting.get()>"✕"</button>
                </div>

                <form class="buy-modal__form" on:submit=on_submit>
                    <div class="buy-modal__section">
                        <label class="buy-modal__label">"Color"</label>
                        <div class="buy-modal__palette">
                            {BRICK_COLORS
                                .iter()
                                .map(|&(label, value)| view! {
                                    <button
                                        type="button"
                                        class="buy-modal__color"
                                        class:buy-modal__color--active=move || form.with(|f| f.color == value)
                                        on:click=move |_| form.update(|f| f.color = value.to_owned())
                                    >
                                        <span class="brick-swatch brick-swatch--small" style:background-color=value></span>
                                        <span>{label}</span>
                                    </button>
                                })
                                .collect_view()}
                        </div>
                    </div>

                    <div class="buy-modal__section">
                        <label class="buy-modal__label">"Message on your brick"</label>
                        <textarea
                            class="buy-modal__textarea"
                            rows="4"
                            maxlength=MESSAGE_MAX_CHARS.to_string()
                            placeholder="Your confession, meme, manifesto, or love letter to your future self..."
                            prop:value=move || form.with(|f| f.message.clone())
                            on:input=move |ev| {
                                let text = event_target_value(&ev);
                                form.update(|f| f.set_message(&text));
                            }
                        ></textarea>
                        <div class="buy-modal__counter">{move || form.with(message_counter)}</div>
                    </div>

                    <div class="buy-modal__section">
                        <button type="button" class="buy-modal__link-toggle" on:click=move |_| show_links.update(|open| *open = !*open)>
                            {move || links_toggle_label(show_links.get())}
                        </button>
                        <Show when=move || show_links.get()>
                            <div class="buy-modal__links">
                                {text_field(form, "Facebook URL", |f| f.facebook_url.clone(), |f, v| f.facebook_url = v)}
                                {text_field(form, "Instagram URL", |f| f.instagram_url.clone(), |f, v| f.instagram_url = v)}
                                {text_field(form, "YouTube URL", |f| f.youtube_url.clone(), |f, v| f.youtube_url = v)}
                                {text_field(form, "TikTok URL", |f| f.tiktok_url.clone(), |f, v| f.tiktok_url = v)}
                                {text_field(form, "X / Twitter URL", |f| f.x_url.clone(), |f, v| f.x_url = v)}
                            </div>
                        </Show>
                    </div>

                    <div class="buy-modal__section buy-modal__gift">
                        <label class="buy-modal__check">
                            <input
                                type="checkbox"
                                prop:checked=move || form.with(|f| f.is_gift)
                                on:change=move |ev| {
                                    let checked = event_target_checked(&ev);
                                    form.update(|f| f.is_gift = checked);
                                }
                            />
                            <span>
                                "Make this a gift brick"
                                <span class="buy-modal__hint">
                                    "We'll email the recipient with your message and their brick details."
                                </span>
                            </span>
                        </label>
                        <Show when=move || form.with(|f| f.is_gift)>
                            <div class="buy-modal__gift-fields">
                                {text_field(form, "Recipient name (optional)", |f| f.recipient_name.clone(), |f, v| f.recipient_name = v)}
                                {text_field(form, "Recipient email (required)", |f| f.recipient_email.clone(), |f, v| f.recipient_email = v)}
                                {text_field(form, "Short note to include in the gift email (optional)", |f| f.gift_note.clone(), |f, v| f.gift_note = v)}
                            </div>
                        </Show>
                    </div>

                    <div class="buy-modal__section">
                        <label class="buy-modal__label">"Pay with"</label>
                        <div class="buy-modal__tokens">
                            {PAYMENT_TOKENS
                                .into_iter()
                                .map(|token| view! {
                                    <label class="buy-modal__token">
                                        <input
                                            type="radio"
                                            name="payment-token"
                                            prop:checked=move || form.with(|f| f.token == token)
                                            on:change=move |_| form.update(|f| f.token = token)
                                        />
                                        <span>{token.label()}</span>
                                    </label>
                                })
                                .collect_view()}
                        </div>
                        <div class="buy-modal__quote">{quote_line}</div>
                        {move || match wallet.get().address {
                            Some(address) => view! {
                                <div class="buy-modal__wallet">{format!("Paying from {}", short_address(&address))}</div>
                            }
                            .into_any(),
                            None => view! {
                                <button type="button" class="buy-modal__connect" on:click=on_connect>
                                    "Connect wallet"
                                </button>
                            }
                            .into_any(),
                        }}
                    </div>

                    {move || error.get().map(|e| view! { <div class="modal__error">{e}</div> })}

                    <button type="submit" class="buy-modal__submit" disabled=move || submitting.get()>
                        {move || submit_label(submitting.get(), form.with(|f| f.is_gift))}
                    </button>
                </form>
            </div>
        </div>
    }
}
