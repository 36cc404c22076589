//! Login page: magic-link sign-in and wallet connection.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::net::session::{self, looks_like_email};
use crate::net::store::StoreClient;
use crate::payment::{ExternalSigner, short_address};
use crate::state::auth::AuthState;

const MAGIC_LINK_SENT: &str = "Magic link sent, check your inbox!";

fn validate_login_email(raw: &str) -> Result<String, &'static str> {
    let email = raw.trim();
    if email.is_empty() {
        return Err("Please enter your email.");
    }
    if !looks_like_email(email) {
        return Err("That doesn't look like an email address.");
    }
    Ok(email.to_owned())
}

/// In-app path to return to after sign-in. Only same-origin paths are kept.
fn redirect_target(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_owned(),
        _ => "/".to_owned(),
    }
}

/// Path the emailed link returns to. The session arrives in the URL
/// fragment, so any fragment of our own is dropped.
fn link_return_path(path: &str) -> &str {
    path.split_once('#').map_or(path, |(before, _)| before)
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let wallet = expect_context::<RwSignal<ExternalSigner>>();
    let store = expect_context::<StoreClient>();
    let query = use_query_map();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let redirect = move || query.with(|q| redirect_target(q.get_str("redirect")));

    // Already signed in (or the session just resolved): go where we were sent from.
    Effect::new(move || {
        if auth.with(|a| a.user.is_some()) {
            navigate(&redirect(), Default::default());
        }
    });

    let on_send_link = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let email_value = match validate_login_email(&email.get()) {
            Ok(value) => value,
            Err(message) => {
                info.set(message.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set("Sending magic link...".to_owned());

        let store = store.clone();
        let return_path = redirect();
        leptos::task::spawn_local(async move {
            #[cfg(feature = "csr")]
            let origin = web_sys::window().and_then(|w| w.location().origin().ok()).unwrap_or_default();
            #[cfg(not(feature = "csr"))]
            let origin = String::new();
            let redirect_to = format!("{origin}{}", link_return_path(&return_path));
            match session::send_magic_link(&store, &email_value, &redirect_to).await {
                Ok(()) => info.set(MAGIC_LINK_SENT.to_owned()),
                Err(e) => {
                    log::warn!("magic link request failed: {e}");
                    info.set(format!("Email login failed: {e}"));
                }
            }
            busy.set(false);
        });
    };

    let on_connect = move |_| {
        leptos::task::spawn_local(async move {
            match ExternalSigner::connect().await {
                Ok(address) => wallet.set(ExternalSigner::connected(address)),
                Err(e) => info.set(e.to_string()),
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Log in to claim your brick"</h1>
                <p class="login-card__subtitle">
                    "Use email for your Brick Wall account. You can also connect your Solana wallet for payments."
                </p>
                <form class="login-form" on:submit=on_send_link>
                    <div class="login-form__label">"Continue with email"</div>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Sending magic link..." } else { "Send magic login link" }}
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <div class="login-divider"></div>
                <div class="login-wallet">
                    <div class="login-form__label">"Connect Solana wallet"</div>
                    <p class="login-card__hint">
                        "This connects your wallet for SOL / USDC payments. Your Brick Wall account is still based on your email login."
                    </p>
                    {move || match wallet.get().address {
                        Some(address) => view! {
                            <div class="login-wallet__address">{format!("Connected wallet: {}", short_address(&address))}</div>
                        }
                        .into_any(),
                        None => view! {
                            <button class="login-button login-button--secondary" on:click=on_connect>"Connect wallet"</button>
                        }
                        .into_any(),
                    }}
                </div>
                <p class="login-card__hint">"After logging in, head to the wall and click any empty brick to buy it. 🧱"</p>
            </div>
        </div>
    }
}
