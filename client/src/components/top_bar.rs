//! Site header: navigation, wallet connection and sign-in state.

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::net::session;
use crate::net::store::StoreClient;
use crate::payment::{ExternalSigner, short_address};
use crate::state::auth::AuthState;

fn wallet_label(signer: &ExternalSigner) -> String {
    signer.address.as_deref().map_or_else(|| "Select wallet".to_owned(), short_address)
}

/// Header shown above every page.
#[component]
pub fn TopBar() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let wallet = expect_context::<RwSignal<ExternalSigner>>();
    let base_store = expect_context::<StoreClient>();
    let navigate = use_navigate();

    let signed_in = move || auth.with(|a| a.user.is_some());
    let connected = move || wallet.with(|w| w.address.is_some());

    let on_wallet = move |_| {
        if wallet.with_untracked(|w| w.address.is_some()) {
            return;
        }
        leptos::task::spawn_local(async move {
            match ExternalSigner::connect().await {
                Ok(address) => wallet.set(ExternalSigner::connected(address)),
                Err(e) => log::warn!("wallet connection failed: {e}"),
            }
        });
    };

    let on_login = {
        let navigate = navigate.clone();
        move |_| navigate("/login", Default::default())
    };

    let on_logout = move |_| {
        let token = auth.with_untracked(|a| a.access_token().map(str::to_owned));
        let store = base_store.clone();
        auth.set(AuthState::default());
        if let Some(token) = token {
            leptos::task::spawn_local(async move {
                session::sign_out(&store, &token).await;
            });
        } else {
            session::forget();
        }
        navigate("/", Default::default());
    };

    view! {
        <header class="top-bar">
            <nav class="top-bar__nav">
                <A href="/" attr:class="top-bar__brand">
                    <span class="top-bar__logo">"🧱"</span>
                    <span class="top-bar__titles">
                        <span class="top-bar__kicker">"THE INTERNET"</span>
                        <span class="top-bar__name">"Brick Wall"</span>
                    </span>
                </A>
                <div class="top-bar__actions">
                    <A href="/wall" attr:class="top-bar__link">"View wall"</A>
                    <Show when=signed_in>
                        <A href="/my-bricks" attr:class="top-bar__link">"My bricks"</A>
                    </Show>
                    <button class="top-bar__wallet" on:click=on_wallet>
                        <span class="top-bar__wallet-dot" class:top-bar__wallet-dot--on=connected></span>
                        <span>{move || wallet.with(wallet_label)}</span>
                    </button>
                    {move || {
                        if auth.with(|a| a.loading) {
                            view! { <span class="top-bar__pending">"…"</span> }.into_any()
                        } else if signed_in() {
                            view! { <button class="top-bar__auth" on:click=on_logout.clone()>"Log out"</button> }.into_any()
                        } else {
                            view! { <button class="top-bar__auth" on:click=on_login.clone()>"Log in"</button> }.into_any()
                        }
                    }}
                </div>
            </nav>
        </header>
    }
}
