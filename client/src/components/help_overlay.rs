//! First-visit helper explaining how to use the wall.
//!
//! Shown once per browser; dismissal is remembered in local storage by the
//! wall page.

use leptos::prelude::*;

/// Small card in the wall's lower-left corner.
#[component]
pub fn HelpOverlay(on_close: Callback<()>) -> impl IntoView {
    let on_keydown = Callback::new(move |ev: leptos::ev::KeyboardEvent| {
        if ev.key() == "Escape" {
            ev.prevent_default();
            on_close.run(());
        }
    });

    view! {
        <div class="help-overlay">
            <div class="help-overlay__card" on:keydown=move |ev| on_keydown.run(ev) tabindex="0">
                <div class="help-overlay__title">"How the wall works"</div>
                <p class="help-overlay__body">
                    "Scroll or pinch to zoom. Tap an empty spot to buy a brick, or tap a colored brick to inspect it."
                </p>
                <button class="help-overlay__dismiss" on:click=move |_| on_close.run(())>
                    "Got it"
                </button>
            </div>
        </div>
    }
}
