//! Bottom info bar on the wall page.
//!
//! SYSTEM CONTEXT
//! ==============
//! Shows the hovered brick, the "highlight my bricks" toggle, the current
//! price quote and the claimed counter. Everything is derived from
//! `WallState`; the bar owns no state of its own.

#[cfg(test)]
#[path = "status_bar_test.rs"]
mod status_bar_test;

use leptos::prelude::*;

use crate::config::ClientConfig;
use crate::state::auth::AuthState;
use crate::state::wall::{WallState, claimed_label, hover_label, price_label};

/// Status bar overlaid on the bottom of the wall.
#[component]
pub fn StatusBar() -> impl IntoView {
    let wall = expect_context::<RwSignal<WallState>>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let config = expect_context::<ClientConfig>();
    let price_usd = config.price_usd;

    let hovered = move || wall.with(|w| hover_label(w.grid(), w.hover));
    let toggle_label = move || highlight_button_label(wall.with(|w| w.highlight_mine));
    let details = move || wall.with(|w| price_and_count_line(w, price_usd));
    let live_class = move || live_dot_class(wall.with(|w| w.live));

    let on_toggle = move |_| {
        let user = auth.with_untracked(AuthState::user_id);
        wall.update(|w| {
            if let Err(notice) = w.toggle_highlight(user) {
                w.notice = Some(notice.to_string());
            }
        });
    };

    view! {
        <div class="wall-status">
            <div class="wall-status__pill">
                <span class=live_class title="Live updates"></span>
                <span class="wall-status__hover">{hovered}</span>
                <button class="wall-status__toggle" on:click=on_toggle>
                    {toggle_label}
                </button>
                <span class="wall-status__details">{details}</span>
            </div>
        </div>
    }
}

fn highlight_button_label(highlighting: bool) -> &'static str {
    if highlighting { "Hide my bricks" } else { "Highlight my bricks" }
}

fn live_dot_class(live: bool) -> &'static str {
    if live { "wall-status__dot wall-status__dot--live" } else { "wall-status__dot" }
}

/// Price quote and claimed counter joined with a middle dot.
fn price_and_count_line(wall: &WallState, price_usd: f64) -> String {
    let claimed = claimed_label(wall.claimed_count(), wall.grid());
    match wall.quote(price_usd) {
        Some(quote) => format!("{} · {claimed}", price_label(&quote, wall.price.is_fallback)),
        None => claimed,
    }
}
