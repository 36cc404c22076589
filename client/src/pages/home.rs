//! Landing page: live claimed count, the latest sold brick, and the way in.
//!
//! Loads the exact claimed count and the newest sold brick side by side.
//! A failed load only hides the numbers; the buttons into the wall keep
//! working.

#[cfg(test)]
#[path = "home_test.rs"]
mod home_test;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;
use wall::consts::DEFAULT_BRICK_COLOR;
use wall::grid::Grid;
use wall::sold::BrickRecord;

use crate::net::store::StoreClient;
use crate::pages::wall::{WALL_PATH, brick_path, buy_path, login_path};
use crate::state::auth::AuthState;
use crate::state::wall::CancelFlag;
use crate::util::format::thousands;

const PLACEHOLDER_MESSAGE: &str = "\"My tiny corner of the internet.\"";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct HomeStats {
    loading: bool,
    claimed: Option<u64>,
    featured: Option<BrickRecord>,
    error: Option<String>,
}

fn claimed_text(claimed: Option<u64>) -> String {
    match claimed {
        Some(count) => format!("{} claimed so far", thousands(count)),
        None => "Loading claimed bricks…".to_owned(),
    }
}

/// Where "See this brick on the wall" leads.
fn featured_link(featured: Option<&BrickRecord>) -> String {
    featured.map_or_else(|| WALL_PATH.to_owned(), |record| brick_path(record.brick_index))
}

fn featured_title(featured: Option<&BrickRecord>) -> String {
    featured.map_or_else(|| "Random brick spinning up...".to_owned(), |record| format!("Brick #{}", record.brick_index))
}

fn featured_message(featured: Option<&BrickRecord>) -> String {
    featured
        .and_then(|record| record.fields.message.as_deref())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map_or_else(|| PLACEHOLDER_MESSAGE.to_owned(), str::to_owned)
}

/// Where "Buy a brick" leads: straight to the wall, or through sign-in.
fn buy_destination(signed_in: bool) -> String {
    if signed_in { buy_path() } else { login_path(&buy_path()) }
}

async fn load_home(store: StoreClient, stats: RwSignal<HomeStats>, cancel: CancelFlag) {
    let (count, featured) = futures::join!(store.count_sold(), store.fetch_featured());
    if cancel.is_cancelled() {
        return;
    }
    stats.set(match (count, featured) {
        (Ok(claimed), Ok(featured)) => HomeStats { loading: false, claimed: Some(claimed), featured, error: None },
        (Err(e), _) | (_, Err(e)) => {
            log::warn!("error loading homepage stats: {e}");
            HomeStats { loading: false, error: Some(e.to_string()), ..HomeStats::default() }
        }
    });
}

#[component]
pub fn HomePage() -> impl IntoView {
    let store = expect_context::<StoreClient>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();
    let stats = RwSignal::new(HomeStats { loading: true, ..HomeStats::default() });

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        on_cleanup(move || cancel.cancel());
    }
    leptos::task::spawn_local(load_home(store, stats, cancel));

    let total = thousands(Grid::default().len());
    let total_footer = total.clone();
    let on_buy = move |_| {
        let signed_in = auth.with_untracked(|a| a.user.is_some());
        navigate(&buy_destination(signed_in), Default::default());
    };
    let featured_href = move || stats.with(|s| featured_link(s.featured.as_ref()));
    let swatch = move || {
        stats.with(|s| s.featured.as_ref().map_or(DEFAULT_BRICK_COLOR, |r| r.fields.color()).to_owned())
    };

    view! {
        <div class="home">
            <section class="home__hero">
                <div class="home__pitch">
                    <div class="home__eyebrow">"OWN YOUR SPOT ON THE WALL"</div>
                    <h1>"Own a piece of the 1,000,000-brick digital wall"</h1>
                    <p>
                        "Buy a colorful brick, leave a custom message, add your socials and claim a permanent spot on the internet's most ridiculous wall."
                    </p>
                    <div class="home__actions">
                        <button type="button" class="home__buy" on:click=on_buy>"Buy a brick"</button>
                        <A href=WALL_PATH attr:class="home__view">"View the wall"</A>
                    </div>
                    <div class="home__stats">
                        <span>"🧱 " {total} " total bricks"</span>
                        <span>" • " {move || stats.with(|s| claimed_text(s.claimed))}</span>
                    </div>
                    {move || {
                        stats.with(|s| s.error.clone()).map(|e| view! {
                            <p class="home__error">
                                "Failed to load live stats. The wall still works, this is just the fancy numbers breaking: "
                                {e}
                            </p>
                        })
                    }}
                </div>
                <div class="home__featured">
                    <div class="home__featured-head">
                        <span class="home__featured-tag">"FEATURED"</span>
                        <span class="home__featured-owned">"● Owned"</span>
                    </div>
                    <h2>"Brick of the day"</h2>
                    <p class="home__hint">"Today's highlighted brick from the wall of 1,000,000."</p>
                    <div class="home__featured-body">
                        <div class="brick-swatch brick-swatch--large" style:background-color=swatch></div>
                        <div>
                            <div class="home__featured-title">{move || stats.with(|s| featured_title(s.featured.as_ref()))}</div>
                            <div class="home__featured-message">{move || stats.with(|s| featured_message(s.featured.as_ref()))}</div>
                        </div>
                    </div>
                    <A href=featured_href attr:class="home__see-brick">"See this brick on the wall →"</A>
                </div>
            </section>
            <div class="home__footer">"Live wall • " {total_footer} " bricks"</div>
        </div>
    }
}
