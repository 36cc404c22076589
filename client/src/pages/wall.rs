//! The wall page: the full canvas plus status bar, helper and dialogs.
//!
//! ARCHITECTURE
//! ============
//! Owns `RwSignal<WallState>` for its lifetime. On mount it loads the sold
//! set and the exact claimed count, subscribes to the realtime change feed,
//! and starts polling the SOL price. The canvas is mounted from the start,
//! so the wall pans and zooms while the first load is still in flight.
//! Realtime changes are buffered and applied in batches so a burst costs one
//! state update. Everything async checks a `CancelFlag` before committing,
//! and the realtime subscription is dropped when the page unmounts.

#[cfg(test)]
#[path = "wall_test.rs"]
mod wall_test;

use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate, use_query_map};
use wall::grid::Grid;

use crate::components::brick_details_modal::BrickDetailsModal;
use crate::components::buy_brick_modal::BuyBrickModal;
use crate::components::help_overlay::HelpOverlay;
use crate::components::status_bar::StatusBar;
use crate::components::wall_canvas::WallCanvas;
use crate::net::store::StoreClient;
use crate::state::auth::AuthState;
use crate::state::purchase::Target;
use crate::state::wall::{CancelFlag, Modal, Notice, WallState};
use crate::util::storage;

#[cfg(feature = "csr")]
use std::cell::{Cell, RefCell};
#[cfg(feature = "csr")]
use std::rc::Rc;

#[cfg(feature = "csr")]
use crate::net::realtime::{self, RealtimeEvent};
#[cfg(feature = "csr")]
use crate::state::wall::{BufferAction, CHANGE_FLUSH_DELAY_MS, ChangeBuffer};

/// Route of the full wall.
pub const WALL_PATH: &str = "/wall";
/// Fragment asking the wall to start a purchase.
pub const BUY_FRAGMENT: &str = "buy";

/// Wall link that opens brick `index`.
pub fn brick_path(index: u32) -> String {
    format!("{WALL_PATH}?brick={index}")
}

/// Wall link that starts a purchase.
pub fn buy_path() -> String {
    format!("{WALL_PATH}#{BUY_FRAGMENT}")
}

/// Login page that returns to `return_to` after sign-in.
pub fn login_path(return_to: &str) -> String {
    let escaped = return_to.replace('%', "%25").replace('&', "%26").replace('#', "%23");
    format!("/login?redirect={escaped}")
}

/// What a `#buy` fragment asks of the wall page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuyRequest {
    None,
    /// Wait for the session to resolve.
    Pending,
    Login,
    PickBrick,
}

fn buy_request(hash: &str, auth: &AuthState) -> BuyRequest {
    if hash.trim_start_matches('#') != BUY_FRAGMENT {
        BuyRequest::None
    } else if auth.loading {
        BuyRequest::Pending
    } else if auth.user.is_some() {
        BuyRequest::PickBrick
    } else {
        BuyRequest::Login
    }
}

/// Brick named by a `?brick=N` share link, if it is on the wall.
fn shared_brick(raw: Option<&str>, grid: Grid) -> Option<Target> {
    let index = raw?.trim().parse::<u32>().ok()?;
    Target::from_index(grid, index)
}

/// Load the sold set and claimed count, unless the page went away meanwhile.
async fn load_wall(store: StoreClient, wall: RwSignal<WallState>, cancel: CancelFlag) {
    let (sold, count) = futures::join!(store.fetch_sold(), store.count_sold());
    if cancel.is_cancelled() {
        return;
    }
    wall.update(|w| {
        match sold {
            Ok(records) => {
                log::debug!("loaded {} sold bricks", records.len());
                w.finish_load(records);
            }
            Err(e) => {
                log::warn!("error loading wall: {e}");
                w.fail_load(format!("Could not load the wall: {e}"));
            }
        }
        match count {
            Ok(total) => w.claimed_total = Some(total),
            Err(e) => log::warn!("could not count claimed bricks: {e}"),
        }
    });
}

/// Merge a fresh snapshot after the feed reconnects, covering missed changes.
#[cfg(feature = "csr")]
async fn reload_sold(store: StoreClient, wall: RwSignal<WallState>, cancel: CancelFlag) {
    if cancel.is_cancelled() {
        return;
    }
    wall.update(WallState::begin_reload);
    let fetched = store.fetch_sold().await;
    if cancel.is_cancelled() {
        return;
    }
    match fetched {
        Ok(records) => {
            wall.update(|w| {
                w.finish_load(records);
            });
        }
        Err(e) => {
            log::warn!("could not refresh wall after reconnect: {e}");
            wall.update(WallState::abandon_reload);
        }
    }
}

#[cfg(feature = "csr")]
fn flush_changes(buffer: &RefCell<ChangeBuffer>, wall: RwSignal<WallState>, cancel: &CancelFlag) {
    let changes = buffer.borrow_mut().drain();
    if changes.is_empty() || cancel.is_cancelled() {
        return;
    }
    wall.update(|w| {
        w.apply_changes(changes);
    });
}

#[cfg(feature = "csr")]
fn start_realtime(store: &StoreClient, wall: RwSignal<WallState>, cancel: &CancelFlag) -> realtime::Subscription {
    let buffer = Rc::new(RefCell::new(ChangeBuffer::new()));
    let joined_before = Rc::new(Cell::new(false));
    let store_for_reload = store.clone();
    let cancel = cancel.clone();
    realtime::subscribe(store, move |event| match event {
        RealtimeEvent::Joined => {
            wall.update(|w| w.live = true);
            if joined_before.replace(true) {
                leptos::task::spawn_local(reload_sold(store_for_reload.clone(), wall, cancel.clone()));
            }
        }
        RealtimeEvent::Change(change) => {
            let action = buffer.borrow_mut().push(change);
            match action {
                BufferAction::FlushNow => flush_changes(&buffer, wall, &cancel),
                BufferAction::ScheduleFlush => {
                    let buffer = Rc::clone(&buffer);
                    let cancel = cancel.clone();
                    leptos::task::spawn_local(async move {
                        let delay = std::time::Duration::from_millis(u64::from(CHANGE_FLUSH_DELAY_MS));
                        gloo_timers::future::sleep(delay).await;
                        flush_changes(&buffer, wall, &cancel);
                    });
                }
                BufferAction::Wait => {}
            }
        }
        RealtimeEvent::Disconnected => {
            if !cancel.is_cancelled() {
                wall.update(|w| w.live = false);
            }
        }
    })
}

/// Refresh the SOL rate until the page goes away.
#[cfg(feature = "csr")]
async fn poll_price(wall: RwSignal<WallState>, cancel: CancelFlag) {
    use crate::net::price::{PRICE_POLL_INTERVAL_MS, fetch_sol_price};

    loop {
        let fetched = fetch_sol_price().await;
        if cancel.is_cancelled() {
            break;
        }
        wall.update(|w| w.price = w.price.update(fetched));
        gloo_timers::future::sleep(std::time::Duration::from_millis(u64::from(PRICE_POLL_INTERVAL_MS))).await;
        if cancel.is_cancelled() {
            break;
        }
    }
}

#[component]
pub fn WallPage() -> impl IntoView {
    let store = expect_context::<StoreClient>();
    let query = use_query_map();
    let wall = RwSignal::new(WallState::new(Grid::default()));
    provide_context(wall);

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        on_cleanup(move || cancel.cancel());
    }

    leptos::task::spawn_local(load_wall(store.clone(), wall, cancel.clone()));

    #[cfg(feature = "csr")]
    {
        let subscription = start_realtime(&store, wall, &cancel);
        on_cleanup(move || drop(subscription));
        leptos::task::spawn_local(poll_price(wall, cancel.clone()));
    }

    if !storage::help_seen() {
        wall.update(|w| w.show_help = true);
    }

    let loading = Memo::new(move |_| wall.with(|w| w.loading));
    let modal = Memo::new(move |_| wall.with(|w| w.modal));
    let show_help = Memo::new(move |_| wall.with(|w| w.show_help));

    // A `?brick=N` share link opens that brick once the wall has loaded.
    let deep_link_done = RwSignal::new(false);
    Effect::new(move || {
        if loading.get() || deep_link_done.get_untracked() {
            return;
        }
        deep_link_done.set(true);
        let grid = wall.with_untracked(WallState::grid);
        let Some(target) = query.with_untracked(|q| shared_brick(q.get_str("brick"), grid)) else {
            return;
        };
        wall.update(|w| {
            if w.sold.contains(target.index) {
                w.modal = Modal::Details(target);
            }
        });
    });

    // `#buy` from the landing page: pick a brick, or sign in first.
    let auth = expect_context::<RwSignal<AuthState>>();
    let location = use_location();
    let navigate = use_navigate();
    let buy_done = RwSignal::new(false);
    Effect::new(move || {
        if buy_done.get_untracked() {
            return;
        }
        let request = location.hash.with(|hash| auth.with(|a| buy_request(hash, a)));
        match request {
            BuyRequest::None | BuyRequest::Pending => {}
            BuyRequest::Login => {
                buy_done.set(true);
                navigate(&login_path(&buy_path()), Default::default());
            }
            BuyRequest::PickBrick => {
                buy_done.set(true);
                wall.update(|w| w.notice = Some(Notice::PickABrick.to_string()));
            }
        }
    });

    let on_close_modal = Callback::new(move |()| wall.update(WallState::close_modal));
    let on_close_help = Callback::new(move |()| {
        wall.update(|w| w.show_help = false);
        storage::mark_help_seen();
    });
    let on_dismiss_notice = move |_| wall.update(|w| w.notice = None);

    view! {
        <div class="wall-page">
            <WallCanvas />
            <Show when=move || loading.get()>
                <div class="wall-page__loading" role="status">"Loading wall..."</div>
            </Show>
            <Show when=move || show_help.get()>
                <HelpOverlay on_close=on_close_help />
            </Show>
            {move || wall.with(|w| w.error.clone()).map(|e| view! { <div class="wall-page__error">{e}</div> })}
            {move || {
                wall.with(|w| w.notice.clone())
                    .map(|n| {
                        view! {
                            <div class="wall-page__notice">
                                <span>{n}</span>
                                <button class="wall-page__notice-close" on:click=on_dismiss_notice>"✕"</button>
                            </div>
                        }
                    })
            }}
            <StatusBar />
            {move || match modal.get() {
                Modal::Buy(target) => view! { <BuyBrickModal target=target on_close=on_close_modal /> }.into_any(),
                Modal::Details(target) => view! { <BrickDetailsModal target=target on_close=on_close_modal /> }.into_any(),
                Modal::None => ().into_any(),
            }}
        </div>
    }
}
