//! "Your bricks" page listing every brick the signed-in user owns.

#[cfg(test)]
#[path = "my_bricks_test.rs"]
mod my_bricks_test;

use leptos::prelude::*;
use uuid::Uuid;
use wall::grid::Grid;
use wall::sold::BrickRecord;

use crate::net::store::StoreClient;
use crate::pages::wall::brick_path;
use crate::state::auth::AuthState;
use crate::state::wall::CancelFlag;
use crate::util::format::{brick_label, short_id};

/// Row shown for one owned brick.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OwnedRow {
    index: u32,
    label: String,
    color: String,
    owner: String,
    message: Option<String>,
}

impl OwnedRow {
    fn from_record(record: &BrickRecord, grid: Grid) -> Self {
        let cell = grid.to_xy(record.brick_index);
        Self {
            index: record.brick_index,
            label: brick_label(record.brick_index, cell.x, cell.y),
            color: record.fields.color().to_owned(),
            owner: record.fields.owner_id.map_or_else(|| "null".to_owned(), short_id),
            message: record
                .fields
                .message
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_owned),
        }
    }
}

fn owned_rows(records: &[BrickRecord], grid: Grid) -> Vec<OwnedRow> {
    let mut rows: Vec<OwnedRow> = records.iter().map(|r| OwnedRow::from_record(r, grid)).collect();
    rows.sort_by_key(|row| row.index);
    rows
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Listing {
    loading: bool,
    rows: Vec<OwnedRow>,
    error: Option<String>,
}

async fn load_owned(store: StoreClient, owner: Uuid, listing: RwSignal<Listing>, cancel: CancelFlag) {
    let result = store.fetch_owned(owner).await;
    if cancel.is_cancelled() {
        return;
    }
    listing.set(match result {
        Ok(records) => Listing { loading: false, rows: owned_rows(&records, Grid::default()), error: None },
        Err(e) => {
            log::warn!("error loading my bricks: {e}");
            Listing { loading: false, rows: Vec::new(), error: Some(format!("Failed to load bricks: {e}")) }
        }
    });
}

#[component]
pub fn MyBricksPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let base_store = expect_context::<StoreClient>();
    let listing = RwSignal::new(Listing { loading: true, ..Listing::default() });

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        on_cleanup(move || cancel.cancel());
    }

    let user_id = Memo::new(move |_| auth.with(AuthState::user_id));
    Effect::new(move || {
        let Some(owner) = user_id.get() else {
            listing.set(Listing::default());
            return;
        };
        listing.set(Listing { loading: true, ..Listing::default() });
        let store = auth.with_untracked(|a| a.store(&base_store));
        leptos::task::spawn_local(load_owned(store, owner, listing, cancel.clone()));
    });

    let email = move || auth.with(|a| a.user.as_ref().and_then(|u| u.email.clone()).unwrap_or_default());
    let short_user = move || user_id.get().map(short_id).unwrap_or_default();

    view! {
        <div class="my-bricks">
            {move || {
                if auth.with(|a| a.loading) {
                    return view! { <div class="my-bricks__status">"Loading your bricks..."</div> }.into_any();
                }
                if user_id.get().is_none() {
                    return view! {
                        <div class="my-bricks__signed-out">
                            <h1>"Log in to view your bricks"</h1>
                            <p>"You need to be logged in with the same account you used to buy your bricks."</p>
                        </div>
                    }
                    .into_any();
                }
                if listing.with(|l| l.loading) {
                    return view! { <div class="my-bricks__status">"Loading your bricks..."</div> }.into_any();
                }
                view! {
                    <div class="my-bricks__card">
                        <h1>"Your bricks"</h1>
                        <p>"Logged in as " <strong>{email}</strong></p>
                        <p class="my-bricks__hint">"User id: " <code>{short_user}</code></p>
                    </div>
                    {move || listing.with(|l| l.error.clone()).map(|e| view! { <div class="my-bricks__error">{e}</div> })}
                    {move || {
                        let rows = listing.with(|l| l.rows.clone());
                        if rows.is_empty() {
                            view! {
                                <div class="my-bricks__empty">
                                    <p><strong>"You don't own any bricks (yet)."</strong></p>
                                    <p class="my-bricks__hint">
                                        "If you previously bought bricks under a different login, log out and sign in with that same account to see them here."
                                    </p>
                                </div>
                            }
                            .into_any()
                        } else {
                            view! {
                                <ul class="my-bricks__list">
                                    {rows
                                        .into_iter()
                                        .map(|row| view! {
                                            <li class="my-bricks__row">
                                                <div class="brick-swatch" style:background-color=row.color></div>
                                                <div class="my-bricks__body">
                                                    <div class="my-bricks__head">
                                                        <a class="my-bricks__label" href=brick_path(row.index)>{row.label}</a>
                                                        <span class="my-bricks__owner">"owner_id: " <code>{row.owner}</code></span>
                                                    </div>
                                                    {row.message.map(|m| view! { <p class="my-bricks__message">{m}</p> })}
                                                </div>
                                            </li>
                                        })
                                        .collect_view()}
                                </ul>
                            }
                            .into_any()
                        }
                    }}
                }
                .into_any()
            }}
        </div>
    }
}
