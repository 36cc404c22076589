//! Details dialog for a claimed brick: message, links, likes and sharing.
//!
//! SYSTEM CONTEXT
//! ==============
//! Opened from a tap on a sold brick. The brick itself comes from the
//! page's sold-set cache; the like counter is fetched from the store when
//! the dialog mounts. Viewing needs no sign-in, liking does.

#[cfg(test)]
#[path = "brick_details_modal_test.rs"]
mod brick_details_modal_test;

use leptos::prelude::*;

use crate::net::store::StoreClient;
use crate::state::auth::AuthState;
use crate::state::purchase::Target;
use crate::state::wall::WallState;
use wall::consts::DEFAULT_BRICK_COLOR;

const LOGIN_TO_LIKE: &str = "Log in to like bricks.";
const LIKE_FAILED: &str = "Could not update like. Please try again.";

/// Like counter for one brick as seen by the current user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Likes {
    count: u64,
    liked: bool,
    busy: bool,
}

impl Likes {
    /// State after the store accepted a like toggle.
    fn toggled(self) -> Self {
        let count = if self.liked { self.count.saturating_sub(1) } else { self.count + 1 };
        Self { count, liked: !self.liked, busy: false }
    }

    fn label(self) -> &'static str {
        if self.liked { "Liked" } else { "Like this brick" }
    }

    fn heart(self) -> &'static str {
        if self.liked { "♥" } else { "♡" }
    }
}

/// Modal describing `target`, which must be in the sold set.
#[component]
pub fn BrickDetailsModal(target: Target, on_close: Callback<()>) -> impl IntoView {
    let wall = expect_context::<RwSignal<WallState>>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let base_store = expect_context::<StoreClient>();

    let likes = RwSignal::new(Likes::default());
    let like_error = RwSignal::new(None::<String>);

    let record = move || wall.with(|w| w.sold.record(target.index));
    let color = move || {
        record()
            .map(|r| r.fields.color().to_owned())
            .unwrap_or_else(|| DEFAULT_BRICK_COLOR.to_owned())
    };
    let message = move || {
        record()
            .and_then(|r| r.fields.message)
            .map(|m| m.trim().to_owned())
            .filter(|m| !m.is_empty())
    };
    let links = move || {
        record()
            .map(|r| {
                r.fields
                    .links
                    .labeled()
                    .into_iter()
                    .map(|(label, url)| (label, url.to_owned()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    };

    #[cfg(feature = "csr")]
    {
        let store = auth.with_untracked(|a| a.store(&base_store));
        let user = auth.with_untracked(AuthState::user_id);
        leptos::task::spawn_local(async move {
            let count = match store.like_count(target.index).await {
                Ok(count) => count,
                Err(e) => {
                    log::warn!("could not load likes for brick #{}: {e}", target.index);
                    0
                }
            };
            let liked = match user {
                Some(user) => store.has_liked(target.index, user).await.unwrap_or_else(|e| {
                    log::warn!("could not load like state for brick #{}: {e}", target.index);
                    false
                }),
                None => false,
            };
            likes.set(Likes { count, liked, busy: false });
        });
    }

    let on_like = move |_| {
        let Some(user) = auth.with_untracked(AuthState::user_id) else {
            like_error.set(Some(LOGIN_TO_LIKE.to_owned()));
            return;
        };
        let current = likes.get_untracked();
        if current.busy {
            return;
        }
        like_error.set(None);
        likes.update(|l| l.busy = true);
        let store = auth.with_untracked(|a| a.store(&base_store));
        leptos::task::spawn_local(async move {
            let result = if current.liked {
                store.unlike(target.index, user).await
            } else {
                store.like(target.index, user).await
            };
            match result {
                Ok(()) => likes.set(current.toggled()),
                Err(e) => {
                    log::warn!("like toggle failed for brick #{}: {e}", target.index);
                    likes.update(|l| l.busy = false);
                    like_error.set(Some(LIKE_FAILED.to_owned()));
                }
            }
        });
    };

    let share_href = {
        #[cfg(feature = "csr")]
        {
            let origin = web_sys::window()
                .and_then(|w| w.location().origin().ok())
                .unwrap_or_default();
            let message = wall.with_untracked(|w| w.sold.get(target.index).and_then(|f| f.message.clone()));
            crate::net::store::share_on_x_url(&origin, target.index, message.as_deref())
        }
        #[cfg(not(feature = "csr"))]
        {
            String::new()
        }
    };

    let on_backdrop = move |_| on_close.run(());
    let on_close_click = move |_| on_close.run(());
    let on_keydown = Callback::new(move |ev: leptos::ev::KeyboardEvent| {
        if ev.key() == "Escape" {
            ev.prevent_default();
            on_close.run(());
        }
    });

    view! {
        <div class="modal__backdrop" on:click=on_backdrop>
            <div
                class="modal brick-details"
                on:click=move |ev| ev.stop_propagation()
                on:keydown=move |ev| on_keydown.run(ev)
                tabindex="0"
            >
                <div class="modal__header">
                    <div>
                        <div class="modal__eyebrow">"Brick details"</div>
                        <div class="modal__title">
                            {format!("Brick #{} · x={}, y={}", target.index, target.x, target.y)}
                        </div>
                    </div>
                    <button class="modal__close" on:click=on_close_click>"Close"</button>
                </div>

                <div class="brick-details__preview">
                    <div class="brick-swatch" style:background-color=color></div>
                    <div class="brick-details__blurb">
                        <div>"From the 1,000,000-brick digital wall."</div>
                        <div>"Each brick is unique and permanent."</div>
                    </div>
                </div>

                {move || message().map(|m| view! { <blockquote class="brick-details__message">{format!("“{m}”")}</blockquote> })}

                {move || {
                    let links = links();
                    (!links.is_empty()).then(|| view! {
                        <div class="brick-details__links">
                            <div class="brick-details__links-title">"Social links"</div>
                            <div class="brick-details__links-row">
                                {links
                                    .into_iter()
                                    .map(|(label, url)| view! {
                                        <a class="brick-details__link" href=url target="_blank" rel="noreferrer">{label}</a>
                                    })
                                    .collect_view()}
                            </div>
                        </div>
                    })
                }}

                <div class="modal__footer">
                    <button
                        class="brick-details__like"
                        class:brick-details__like--active=move || likes.get().liked
                        disabled=move || likes.get().busy
                        on:click=on_like
                    >
                        <span>{move || likes.get().heart()}</span>
                        <span>{move || likes.get().label()}</span>
                        <span class="brick-details__like-count">{move || likes.get().count}</span>
                    </button>
                    <a class="brick-details__share" href=share_href target="_blank" rel="noopener noreferrer">
                        "𝕏 Share"
                    </a>
                    <div class="modal__hint">"Likes are per user · You can unlike anytime."</div>
                </div>
                {move || like_error.get().map(|e| view! { <div class="modal__error">{e}</div> })}
            </div>
        </div>
    }
}
