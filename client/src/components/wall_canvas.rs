//! Bridge component between Leptos state and the imperative `wall::Engine`.
//!
//! ARCHITECTURE
//! ============
//! The engine owns zoom/pan, gesture recognition and painting. This host
//! forwards DOM pointer and wheel events to it, turns the returned actions
//! into page state changes (hover label, dialogs), catches the engine's
//! sold-set up with the page's whenever it changes, and draws the hover and
//! ownership outlines as positioned elements above the canvas.

#[cfg(test)]
#[path = "wall_canvas_test.rs"]
mod wall_canvas_test;

use std::cell::Cell;

use leptos::prelude::*;
use wall::engine::EngineCore;
use wall::overlay::OverlayBox;

use crate::components::zoom_controls::ZoomControls;
use crate::state::auth::AuthState;
use crate::state::wall::{SoldSync, WallState};

#[cfg(feature = "csr")]
use std::cell::RefCell;
#[cfg(feature = "csr")]
use std::rc::Rc;

#[cfg(feature = "csr")]
use leptos_router::NavigateOptions;
#[cfg(feature = "csr")]
use wall::engine::{Action, Engine};
#[cfg(feature = "csr")]
use wall::input::{PointerKind, WheelDelta};
#[cfg(feature = "csr")]
use wall::viewport::Point;
#[cfg(feature = "csr")]
use wasm_bindgen::{JsCast, closure::Closure};

#[cfg(feature = "csr")]
use crate::pages::wall::{WALL_PATH, login_path};
#[cfg(feature = "csr")]
use crate::state::purchase::Target;
#[cfg(feature = "csr")]
use crate::state::wall::ClickOutcome;


/// Inline style placing an outline box over its cell.
fn box_style(b: &OverlayBox) -> String {
    format!("left: {:.2}px; top: {:.2}px; width: {:.2}px; height: {:.2}px;", b.left, b.top, b.size, b.size)
}

#[cfg(feature = "csr")]
type SharedEngine = Rc<RefCell<Option<Engine>>>;

#[cfg(feature = "csr")]
fn pointer_point(ev: &leptos::ev::PointerEvent) -> Point {
    Point::new(f64::from(ev.offset_x()), f64::from(ev.offset_y()))
}

#[cfg(feature = "csr")]
fn wheel_point(ev: &leptos::ev::WheelEvent) -> Point {
    Point::new(f64::from(ev.offset_x()), f64::from(ev.offset_y()))
}

/// Read the canvas element's CSS size and device pixel ratio into the engine.
#[cfg(feature = "csr")]
fn sync_viewport(engine: &mut Engine, canvas_ref: &NodeRef<leptos::html::Canvas>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(canvas) = canvas_ref.get() else {
        return;
    };
    let width = f64::from(canvas.client_width()).max(1.0);
    let height = f64::from(canvas.client_height()).max(1.0);
    let dpr = window.device_pixel_ratio().max(1.0);
    engine.set_viewport(width, height, dpr);
}

/// Bring the engine's sold-set up to `wall.sold_rev`.
///
/// Realtime batches are replayed from the journal; the whole set is copied
/// only on the first sync and after a snapshot lands.
#[cfg_attr(not(feature = "csr"), allow(dead_code))]
fn sync_sold(core: &mut EngineCore, wall: &WallState, synced_rev: &Cell<Option<u64>>) {
    match wall.sold_sync(synced_rev.get()) {
        SoldSync::Current => return,
        SoldSync::Changes(changes) => {
            core.apply_changes(changes);
        }
        SoldSync::Full => core.sold = wall.sold.clone(),
    }
    synced_rev.set(Some(wall.sold_rev));
}

#[cfg(feature = "csr")]
fn sync_from_state(engine: &mut Engine, wall: RwSignal<WallState>, user: Option<uuid::Uuid>, synced_rev: &Cell<Option<u64>>) {
    wall.with_untracked(|w| {
        sync_sold(&mut engine.core, w, synced_rev);
        engine.core.set_highlights(w.highlights(user));
    });
}

#[cfg(feature = "csr")]
fn render_frame(engine: &mut Engine, overlay: RwSignal<Vec<OverlayBox>>) {
    if let Err(e) = engine.render() {
        log::warn!("wall render failed: {e:?}");
    }
    overlay.set(engine.core.overlay());
}

#[cfg(feature = "csr")]
fn request_render(engine: &SharedEngine, overlay: RwSignal<Vec<OverlayBox>>, raf_pending: RwSignal<bool>) {
    if raf_pending.get_untracked() {
        return;
    }
    raf_pending.set(true);

    let Some(window) = web_sys::window() else {
        raf_pending.set(false);
        if let Some(engine) = engine.borrow_mut().as_mut() {
            render_frame(engine, overlay);
        }
        return;
    };

    let engine_for_cb = Rc::clone(engine);
    let holder: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let holder_for_cb = Rc::clone(&holder);
    let cb = Closure::wrap(Box::new(move |_ts: f64| {
        raf_pending.set(false);
        if let Some(engine) = engine_for_cb.borrow_mut().as_mut() {
            render_frame(engine, overlay);
        }
        holder_for_cb.borrow_mut().take();
    }) as Box<dyn FnMut(f64)>);

    if window.request_animation_frame(cb.as_ref().unchecked_ref()).is_ok() {
        *holder.borrow_mut() = Some(cb);
    } else {
        raf_pending.set(false);
        if let Some(engine) = engine.borrow_mut().as_mut() {
            render_frame(engine, overlay);
        }
    }
}

/// Everything an engine action may touch.
#[cfg(feature = "csr")]
#[derive(Clone)]
struct Host<N> {
    engine: SharedEngine,
    wall: RwSignal<WallState>,
    auth: RwSignal<AuthState>,
    overlay: RwSignal<Vec<OverlayBox>>,
    raf_pending: RwSignal<bool>,
    navigate: N,
}

#[cfg(feature = "csr")]
impl<N> Host<N>
where
    N: Fn(&str, NavigateOptions),
{
    /// Run `f` against the mounted engine, then act on what it returned.
    fn dispatch(&self, f: impl FnOnce(&mut Engine) -> Vec<Action>) {
        let actions = {
            let mut slot = self.engine.borrow_mut();
            let Some(engine) = slot.as_mut() else {
                return;
            };
            f(engine)
        };
        self.process(actions);
    }

    fn process(&self, actions: Vec<Action>) {
        let mut needs_frame = false;
        for action in actions {
            match action {
                Action::BrickClicked { index, x, y } => {
                    let target = Target { index, x, y };
                    let user = self.auth.with_untracked(AuthState::user_id);
                    let outcome = self.wall.try_update(|w| w.click(target, user));
                    if outcome == Some(ClickOutcome::LoginRequired) {
                        (self.navigate)(&login_path(WALL_PATH), NavigateOptions::default());
                    }
                }
                Action::HoverChanged(hover) => {
                    if self.wall.with_untracked(|w| w.hover != hover) {
                        self.wall.update(|w| w.hover = hover);
                    }
                    needs_frame = true;
                }
                Action::RenderNeeded => needs_frame = true,
            }
        }
        if needs_frame {
            request_render(&self.engine, self.overlay, self.raf_pending);
        }
    }
}

/// Full-bleed wall canvas with outlines and zoom buttons.
#[component]
pub fn WallCanvas() -> impl IntoView {
    let wall = expect_context::<RwSignal<WallState>>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let overlay = RwSignal::new(Vec::<OverlayBox>::new());
    #[cfg(not(feature = "csr"))]
    let _ = (wall, auth);

    #[cfg(feature = "csr")]
    let host = Host {
        engine: Rc::new(RefCell::new(None::<Engine>)),
        wall,
        auth,
        overlay,
        raf_pending: RwSignal::new(false),
        navigate: leptos_router::hooks::use_navigate(),
    };
    #[cfg(feature = "csr")]
    let synced_rev = Rc::new(Cell::new(None::<u64>));

    #[cfg(feature = "csr")]
    {
        let host = host.clone();
        let synced_rev = Rc::clone(&synced_rev);
        Effect::new(move || {
            let Some(canvas) = canvas_ref.get() else {
                return;
            };
            if host.engine.borrow().is_some() {
                return;
            }
            let grid = wall.with_untracked(WallState::grid);
            let mut instance = Engine::new(canvas, grid);
            sync_viewport(&mut instance, &canvas_ref);
            sync_from_state(&mut instance, wall, auth.with_untracked(AuthState::user_id), &synced_rev);
            render_frame(&mut instance, overlay);
            *host.engine.borrow_mut() = Some(instance);
        });
    }

    #[cfg(feature = "csr")]
    {
        let host = host.clone();
        let synced_rev = Rc::clone(&synced_rev);
        Effect::new(move || {
            let _ = wall.with(|w| (w.sold_rev, w.highlight_mine));
            let user = auth.with(AuthState::user_id);
            {
                let mut slot = host.engine.borrow_mut();
                let Some(engine) = slot.as_mut() else {
                    return;
                };
                sync_from_state(engine, wall, user, &synced_rev);
            }
            host.process(vec![Action::RenderNeeded]);
        });
    }

    #[cfg(feature = "csr")]
    {
        let host = host.clone();
        let handle = window_event_listener(leptos::ev::resize, move |_| {
            host.dispatch(|engine| {
                sync_viewport(engine, &canvas_ref);
                vec![Action::RenderNeeded]
            });
        });
        on_cleanup(move || handle.remove());
    }

    let on_pointer_down = {
        #[cfg(feature = "csr")]
        {
            let host = host.clone();
            move |ev: leptos::ev::PointerEvent| {
                ev.prevent_default();
                if let Some(canvas) = canvas_ref.get() {
                    let _ = canvas.set_pointer_capture(ev.pointer_id());
                }
                let kind = PointerKind::from_dom(&ev.pointer_type());
                host.dispatch(|engine| engine.core.on_pointer_down(ev.pointer_id(), kind, pointer_point(&ev)));
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            move |_ev: leptos::ev::PointerEvent| {}
        }
    };

    let on_pointer_move = {
        #[cfg(feature = "csr")]
        {
            let host = host.clone();
            move |ev: leptos::ev::PointerEvent| {
                host.dispatch(|engine| engine.core.on_pointer_move(ev.pointer_id(), pointer_point(&ev)));
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            move |_ev: leptos::ev::PointerEvent| {}
        }
    };

    let on_pointer_up = {
        #[cfg(feature = "csr")]
        {
            let host = host.clone();
            move |ev: leptos::ev::PointerEvent| {
                if let Some(canvas) = canvas_ref.get() {
                    let _ = canvas.release_pointer_capture(ev.pointer_id());
                }
                host.dispatch(|engine| engine.core.on_pointer_up(ev.pointer_id(), pointer_point(&ev)));
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            move |_ev: leptos::ev::PointerEvent| {}
        }
    };

    let on_pointer_cancel = {
        #[cfg(feature = "csr")]
        {
            let host = host.clone();
            move |ev: leptos::ev::PointerEvent| {
                host.dispatch(|engine| engine.core.on_pointer_cancel(ev.pointer_id()));
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            move |_ev: leptos::ev::PointerEvent| {}
        }
    };

    let on_pointer_leave = {
        #[cfg(feature = "csr")]
        {
            let host = host.clone();
            move |ev: leptos::ev::PointerEvent| {
                // Captured pointers keep delivering events; only a real exit resets.
                if let Some(canvas) = canvas_ref.get() {
                    if canvas.has_pointer_capture(ev.pointer_id()) {
                        return;
                    }
                }
                host.dispatch(|engine| engine.core.on_pointer_leave());
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            move |_ev: leptos::ev::PointerEvent| {}
        }
    };

    let on_wheel = {
        #[cfg(feature = "csr")]
        {
            let host = host.clone();
            move |ev: leptos::ev::WheelEvent| {
                ev.prevent_default();
                let delta = WheelDelta { dx: ev.delta_x(), dy: ev.delta_y() };
                host.dispatch(|engine| engine.core.on_wheel(wheel_point(&ev), delta));
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            move |_ev: leptos::ev::WheelEvent| {}
        }
    };

    let on_zoom_in = {
        #[cfg(feature = "csr")]
        {
            let host = host.clone();
            move |_ev: leptos::ev::MouseEvent| host.dispatch(|engine| engine.core.zoom_in())
        }
        #[cfg(not(feature = "csr"))]
        {
            move |_ev: leptos::ev::MouseEvent| {}
        }
    };

    let on_zoom_out = {
        #[cfg(feature = "csr")]
        {
            let host = host.clone();
            move |_ev: leptos::ev::MouseEvent| host.dispatch(|engine| engine.core.zoom_out())
        }
        #[cfg(not(feature = "csr"))]
        {
            move |_ev: leptos::ev::MouseEvent| {}
        }
    };

    view! {
        <div class="wall-canvas">
            <canvas
                node_ref=canvas_ref
                class="wall-canvas__surface"
                on:pointerdown=on_pointer_down
                on:pointermove=on_pointer_move
                on:pointerup=on_pointer_up
                on:pointercancel=on_pointer_cancel
                on:pointerleave=on_pointer_leave
                on:wheel=on_wheel
            >
                "Your browser does not support canvas."
            </canvas>
            <div class="wall-overlay">
                {move || {
                    overlay
                        .get()
                        .iter()
                        .map(|b| view! { <div class=b.kind.css_class() style=box_style(b)></div> })
                        .collect_view()
                }}
            </div>
            <ZoomControls on_zoom_in=on_zoom_in on_zoom_out=on_zoom_out />
        </div>
    }
}
