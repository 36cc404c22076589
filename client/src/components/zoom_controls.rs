//! Floating zoom buttons for devices without a wheel or pinch.

use leptos::prelude::*;

/// Zoom in / zoom out buttons anchored to the wall's top-right corner.
///
/// Handlers are plain closures so the canvas host can pass ones that hold
/// its engine handle.
#[component]
pub fn ZoomControls<ZI, ZO>(on_zoom_in: ZI, on_zoom_out: ZO) -> impl IntoView
where
    ZI: Fn(leptos::ev::MouseEvent) + 'static,
    ZO: Fn(leptos::ev::MouseEvent) + 'static,
{
    view! {
        <div class="zoom-controls">
            <button class="zoom-controls__button" title="Zoom in" on:click=on_zoom_in>
                "+"
            </button>
            <button class="zoom-controls__button" title="Zoom out" on:click=on_zoom_out>
                "–"
            </button>
        </div>
    }
}
