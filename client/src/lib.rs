//! # client
//!
//! Leptos + WASM frontend for the million-brick wall.
//!
//! Pages, components, page state and the adapters for the external
//! services: the brick store, its realtime change feed, the sign-in
//! service, the SOL price API and the page-provided wallet. Rendering and
//! gesture handling live in the `wall` crate and are hosted by
//! `components::wall_canvas`.
//!
//! Everything that touches the browser is behind the `csr` feature. Without
//! it the network adapters report themselves unavailable, which is what the
//! native unit tests exercise.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod payment;
pub mod state;
pub mod util;

/// WASM entry point: install the panic hook and logger, then mount the app.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(app::App);
}
