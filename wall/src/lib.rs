//! Rendering and input engine for the million-brick wall.
//!
//! This crate is compiled to WebAssembly and runs in the browser, but
//! everything except [`engine::Engine`] and the canvas [`render::Surface`]
//! impl is plain Rust and is tested natively. It owns the viewport math
//! (zoom/pan and screen-to-cell mapping), the gesture state machine, the
//! client-side cache of sold bricks, and painting. The host UI wires DOM
//! events to the engine and reacts to the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`grid`] | Brick index / cell coordinate mapping |
//! | [`viewport`] | Zoom/pan state and derived layout |
//! | [`input`] | Pointer types and the gesture state machine |
//! | [`sold`] | Sold-set cache and realtime change validation |
//! | [`render`] | Canvas painting through the [`render::Surface`] trait |
//! | [`overlay`] | Hover and ownership outline geometry |
//! | [`consts`] | Shared constants (zoom limits, thresholds, colors) |

pub mod consts;
pub mod engine;
pub mod grid;
pub mod input;
pub mod overlay;
pub mod render;
pub mod sold;
pub mod viewport;
