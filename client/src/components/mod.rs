//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render the wall chrome and dialogs while reading/writing
//! shared state from Leptos context providers.

pub mod brick_details_modal;
pub mod buy_brick_modal;
pub mod help_overlay;
pub mod status_bar;
pub mod top_bar;
pub mod wall_canvas;
pub mod zoom_controls;
