//! Reactive state shared through Leptos context.

pub mod auth;
pub mod purchase;
pub mod wall;
