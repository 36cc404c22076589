//! Adapters for the external services the wall talks to.
//!
//! SYSTEM CONTEXT
//! ==============
//! `store` covers brick queries, the reserve procedure and likes; `session`
//! the sign-in service; `realtime` the change feed; `price` the SOL rate.
//! `types` defines the shared wire schema.

pub mod price;
pub mod realtime;
pub mod session;
pub mod store;
pub mod types;
