//! Hub layer: connection identity, membership events, and the
//! single-task registry/broadcaster.
//!
//! The hub owns the only shared state in the system — the map of live
//! connections — and it is only ever touched by the hub's own task.
//! Everything else communicates with it over the [`HubEvent`] queue.

pub mod client_id;
pub mod event;
pub mod registry;

pub use client_id::ClientId;
pub use event::HubEvent;
pub use registry::{Hub, HubHandle};
