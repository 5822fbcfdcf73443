//! # relay-hub
//!
//! Real-time WebSocket fan-out hub: every text frame a client sends is
//! broadcast to all currently-connected clients, the sender included.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket)
//!     │
//!     ├── WS upgrade + origin check (ws/handler)
//!     │
//!     ├── Connection Pump            two tasks per client (ws/pump)
//!     │     read pump  ──▶ Hub       text frames become broadcasts
//!     │     write pump ◀── mailbox   bounded, coalesced, pinged
//!     │
//!     └── Hub (hub/registry)         one task owning the membership map,
//!                                    fed by a Join/Leave/Broadcast queue
//! ```
//!
//! The membership map is only ever touched by the hub's own task, so the
//! core needs no locks. A slow client whose mailbox fills up is evicted
//! rather than ever stalling the hub.

pub mod app_state;
pub mod config;
pub mod error;
pub mod hub;
pub mod ws;
