//! Membership and broadcast events consumed by the [`super::Hub`].
//!
//! Every change to the connected-client set and every fan-out request
//! travels through one combined event stream, so the Hub observes them
//! in a single, serialized arrival order.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::ClientId;

/// One event on the Hub's intake queue. Consumed exactly once.
#[derive(Debug)]
pub enum HubEvent {
    /// A new connection finished its handshake and wants broadcasts.
    Join {
        /// Identity of the joining connection.
        id: ClientId,
        /// Sending half of the connection's outbound mailbox. The Hub
        /// keeps this in the membership map; dropping it closes the
        /// mailbox and signals the connection's write pump to exit.
        /// Payloads are `Arc<str>` so fan-out shares one allocation
        /// across every member.
        mailbox: mpsc::Sender<Arc<str>>,
    },
    /// A connection is going away and must stop receiving broadcasts.
    Leave {
        /// Identity of the leaving connection.
        id: ClientId,
    },
    /// A payload to fan out to every current member.
    Broadcast {
        /// Opaque text payload, passed through unmodified.
        payload: String,
    },
}
