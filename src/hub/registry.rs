//! Single-task registry and broadcaster for all live connections.
//!
//! [`Hub`] owns the authoritative membership map and drains a bounded
//! [`mpsc`] queue of [`HubEvent`]s one at a time, in arrival order. The
//! map is never touched from any other task, so no lock guards it.
//! [`HubHandle`] is the cloneable producer side handed to every
//! connection pump.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::{ClientId, HubEvent};
use crate::error::RelayError;

/// Central registry/broadcaster.
///
/// Created together with its [`HubHandle`] via [`Hub::new`], then moved
/// into its own task with [`Hub::run`]. Membership mutation and broadcast
/// delivery are serialized on the event queue, so a `Join` racing a
/// `Broadcast` is resolved by whichever the queue delivers first.
///
/// # Slow consumers
///
/// Broadcast delivery uses `try_send` into each member's bounded mailbox
/// and never blocks. A member whose mailbox is full is treated as
/// unhealthy and evicted: its `Sender` is dropped, which closes the
/// mailbox and triggers that connection's teardown.
#[derive(Debug)]
pub struct Hub {
    clients: HashMap<ClientId, mpsc::Sender<Arc<str>>>,
    events: mpsc::Receiver<HubEvent>,
}

/// Cloneable handle feeding events into the [`Hub`]'s intake queue.
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubEvent>,
}

impl Hub {
    /// Creates a hub and its handle. `capacity` bounds the event intake
    /// queue shared by all producers.
    #[must_use]
    pub fn new(capacity: usize) -> (HubHandle, Self) {
        let (tx, events) = mpsc::channel(capacity);
        let hub = Self {
            clients: HashMap::new(),
            events,
        };
        (HubHandle { tx }, hub)
    }

    /// Runs the event loop until every [`HubHandle`] has been dropped.
    ///
    /// Spawned once at startup; in normal operation it never returns.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            self.process(event);
        }
        tracing::info!("hub event queue closed, shutting down");
    }

    /// Applies a single event to the membership map.
    fn process(&mut self, event: HubEvent) {
        match event {
            HubEvent::Join { id, mailbox } => {
                if self.clients.insert(id, mailbox).is_some() {
                    tracing::warn!(client_id = %id, "duplicate join, replaced existing entry");
                }
                tracing::info!(client_id = %id, clients = self.clients.len(), "client joined");
            }
            HubEvent::Leave { id } => {
                // Idempotent: a second leave for the same client is a no-op.
                if self.clients.remove(&id).is_some() {
                    tracing::info!(client_id = %id, clients = self.clients.len(), "client left");
                }
            }
            HubEvent::Broadcast { payload } => {
                // One shared allocation; each member gets an Arc clone.
                let payload: Arc<str> = payload.into();
                self.clients
                    .retain(|id, mailbox| match mailbox.try_send(Arc::clone(&payload)) {
                        Ok(()) => true,
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!(client_id = %id, "mailbox full, evicting slow client");
                            false
                        }
                        Err(TrySendError::Closed(_)) => {
                            tracing::debug!(client_id = %id, "mailbox closed, evicting client");
                            false
                        }
                    });
            }
        }
    }

    /// Returns the number of current members.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

impl HubHandle {
    /// Registers a connection's mailbox with the hub.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HubClosed`] if the hub task has shut down.
    pub async fn join(
        &self,
        id: ClientId,
        mailbox: mpsc::Sender<Arc<str>>,
    ) -> Result<(), RelayError> {
        self.tx
            .send(HubEvent::Join { id, mailbox })
            .await
            .map_err(|_| RelayError::HubClosed)
    }

    /// Removes a connection from the hub. Safe to call for a client that
    /// has already been removed.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HubClosed`] if the hub task has shut down.
    pub async fn leave(&self, id: ClientId) -> Result<(), RelayError> {
        self.tx
            .send(HubEvent::Leave { id })
            .await
            .map_err(|_| RelayError::HubClosed)
    }

    /// Queues a payload for fan-out to every current member.
    ///
    /// May briefly wait if the intake queue is momentarily full; hub
    /// processing is O(members) per event, so this never stalls for long.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HubClosed`] if the hub task has shut down.
    pub async fn broadcast(&self, payload: String) -> Result<(), RelayError> {
        self.tx
            .send(HubEvent::Broadcast { payload })
            .await
            .map_err(|_| RelayError::HubClosed)
    }
}
