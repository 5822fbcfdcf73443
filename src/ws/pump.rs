//! Per-connection duplex pump.
//!
//! Each accepted WebSocket is driven by two flows bound to one
//! [`ClientId`]: a read pump that forwards inbound text frames to the
//! hub under a rolling read deadline, and a write pump that drains the
//! connection's bounded mailbox and injects periodic pings. Either flow
//! failing tears the whole connection down.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::hub::{ClientId, HubHandle};

/// Maximum inbound message size in bytes. Larger frames fail the read.
pub const MAX_MESSAGE_SIZE: usize = 10_000;

/// Capacity of each connection's outbound mailbox.
pub const MAILBOX_CAPACITY: usize = 256;

/// Read deadline: maximum time between inbound frames (pongs included).
pub const PONG_WAIT: Duration = Duration::from_secs(60);

/// Write deadline applied to every outbound frame.
pub const WRITE_WAIT: Duration = Duration::from_secs(10);

/// Ping interval. Must fire well inside [`PONG_WAIT`] so a healthy peer
/// always refreshes the read deadline in time.
pub const PING_PERIOD: Duration = Duration::from_secs(54);

const _: () = assert!(PING_PERIOD.as_secs() < PONG_WAIT.as_secs());

/// Drives one WebSocket connection until it disconnects.
///
/// Registers the connection's mailbox with the hub, spawns the write
/// pump, and runs the read pump on the current task. When the read pump
/// exits — peer close, read error, or deadline — teardown runs exactly
/// once: the hub drops the mailbox sender on `Leave`, the closed mailbox
/// makes the write pump send a Close frame and shut the socket, and both
/// halves are released.
pub async fn run_connection(socket: WebSocket, hub: HubHandle) {
    let id = ClientId::new();
    let (sink, stream) = socket.split();
    let (mailbox_tx, mailbox_rx) = mpsc::channel(MAILBOX_CAPACITY);

    if hub.join(id, mailbox_tx).await.is_err() {
        tracing::error!(client_id = %id, "hub unavailable, dropping connection");
        return;
    }

    let writer = tokio::spawn(write_pump(id, sink, mailbox_rx));
    read_pump(id, stream, &hub).await;

    // Leave removes the hub's mailbox sender, closing the mailbox; the
    // write pump then sends Close and shuts the socket down.
    let _ = hub.leave(id).await;
    let _ = writer.await;
    tracing::debug!(client_id = %id, "connection torn down");
}

/// Inbound flow: forwards text frames to the hub as broadcasts.
///
/// Every iteration re-arms the [`PONG_WAIT`] deadline, so any inbound
/// frame — payload, ping, or pong — counts as liveness. The first read
/// error of any kind is terminal; closure classes only differ in how
/// they are logged.
async fn read_pump(id: ClientId, mut stream: SplitStream<WebSocket>, hub: &HubHandle) {
    loop {
        let frame = match time::timeout(PONG_WAIT, stream.next()).await {
            Err(_) => {
                tracing::warn!(client_id = %id, "read deadline elapsed, dropping connection");
                break;
            }
            Ok(None) => {
                tracing::debug!(client_id = %id, "peer went away");
                break;
            }
            Ok(Some(Err(err))) => {
                tracing::warn!(client_id = %id, error = %err, "unexpected read error");
                break;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Message::Text(text) => {
                if hub.broadcast(text.to_string()).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => {
                tracing::debug!(client_id = %id, "peer sent close frame");
                break;
            }
            // Pings are answered at the protocol layer; pongs and binary
            // frames only refresh the read deadline.
            _ => {}
        }
    }
}

/// Outbound flow: drains the mailbox and injects periodic pings.
///
/// On mailbox close the pump sends a Close frame and exits; any write
/// failure or missed deadline also exits. The socket is closed on the
/// way out, which unblocks the read pump — unregistration stays the read
/// side's job so `Leave` is emitted only once.
async fn write_pump(
    id: ClientId,
    mut sink: SplitSink<WebSocket, Message>,
    mut mailbox: mpsc::Receiver<Arc<str>>,
) {
    let mut ping = time::interval_at(Instant::now() + PING_PERIOD, PING_PERIOD);

    loop {
        tokio::select! {
            queued = mailbox.recv() => {
                let Some(first) = queued else {
                    // Hub dropped the mailbox: say goodbye and stop.
                    let _ = time::timeout(WRITE_WAIT, sink.send(Message::Close(None))).await;
                    break;
                };
                let frame = coalesce(&first, &mut mailbox);
                match time::timeout(WRITE_WAIT, sink.send(Message::text(frame))).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        tracing::debug!(client_id = %id, error = %err, "write failed");
                        break;
                    }
                    Err(_) => {
                        tracing::warn!(client_id = %id, "write deadline elapsed");
                        break;
                    }
                }
            }
            _ = ping.tick() => {
                match time::timeout(WRITE_WAIT, sink.send(Message::Ping(Bytes::new()))).await {
                    Ok(Ok(())) => {}
                    _ => {
                        tracing::debug!(client_id = %id, "ping failed, dropping connection");
                        break;
                    }
                }
            }
        }
    }

    let _ = sink.close().await;
}

/// Merges whatever is queued in the mailbox at this instant into one
/// frame, newline-separated, starting from `first`.
///
/// Drains exactly the number of payloads queued when draining begins.
/// Payloads enqueued afterwards wait for the next physical write, which
/// keeps a fast producer from pinning the drain loop forever.
fn coalesce(first: &str, mailbox: &mut mpsc::Receiver<Arc<str>>) -> String {
    let queued = mailbox.len();
    let mut frame = String::from(first);
    for _ in 0..queued {
        let Ok(next) = mailbox.try_recv() else {
            break;
        };
        frame.push('\n');
        frame.push_str(&next);
    }
    frame
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn timing_constants_hold_their_invariants() {
        assert!(PING_PERIOD < PONG_WAIT);
        assert_eq!(PING_PERIOD, PONG_WAIT * 9 / 10);
        assert!(WRITE_WAIT < PONG_WAIT);
    }

    #[tokio::test]
    async fn coalesce_with_empty_mailbox_returns_first() {
        let (_tx, mut rx) = mpsc::channel::<Arc<str>>(8);
        let frame = coalesce("solo", &mut rx);
        assert_eq!(frame, "solo");
    }

    #[tokio::test]
    async fn coalesce_joins_queued_payloads_with_newlines() {
        let (tx, mut rx) = mpsc::channel(8);
        for payload in ["two", "three"] {
            let Ok(()) = tx.try_send(Arc::from(payload)) else {
                panic!("enqueue failed");
            };
        }

        let frame = coalesce("one", &mut rx);
        assert_eq!(frame, "one\ntwo\nthree");
        assert!(rx.try_recv().is_err(), "mailbox should be drained");
    }

    #[tokio::test]
    async fn coalesce_preserves_enqueue_order() {
        let (tx, mut rx) = mpsc::channel(16);
        for i in 1..=5 {
            let Ok(()) = tx.try_send(Arc::from(format!("m{i}").as_str())) else {
                panic!("enqueue failed");
            };
        }

        let first = match rx.recv().await {
            Some(first) => first,
            None => panic!("mailbox empty"),
        };
        let frame = coalesce(&first, &mut rx);
        assert_eq!(frame, "m1\nm2\nm3\nm4\nm5");
    }

    #[tokio::test]
    async fn coalesce_does_not_close_the_mailbox() {
        let (tx, mut rx) = mpsc::channel(8);
        let Ok(()) = tx.try_send(Arc::from("queued")) else {
            panic!("enqueue failed");
        };

        let _ = coalesce("head", &mut rx);

        // The producer can keep sending for the next physical write.
        let Ok(()) = tx.try_send(Arc::from("later")) else {
            panic!("mailbox unexpectedly closed");
        };
        assert_eq!(rx.try_recv().ok().as_deref(), Some("later"));
    }
}
