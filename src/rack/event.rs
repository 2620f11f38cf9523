//! Event plumbing between producers, order timers, and the rack dispatcher.
//!
//! Terminal events identify their order by id; the dispatcher resolves ids
//! against its live table at processing time, so an event that races a
//! removal degrades to a logged no-op instead of touching a dead order.
//! Spoil events additionally carry the placement generation that scheduled
//! them, because a superseded spoil timer can lose its cancellation race and
//! still submit — the generation lets the dispatcher tell a stale deadline
//! from the live one.

use crate::model::OrderSpec;
use thiserror::Error;
use tokio::sync::mpsc;

/// A single entry in the dispatcher's serialized inbox.
#[derive(Debug, Clone)]
pub enum OrderEvent {
    /// A cooked order arrived from the producer and needs a shelf.
    Created { spec: OrderSpec },
    /// The courier picked the order up.
    Delivered { id: String },
    /// The order's value reached zero while shelved. `generation` is the
    /// placement generation whose deadline fired; the dispatcher drops the
    /// event unless it matches the order's current generation.
    Spoiled { id: String, generation: u64 },
}

/// The rack dispatcher has shut down and no longer accepts events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rack dispatcher closed")]
pub struct RackClosed;

/// Cloneable submitter for [`OrderEvent`]s.
///
/// Cheap to clone (holds only a channel sender) and shared by the producer
/// and every order's timer tasks. Events are processed strictly in FIFO
/// order by the dispatcher.
#[derive(Clone)]
pub struct RackHandle {
    sender: mpsc::Sender<OrderEvent>,
}

impl RackHandle {
    pub(crate) fn new(sender: mpsc::Sender<OrderEvent>) -> Self {
        Self { sender }
    }

    /// Submit an event, waiting for inbox space if the dispatcher is behind.
    pub async fn submit(&self, event: OrderEvent) -> Result<(), RackClosed> {
        self.sender.send(event).await.map_err(|_| RackClosed)
    }
}
