//! Realtime Event Bus
//!
//! ```text
//! OrderManager ──publish(room, event, payload)──▶ EventPublisher
//!                                                   │
//!                                              RoomHub (broadcast per room)
//!                                                   │
//!                                   /ws connections that joined the room
//! ```
//!
//! Delivery is best effort: nothing is queued for clients that are not
//! connected, and a failed publish never fails the write that caused it.

mod access;
mod hub;

pub use access::{authorize_join, staff_rooms};
pub use hub::RoomHub;

use async_trait::async_trait;
use serde_json::Value;
use shared::realtime::{RealtimeEvent, Room};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    /// The transport behind the publisher is gone
    #[error("event bus closed")]
    Closed,
}

/// Narrow publish interface the order manager depends on
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(
        &self,
        room: Room,
        event: RealtimeEvent,
        payload: Value,
    ) -> Result<(), PublishError>;
}
