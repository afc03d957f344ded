//! RoomHub: 房间广播
//!
//! One broadcast channel per room, created on first subscribe and dropped
//! once the last subscriber leaves.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use shared::realtime::{RealtimeEvent, Room, RoomEvent};
use tokio::sync::broadcast;

use super::{EventPublisher, PublishError};

/// Broadcast channel 容量, 足以缓冲突发
const BROADCAST_CAPACITY: usize = 256;

/// In-process room fan-out
#[derive(Clone, Default)]
pub struct RoomHub {
    rooms: Arc<DashMap<Room, broadcast::Sender<Arc<RoomEvent>>>>,
}

impl std::fmt::Debug for RoomHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomHub")
            .field("rooms", &self.rooms.len())
            .finish()
    }
}

impl RoomHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, room: Room) -> broadcast::Receiver<Arc<RoomEvent>> {
        self.rooms
            .entry(room)
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Drop the room's channel when nobody listens any more
    pub fn release(&self, room: Room) {
        self.rooms
            .remove_if(&room, |_, tx| tx.receiver_count() == 0);
    }

    pub fn subscriber_count(&self, room: Room) -> usize {
        self.rooms
            .get(&room)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Deliver to the room's current subscribers. Returns how many received it.
    pub fn send(&self, room: Room, event: RealtimeEvent, data: Value) -> usize {
        let Some(tx) = self.rooms.get(&room) else {
            return 0;
        };
        let message = Arc::new(RoomEvent {
            room,
            event,
            data,
            timestamp: shared::util::now_millis(),
        });
        // 无订阅者时 send 返回 Err，安全忽略
        tx.send(message).unwrap_or(0)
    }
}

#[async_trait]
impl EventPublisher for RoomHub {
    async fn publish(
        &self,
        room: Room,
        event: RealtimeEvent,
        payload: Value,
    ) -> Result<(), PublishError> {
        let delivered = self.send(room, event, payload);
        tracing::trace!(room = %room, event = %event, delivered, "Event published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_reaches_room_subscribers_only() {
        let hub = RoomHub::new();
        let mut kitchen = hub.subscribe(Room::Kitchen(1));
        let mut other = hub.subscribe(Room::Kitchen(2));

        hub.publish(Room::Kitchen(1), RealtimeEvent::OrderNew, json!({"order_number": "ORD-1"}))
            .await
            .unwrap();

        let event = kitchen.recv().await.unwrap();
        assert_eq!(event.room, Room::Kitchen(1));
        assert_eq!(event.event, RealtimeEvent::OrderNew);
        assert_eq!(event.data["order_number"], "ORD-1");
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let hub = RoomHub::new();
        assert!(hub
            .publish(Room::Service(1), RealtimeEvent::OrderReady, json!({}))
            .await
            .is_ok());
        assert_eq!(hub.send(Room::Service(1), RealtimeEvent::OrderReady, json!({})), 0);
    }

    #[test]
    fn test_release_drops_empty_rooms() {
        let hub = RoomHub::new();
        let rx = hub.subscribe(Room::Order(5));
        assert_eq!(hub.subscriber_count(Room::Order(5)), 1);

        hub.release(Room::Order(5));
        assert_eq!(hub.subscriber_count(Room::Order(5)), 1);

        drop(rx);
        hub.release(Room::Order(5));
        assert_eq!(hub.subscriber_count(Room::Order(5)), 0);
        assert!(hub.rooms.is_empty());
    }
}
