//! Realtime protocol
//!
//! Server → Client: [`ServerMessage`] (room events + join acknowledgements)
//! Client → Server: [`ClientCommand`] (room subscription control)
//!
//! Rooms are plain strings on the wire (`kitchen:42`, `order:1001`, ...).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::ErrorCode;

/// Broadcast group a connection can join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Room {
    /// Kitchen screens of one restaurant
    Kitchen(i64),
    /// Service staff and owner of one restaurant
    Service(i64),
    /// Every authenticated member of one restaurant
    Restaurant(i64),
    /// Customers tracking one order
    Order(i64),
    /// Customers and staff watching one table
    Table(i64),
}

impl Room {
    /// Rooms anyone may join, authenticated or not
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Order(_) | Self::Table(_))
    }

    /// Restaurant a staff room belongs to
    pub fn restaurant_id(&self) -> Option<i64> {
        match self {
            Self::Kitchen(id) | Self::Service(id) | Self::Restaurant(id) => Some(*id),
            Self::Order(_) | Self::Table(_) => None,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::Kitchen(_) => "kitchen",
            Self::Service(_) => "service",
            Self::Restaurant(_) => "restaurant",
            Self::Order(_) => "order",
            Self::Table(_) => "table",
        }
    }

    fn id(&self) -> i64 {
        match self {
            Self::Kitchen(id)
            | Self::Service(id)
            | Self::Restaurant(id)
            | Self::Order(id)
            | Self::Table(id) => *id,
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix(), self.id())
    }
}

impl FromStr for Room {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, id) = s
            .split_once(':')
            .ok_or_else(|| format!("invalid room: {s}"))?;
        let id: i64 = id.parse().map_err(|_| format!("invalid room id: {s}"))?;
        match prefix {
            "kitchen" => Ok(Self::Kitchen(id)),
            "service" => Ok(Self::Service(id)),
            "restaurant" => Ok(Self::Restaurant(id)),
            "order" => Ok(Self::Order(id)),
            "table" => Ok(Self::Table(id)),
            _ => Err(format!("unknown room kind: {prefix}")),
        }
    }
}

impl From<Room> for String {
    fn from(room: Room) -> Self {
        room.to_string()
    }
}

impl TryFrom<String> for Room {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Named lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RealtimeEvent {
    #[serde(rename = "order:new")]
    OrderNew,
    #[serde(rename = "order:ready")]
    OrderReady,
    #[serde(rename = "order:items-modified")]
    OrderItemsModified,
    #[serde(rename = "order:item-reduced")]
    OrderItemReduced,
    #[serde(rename = "order:cancelled")]
    OrderCancelled,
    #[serde(rename = "order:status-changed")]
    OrderStatusChanged,
    #[serde(rename = "order:needs-attention")]
    OrderNeedsAttention,
    #[serde(rename = "table:status-changed")]
    TableStatusChanged,
}

impl RealtimeEvent {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OrderNew => "order:new",
            Self::OrderReady => "order:ready",
            Self::OrderItemsModified => "order:items-modified",
            Self::OrderItemReduced => "order:item-reduced",
            Self::OrderCancelled => "order:cancelled",
            Self::OrderStatusChanged => "order:status-changed",
            Self::OrderNeedsAttention => "order:needs-attention",
            Self::TableStatusChanged => "table:status-changed",
        }
    }
}

impl fmt::Display for RealtimeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event delivered to one room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomEvent {
    pub room: Room,
    pub event: RealtimeEvent,
    pub data: Value,
    pub timestamp: i64,
}

/// Client → Server command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientCommand {
    /// Join the staff rooms matching the token's role
    JoinRooms,
    /// Track one order
    JoinOrder { order_id: i64 },
    /// Track one table
    JoinTable { table_id: i64 },
    /// Stop receiving a room
    LeaveRoom { room: Room },
}

/// Server → Client message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Staff rooms joined after `join-rooms`
    RoomsJoined { rooms: Vec<Room> },
    /// Single room joined
    Joined { room: Room },
    /// Room left
    Left { room: Room },
    /// Lifecycle event
    Event(RoomEvent),
    /// Command rejected
    Error { code: ErrorCode, message: String },
}
