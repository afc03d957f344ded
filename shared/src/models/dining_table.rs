//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Occupancy status of a table
///
/// `Paused` is set by staff; `Occupied` and `Available` follow the open
/// orders of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Available,
    Occupied,
    Paused,
}

impl TableStatus {
    /// Derive the status from the pause flag and the open-order count
    pub fn derive(is_paused: bool, open_orders: i64) -> Self {
        if is_paused {
            Self::Paused
        } else if open_orders > 0 {
            Self::Occupied
        } else {
            Self::Available
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Paused => "paused",
        }
    }
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub restaurant_id: i64,
    pub table_number: i32,
    pub status: TableStatus,
    pub is_paused: bool,
    pub qr_code: String,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    /// Bumped by every write to the table's open-order set
    #[serde(skip_serializing)]
    #[serde(default)]
    pub order_version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub table_number: i32,
    pub capacity: Option<i32>,
    pub location: Option<String>,
}

/// Staff status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatusUpdate {
    pub status: TableStatus,
}

/// Occupancy change produced by a table write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatusChange {
    pub table_id: i64,
    pub restaurant_id: i64,
    pub table_number: i32,
    pub previous: TableStatus,
    pub status: TableStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_status() {
        assert_eq!(TableStatus::derive(false, 0), TableStatus::Available);
        assert_eq!(TableStatus::derive(false, 2), TableStatus::Occupied);
        assert_eq!(TableStatus::derive(true, 0), TableStatus::Paused);
        assert_eq!(TableStatus::derive(true, 3), TableStatus::Paused);
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&TableStatus::Occupied).unwrap();
        assert_eq!(json, "\"occupied\"");
        let status: TableStatus = serde_json::from_str("\"paused\"").unwrap();
        assert_eq!(status, TableStatus::Paused);
    }
}
