//! Inventory Transaction Model
//!
//! 库存变动审计：只追加，不修改。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Append-only audit entry per stock mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryTransaction {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub merchant: String,
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    /// Negative for sales
    pub delta: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    #[serde(with = "serde_helpers::record_id")]
    pub order: RecordId,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
}
