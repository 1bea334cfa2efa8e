//! Blocked Customer Model
//!
//! 黑名单条目只读不写：下单流程查询，运营后台维护。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Blocklist entry, matched by phone (raw / normalized / suffix) or email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedCustomer {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub merchant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
