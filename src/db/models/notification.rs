//! Notification Model
//!
//! 仪表盘通知：事件先走消息总线即时送达，文档随后异步落库。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewOrder,
    OrderStatus,
}

/// Per merchant-user notification document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub merchant: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<RecordId>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
