//! Affiliate + Commission Models
//!
//! 联盟客按推广码引流；订单创建时累计 order_count，
//! 余额只在订单送达 (delivered) 时入账。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AffiliateStatus {
    Active,
    Suspended,
}

/// Affiliate entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affiliate {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub merchant: String,
    pub promo_code: String,
    pub status: AffiliateStatus,
    /// Commission tier level (resolved against merchant settings)
    pub level: u8,
    #[serde(default)]
    pub order_count: i64,
    /// Credited only when an order reaches delivered
    #[serde(default)]
    pub pending_balance: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommissionStatus {
    Pending,
    Settled,
}

/// Commission record linking an order to an affiliate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionRecord {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub merchant: String,
    #[serde(with = "serde_helpers::record_id")]
    pub order: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub affiliate: RecordId,
    pub percent: Decimal,
    pub amount: Decimal,
    pub status: CommissionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,
}
