//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Product model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub merchant: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price: Decimal,
    /// Cost price (merchant analytics only)
    #[serde(default)]
    pub buy_price: Decimal,
    /// Sale discount in percent (e.g. 10 = 10%)
    #[serde(default)]
    pub discount_percent: Decimal,
    /// Tracked stock count, decremented once per order
    #[serde(default)]
    pub stock: i64,
}

impl Product {
    pub fn new(
        merchant: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        stock: i64,
    ) -> Self {
        Self {
            id: None,
            merchant: merchant.into(),
            name: name.into(),
            category: String::new(),
            price,
            buy_price: Decimal::ZERO,
            discount_percent: Decimal::ZERO,
            stock,
        }
    }

    /// Effective unit price after the product-level sale discount
    pub fn effective_price(&self) -> Decimal {
        if self.discount_percent.is_zero() {
            return self.price;
        }
        let factor = Decimal::ONE - self.discount_percent / Decimal::ONE_HUNDRED;
        (self.price * factor).round_dp(2)
    }
}
