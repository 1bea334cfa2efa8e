//! Merchant Settings Model
//!
//! 每商户一份：品牌名、通知受众、联盟分佣梯度。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Dashboard user of a merchant (notification audience)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantUser {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Brand configuration, overrides the store name for display ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandConfig {
    pub name: String,
}

/// Commission percent per affiliate tier level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionTier {
    pub level: u8,
    pub percent: Decimal,
}

/// Per-merchant settings document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantSettings {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub merchant: String,
    pub store_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<BrandConfig>,
    /// Recipient of new-order alert emails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub users: Vec<MerchantUser>,
    #[serde(default = "default_tiers")]
    pub commission_tiers: Vec<CommissionTier>,
}

/// Default tier table: 5% / 7.5% / 10% for levels 1-3
pub fn default_tiers() -> Vec<CommissionTier> {
    vec![
        CommissionTier {
            level: 1,
            percent: Decimal::new(5, 0),
        },
        CommissionTier {
            level: 2,
            percent: Decimal::new(75, 1),
        },
        CommissionTier {
            level: 3,
            percent: Decimal::new(10, 0),
        },
    ]
}

impl MerchantSettings {
    /// Fallback settings for merchants without a settings document
    pub fn fallback(merchant: impl Into<String>) -> Self {
        Self {
            id: None,
            merchant: merchant.into(),
            store_name: String::new(),
            brand: None,
            admin_email: None,
            users: Vec::new(),
            commission_tiers: default_tiers(),
        }
    }

    /// Brand name for display ids: brand config, else store name
    pub fn brand_name(&self) -> Option<&str> {
        if let Some(brand) = &self.brand
            && !brand.name.trim().is_empty()
        {
            return Some(brand.name.as_str());
        }
        if self.store_name.trim().is_empty() {
            None
        } else {
            Some(self.store_name.as_str())
        }
    }

    /// Commission percent for a tier level, None when unconfigured
    pub fn tier_percent(&self, level: u8) -> Option<Decimal> {
        self.commission_tiers
            .iter()
            .find(|t| t.level == level)
            .map(|t| t.percent)
    }
}
