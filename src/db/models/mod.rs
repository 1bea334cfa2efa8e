//! Data Models
//!
//! Serde models for the SurrealDB tables. Order documents serialize in
//! camelCase because they double as the public API shape; internal tables
//! keep snake_case fields.

pub mod serde_helpers;

pub mod affiliate;
pub mod blocked_customer;
pub mod inventory;
pub mod merchant;
pub mod notification;
pub mod order;
pub mod product;

pub use affiliate::{Affiliate, AffiliateStatus, CommissionRecord, CommissionStatus};
pub use blocked_customer::BlockedCustomer;
pub use inventory::InventoryTransaction;
pub use merchant::{BrandConfig, CommissionTier, MerchantSettings, MerchantUser};
pub use notification::{Notification, NotificationKind};
pub use order::{
    CustomerInfo, FraudAnnotation, GeoInfo, Order, OrderItem, OrderStatus, PaymentMethod,
    PaymentStatus, RiskLevel,
};
pub use product::Product;
