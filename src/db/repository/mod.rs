//! Repository Module
//!
//! Merchant-scoped access to the SurrealDB tables. Every repository is
//! constructed per request with the tenant id from the request scope, and
//! every query carries a `merchant = $merchant` condition.

pub mod affiliate;
pub mod blocked_customer;
pub mod commission;
pub mod inventory;
pub mod merchant;
pub mod notification;
pub mod order;
pub mod product;

// Re-exports
pub use affiliate::AffiliateRepository;
pub use blocked_customer::BlockedCustomerRepository;
pub use commission::CommissionRepository;
pub use inventory::InventoryRepository;
pub use merchant::MerchantSettingsRepository;
pub use notification::NotificationRepository;
pub use order::{OrderPage, OrderRepository};
pub use product::{ProductRepository, ReserveOutcome, ReserveRequest, StockReservation};

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "order:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("order", "abc");
//   - API 层收到的 id 可能带表前缀也可能不带，record_key 统一剥离

/// Strip an optional "table:" prefix from an id string
pub(crate) fn record_key<'a>(table: &str, id: &'a str) -> &'a str {
    id.strip_prefix(table)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(id)
}

/// Base repository with database reference and tenant scope
#[derive(Clone, Debug)]
pub struct BaseRepository {
    db: Surreal<Db>,
    merchant: String,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>, merchant: impl Into<String>) -> Self {
        Self {
            db,
            merchant: merchant.into(),
        }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    pub fn merchant(&self) -> &str {
        &self.merchant
    }

    /// Owned merchant id for `.bind()` tuples
    pub fn merchant_owned(&self) -> String {
        self.merchant.clone()
    }
}
