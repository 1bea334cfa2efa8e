//! Inventory Transaction Repository
//!
//! 审计记录只追加。

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::InventoryTransaction;

const INVENTORY_TABLE: &str = "inventory_transaction";

#[derive(Clone)]
pub struct InventoryRepository {
    base: BaseRepository,
}

impl InventoryRepository {
    pub fn new(db: Surreal<Db>, merchant: impl Into<String>) -> Self {
        Self {
            base: BaseRepository::new(db, merchant),
        }
    }

    /// Append one audit entry
    pub async fn append(
        &self,
        mut txn: InventoryTransaction,
    ) -> RepoResult<InventoryTransaction> {
        txn.merchant = self.base.merchant_owned();
        let created: Option<InventoryTransaction> = self
            .base
            .db()
            .create(INVENTORY_TABLE)
            .content(txn)
            .await?;
        created
            .ok_or_else(|| RepoError::Database("Failed to append inventory transaction".to_string()))
    }

    /// All audit entries for one order (dashboards, tests)
    ///
    /// 链接字段以 "table:id" 字符串存储，比对时也绑字符串。
    pub async fn find_by_order(&self, order: &RecordId) -> RepoResult<Vec<InventoryTransaction>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM inventory_transaction \
                 WHERE `order` = $order AND merchant = $merchant ORDER BY created_at",
            )
            .bind(("order", order.to_string()))
            .bind(("merchant", self.base.merchant_owned()))
            .await?;
        let txns: Vec<InventoryTransaction> = result.take(0)?;
        Ok(txns)
    }
}
