//! Commission Repository

use chrono::{DateTime, Utc};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{CommissionRecord, CommissionStatus};

const COMMISSION_TABLE: &str = "commission";

#[derive(Clone)]
pub struct CommissionRepository {
    base: BaseRepository,
}

impl CommissionRepository {
    pub fn new(db: Surreal<Db>, merchant: impl Into<String>) -> Self {
        Self {
            base: BaseRepository::new(db, merchant),
        }
    }

    /// Insert a pending commission record
    pub async fn create(&self, mut record: CommissionRecord) -> RepoResult<CommissionRecord> {
        record.merchant = self.base.merchant_owned();
        let created: Option<CommissionRecord> = self
            .base
            .db()
            .create(COMMISSION_TABLE)
            .content(record)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create commission record".to_string()))
    }

    /// The pending commission for an order, if any
    ///
    /// 链接字段以 "table:id" 字符串存储，比对时也绑字符串。
    pub async fn find_pending_by_order(
        &self,
        order: &RecordId,
    ) -> RepoResult<Option<CommissionRecord>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM commission \
                 WHERE `order` = $order AND merchant = $merchant AND status = $status",
            )
            .bind(("order", order.to_string()))
            .bind(("merchant", self.base.merchant_owned()))
            .bind(("status", CommissionStatus::Pending))
            .await?;
        let records: Vec<CommissionRecord> = result.take(0)?;
        Ok(records.into_iter().next())
    }

    /// Mark a commission record settled
    pub async fn settle(
        &self,
        id: &RecordId,
        settled_at: DateTime<Utc>,
    ) -> RepoResult<CommissionRecord> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE commission SET status = $status, settled_at = $at \
                 WHERE id = $id AND merchant = $merchant RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("status", CommissionStatus::Settled))
            .bind(("at", settled_at))
            .bind(("merchant", self.base.merchant_owned()))
            .await?;
        let records: Vec<CommissionRecord> = result.take(0)?;
        records
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Commission {} not found", id)))
    }
}
