//! Affiliate Repository

use rust_decimal::Decimal;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult, record_key};
use crate::db::models::Affiliate;

const AFFILIATE_TABLE: &str = "affiliate";

#[derive(Clone)]
pub struct AffiliateRepository {
    base: BaseRepository,
}

impl AffiliateRepository {
    pub fn new(db: Surreal<Db>, merchant: impl Into<String>) -> Self {
        Self {
            base: BaseRepository::new(db, merchant),
        }
    }

    /// Find affiliate by id, merchant-scoped
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Affiliate>> {
        let rid = RecordId::from_table_key(AFFILIATE_TABLE, record_key(AFFILIATE_TABLE, id));
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM affiliate WHERE id = $id AND merchant = $merchant")
            .bind(("id", rid))
            .bind(("merchant", self.base.merchant_owned()))
            .await?;
        let affiliates: Vec<Affiliate> = result.take(0)?;
        Ok(affiliates.into_iter().next())
    }

    /// Find affiliate by promo code
    pub async fn find_by_promo_code(&self, code: &str) -> RepoResult<Option<Affiliate>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM affiliate WHERE promo_code = $code AND merchant = $merchant")
            .bind(("code", code.to_string()))
            .bind(("merchant", self.base.merchant_owned()))
            .await?;
        let affiliates: Vec<Affiliate> = result.take(0)?;
        Ok(affiliates.into_iter().next())
    }

    /// Increment the running order counter by one
    pub async fn increment_order_count(&self, id: &RecordId) -> RepoResult<Affiliate> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE affiliate SET order_count += 1 \
                 WHERE id = $id AND merchant = $merchant RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("merchant", self.base.merchant_owned()))
            .await?;
        let affiliates: Vec<Affiliate> = result.take(0)?;
        affiliates
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Affiliate {} not found", id)))
    }

    /// Credit the pending balance (delivered-order settlement)
    ///
    /// Decimal 字段以字符串存储，不能用 `+=`，读改写。
    pub async fn credit_balance(&self, id: &RecordId, amount: Decimal) -> RepoResult<Affiliate> {
        let current = self
            .find_by_id(&id.to_string())
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Affiliate {} not found", id)))?;
        let new_balance = current.pending_balance + amount;

        let mut result = self
            .base
            .db()
            .query(
                "UPDATE affiliate SET pending_balance = $balance \
                 WHERE id = $id AND merchant = $merchant RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("balance", new_balance))
            .bind(("merchant", self.base.merchant_owned()))
            .await?;
        let affiliates: Vec<Affiliate> = result.take(0)?;
        affiliates
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Affiliate {} not found", id)))
    }

    /// Create an affiliate (seeding / onboarding tooling)
    pub async fn create(&self, mut affiliate: Affiliate) -> RepoResult<Affiliate> {
        affiliate.merchant = self.base.merchant_owned();
        let created: Option<Affiliate> = self
            .base
            .db()
            .create(AFFILIATE_TABLE)
            .content(affiliate)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create affiliate".to_string()))
    }
}
