//! Blocked Customer Repository
//!
//! 黑名单命中判断：号码的多种等价写法 (原文 / 归一化 / 后缀) 加邮箱，
//! OR 到一起查一次。

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::BlockedCustomer;
use crate::utils::normalize_phone;

const BLOCKLIST_TABLE: &str = "blocked_customer";

#[derive(Debug, Deserialize)]
struct CountRow {
    count: i64,
}

#[derive(Clone)]
pub struct BlockedCustomerRepository {
    base: BaseRepository,
}

impl BlockedCustomerRepository {
    pub fn new(db: Surreal<Db>, merchant: impl Into<String>) -> Self {
        Self {
            base: BaseRepository::new(db, merchant),
        }
    }

    /// Whether an active blocklist entry matches the phone or email
    ///
    /// 条件按提供的字段动态拼接：email 缺失时绝不能生成
    /// `email = NONE`，否则会命中所有无邮箱的条目。
    pub async fn is_blocked(
        &self,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> RepoResult<bool> {
        let mut matchers: Vec<&str> = Vec::new();
        // 空后缀会让 endsWith 恒真，无数字的"号码"直接跳过
        let normalized = phone.map(normalize_phone).filter(|n| !n.is_empty());

        if phone.is_some() {
            matchers.push("phone = $phone");
        }
        if normalized.is_some() {
            matchers.push("phone = $normalized");
            // phone 为 NONE 的条目 (纯邮箱黑名单) 不能让函数调用报错
            matchers.push("string::endsWith(phone ?? '', $normalized)");
        }
        if email.is_some() {
            matchers.push("email = $email");
        }
        if matchers.is_empty() {
            return Ok(false);
        }

        let query_str = format!(
            "SELECT count() FROM blocked_customer \
             WHERE merchant = $merchant AND active = true AND ({}) GROUP ALL",
            matchers.join(" OR ")
        );

        let mut query = self
            .base
            .db()
            .query(query_str)
            .bind(("merchant", self.base.merchant_owned()));
        if let Some(phone) = phone {
            query = query.bind(("phone", phone.to_string()));
        }
        if let Some(normalized) = normalized {
            query = query.bind(("normalized", normalized));
        }
        if let Some(email) = email {
            query = query.bind(("email", email.to_string()));
        }

        let mut result = query.await?;
        let counts: Vec<CountRow> = result.take(0)?;
        Ok(counts.first().map(|c| c.count > 0).unwrap_or(false))
    }

    /// Create a blocklist entry (operations tooling)
    pub async fn create(&self, mut entry: BlockedCustomer) -> RepoResult<BlockedCustomer> {
        entry.merchant = self.base.merchant_owned();
        let created: Option<BlockedCustomer> = self
            .base
            .db()
            .create(BLOCKLIST_TABLE)
            .content(entry)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create blocklist entry".to_string()))
    }
}
