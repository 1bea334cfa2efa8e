//! Notification Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoResult};
use crate::db::models::Notification;

const NOTIFICATION_TABLE: &str = "notification";

#[derive(Clone)]
pub struct NotificationRepository {
    base: BaseRepository,
}

impl NotificationRepository {
    pub fn new(db: Surreal<Db>, merchant: impl Into<String>) -> Self {
        Self {
            base: BaseRepository::new(db, merchant),
        }
    }

    /// Persist a batch of notification documents
    ///
    /// Best effort: 单条失败记日志继续，落库晚于总线送达是预期行为。
    pub async fn create_many(&self, notifications: Vec<Notification>) -> RepoResult<usize> {
        let mut stored = 0usize;
        for mut n in notifications {
            n.merchant = self.base.merchant_owned();
            let outcome: Result<Option<Notification>, surrealdb::Error> = self
                .base
                .db()
                .create(NOTIFICATION_TABLE)
                .content(n)
                .await;
            match outcome {
                Ok(Some(_)) => stored += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(target: "notifications", error = %e, "Failed to persist notification");
                }
            }
        }
        Ok(stored)
    }

    /// Recent notifications for the merchant (dashboards, tests)
    pub async fn find_recent(&self, limit: i64) -> RepoResult<Vec<Notification>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM notification WHERE merchant = $merchant \
                 ORDER BY created_at DESC LIMIT $limit",
            )
            .bind(("merchant", self.base.merchant_owned()))
            .bind(("limit", limit))
            .await?;
        let notifications: Vec<Notification> = result.take(0)?;
        Ok(notifications)
    }
}
