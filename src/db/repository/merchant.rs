//! Merchant Settings Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::MerchantSettings;

const SETTINGS_TABLE: &str = "merchant_settings";

#[derive(Clone)]
pub struct MerchantSettingsRepository {
    base: BaseRepository,
}

impl MerchantSettingsRepository {
    pub fn new(db: Surreal<Db>, merchant: impl Into<String>) -> Self {
        Self {
            base: BaseRepository::new(db, merchant),
        }
    }

    /// The merchant's settings document, if provisioned
    pub async fn get(&self) -> RepoResult<Option<MerchantSettings>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM merchant_settings WHERE merchant = $merchant LIMIT 1")
            .bind(("merchant", self.base.merchant_owned()))
            .await?;
        let settings: Vec<MerchantSettings> = result.take(0)?;
        Ok(settings.into_iter().next())
    }

    /// Create the settings document (provisioning / seeding)
    pub async fn create(&self, mut settings: MerchantSettings) -> RepoResult<MerchantSettings> {
        settings.merchant = self.base.merchant_owned();
        let created: Option<MerchantSettings> = self
            .base
            .db()
            .create(SETTINGS_TABLE)
            .content(settings)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create merchant settings".to_string()))
    }
}
