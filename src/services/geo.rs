//! IP 归属地查询
//!
//! 结果异步补写到订单，查询失败不影响主流程。

use crate::core::Config;
use crate::db::models::GeoInfo;
use crate::utils::AppError;

/// 归属地查询客户端
#[derive(Clone, Debug)]
pub struct GeoClient {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl GeoClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.geo_lookup_url.clone(),
        }
    }

    /// Resolve an ip to country/region/city
    pub async fn lookup(&self, ip: &str) -> Result<Option<GeoInfo>, AppError> {
        let Some(endpoint) = &self.endpoint else {
            tracing::debug!(target: "geo", "Geolocation lookup disabled, skipping");
            return Ok(None);
        };

        let url = format!("{}/{}", endpoint.trim_end_matches('/'), ip);
        let geo: GeoInfo = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Geo lookup failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::internal(format!("Geo lookup rejected: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Geo lookup returned invalid JSON: {e}")))?;

        Ok(Some(geo))
    }
}
