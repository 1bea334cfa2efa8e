//! 广告平台购买事件回传
//!
//! 货到付款订单在下单时回传 purchase 事件；在线支付订单在
//! 支付成功回调处回传，不走这里。

use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::Config;
use crate::utils::AppError;

#[derive(Debug, Serialize)]
struct PurchaseEvent<'a> {
    event: &'a str,
    order_id: &'a str,
    value: Decimal,
    currency: &'a str,
}

/// 服务端购买事件客户端
#[derive(Clone, Debug)]
pub struct TrackingClient {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl TrackingClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.tracking_url.clone(),
        }
    }

    /// Report a server-side purchase event
    pub async fn purchase(
        &self,
        order_id: &str,
        value: Decimal,
        currency: &str,
    ) -> Result<(), AppError> {
        let Some(endpoint) = &self.endpoint else {
            tracing::debug!(target: "tracking", "Purchase tracking disabled, skipping");
            return Ok(());
        };

        self.client
            .post(endpoint)
            .json(&PurchaseEvent {
                event: "purchase",
                order_id,
                value,
                currency,
            })
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Purchase tracking failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::internal(format!("Purchase tracking rejected: {e}")))?;

        tracing::debug!(target: "tracking", order_id, "Purchase event reported");
        Ok(())
    }
}
