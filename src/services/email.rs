//! 事务邮件投递
//!
//! 通过邮件服务商的 HTTP API 发送具名模板事件。
//! 端点未配置时视为关闭，调用直接返回成功。

use serde::Serialize;

use crate::core::Config;
use crate::utils::AppError;

/// 顾客下单确认
pub const EVENT_ORDER_CONFIRMATION: &str = "order_confirmation";
/// 商户新订单提醒
pub const EVENT_ADMIN_NEW_ORDER: &str = "admin_new_order";

#[derive(Debug, Serialize)]
struct EmailEventRequest<'a> {
    event: &'a str,
    to: &'a str,
    variables: serde_json::Value,
}

/// 邮件服务客户端
#[derive(Clone, Debug)]
pub struct EmailService {
    client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl EmailService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.email_api_url.clone(),
            api_key: config.email_api_key.clone(),
        }
    }

    /// Dispatch a named template event
    pub async fn send_event(
        &self,
        event: &str,
        to: &str,
        variables: serde_json::Value,
    ) -> Result<(), AppError> {
        let Some(endpoint) = &self.endpoint else {
            tracing::debug!(target: "email", event, "Email dispatch disabled, skipping");
            return Ok(());
        };

        let mut request = self.client.post(endpoint).json(&EmailEventRequest {
            event,
            to,
            variables,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Email dispatch failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::internal(format!("Email provider rejected event: {e}")))?;

        tracing::debug!(target: "email", event, to, "Email event dispatched");
        Ok(())
    }
}
