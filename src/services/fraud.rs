//! 外部风控评分客户端
//!
//! 下单响应返回后异步调用，结果补写到订单文档。
//! 评分接口历史上换过三版响应格式，三种形状都要归一化。

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::core::Config;
use crate::db::models::{FraudAnnotation, RiskLevel};
use crate::utils::AppError;

#[derive(Debug, Serialize)]
struct FraudCheckRequest<'a> {
    phone: &'a str,
}

/// 风控评分客户端 (10 秒超时)
#[derive(Clone, Debug)]
pub struct FraudScoreClient {
    client: reqwest::Client,
    endpoint: Option<String>,
    timeout: Duration,
}

impl FraudScoreClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.fraud_check_url.clone(),
            timeout: Duration::from_millis(config.fraud_check_timeout_ms),
        }
    }

    /// Score a phone number; None when the service is unconfigured or the
    /// response is unrecognizable
    pub async fn check_phone(&self, phone: &str) -> Result<Option<FraudAnnotation>, AppError> {
        let Some(endpoint) = &self.endpoint else {
            tracing::debug!(target: "fraud", "Fraud scoring disabled, skipping");
            return Ok(None);
        };

        let response = self
            .client
            .post(endpoint)
            .timeout(self.timeout)
            .json(&FraudCheckRequest { phone })
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Fraud check request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::internal(format!("Fraud check rejected: {e}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Fraud check returned invalid JSON: {e}")))?;

        Ok(normalize_response(&body))
    }
}

/// 三种历史响应形状归一化：
///
/// A: `{"status":"success","data":{"courier":{"total_parcel","success_parcel","cancelled_parcel"}}}`
/// B: `{"total_parcels","delivered_parcels","cancelled_parcels"}`
/// C: `{"success":true,"report":{"summary":{"total","delivered","cancelled"}}}`
fn normalize_response(body: &Value) -> Option<FraudAnnotation> {
    // Shape A
    if body["status"] == "success" {
        let courier = &body["data"]["courier"];
        if courier.is_object() {
            return Some(annotate(
                courier["total_parcel"].as_i64()?,
                courier["success_parcel"].as_i64().unwrap_or(0),
                courier["cancelled_parcel"].as_i64().unwrap_or(0),
            ));
        }
    }

    // Shape C
    if body["success"] == true {
        let summary = &body["report"]["summary"];
        if summary.is_object() {
            return Some(annotate(
                summary["total"].as_i64()?,
                summary["delivered"].as_i64().unwrap_or(0),
                summary["cancelled"].as_i64().unwrap_or(0),
            ));
        }
    }

    // Shape B (flat)
    if let Some(total) = body["total_parcels"].as_i64() {
        return Some(annotate(
            total,
            body["delivered_parcels"].as_i64().unwrap_or(0),
            body["cancelled_parcels"].as_i64().unwrap_or(0),
        ));
    }

    tracing::warn!(target: "fraud", "Unrecognized fraud check response shape");
    None
}

fn annotate(total: i64, delivered: i64, cancelled: i64) -> FraudAnnotation {
    // 无历史订单按可信处理
    let success_ratio = if total > 0 {
        delivered as f64 / total as f64
    } else {
        1.0
    };
    let risk = if success_ratio >= 0.8 {
        RiskLevel::Low
    } else if success_ratio >= 0.5 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };
    FraudAnnotation {
        total_orders: total,
        delivered,
        cancelled,
        success_ratio,
        risk,
        checked_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_shape_a() {
        let body = json!({
            "status": "success",
            "data": { "courier": { "total_parcel": 10, "success_parcel": 9, "cancelled_parcel": 1 } }
        });
        let a = normalize_response(&body).unwrap();
        assert_eq!(a.total_orders, 10);
        assert_eq!(a.delivered, 9);
        assert_eq!(a.risk, RiskLevel::Low);
    }

    #[test]
    fn normalizes_shape_b() {
        let body = json!({ "total_parcels": 4, "delivered_parcels": 2, "cancelled_parcels": 2 });
        let a = normalize_response(&body).unwrap();
        assert_eq!(a.total_orders, 4);
        assert_eq!(a.cancelled, 2);
        assert_eq!(a.risk, RiskLevel::Medium);
    }

    #[test]
    fn normalizes_shape_c() {
        let body = json!({
            "success": true,
            "report": { "summary": { "total": 5, "delivered": 1, "cancelled": 4 } }
        });
        let a = normalize_response(&body).unwrap();
        assert_eq!(a.total_orders, 5);
        assert_eq!(a.risk, RiskLevel::High);
    }

    #[test]
    fn no_history_is_low_risk() {
        let body = json!({ "total_parcels": 0, "delivered_parcels": 0, "cancelled_parcels": 0 });
        let a = normalize_response(&body).unwrap();
        assert_eq!(a.success_ratio, 1.0);
        assert_eq!(a.risk, RiskLevel::Low);
    }

    #[test]
    fn unknown_shape_yields_none() {
        assert!(normalize_response(&json!({ "weird": true })).is_none());
    }
}
