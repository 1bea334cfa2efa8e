//! Checkout Error Type
//!
//! 下单接口的错误响应形状是对外契约，独立于通用 AppError 信封：
//!
//! - 400 `{"error": "Insufficient stock", "details": [...]}`
//! - 403 `{"error": "Order rejected", "message": ..., "code": "CUSTOMER_BLOCKED"}`

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::db::repository::RepoError;

/// 下单流水线错误
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// 任一条目库存不足，订单整体拒绝 (400)
    #[error("insufficient stock")]
    InsufficientStock(Vec<String>),

    /// 顾客命中黑名单 (403)
    #[error("customer blocked")]
    CustomerBlocked,

    /// 请求本身无效 (400)
    #[error("invalid request: {0}")]
    Invalid(String),

    /// 数据库失败 (500)
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl IntoResponse for CheckoutError {
    fn into_response(self) -> Response {
        match self {
            CheckoutError::InsufficientStock(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Insufficient stock",
                    "details": details,
                })),
            )
                .into_response(),

            CheckoutError::CustomerBlocked => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "Order rejected",
                    "message": "This customer is not allowed to place orders",
                    "code": "CUSTOMER_BLOCKED",
                })),
            )
                .into_response(),

            CheckoutError::Invalid(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": msg })),
            )
                .into_response(),

            CheckoutError::Repo(e) => {
                error!(target: "checkout", error = %e, "Checkout failed on database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
