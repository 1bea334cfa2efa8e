//! Merchant Scope Extractor
//!
//! 多租户边界：每个请求必须带 `X-Merchant-Id` 头，后续所有
//! 数据访问都以它过滤。

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::utils::AppError;

const MERCHANT_HEADER: &str = "x-merchant-id";

/// Tenant scope resolved from the request headers
#[derive(Debug, Clone)]
pub struct MerchantScope {
    pub merchant_id: String,
}

impl<S> FromRequestParts<S> for MerchantScope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Check if already extracted (from middleware)
        if let Some(scope) = parts.extensions.get::<MerchantScope>() {
            return Ok(scope.clone());
        }

        let merchant_id = parts
            .headers
            .get(MERCHANT_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::validation("Missing X-Merchant-Id header"))?;

        let scope = MerchantScope { merchant_id };

        // Store in extensions for potential reuse
        parts.extensions.insert(scope.clone());

        Ok(scope)
    }
}
