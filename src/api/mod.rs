//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单接入与查询接口
//! - [`scope`] - 商户租户范围提取器

pub mod health;
pub mod orders;
pub mod scope;

pub use scope::MerchantScope;

// Re-export common types for handlers
pub use crate::utils::{AppResult, ok};
