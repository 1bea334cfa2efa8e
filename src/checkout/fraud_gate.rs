//! 黑名单拦截
//!
//! 命中黑名单的顾客下单直接 403。查询本身失败时放行：
//! 下单可用性优先于风控完整性 (fail-open)。

use super::CheckoutError;
use crate::db::models::CustomerInfo;
use crate::db::repository::BlockedCustomerRepository;

/// Reject the order when the customer matches an active blocklist entry
pub async fn ensure_not_blocked(
    repo: &BlockedCustomerRepository,
    customer: &CustomerInfo,
) -> Result<(), CheckoutError> {
    let phone = (!customer.phone.trim().is_empty()).then_some(customer.phone.as_str());
    let email = customer
        .email
        .as_deref()
        .filter(|e| !e.trim().is_empty());

    match repo.is_blocked(phone, email).await {
        Ok(true) => {
            tracing::info!(
                target: "checkout",
                phone = %customer.phone,
                "Order rejected: customer is blocklisted"
            );
            Err(CheckoutError::CustomerBlocked)
        }
        Ok(false) => Ok(()),
        Err(e) => {
            // fail-open：黑名单查不了不拦单
            tracing::warn!(
                target: "checkout",
                error = %e,
                "Blocklist check failed, letting the order through"
            );
            Ok(())
        }
    }
}
