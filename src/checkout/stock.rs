//! 库存校验 - 下单前逐项检查
//!
//! 逐条加载商品：商品不存在或库存不足都累积成人读错误串，
//! 任何一条出错整单 400，不落任何数据。

use surrealdb::RecordId;

use super::CheckoutError;
use super::ItemRequest;
use crate::db::models::Product;
use crate::db::repository::ProductRepository;

/// A line item that passed validation, with its product snapshot
#[derive(Debug, Clone)]
pub struct ValidatedItem {
    pub id: RecordId,
    pub name: String,
    /// Effective unit price at order time
    pub price: rust_decimal::Decimal,
    pub quantity: i64,
}

/// Validate every requested line against current stock, all-or-nothing
pub async fn validate_stock(
    repo: &ProductRepository,
    items: &[ItemRequest],
) -> Result<Vec<ValidatedItem>, CheckoutError> {
    let mut validated = Vec::with_capacity(items.len());
    let mut errors: Vec<String> = Vec::new();

    for item in items {
        let Some(product) = repo.find_by_id(&item.product_id).await? else {
            errors.push(format!("Product not found: {}", item.product_id));
            continue;
        };
        let price = product.effective_price();
        let Product {
            id: Some(id),
            name,
            stock,
            ..
        } = product
        else {
            errors.push(format!("Product not found: {}", item.product_id));
            continue;
        };
        if stock < item.quantity {
            errors.push(format!(
                "Insufficient stock for {}. Available: {}, Requested: {}",
                name, stock, item.quantity
            ));
            continue;
        }
        validated.push(ValidatedItem {
            id,
            name,
            price,
            quantity: item.quantity,
        });
    }

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(CheckoutError::InsufficientStock(errors))
    }
}
