//! Product Repository
//!
//! 查询 + 条件减库存。减库存带 `stock >= $qty` 守卫，
//! 并发下单不会把库存打成负数。

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult, record_key};
use crate::db::models::Product;

const PRODUCT_TABLE: &str = "product";

/// One line of a stock reservation request
#[derive(Debug, Clone)]
pub struct ReserveRequest {
    pub product: RecordId,
    pub quantity: i64,
}

/// Successful conditional decrement for one product
#[derive(Debug, Clone)]
pub struct StockReservation {
    pub product: RecordId,
    pub name: String,
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
}

/// Outcome of a multi-item reservation attempt
#[derive(Debug)]
pub enum ReserveOutcome {
    /// Every item reserved; audit data per line
    Reserved(Vec<StockReservation>),
    /// A conditional decrement lost the race; everything compensated
    Insufficient(RecordId),
}

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>, merchant: impl Into<String>) -> Self {
        Self {
            base: BaseRepository::new(db, merchant),
        }
    }

    /// Find product by id, merchant-scoped
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let rid = RecordId::from_table_key(PRODUCT_TABLE, record_key(PRODUCT_TABLE, id));
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM product WHERE id = $id AND merchant = $merchant")
            .bind(("id", rid))
            .bind(("merchant", self.base.merchant_owned()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Create a new product (seeding / restock tooling)
    pub async fn create(&self, mut product: Product) -> RepoResult<Product> {
        product.merchant = self.base.merchant_owned();
        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Reserve stock for every line item, all-or-nothing
    ///
    /// 每个条目执行一次带守卫的条件减库存；任何一条失败就对已减的
    /// 条目做补偿回加，返回 [`ReserveOutcome::Insufficient`]。
    pub async fn reserve_stock(&self, items: &[ReserveRequest]) -> RepoResult<ReserveOutcome> {
        let mut reserved: Vec<StockReservation> = Vec::with_capacity(items.len());

        for item in items {
            let mut result = self
                .base
                .db()
                .query(
                    "UPDATE product SET stock -= $qty \
                     WHERE id = $id AND merchant = $merchant AND stock >= $qty \
                     RETURN AFTER",
                )
                .bind(("id", item.product.clone()))
                .bind(("qty", item.quantity))
                .bind(("merchant", self.base.merchant_owned()))
                .await?;
            let rows: Vec<Product> = result.take(0)?;

            match rows.into_iter().next() {
                Some(after) => reserved.push(StockReservation {
                    product: item.product.clone(),
                    name: after.name,
                    quantity: item.quantity,
                    previous_stock: after.stock + item.quantity,
                    new_stock: after.stock,
                }),
                None => {
                    // Lost the race (or product vanished): undo what we took
                    self.release_stock(&reserved).await;
                    return Ok(ReserveOutcome::Insufficient(item.product.clone()));
                }
            }
        }

        Ok(ReserveOutcome::Reserved(reserved))
    }

    /// Compensate reservations (re-increment stock)
    ///
    /// Failures are logged, not propagated: 补偿失败只能靠人工盘点兜底。
    pub async fn release_stock(&self, reservations: &[StockReservation]) {
        for r in reservations {
            let outcome = self
                .base
                .db()
                .query("UPDATE product SET stock += $qty WHERE id = $id AND merchant = $merchant")
                .bind(("id", r.product.clone()))
                .bind(("qty", r.quantity))
                .bind(("merchant", self.base.merchant_owned()))
                .await;
            if let Err(e) = outcome {
                tracing::error!(
                    target: "checkout",
                    product = %r.product,
                    quantity = r.quantity,
                    error = %e,
                    "Failed to release reserved stock"
                );
            }
        }
    }
}
