//! Order Repository
//!
//! 订单表字段为 camelCase（文档即 API 形状），查询语句里的字段名
//! 与模型 serde 重命名保持一致。

use chrono::Utc;
use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult, record_key};
use crate::db::models::{FraudAnnotation, GeoInfo, Order, OrderStatus};

const ORDER_TABLE: &str = "order";

/// One page of orders plus the unpaged total
#[derive(Debug)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: i64,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>, merchant: impl Into<String>) -> Self {
        Self {
            base: BaseRepository::new(db, merchant),
        }
    }

    /// Insert the order document
    pub async fn create(&self, mut order: Order) -> RepoResult<Order> {
        order.merchant = self.base.merchant_owned();
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id, merchant-scoped
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let rid = RecordId::from_table_key(ORDER_TABLE, record_key(ORDER_TABLE, id));
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE id = $id AND merchant = $merchant")
            .bind(("id", rid))
            .bind(("merchant", self.base.merchant_owned()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Paginated order listing, newest first
    ///
    /// `search` matches the display id, customer name or phone.
    pub async fn find_page(
        &self,
        page: i64,
        limit: i64,
        status: Option<OrderStatus>,
        search: Option<&str>,
    ) -> RepoResult<OrderPage> {
        let mut conditions = vec!["merchant = $merchant"];
        if status.is_some() {
            conditions.push("status = $status");
        }
        if search.is_some() {
            conditions.push(
                "(string::contains(customOrderId, $search) \
                 OR string::contains(customer.name, $search) \
                 OR string::contains(customer.phone, $search))",
            );
        }
        let where_clause = conditions.join(" AND ");

        let page_query = format!(
            "SELECT * FROM order WHERE {where_clause} \
             ORDER BY createdAt DESC LIMIT $limit START $start"
        );
        let count_query = format!("SELECT count() FROM order WHERE {where_clause} GROUP ALL");

        let start = (page - 1).max(0) * limit;

        let mut query = self
            .base
            .db()
            .query(page_query)
            .query(count_query)
            .bind(("merchant", self.base.merchant_owned()))
            .bind(("limit", limit))
            .bind(("start", start));
        if let Some(status) = status {
            query = query.bind(("status", status));
        }
        if let Some(search) = search {
            query = query.bind(("search", search.to_string()));
        }

        let mut result = query.await?;
        let orders: Vec<Order> = result.take(0)?;
        let counts: Vec<CountRow> = result.take(1)?;
        let total = counts.first().map(|c| c.count).unwrap_or(0);

        Ok(OrderPage { orders, total })
    }

    /// Transition the order status (caller validates the transition)
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> RepoResult<Order> {
        let rid = RecordId::from_table_key(ORDER_TABLE, record_key(ORDER_TABLE, id));
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE order SET status = $status, updatedAt = $now \
                 WHERE id = $id AND merchant = $merchant RETURN AFTER",
            )
            .bind(("id", rid))
            .bind(("status", status))
            .bind(("now", Utc::now()))
            .bind(("merchant", self.base.merchant_owned()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Patch the post-hoc fraud annotation onto an existing order
    pub async fn set_fraud_check(&self, id: &str, annotation: FraudAnnotation) -> RepoResult<()> {
        let rid = RecordId::from_table_key(ORDER_TABLE, record_key(ORDER_TABLE, id));
        self.base
            .db()
            .query(
                "UPDATE order SET fraudCheck = $check, updatedAt = $now \
                 WHERE id = $id AND merchant = $merchant",
            )
            .bind(("id", rid))
            .bind(("check", annotation))
            .bind(("now", Utc::now()))
            .bind(("merchant", self.base.merchant_owned()))
            .await?;
        Ok(())
    }

    /// Patch geolocation enrichment onto an existing order
    pub async fn set_geo(&self, id: &str, geo: GeoInfo) -> RepoResult<()> {
        let rid = RecordId::from_table_key(ORDER_TABLE, record_key(ORDER_TABLE, id));
        self.base
            .db()
            .query(
                "UPDATE order SET geo = $geo, updatedAt = $now \
                 WHERE id = $id AND merchant = $merchant",
            )
            .bind(("id", rid))
            .bind(("geo", geo))
            .bind(("now", Utc::now()))
            .bind(("merchant", self.base.merchant_owned()))
            .await?;
        Ok(())
    }
}
