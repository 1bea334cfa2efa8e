//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::MerchantScope;
use crate::checkout::{CheckoutError, CheckoutRequest, CheckoutService};
use crate::core::ServerState;
use crate::db::models::{Order, OrderStatus};
use crate::db::repository::{AffiliateRepository, CommissionRepository, OrderRepository};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "order";

/// Cache tags attached to list responses
const LIST_CACHE_TAGS: &[&str] = &["orders", "statistics"];

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub search: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

/// Pagination block of the list response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// GET /api/orders response
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub pagination: Pagination,
}

/// List orders (paginated, newest first)
pub async fn list(
    State(state): State<ServerState>,
    scope: MerchantScope,
    Query(query): Query<ListQuery>,
) -> AppResult<([(&'static str, String); 2], Json<OrderListResponse>)> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);

    let repo = OrderRepository::new(state.db.clone(), &scope.merchant_id);
    let result = repo
        .find_page(page, limit, query.status, query.search.as_deref())
        .await?;

    let total_pages = if result.total == 0 {
        0
    } else {
        (result.total + limit - 1) / limit
    };
    let response = OrderListResponse {
        orders: result.orders,
        pagination: Pagination {
            page,
            limit,
            total: result.total,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        },
    };

    let headers = [
        ("cache-control", "private, max-age=30".to_string()),
        ("x-cache-tags", state.cache_tags.header_value(LIST_CACHE_TAGS)),
    ];
    Ok((headers, Json(response)))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    scope: MerchantScope,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.db.clone(), &scope.merchant_id);
    let order = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    Ok(Json(order))
}

/// Create an order (the ingestion flow)
pub async fn create(
    State(state): State<ServerState>,
    scope: MerchantScope,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>), CheckoutError> {
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    let client_ip = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let service = CheckoutService::new(state, scope.merchant_id);
    let order = service.place_order(request, cookie_header, client_ip).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Status transition request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Transition the order status
///
/// delivered 时结算佣金并给联盟客入账。
pub async fn update_status(
    State(state): State<ServerState>,
    scope: MerchantScope,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.db.clone(), &scope.merchant_id);
    let order = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

    if !order.status.can_transition_to(payload.status) {
        return Err(AppError::business_rule(format!(
            "Cannot transition order from {} to {}",
            order.status, payload.status
        )));
    }

    let updated = repo.update_status(&id, payload.status).await?;

    if payload.status == OrderStatus::Delivered {
        settle_commission(&state, &scope.merchant_id, &updated).await;
    }

    state.publish_order_update(&scope.merchant_id, &updated);
    state.cache_tags.revalidate(LIST_CACHE_TAGS);
    state
        .bus()
        .publish(crate::message::BusMessage::sync(
            &scope.merchant_id,
            &serde_json::json!({ "resource": RESOURCE, "id": id }),
        ));

    Ok(Json(updated))
}

/// Settle the pending commission once the order is delivered
///
/// 结算失败记日志：状态迁移已经落库，佣金走人工对账兜底。
async fn settle_commission(state: &ServerState, merchant: &str, order: &Order) {
    let Some(order_id) = order.id.clone() else {
        return;
    };
    let commissions = CommissionRepository::new(state.db.clone(), merchant);
    let record = match commissions.find_pending_by_order(&order_id).await {
        Ok(Some(record)) => record,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(target: "commission", error = %e, "Commission lookup failed on delivery");
            return;
        }
    };

    let Some(record_id) = record.id.clone() else {
        return;
    };
    if let Err(e) = commissions.settle(&record_id, Utc::now()).await {
        tracing::warn!(target: "commission", error = %e, "Failed to settle commission");
        return;
    }

    let affiliates = AffiliateRepository::new(state.db.clone(), merchant);
    if let Err(e) = affiliates
        .credit_balance(&record.affiliate, record.amount)
        .await
    {
        tracing::warn!(target: "commission", error = %e, "Failed to credit affiliate balance");
    }
}
