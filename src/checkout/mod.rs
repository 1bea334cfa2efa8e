//! 订单接入流水线
//!
//! # 流程
//!
//! ```text
//! POST /api/orders
//!   1. 库存校验 (全部通过才继续，否则 400 itemized)
//!   2. 黑名单拦截 (命中 403，查询失败放行)
//!   3. 联盟归因 (best effort，失败降级为无归因)
//!   4. 条件减库存 (守卫 stock >= qty，输了竞争补偿回滚)
//!   5. 订单落库
//!   6. 副作用扇出:
//!      - 同步: 库存审计、佣金记录、实时事件、缓存失效
//!      - fire-and-forget: 通知落库、邮件、IP 归属地、广告回传、风控评分
//! ```
//!
//! 插入成功后的任何副作用失败都只记日志，不回滚订单、不影响响应。

pub mod attribution;
pub mod error;
pub mod fraud_gate;
pub mod order_id;
pub mod stock;

pub use error::CheckoutError;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{
    CommissionRecord, CommissionStatus, CustomerInfo, InventoryTransaction, MerchantSettings,
    Notification, NotificationKind, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
};
use crate::db::repository::{
    AffiliateRepository, BlockedCustomerRepository, CommissionRepository, InventoryRepository,
    MerchantSettingsRepository, NotificationRepository, OrderRepository, ProductRepository,
    ReserveOutcome, ReserveRequest, StockReservation,
};
use crate::services::email;
use attribution::Attribution;

/// Cache tags touched by order creation
const ORDER_CACHE_TAGS: &[&str] = &["orders", "inventory", "statistics"];

/// One requested line item
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// POST /api/orders request body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(length(min = 1, message = "order must contain at least one item"))]
    pub items: Vec<ItemRequest>,
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub shipping: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub coupon_code: Option<String>,
    /// Source-tracking blob forwarded as-is
    #[serde(default)]
    pub source: Option<serde_json::Value>,
}

/// 订单接入服务 (per request, merchant-scoped)
pub struct CheckoutService {
    state: ServerState,
    merchant: String,
}

impl CheckoutService {
    pub fn new(state: ServerState, merchant: impl Into<String>) -> Self {
        Self {
            state,
            merchant: merchant.into(),
        }
    }

    /// The order-ingestion flow
    ///
    /// 只有库存不足和黑名单命中会拒单；其余失败路径都降级。
    pub async fn place_order(
        &self,
        request: CheckoutRequest,
        cookie_header: Option<String>,
        client_ip: Option<String>,
    ) -> Result<Order, CheckoutError> {
        request
            .validate()
            .map_err(|e| CheckoutError::Invalid(e.to_string()))?;
        if request.customer.phone.trim().is_empty() {
            return Err(CheckoutError::Invalid(
                "customer phone is required".to_string(),
            ));
        }

        let db = self.state.get_db();
        let products = ProductRepository::new(db.clone(), &self.merchant);
        let blocklist = BlockedCustomerRepository::new(db.clone(), &self.merchant);
        let affiliates = AffiliateRepository::new(db.clone(), &self.merchant);
        let orders = OrderRepository::new(db.clone(), &self.merchant);
        let settings_repo = MerchantSettingsRepository::new(db, &self.merchant);

        // 1. 库存校验 (all-or-nothing)
        let validated = stock::validate_stock(&products, &request.items).await?;

        // 2. 黑名单拦截
        fraud_gate::ensure_not_blocked(&blocklist, &request.customer).await?;

        // 3. 商户设置：缺失或读失败都用兜底值，品牌前缀随之退化
        let settings = match settings_repo.get().await {
            Ok(Some(s)) => s,
            Ok(None) => MerchantSettings::fallback(&self.merchant),
            Err(e) => {
                tracing::warn!(
                    target: "checkout",
                    error = %e,
                    "Failed to load merchant settings, using fallback"
                );
                MerchantSettings::fallback(&self.merchant)
            }
        };

        let now = Utc::now();

        // 4. 联盟归因 (best effort)
        let attribution = attribution::resolve(
            &affiliates,
            &settings,
            cookie_header.as_deref(),
            request.total,
            now.timestamp_millis(),
        )
        .await;

        // 5. 条件减库存
        let reserve_requests: Vec<ReserveRequest> = validated
            .iter()
            .map(|v| ReserveRequest {
                product: v.id.clone(),
                quantity: v.quantity,
            })
            .collect();
        let reservations = match products.reserve_stock(&reserve_requests).await? {
            ReserveOutcome::Reserved(r) => r,
            ReserveOutcome::Insufficient(_) => {
                // 校验后被并发订单抢走了库存：重跑校验拿准确明细
                return match stock::validate_stock(&products, &request.items).await {
                    Ok(_) => Err(CheckoutError::InsufficientStock(vec![
                        "Stock changed while placing the order, please retry".to_string(),
                    ])),
                    Err(e) => Err(e),
                };
            }
        };

        // 6. 订单落库
        let display_id = order_id::generate_display_id(settings.brand_name(), now);
        let items: Vec<OrderItem> = validated
            .iter()
            .map(|v| OrderItem {
                product: v.id.clone(),
                name: v.name.clone(),
                quantity: v.quantity,
                price: v.price,
            })
            .collect();
        let order = Order {
            id: None,
            custom_order_id: display_id,
            merchant: self.merchant.clone(),
            status: OrderStatus::Pending,
            items,
            subtotal: request.subtotal,
            discount: request.discount,
            tax: request.tax,
            shipping: request.shipping,
            total: request.total,
            payment_method: request.payment_method,
            payment_status: PaymentStatus::Pending,
            customer: request.customer.clone(),
            coupon_code: request.coupon_code.clone(),
            affiliate_code: attribution.as_ref().map(|a| a.promo_code.clone()),
            affiliate: attribution.as_ref().map(|a| a.affiliate_id.clone()),
            affiliate_commission: attribution.as_ref().map(|a| a.amount),
            fraud_check: None,
            geo: None,
            client_ip,
            source: request.source.clone(),
            created_at: now,
            updated_at: now,
        };

        let order = match orders.create(order).await {
            Ok(o) => o,
            Err(e) => {
                // 落库失败必须把刚扣的库存还回去
                products.release_stock(&reservations).await;
                return Err(e.into());
            }
        };

        // 7. 副作用扇出
        self.fan_out(&order, &reservations, attribution.as_ref(), &settings)
            .await;

        Ok(order)
    }

    /// Side-effect fan-out after the order insert
    ///
    /// 每块独立 try/catch：任何失败记日志后继续。
    async fn fan_out(
        &self,
        order: &Order,
        reservations: &[StockReservation],
        attribution: Option<&Attribution>,
        settings: &MerchantSettings,
    ) {
        let Some(order_id) = order.id.clone() else {
            tracing::error!(target: "checkout", "Created order has no record id, skipping fan-out");
            return;
        };
        let db = self.state.get_db();

        // 库存审计：每次扣减一条
        let inventory = InventoryRepository::new(db.clone(), &self.merchant);
        for r in reservations {
            let txn = InventoryTransaction {
                id: None,
                merchant: self.merchant.clone(),
                product: r.product.clone(),
                delta: -r.quantity,
                previous_stock: r.previous_stock,
                new_stock: r.new_stock,
                order: order_id.clone(),
                note: format!("Order {}", order.custom_order_id),
                created_at: order.created_at,
            };
            if let Err(e) = inventory.append(txn).await {
                tracing::warn!(
                    target: "checkout",
                    product = %r.product,
                    error = %e,
                    "Failed to append inventory transaction"
                );
            }
        }

        // 佣金记录 + 联盟客订单计数 (余额到 delivered 才动)
        if let Some(att) = attribution {
            let commissions = CommissionRepository::new(db.clone(), &self.merchant);
            let record = CommissionRecord {
                id: None,
                merchant: self.merchant.clone(),
                order: order_id.clone(),
                affiliate: att.affiliate_id.clone(),
                percent: att.percent,
                amount: att.amount,
                status: CommissionStatus::Pending,
                created_at: order.created_at,
                settled_at: None,
            };
            if let Err(e) = commissions.create(record).await {
                tracing::warn!(target: "checkout", error = %e, "Failed to insert commission record");
            }

            let affiliates = AffiliateRepository::new(db.clone(), &self.merchant);
            if let Err(e) = affiliates.increment_order_count(&att.affiliate_id).await {
                tracing::warn!(target: "checkout", error = %e, "Failed to increment affiliate order count");
            }
        }

        // 实时订单事件 (同步发布，仪表盘立刻可见)
        self.state.publish_order_update(&self.merchant, order);

        // 通知：事件同步发布，文档异步落库
        let notifications: Vec<Notification> = settings
            .users
            .iter()
            .map(|user| Notification {
                id: None,
                merchant: self.merchant.clone(),
                user_id: user.id.clone(),
                title: "New order".to_string(),
                body: format!(
                    "Order {} placed by {}",
                    order.custom_order_id, order.customer.name
                ),
                kind: NotificationKind::NewOrder,
                order: Some(order_id.clone()),
                read: false,
                created_at: order.created_at,
            })
            .collect();
        for notification in &notifications {
            self.state.publish_notification(&self.merchant, notification);
        }
        if !notifications.is_empty() {
            let repo = NotificationRepository::new(db.clone(), &self.merchant);
            tokio::spawn(async move {
                if let Err(e) = repo.create_many(notifications).await {
                    tracing::warn!(target: "notifications", error = %e, "Failed to persist notifications");
                }
            });
        }

        // 缓存标签失效
        self.state.cache_tags.revalidate(ORDER_CACHE_TAGS);

        // 邮件 (fire-and-forget)
        self.dispatch_emails(order, settings);

        // IP 归属地 (fire-and-forget，结果补写订单)
        if let Some(ip) = order.client_ip.clone() {
            let geo = self.state.geo.clone();
            let repo = OrderRepository::new(db.clone(), &self.merchant);
            let order_key = order_id.to_string();
            tokio::spawn(async move {
                match geo.lookup(&ip).await {
                    Ok(Some(info)) => {
                        if let Err(e) = repo.set_geo(&order_key, info).await {
                            tracing::warn!(target: "geo", error = %e, "Failed to patch order geo");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!(target: "geo", error = %e, "Geo lookup failed"),
                }
            });
        }

        // 货到付款在下单时回传购买事件；在线支付在支付成功时回传
        if order.payment_method == PaymentMethod::Cod {
            let tracking = self.state.tracking.clone();
            let order_ref = order.custom_order_id.clone();
            let total = order.total;
            tokio::spawn(async move {
                if let Err(e) = tracking.purchase(&order_ref, total, "BDT").await {
                    tracing::warn!(target: "tracking", error = %e, "Purchase tracking failed");
                }
            });
        }

        // 外部风控评分 (fire-and-forget，响应已经回给调用方)
        if !order.customer.phone.trim().is_empty() {
            let fraud = self.state.fraud.clone();
            let repo = OrderRepository::new(db, &self.merchant);
            let phone = order.customer.phone.clone();
            let order_key = order_id.to_string();
            tokio::spawn(async move {
                match fraud.check_phone(&phone).await {
                    Ok(Some(annotation)) => {
                        if let Err(e) = repo.set_fraud_check(&order_key, annotation).await {
                            tracing::warn!(target: "fraud", error = %e, "Failed to patch fraud annotation");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!(target: "fraud", error = %e, "Fraud scoring failed"),
                }
            });
        }
    }

    /// Customer confirmation + admin alert, both fire-and-forget
    fn dispatch_emails(&self, order: &Order, settings: &MerchantSettings) {
        if let Some(to) = order.customer.email.clone() {
            let mailer = self.state.email.clone();
            let variables = serde_json::json!({
                "customerName": order.customer.name,
                "orderId": order.custom_order_id,
                "total": order.total,
            });
            tokio::spawn(async move {
                if let Err(e) = mailer
                    .send_event(email::EVENT_ORDER_CONFIRMATION, &to, variables)
                    .await
                {
                    tracing::warn!(target: "email", error = %e, "Order confirmation email failed");
                }
            });
        }

        if let Some(admin) = settings.admin_email.clone() {
            let mailer = self.state.email.clone();
            let variables = serde_json::json!({
                "orderId": order.custom_order_id,
                "customerName": order.customer.name,
                "total": order.total,
            });
            tokio::spawn(async move {
                if let Err(e) = mailer
                    .send_event(email::EVENT_ADMIN_NEW_ORDER, &admin, variables)
                    .await
                {
                    tracing::warn!(target: "email", error = %e, "Admin alert email failed");
                }
            });
        }
    }
}
