//! End-to-end checkout flow tests over the in-memory engine
//!
//! Seeds products / settings / affiliates / blocklist entries, drives the
//! ingestion flow (service-level and over HTTP) and asserts the stock,
//! audit, attribution and rejection behavior.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use rust_decimal::Decimal;
use tower::ServiceExt;

use storefront_server::checkout::{CheckoutError, CheckoutRequest, CheckoutService, ItemRequest};
use storefront_server::core::{Config, Server, ServerState};
use storefront_server::db::DbService;
use storefront_server::db::models::{
    Affiliate, AffiliateStatus, BlockedCustomer, BrandConfig, CommissionStatus, CustomerInfo,
    MerchantSettings, MerchantUser, OrderStatus, PaymentMethod, Product,
};
use storefront_server::db::repository::{
    AffiliateRepository, BlockedCustomerRepository, CommissionRepository, InventoryRepository,
    MerchantSettingsRepository, OrderRepository, ProductRepository,
};
use storefront_server::message::EventType;

const MERCHANT: &str = "m-sunrise";

fn test_config() -> Config {
    Config {
        work_dir: "/tmp/storefront-test".to_string(),
        http_port: 0,
        environment: "test".to_string(),
        bus_capacity: 64,
        fraud_check_url: None,
        fraud_check_timeout_ms: 10_000,
        geo_lookup_url: None,
        email_api_url: None,
        email_api_key: None,
        tracking_url: None,
    }
}

async fn test_state() -> ServerState {
    let db = DbService::memory().await.expect("in-memory db");
    ServerState::with_db(&test_config(), db.db)
}

async fn seed_product(state: &ServerState, name: &str, price: Decimal, stock: i64) -> Product {
    ProductRepository::new(state.db.clone(), MERCHANT)
        .create(Product::new(MERCHANT, name, price, stock))
        .await
        .expect("seed product")
}

async fn seed_settings(state: &ServerState) -> MerchantSettings {
    let settings = MerchantSettings {
        brand: Some(BrandConfig {
            name: "Brightline".into(),
        }),
        store_name: "Sunrise Traders".into(),
        admin_email: Some("owner@sunrise.example".into()),
        users: vec![
            MerchantUser {
                id: "u-1".into(),
                name: "Owner".into(),
                email: Some("owner@sunrise.example".into()),
            },
            MerchantUser {
                id: "u-2".into(),
                name: "Staff".into(),
                email: None,
            },
        ],
        ..MerchantSettings::fallback(MERCHANT)
    };
    MerchantSettingsRepository::new(state.db.clone(), MERCHANT)
        .create(settings)
        .await
        .expect("seed settings")
}

async fn seed_affiliate(state: &ServerState, promo: &str, level: u8) -> Affiliate {
    AffiliateRepository::new(state.db.clone(), MERCHANT)
        .create(Affiliate {
            id: None,
            merchant: MERCHANT.into(),
            promo_code: promo.into(),
            status: AffiliateStatus::Active,
            level,
            order_count: 0,
            pending_balance: Decimal::ZERO,
        })
        .await
        .expect("seed affiliate")
}

fn customer() -> CustomerInfo {
    CustomerInfo {
        name: "Rahim Uddin".into(),
        phone: "+8801712345678".into(),
        email: Some("rahim@example.com".into()),
        address: "12 Lake Road, Dhaka".into(),
    }
}

fn request_for(items: Vec<ItemRequest>, total: Decimal) -> CheckoutRequest {
    CheckoutRequest {
        items,
        customer: customer(),
        payment_method: PaymentMethod::Cod,
        subtotal: total,
        discount: Decimal::ZERO,
        tax: Decimal::ZERO,
        shipping: Decimal::ZERO,
        total,
        coupon_code: None,
        source: None,
    }
}

fn item(product: &Product, quantity: i64) -> ItemRequest {
    ItemRequest {
        product_id: product.id.clone().expect("seeded id").to_string(),
        quantity,
    }
}

/// Minimal percent-encoding for cookie values (everything non-unreserved)
fn percent_encode(raw: &str) -> String {
    let mut out = String::new();
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn attribution_cookie(affiliate: &Affiliate, expiry_ms: i64) -> String {
    let payload = format!(
        r#"{{"promoCode":"{}","affiliateId":"{}","expiry":{}}}"#,
        affiliate.promo_code,
        affiliate.id.clone().expect("seeded id"),
        expiry_ms
    );
    format!("affiliate_tracking={}", percent_encode(&payload))
}

fn far_future_ms() -> i64 {
    Utc::now().timestamp_millis() + 86_400_000
}

// ============================================================================
// Stock validation + reservation
// ============================================================================

#[tokio::test]
async fn successful_order_decrements_stock_and_audits() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Ceramic Mug", Decimal::new(10000, 2), 10).await;

    let service = CheckoutService::new(state.clone(), MERCHANT);
    let order = service
        .place_order(
            request_for(vec![item(&product, 2)], Decimal::new(20000, 2)),
            None,
            None,
        )
        .await
        .expect("order should be created");

    assert!(order.id.is_some());
    assert!(
        order.custom_order_id.starts_with("BRI-"),
        "brand prefix expected, got {}",
        order.custom_order_id
    );
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 2);

    // stock 10 -> 8
    let products = ProductRepository::new(state.db.clone(), MERCHANT);
    let after = products
        .find_by_id(&product.id.clone().unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.stock, 8);

    // exactly one audit entry with previous/new captured
    let inventory = InventoryRepository::new(state.db.clone(), MERCHANT);
    let txns = inventory
        .find_by_order(&order.id.clone().unwrap())
        .await
        .unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].delta, -2);
    assert_eq!(txns[0].previous_stock, 10);
    assert_eq!(txns[0].new_stock, 8);
}

#[tokio::test]
async fn insufficient_stock_rejects_the_whole_order() {
    let state = test_state().await;
    seed_settings(&state).await;
    let short = seed_product(&state, "Desk Lamp", Decimal::new(5000, 2), 3).await;
    let plenty = seed_product(&state, "Notebook", Decimal::new(1000, 2), 10).await;

    let service = CheckoutService::new(state.clone(), MERCHANT);
    let result = service
        .place_order(
            request_for(
                vec![item(&short, 5), item(&plenty, 1)],
                Decimal::new(26000, 2),
            ),
            None,
            None,
        )
        .await;

    match result {
        Err(CheckoutError::InsufficientStock(details)) => {
            assert_eq!(details.len(), 1);
            assert_eq!(
                details[0],
                "Insufficient stock for Desk Lamp. Available: 3, Requested: 5"
            );
        }
        other => panic!("expected InsufficientStock, got {:?}", other.map(|o| o.id)),
    }

    // no stock mutated for ANY item, no order persisted
    let products = ProductRepository::new(state.db.clone(), MERCHANT);
    for (p, expected) in [(&short, 3), (&plenty, 10)] {
        let after = products
            .find_by_id(&p.id.clone().unwrap().to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.stock, expected);
    }
    let orders = OrderRepository::new(state.db.clone(), MERCHANT);
    let page = orders.find_page(1, 10, None, None).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn unknown_product_rejects_with_itemized_detail() {
    let state = test_state().await;
    seed_settings(&state).await;

    let service = CheckoutService::new(state.clone(), MERCHANT);
    let result = service
        .place_order(
            request_for(
                vec![ItemRequest {
                    product_id: "product:does-not-exist".into(),
                    quantity: 1,
                }],
                Decimal::new(1000, 2),
            ),
            None,
            None,
        )
        .await;

    match result {
        Err(CheckoutError::InsufficientStock(details)) => {
            assert_eq!(details.len(), 1);
            assert!(details[0].starts_with("Product not found:"));
        }
        other => panic!("expected itemized rejection, got {:?}", other.map(|o| o.id)),
    }
}

#[tokio::test]
async fn products_of_other_merchants_are_invisible() {
    let state = test_state().await;
    seed_settings(&state).await;
    let foreign = ProductRepository::new(state.db.clone(), "m-other")
        .create(Product::new("m-other", "Foreign", Decimal::new(1000, 2), 50))
        .await
        .unwrap();

    let service = CheckoutService::new(state.clone(), MERCHANT);
    let result = service
        .place_order(
            request_for(vec![item(&foreign, 1)], Decimal::new(1000, 2)),
            None,
            None,
        )
        .await;

    assert!(matches!(result, Err(CheckoutError::InsufficientStock(_))));
}

// ============================================================================
// Fraud gate
// ============================================================================

#[tokio::test]
async fn blocklisted_phone_is_rejected_before_any_write() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Kettle", Decimal::new(4000, 2), 5).await;

    // 黑名单存的是归一化后的号码，请求里的是带国家码的写法
    BlockedCustomerRepository::new(state.db.clone(), MERCHANT)
        .create(BlockedCustomer {
            id: None,
            merchant: MERCHANT.into(),
            phone: Some("01712345678".into()),
            email: None,
            active: true,
            reason: Some("repeated refusals".into()),
        })
        .await
        .unwrap();

    let service = CheckoutService::new(state.clone(), MERCHANT);
    let result = service
        .place_order(
            request_for(vec![item(&product, 1)], Decimal::new(4000, 2)),
            None,
            None,
        )
        .await;

    assert!(matches!(result, Err(CheckoutError::CustomerBlocked)));

    let products = ProductRepository::new(state.db.clone(), MERCHANT);
    let after = products
        .find_by_id(&product.id.clone().unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.stock, 5);

    let orders = OrderRepository::new(state.db.clone(), MERCHANT);
    assert_eq!(orders.find_page(1, 10, None, None).await.unwrap().total, 0);
}

#[tokio::test]
async fn blocklisted_email_is_rejected() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Kettle", Decimal::new(4000, 2), 5).await;

    BlockedCustomerRepository::new(state.db.clone(), MERCHANT)
        .create(BlockedCustomer {
            id: None,
            merchant: MERCHANT.into(),
            phone: None,
            email: Some("rahim@example.com".into()),
            active: true,
            reason: None,
        })
        .await
        .unwrap();

    let service = CheckoutService::new(state.clone(), MERCHANT);
    let result = service
        .place_order(
            request_for(vec![item(&product, 1)], Decimal::new(4000, 2)),
            None,
            None,
        )
        .await;
    assert!(matches!(result, Err(CheckoutError::CustomerBlocked)));
}

#[tokio::test]
async fn inactive_blocklist_entries_do_not_block() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Kettle", Decimal::new(4000, 2), 5).await;

    BlockedCustomerRepository::new(state.db.clone(), MERCHANT)
        .create(BlockedCustomer {
            id: None,
            merchant: MERCHANT.into(),
            phone: Some("01712345678".into()),
            email: None,
            active: false,
            reason: None,
        })
        .await
        .unwrap();

    let service = CheckoutService::new(state.clone(), MERCHANT);
    let result = service
        .place_order(
            request_for(vec![item(&product, 1)], Decimal::new(4000, 2)),
            None,
            None,
        )
        .await;
    assert!(result.is_ok());
}

// ============================================================================
// Affiliate attribution
// ============================================================================

#[tokio::test]
async fn valid_cookie_attributes_order_and_bumps_counter() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Ceramic Mug", Decimal::new(10000, 2), 10).await;
    let affiliate = seed_affiliate(&state, "SUN10", 1).await;

    let cookie = attribution_cookie(&affiliate, far_future_ms());
    let service = CheckoutService::new(state.clone(), MERCHANT);
    let order = service
        .place_order(
            request_for(vec![item(&product, 2)], Decimal::new(20000, 2)),
            Some(cookie),
            None,
        )
        .await
        .expect("order should be created");

    // level 1 = 5% of 200.00 = 10.00
    assert_eq!(order.affiliate_code.as_deref(), Some("SUN10"));
    assert_eq!(order.affiliate, affiliate.id);
    assert_eq!(order.affiliate_commission, Some(Decimal::new(1000, 2)));

    let affiliates = AffiliateRepository::new(state.db.clone(), MERCHANT);
    let after = affiliates
        .find_by_id(&affiliate.id.clone().unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.order_count, 1);
    assert_eq!(after.pending_balance, Decimal::ZERO);

    let commissions = CommissionRepository::new(state.db.clone(), MERCHANT);
    let record = commissions
        .find_pending_by_order(&order.id.clone().unwrap())
        .await
        .unwrap()
        .expect("pending commission record");
    assert_eq!(record.amount, Decimal::new(1000, 2));
    assert_eq!(record.status, CommissionStatus::Pending);
}

#[tokio::test]
async fn expired_cookie_drops_attribution() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Ceramic Mug", Decimal::new(10000, 2), 10).await;
    let affiliate = seed_affiliate(&state, "SUN10", 1).await;

    let expired = Utc::now().timestamp_millis() - 1_000;
    let cookie = attribution_cookie(&affiliate, expired);
    let service = CheckoutService::new(state.clone(), MERCHANT);
    let order = service
        .place_order(
            request_for(vec![item(&product, 1)], Decimal::new(10000, 2)),
            Some(cookie),
            None,
        )
        .await
        .expect("order still created");

    assert!(order.affiliate_code.is_none());
    assert!(order.affiliate.is_none());
    assert!(order.affiliate_commission.is_none());

    let affiliates = AffiliateRepository::new(state.db.clone(), MERCHANT);
    let after = affiliates
        .find_by_id(&affiliate.id.clone().unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.order_count, 0);
}

#[tokio::test]
async fn double_encoded_cookie_is_treated_as_malformed() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Ceramic Mug", Decimal::new(10000, 2), 10).await;
    let affiliate = seed_affiliate(&state, "SUN10", 1).await;

    let payload = format!(
        r#"{{"promoCode":"SUN10","affiliateId":"{}","expiry":{}}}"#,
        affiliate.id.clone().unwrap(),
        far_future_ms()
    );
    let double_encoded = percent_encode(&percent_encode(&payload));
    let cookie = format!("affiliate_tracking={}", double_encoded);

    let service = CheckoutService::new(state.clone(), MERCHANT);
    let order = service
        .place_order(
            request_for(vec![item(&product, 1)], Decimal::new(10000, 2)),
            Some(cookie),
            None,
        )
        .await
        .expect("order still created");

    assert!(order.affiliate_code.is_none());
}

#[tokio::test]
async fn suspended_affiliate_gets_no_attribution() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Ceramic Mug", Decimal::new(10000, 2), 10).await;
    let affiliate = AffiliateRepository::new(state.db.clone(), MERCHANT)
        .create(Affiliate {
            id: None,
            merchant: MERCHANT.into(),
            promo_code: "SUN10".into(),
            status: AffiliateStatus::Suspended,
            level: 1,
            order_count: 0,
            pending_balance: Decimal::ZERO,
        })
        .await
        .unwrap();

    let cookie = attribution_cookie(&affiliate, far_future_ms());
    let service = CheckoutService::new(state.clone(), MERCHANT);
    let order = service
        .place_order(
            request_for(vec![item(&product, 1)], Decimal::new(10000, 2)),
            Some(cookie),
            None,
        )
        .await
        .unwrap();

    assert!(order.affiliate_code.is_none());
}

// ============================================================================
// Real-time events
// ============================================================================

#[tokio::test]
async fn order_creation_emits_bus_events() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Ceramic Mug", Decimal::new(10000, 2), 10).await;

    let mut rx = state.bus().subscribe();

    let service = CheckoutService::new(state.clone(), MERCHANT);
    let order = service
        .place_order(
            request_for(vec![item(&product, 1)], Decimal::new(10000, 2)),
            None,
            None,
        )
        .await
        .unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first.event_type, EventType::OrderUpdate);
    assert_eq!(first.merchant, MERCHANT);
    assert_eq!(first.payload["customOrderId"], order.custom_order_id.as_str());

    // two seeded users -> two notification events
    let second = rx.recv().await.unwrap();
    assert_eq!(second.event_type, EventType::Notification);
    let third = rx.recv().await.unwrap();
    assert_eq!(third.event_type, EventType::Notification);
}

#[tokio::test]
async fn cache_tags_are_invalidated_on_order_creation() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Ceramic Mug", Decimal::new(10000, 2), 10).await;

    assert_eq!(state.cache_tags.version("orders"), 0);

    let service = CheckoutService::new(state.clone(), MERCHANT);
    service
        .place_order(
            request_for(vec![item(&product, 1)], Decimal::new(10000, 2)),
            None,
            None,
        )
        .await
        .unwrap();

    assert_eq!(state.cache_tags.version("orders"), 1);
    assert_eq!(state.cache_tags.version("inventory"), 1);
    assert_eq!(state.cache_tags.version("statistics"), 1);
}

// ============================================================================
// HTTP surface
// ============================================================================

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-merchant-id", MERCHANT)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn checkout_body(product: &Product, quantity: i64, total: &str) -> serde_json::Value {
    serde_json::json!({
        "items": [{ "productId": product.id.clone().unwrap().to_string(), "quantity": quantity }],
        "customer": {
            "name": "Rahim Uddin",
            "phone": "+8801712345678",
            "email": "rahim@example.com",
            "address": "12 Lake Road, Dhaka"
        },
        "paymentMethod": "cod",
        "subtotal": total,
        "total": total
    })
}

#[tokio::test]
async fn http_create_then_list_with_cache_headers() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Ceramic Mug", Decimal::new(10000, 2), 10).await;

    let app = Server::router(state.clone());

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/orders",
            checkout_body(&product, 2, "200.00"),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let order = body_json(created).await;
    assert!(order["id"].is_string());
    assert!(order["customOrderId"].as_str().unwrap().starts_with("BRI-"));

    let listed = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/orders?page=1&limit=10")
                .header("x-merchant-id", MERCHANT)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    assert_eq!(
        listed.headers().get(header::CACHE_CONTROL).unwrap(),
        "private, max-age=30"
    );
    let tags = listed
        .headers()
        .get("x-cache-tags")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(tags.contains("orders:"), "got {tags}");

    let body = body_json(listed).await;
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["totalPages"], 1);
    assert_eq!(body["pagination"]["hasNextPage"], false);
    assert_eq!(body["pagination"]["hasPrevPage"], false);
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn http_insufficient_stock_shape() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Desk Lamp", Decimal::new(5000, 2), 3).await;

    let app = Server::router(state.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/orders",
            checkout_body(&product, 5, "250.00"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Insufficient stock");
    assert_eq!(
        body["details"][0],
        "Insufficient stock for Desk Lamp. Available: 3, Requested: 5"
    );
}

#[tokio::test]
async fn http_blocked_customer_shape() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Kettle", Decimal::new(4000, 2), 5).await;
    BlockedCustomerRepository::new(state.db.clone(), MERCHANT)
        .create(BlockedCustomer {
            id: None,
            merchant: MERCHANT.into(),
            phone: Some("01712345678".into()),
            email: None,
            active: true,
            reason: None,
        })
        .await
        .unwrap();

    let app = Server::router(state.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/orders",
            checkout_body(&product, 1, "40.00"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["code"], "CUSTOMER_BLOCKED");
    assert_eq!(body["error"], "Order rejected");
}

#[tokio::test]
async fn http_missing_merchant_header_is_rejected() {
    let state = test_state().await;
    let app = Server::router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/orders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delivered_transition_settles_commission() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Ceramic Mug", Decimal::new(10000, 2), 10).await;
    let affiliate = seed_affiliate(&state, "SUN10", 2).await;

    // place with attribution: level 2 = 7.5% of 200.00 = 15.00
    let cookie = attribution_cookie(&affiliate, far_future_ms());
    let service = CheckoutService::new(state.clone(), MERCHANT);
    let order = service
        .place_order(
            request_for(vec![item(&product, 2)], Decimal::new(20000, 2)),
            Some(cookie),
            None,
        )
        .await
        .unwrap();
    assert_eq!(order.affiliate_commission, Some(Decimal::new(1500, 2)));

    let app = Server::router(state.clone());
    let order_id = order.id.clone().unwrap().to_string();

    for status in ["processing", "shipped", "delivered"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/orders/{}/status", order_id),
                serde_json::json!({ "status": status }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "transition to {status}");
    }

    // commission settled, balance credited exactly once
    let commissions = CommissionRepository::new(state.db.clone(), MERCHANT);
    assert!(
        commissions
            .find_pending_by_order(&order.id.clone().unwrap())
            .await
            .unwrap()
            .is_none()
    );
    let affiliates = AffiliateRepository::new(state.db.clone(), MERCHANT);
    let after = affiliates
        .find_by_id(&affiliate.id.clone().unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.pending_balance, Decimal::new(1500, 2));
    assert_eq!(after.order_count, 1);
}

#[tokio::test]
async fn invalid_transition_is_rejected() {
    let state = test_state().await;
    seed_settings(&state).await;
    let product = seed_product(&state, "Ceramic Mug", Decimal::new(10000, 2), 10).await;

    let service = CheckoutService::new(state.clone(), MERCHANT);
    let order = service
        .place_order(
            request_for(vec![item(&product, 1)], Decimal::new(10000, 2)),
            None,
            None,
        )
        .await
        .unwrap();

    let app = Server::router(state.clone());
    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/orders/{}/status", order.id.clone().unwrap()),
            serde_json::json!({ "status": "delivered" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
