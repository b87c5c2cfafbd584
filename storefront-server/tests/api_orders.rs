//! 下单与订单状态流转 - HTTP 层测试

mod common;

use chrono::{Duration, Utc};
use common::{TestApp, decimal, error_code};
use http::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;
use shared::ErrorCode;

fn pickup() -> serde_json::Value {
    json!({
        "delivery_method": "pickup",
        "payment_method": "cod",
        "contact_phone": "0917 555 0101"
    })
}

async fn stock_of(app: &TestApp, product_id: i64) -> i64 {
    let (status, body) = app
        .request(Method::GET, &format!("/api/products/{product_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["stock_quantity"].as_i64().unwrap()
}

#[tokio::test]
async fn test_checkout_freezes_prices_and_takes_stock() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;
    let ana = app.customer("Ana").await;
    let grocery = app.category("Grocery", true).await;
    let rice = app.product(grocery, "Rice", "45.00", 10).await;
    let eggs = app.product(grocery, "Eggs", "55.00", 5).await;

    app.add_to_cart(&ana, rice, 2).await;
    app.add_to_cart(&ana, eggs, 1).await;

    let (status, order) = app.post("/api/orders", &ana, pickup()).await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["status"], "pending");
    assert_eq!(decimal(&order["total_amount"]), Decimal::new(14500, 2));
    let number = order["order_number"].as_str().unwrap();
    assert!(number.starts_with("RB"));
    assert_eq!(number.len(), 14);
    assert!(order["delivery_address"].is_null());

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let rice_line = items.iter().find(|i| i["product_id"] == rice).unwrap();
    assert_eq!(decimal(&rice_line["unit_price"]), Decimal::new(4500, 2));
    assert_eq!(rice_line["product"]["name"], "Rice");

    assert_eq!(stock_of(&app, rice).await, 8);
    assert_eq!(stock_of(&app, eggs).await, 4);

    let (_, cart) = app.get("/api/cart", &ana).await;
    assert_eq!(cart["item_count"], 0);

    // 之后的改价不影响订单
    let (status, _) = app
        .put(&format!("/api/admin/products/{rice}"), &admin, json!({ "price": "99.00" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, stored) = app.get(&format!("/api/orders/{}", order["id"]), &ana).await;
    assert_eq!(decimal(&stored["total_amount"]), Decimal::new(14500, 2));
}

#[tokio::test]
async fn test_insufficient_stock_rolls_back() {
    let app = TestApp::spawn().await;
    let ana = app.customer("Ana").await;
    let grocery = app.category("Grocery", true).await;
    let rice = app.product(grocery, "Rice", "45.00", 5).await;
    let milk = app.product(grocery, "Milk", "80.00", 2).await;

    app.add_to_cart(&ana, rice, 3).await;
    app.add_to_cart(&ana, milk, 2).await;
    // 加购后库存被改低
    sqlx::query("UPDATE product SET stock_quantity = 1 WHERE id = ?")
        .bind(milk)
        .execute(&app.state.pool)
        .await
        .unwrap();

    let (status, body) = app.post("/api/orders", &ana, pickup()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), ErrorCode::ProductOutOfStock.code());
    assert_eq!(body["details"]["product_id"], milk);
    assert_eq!(body["details"]["available"], 1);

    assert_eq!(stock_of(&app, rice).await, 5);
    assert_eq!(stock_of(&app, milk).await, 1);
    let (_, orders) = app.get("/api/orders", &ana).await;
    assert_eq!(orders["total"], 0);
    let (_, cart) = app.get("/api/cart", &ana).await;
    assert_eq!(cart["item_count"], 5);
}

#[tokio::test]
async fn test_delivery_restricted_category() {
    let app = TestApp::spawn().await;
    let ana = app.customer("Ana").await;
    let dry = app.category("Dry Goods", false).await;
    let sack = app.product(dry, "Feed Sack", "120.00", 4).await;
    app.add_to_cart(&ana, sack, 1).await;

    let tomorrow = (Utc::now() + Duration::days(1)).to_rfc3339();
    let (status, body) = app
        .post(
            "/api/orders",
            &ana,
            json!({
                "delivery_method": "delivery",
                "payment_method": "gcash",
                "delivery_address": "12 Mabini St",
                "contact_phone": "0917",
                "delivery_date": tomorrow
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), ErrorCode::DeliveryNotAvailable.code());
    assert_eq!(stock_of(&app, sack).await, 4);

    let (status, _) = app.post("/api/orders", &ana, pickup()).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_empty_cart_and_validation() {
    let app = TestApp::spawn().await;
    let ana = app.customer("Ana").await;

    let (status, body) = app.post("/api/orders", &ana, pickup()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), ErrorCode::CartEmpty.code());

    let (status, body) = app
        .post(
            "/api/orders",
            &ana,
            json!({ "delivery_method": "pickup", "payment_method": "cod", "contact_phone": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["fields"]["contact_phone"].is_array());

    let (status, _) = app
        .request(Method::POST, "/api/orders", None, Some(pickup()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_cancel_restores_stock() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;
    let ana = app.customer("Ana").await;
    let ben = app.customer("Ben").await;
    let grocery = app.category("Grocery", true).await;
    let rice = app.product(grocery, "Rice", "45.00", 10).await;

    app.add_to_cart(&ana, rice, 4).await;
    let (_, order) = app.post("/api/orders", &ana, pickup()).await;
    let id = order["id"].as_i64().unwrap();

    let (status, body) = app.get(&format!("/api/orders/{id}"), &ben).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), ErrorCode::NotResourceOwner.code());
    let (status, _) = app.post(&format!("/api/orders/{id}/cancel"), &ben, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, cancelled) = app.post(&format!("/api/orders/{id}/cancel"), &ana, json!({})).await;
    assert_eq!(status, StatusCode::OK, "{cancelled}");
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(stock_of(&app, rice).await, 10);

    let (status, body) = app.post(&format!("/api/orders/{id}/cancel"), &ana, json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), ErrorCode::OrderNotPending.code());

    // 已确认的订单不可由客户取消
    app.add_to_cart(&ana, rice, 1).await;
    let (_, second) = app.post("/api/orders", &ana, pickup()).await;
    let second_id = second["id"].as_i64().unwrap();
    let (status, _) = app
        .put(
            &format!("/api/admin/orders/{second_id}/status"),
            &admin,
            json!({ "status": "confirmed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post(&format!("/api/orders/{second_id}/cancel"), &ana, json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(stock_of(&app, rice).await, 9);
}

#[tokio::test]
async fn test_admin_status_update_and_reason() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;
    let ana = app.customer("Ana").await;
    let grocery = app.category("Grocery", true).await;
    let rice = app.product(grocery, "Rice", "45.00", 10).await;
    app.add_to_cart(&ana, rice, 2).await;
    let (_, order) = app.post("/api/orders", &ana, pickup()).await;
    let uri = format!("/api/admin/orders/{}/status", order["id"]);

    let (status, body) = app.put(&uri, &ana, json!({ "status": "confirmed" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), ErrorCode::AdminRequired.code());

    let (status, body) = app.put(&uri, &admin, json!({ "status": "shipped" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["fields"]["status"].is_array());

    let (status, body) = app.put(&uri, &admin, json!({ "status": "cancelled" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), ErrorCode::CancellationReasonRequired.code());

    let (status, body) = app.put(&uri, &admin, json!({ "status": "start_preparing" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "start_preparing");

    let (status, body) = app.put(&uri, &admin, json!({ "status": "out_for_delivery" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), ErrorCode::OrderInvalidTransition.code());

    let (status, body) = app
        .put(&uri, &admin, json!({ "status": "cancelled", "cancellation_reason": "  Out of season  " }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cancellation_reason"], "Out of season");
    assert_eq!(stock_of(&app, rice).await, 10);

    let (status, body) = app.put(&uri, &admin, json!({ "status": "pending" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["cancellation_reason"].is_null());
    assert_eq!(stock_of(&app, rice).await, 8);
}

#[tokio::test]
async fn test_order_notifications_reach_inboxes() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;
    let ana = app.customer("Ana").await;
    let grocery = app.category("Grocery", true).await;
    let rice = app.product(grocery, "Rice", "45.00", 10).await;
    app.add_to_cart(&ana, rice, 1).await;
    let (_, order) = app.post("/api/orders", &ana, pickup()).await;

    let (_, inbox) = app.get("/api/notifications", &admin).await;
    assert_eq!(inbox["total"], 1);
    assert_eq!(inbox["data"][0]["kind"], "new_order");
    assert_eq!(inbox["data"][0]["data"]["order_number"], order["order_number"]);
    assert_eq!(inbox["data"][0]["data"]["customer_name"], "Ana");

    let (_, count) = app.get("/api/notifications/unread-count", &ana).await;
    assert_eq!(count["unread"], 1);

    app.put(
        &format!("/api/admin/orders/{}/status", order["id"]),
        &admin,
        json!({ "status": "mark_ready" }),
    )
    .await;
    let (_, inbox) = app.get("/api/notifications?unread_only=true", &ana).await;
    assert_eq!(inbox["total"], 2);
    assert_eq!(inbox["data"][0]["kind"], "order_status_changed");
    assert_eq!(
        inbox["data"][0]["data"]["message"],
        "Your order status has been updated to Ready"
    );

    let first = inbox["data"][1]["id"].as_i64().unwrap();
    let (status, count) = app.post(&format!("/api/notifications/{first}/read"), &ana, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count["unread"], 1);

    // 他人的通知不可操作
    let (status, body) = app.post(&format!("/api/notifications/{first}/read"), &admin, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), ErrorCode::NotificationNotFound.code());

    let (_, count) = app.post("/api/notifications/read-all", &ana, json!({})).await;
    assert_eq!(count["unread"], 0);
}
