//! 并发写: 同时下单、取消与管理员改状态

mod common;

use std::collections::HashSet;

use common::{Actor, TestApp, error_code};
use futures::future::join_all;
use http::{Method, StatusCode};
use serde_json::json;
use shared::ErrorCode;

const BUYERS: usize = 16;

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

async fn buyers_with_carts(app: &TestApp, product_id: i64) -> Vec<Actor> {
    let mut buyers = Vec::with_capacity(BUYERS);
    for i in 0..BUYERS {
        let buyer = app.customer(&format!("Buyer{i}")).await;
        app.add_to_cart(&buyer, product_id, 1).await;
        buyers.push(buyer);
    }
    buyers
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_checkouts_all_commit() {
    let app = TestApp::spawn().await;
    let grocery = app.category("Grocery", true).await;
    let rice = app.product(grocery, "Rice", "45.00", 1000).await;
    let buyers = buyers_with_carts(&app, rice).await;

    let results = join_all(buyers.iter().map(|b| app.post("/api/orders", b, pickup()))).await;

    let mut numbers = HashSet::new();
    for (status, order) in &results {
        assert_eq!(*status, StatusCode::CREATED, "{order}");
        numbers.insert(order["order_number"].as_str().unwrap().to_string());
    }
    assert_eq!(numbers.len(), BUYERS);
    assert_eq!(stock_of(&app, rice).await, 1000 - BUYERS as i64);

    let (_, cart) = app.get("/api/cart", &buyers[0]).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 0, "{cart}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_checkouts_never_oversell() {
    let app = TestApp::spawn().await;
    let grocery = app.category("Grocery", true).await;
    let eggs = app.product(grocery, "Eggs", "55.00", 10).await;
    let buyers = buyers_with_carts(&app, eggs).await;

    let results = join_all(buyers.iter().map(|b| app.post("/api/orders", b, pickup()))).await;

    let placed = results.iter().filter(|(s, _)| *s == StatusCode::CREATED).count();
    assert_eq!(placed, 10);
    for (status, body) in results.iter().filter(|(s, _)| *s != StatusCode::CREATED) {
        assert_eq!(*status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        assert_eq!(error_code(body), ErrorCode::ProductOutOfStock.code());
    }
    assert_eq!(stock_of(&app, eggs).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_customer_and_admin_cancel_release_stock_once() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;
    let grocery = app.category("Grocery", true).await;
    let rice = app.product(grocery, "Rice", "45.00", 100).await;

    for round in 0..8 {
        let ana = app.customer(&format!("Ana{round}")).await;
        app.add_to_cart(&ana, rice, 3).await;
        let (status, order) = app.post("/api/orders", &ana, pickup()).await;
        assert_eq!(status, StatusCode::CREATED, "{order}");
        assert_eq!(stock_of(&app, rice).await, 97);
        let id = order["id"].as_i64().unwrap();

        let cancel_uri = format!("/api/orders/{id}/cancel");
        let status_uri = format!("/api/admin/orders/{id}/status");
        let ((customer, customer_body), (admin_status, admin_body)) = tokio::join!(
            app.post(&cancel_uri, &ana, json!({})),
            app.put(
                &status_uri,
                &admin,
                json!({ "status": "cancelled", "cancellation_reason": "Out of delivery area" }),
            ),
        );

        assert_eq!(admin_status, StatusCode::OK, "{admin_body}");
        assert_eq!(admin_body["status"], "cancelled");
        match customer {
            StatusCode::OK => assert_eq!(customer_body["status"], "cancelled"),
            StatusCode::UNPROCESSABLE_ENTITY => {
                assert_eq!(error_code(&customer_body), ErrorCode::OrderNotPending.code())
            }
            other => panic!("unexpected {other}: {customer_body}"),
        }

        let (_, current) = app.get(&format!("/api/orders/{id}"), &ana).await;
        assert_eq!(current["status"], "cancelled");
        assert_eq!(stock_of(&app, rice).await, 100, "round {round}");
    }
}
