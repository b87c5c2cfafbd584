//! HTTP 测试辅助
//!
//! 每个测试使用临时目录中的 SQLite 文件，通过 `ServerState::initialize`
//! 完整初始化 (迁移、通知通道)，再用 `oneshot` 驱动路由。

#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use shared::models::{CategoryCreate, ProductCreate, UserCreate, UserRole};
use storefront_server::db::repository::{category, product, user};
use storefront_server::{Config, ServerState, core::build_app};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
    _dir: TempDir,
}

/// 登录身份 (用户 ID + Bearer 令牌)
pub struct Actor {
    pub id: i64,
    pub token: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("storefront.db").display());
        let vars: HashMap<String, String> = [
            ("DATABASE_URL", url),
            ("JWT_SECRET", "integration-test-secret-0123456789abcdef".to_string()),
            ("SEED_DEMO_DATA", "false".to_string()),
            ("NOTIFICATION_CHANNELS", "database,broadcast".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
        let state = ServerState::initialize(&config).await.unwrap();
        Self {
            app: build_app(state.clone()),
            state,
            _dir: dir,
        }
    }

    pub async fn actor(&self, name: &str, role: UserRole) -> Actor {
        let created = user::create(
            &self.state.pool,
            UserCreate {
                name: name.to_string(),
                email: format!("{}@test.local", name.to_lowercase()),
                phone: None,
                role,
            },
        )
        .await
        .unwrap();
        let token = self
            .state
            .jwt_service
            .generate_token(created.id, &created.name, role)
            .unwrap();
        Actor {
            id: created.id,
            token,
        }
    }

    pub async fn customer(&self, name: &str) -> Actor {
        self.actor(name, UserRole::Customer).await
    }

    pub async fn admin(&self) -> Actor {
        self.actor("Admin", UserRole::Admin).await
    }

    pub async fn category(&self, name: &str, allows_delivery: bool) -> i64 {
        category::create(
            &self.state.pool,
            CategoryCreate {
                name: name.to_string(),
                description: None,
                allows_delivery: Some(allows_delivery),
                is_active: Some(true),
            },
        )
        .await
        .unwrap()
        .id
    }

    pub async fn product(&self, category_id: i64, name: &str, price: &str, stock: i64) -> i64 {
        product::create(
            &self.state.pool,
            ProductCreate {
                category_id,
                name: name.to_string(),
                description: None,
                price: Decimal::from_str(price).unwrap(),
                stock_quantity: stock,
                unit: None,
                weight: None,
                is_active: Some(true),
            },
        )
        .await
        .unwrap()
        .id
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, actor: &Actor) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(&actor.token), None).await
    }

    pub async fn post(&self, uri: &str, actor: &Actor, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(&actor.token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, actor: &Actor, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(&actor.token), Some(body)).await
    }

    /// 加入购物车并断言成功
    pub async fn add_to_cart(&self, actor: &Actor, product_id: i64, quantity: i64) {
        let (status, body) = self
            .post(
                "/api/cart",
                actor,
                serde_json::json!({ "product_id": product_id, "quantity": quantity }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }
}

/// Money fields serialize as decimal strings
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}

pub fn error_code(body: &Value) -> u16 {
    body["code"].as_u64().unwrap() as u16
}
