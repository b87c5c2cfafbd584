//! 购物车结算

use chrono::{DateTime, Utc};
use shared::models::{
    CartItem, DeliveryMethod, NotificationKind, NotificationPayload, Order, PlaceOrderRequest, Product,
};

use super::{OrderError, OrderResult, OrderWorkflow, ProductRef, money};
use crate::db::repository::order::{NewOrder, NewOrderItem};
use crate::db;
use crate::db::repository::{cart, order, product, user};
use crate::notifications::NotificationEvent;

/// Normalized checkout fields
#[derive(Debug)]
struct Checkout {
    request: PlaceOrderRequest,
    delivery_address: Option<String>,
    contact_phone: String,
    notes: Option<String>,
    delivery_date: Option<i64>,
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl Checkout {
    fn from_request(request: PlaceOrderRequest, now: DateTime<Utc>) -> OrderResult<Self> {
        let contact_phone = trimmed(Some(&request.contact_phone)).ok_or(OrderError::Validation {
            field: "contact_phone",
            message: "Contact phone is required".into(),
        })?;

        // 自取订单不保存地址
        let delivery_address = match request.delivery_method {
            DeliveryMethod::Delivery => Some(trimmed(request.delivery_address.as_deref()).ok_or(
                OrderError::Validation {
                    field: "delivery_address",
                    message: "Delivery address is required for delivery orders".into(),
                },
            )?),
            DeliveryMethod::Pickup => None,
        };

        let delivery_date = match request.delivery_date {
            Some(date) if date <= now => {
                return Err(OrderError::Validation {
                    field: "delivery_date",
                    message: "Delivery date must be in the future".into(),
                });
            }
            Some(date) => Some(date.timestamp_millis()),
            None => None,
        };

        let notes = trimmed(request.notes.as_deref());
        Ok(Self {
            request,
            delivery_address,
            contact_phone,
            notes,
            delivery_date,
        })
    }
}

fn product_ref(product: &Product) -> ProductRef {
    ProductRef {
        id: product.id,
        name: product.name.clone(),
    }
}

/// Cart line paired with its live product
fn line_product(line: &CartItem) -> OrderResult<&Product> {
    let product = line.product.as_ref().ok_or_else(|| {
        OrderError::ProductUnavailable(ProductRef {
            id: line.product_id,
            name: format!("#{}", line.product_id),
        })
    })?;
    let category_active = product.category.as_ref().is_none_or(|c| c.is_active);
    if !product.is_active || !category_active {
        return Err(OrderError::ProductUnavailable(product_ref(product)));
    }
    Ok(product)
}

/// Products whose category does not deliver
fn delivery_conflicts<'a>(products: impl IntoIterator<Item = &'a Product>) -> Vec<ProductRef> {
    products
        .into_iter()
        .filter(|p| p.category.as_ref().is_some_and(|c| !c.allows_delivery))
        .map(product_ref)
        .collect()
}

impl OrderWorkflow {
    /// Convert the user's cart into a pending order
    pub async fn place_order(&self, user_id: i64, request: PlaceOrderRequest) -> OrderResult<Order> {
        let checkout = Checkout::from_request(request, Utc::now())?;
        let method = checkout.request.delivery_method;

        let mut tx = db::begin_write(&self.pool).await?;

        let lines = cart::find_by_user_tx(&mut *tx, user_id).await?;
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let products = lines.iter().map(line_product).collect::<OrderResult<Vec<_>>>()?;

        if method == DeliveryMethod::Delivery {
            let blocked = delivery_conflicts(products.iter().copied());
            if !blocked.is_empty() {
                tracing::info!(user_id, products = ?blocked, "Delivery rejected for restricted categories");
                return Err(OrderError::DeliveryNotAvailable(blocked));
            }
        }

        // 逐行预留库存；任何一行不足则整单回滚
        let mut frozen = Vec::with_capacity(lines.len());
        for (line, product) in lines.iter().zip(&products) {
            if !product::reserve_stock(&mut *tx, product.id, line.quantity).await? {
                let available = product::find_by_id_tx(&mut *tx, product.id)
                    .await?
                    .map(|p| p.stock_quantity)
                    .unwrap_or(0);
                return Err(OrderError::InsufficientStock {
                    product: product_ref(product),
                    requested: line.quantity,
                    available,
                });
            }
            let line_total = money::line_total(product.price, line.quantity);
            frozen.push((*product, line.quantity, line_total));
        }

        let total = money::sum(frozen.iter().map(|(_, _, total)| *total));
        let total_cents = cents(total)?;

        let order_number = self.numbers.generate(&mut *tx).await?;
        let order_id = order::insert(
            &mut *tx,
            &NewOrder {
                order_number: &order_number,
                user_id,
                total_cents,
                delivery_method: method,
                payment_method: checkout.request.payment_method,
                delivery_address: checkout.delivery_address.as_deref(),
                delivery_date: checkout.delivery_date,
                contact_phone: &checkout.contact_phone,
                notes: checkout.notes.as_deref(),
            },
        )
        .await?;

        for (product, quantity, line_total) in &frozen {
            order::insert_item(
                &mut *tx,
                order_id,
                &NewOrderItem {
                    product_id: product.id,
                    product_name: &product.name,
                    quantity: *quantity,
                    unit_price_cents: cents(product.price)?,
                    line_total_cents: cents(*line_total)?,
                },
            )
            .await?;
        }

        cart::clear(&mut *tx, user_id).await?;

        let admins = user::find_admin_ids(&mut *tx).await?;
        let mut placed = order::find_by_id_tx(&mut *tx, order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;
        order::attach_products(&mut *tx, &mut placed).await?;

        tx.commit().await?;

        tracing::info!(
            order_id,
            order_number = %placed.order_number,
            user_id,
            total = %placed.total_amount,
            lines = placed.items.len(),
            "Order placed"
        );

        let mut events: Vec<NotificationEvent> = admins
            .into_iter()
            .map(|admin_id| NotificationEvent {
                recipient_id: admin_id,
                kind: NotificationKind::NewOrder,
                payload: NotificationPayload::new_order(&placed),
            })
            .collect();
        events.push(NotificationEvent {
            recipient_id: user_id,
            kind: NotificationKind::OrderReceived,
            payload: NotificationPayload::order_received(&placed),
        });
        self.notifier.notify_all(&events).await;

        Ok(placed)
    }
}

fn cents(amount: rust_decimal::Decimal) -> OrderResult<i64> {
    money::to_cents(amount).ok_or_else(|| OrderError::Validation {
        field: "total_amount",
        message: format!("Amount out of range: {amount}"),
    })
}
