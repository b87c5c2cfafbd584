//! Order workflow errors

use shared::models::OrderStatus;
use shared::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::repository::RepoError;

/// Product named in a rejection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Product is no longer available: {}", .0.name)]
    ProductUnavailable(ProductRef),

    #[error("Delivery is not available for: {}", names(.0))]
    DeliveryNotAvailable(Vec<ProductRef>),

    #[error("Insufficient stock for {}: requested {requested}, available {available}", .product.name)]
    InsufficientStock {
        product: ProductRef,
        requested: i64,
        available: i64,
    },

    #[error("Order not found: {0}")]
    NotFound(i64),

    #[error("Order {0} belongs to another customer")]
    NotOwner(i64),

    #[error("Only pending orders can be cancelled (current status: {0})")]
    NotPending(OrderStatus),

    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Cancellation reason is required")]
    ReasonRequired,

    #[error("Could not allocate an order number after {0} attempts")]
    NumberExhausted(u32),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

fn names(products: &[ProductRef]) -> String {
    products
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::Repo(RepoError::from(err))
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::Validation { field, message } => AppError::field(field, message),
            OrderError::EmptyCart => AppError::new(ErrorCode::CartEmpty),
            OrderError::ProductUnavailable(product) => {
                AppError::with_message(ErrorCode::ProductUnavailable, message)
                    .with_detail("product_id", product.id)
                    .with_detail("product_name", product.name)
            }
            OrderError::DeliveryNotAvailable(products) => {
                let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
                let names: Vec<String> = products.into_iter().map(|p| p.name).collect();
                AppError::with_message(ErrorCode::DeliveryNotAvailable, message)
                    .with_detail("product_ids", ids)
                    .with_detail("products", names)
            }
            OrderError::InsufficientStock {
                product,
                requested,
                available,
            } => AppError::with_message(ErrorCode::ProductOutOfStock, message)
                .with_detail("product_id", product.id)
                .with_detail("product_name", product.name)
                .with_detail("requested", requested)
                .with_detail("available", available),
            OrderError::NotFound(_) => AppError::with_message(ErrorCode::OrderNotFound, message),
            OrderError::NotOwner(_) => AppError::new(ErrorCode::NotResourceOwner),
            OrderError::NotPending(status) => AppError::with_message(ErrorCode::OrderNotPending, message)
                .with_detail("status", status.as_str()),
            OrderError::InvalidTransition { from, to } => {
                AppError::with_message(ErrorCode::OrderInvalidTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            OrderError::ReasonRequired => AppError::new(ErrorCode::CancellationReasonRequired)
                .with_field_error("cancellation_reason", "Cancellation reason is required"),
            OrderError::NumberExhausted(_) => {
                tracing::error!(error = %message, "Order number space exhausted");
                AppError::with_message(ErrorCode::OrderNumberExhausted, message)
            }
            OrderError::Repo(e) => e.into(),
        }
    }
}
