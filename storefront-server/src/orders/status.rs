//! Order status transition table (admin path)
//!
//! ```text
//! pending → confirmed → start_preparing → mark_ready → out_for_delivery → delivered | processed
//! ```
//!
//! - forward moves may skip steps; `out_for_delivery` needs a delivery order
//! - `delivered` / `processed` are final
//! - any non-terminal state may be cancelled, which releases stock
//! - `cancelled → pending` reopens the order and reserves stock again

use shared::models::{DeliveryMethod, OrderStatus};

use super::OrderError;

/// Stock side effect of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    None,
    /// Put every line back on the shelf
    Release,
    /// Take every line off the shelf again
    Reserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same status; nothing to write
    Unchanged,
    Change(StockEffect),
}

pub fn check_transition(
    from: OrderStatus,
    to: OrderStatus,
    method: DeliveryMethod,
) -> Result<Transition, OrderError> {
    let invalid = || OrderError::InvalidTransition { from, to };

    if from == to {
        return Ok(Transition::Unchanged);
    }
    if from.is_terminal() {
        return Err(invalid());
    }
    if to == OrderStatus::OutForDelivery && method != DeliveryMethod::Delivery {
        return Err(invalid());
    }

    match (from, to) {
        (_, OrderStatus::Cancelled) => Ok(Transition::Change(StockEffect::Release)),
        (OrderStatus::Cancelled, OrderStatus::Pending) => Ok(Transition::Change(StockEffect::Reserve)),
        (OrderStatus::Cancelled, _) => Err(invalid()),
        _ => match (from.stage(), to.stage()) {
            (Some(current), Some(next)) if next > current => Ok(Transition::Change(StockEffect::None)),
            _ => Err(invalid()),
        },
    }
}
