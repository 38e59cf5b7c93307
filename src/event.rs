//! [`OrderEvent`]: an immutable record of one order lifecycle transition.

use crate::orders::Order;
use crate::types::{Action, OrderId, OrderStatus, OrderType, Price, Quantity, Side, Timestamp};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderEvent {
    pub timestamp: Timestamp,
    pub order_id: OrderId,
    pub instrument: String,
    pub side: Side,
    pub order_type: OrderType,
    pub action: Action,
    pub status: OrderStatus,
    pub display_qty: Quantity,
    pub price: Price,
    pub executed_qty: Quantity,
    pub execution_price: Price,
    pub counterparty_id: OrderId,
}

impl OrderEvent {
    /// A status-only event (no trade attached): a resting NEW/MODIFY
    /// acknowledgement, or a terminal CANCEL. `status` is passed explicitly
    /// rather than read off `order` because CANCEL always reports CANCELED
    /// even when the order's true underlying status was already EXECUTED
    /// (idempotent cancel of a filled order). `timestamp` is the triggering
    /// action's timestamp, not `order.timestamp` — those diverge once an
    /// order has been MODIFYed or CANCELed at a later action timestamp than
    /// it was created.
    pub fn status_only(
        timestamp: Timestamp,
        action: Action,
        order: &Order,
        status: OrderStatus,
        display_qty: Quantity,
        price: Price,
    ) -> Self {
        OrderEvent {
            timestamp,
            order_id: order.id,
            instrument: order.instrument.clone(),
            side: order.side,
            order_type: order.order_type,
            action,
            status,
            display_qty,
            price,
            executed_qty: 0,
            execution_price: 0.0,
            counterparty_id: 0,
        }
    }

    /// One side's view of a fill: `order` is the side this event describes,
    /// already updated by the matcher; `executed_qty`/`execution_price` come
    /// from the trade, `counterparty_id` from the other side. `timestamp`
    /// is the trade's own timestamp (the action that caused it), so both
    /// halves of one trade always carry the same timestamp regardless of
    /// when either order was originally created.
    pub fn fill(
        timestamp: Timestamp,
        action: Action,
        order: &Order,
        executed_qty: Quantity,
        execution_price: Price,
        counterparty_id: OrderId,
    ) -> Self {
        let status = if order.remaining > 0 {
            OrderStatus::PartiallyExecuted
        } else {
            OrderStatus::Executed
        };
        OrderEvent {
            timestamp,
            order_id: order.id,
            instrument: order.instrument.clone(),
            side: order.side,
            order_type: order.order_type,
            action,
            status,
            display_qty: order.remaining,
            price: order.price,
            executed_qty,
            execution_price,
            counterparty_id,
        }
    }

    /// The terminal event for a MARKET order with an unfilled residual.
    pub fn market_residual_canceled(timestamp: Timestamp, order: &Order) -> Self {
        OrderEvent {
            timestamp,
            order_id: order.id,
            instrument: order.instrument.clone(),
            side: order.side,
            order_type: order.order_type,
            action: Action::New,
            status: OrderStatus::Canceled,
            display_qty: 0,
            price: 0.0,
            executed_qty: 0,
            execution_price: 0.0,
            counterparty_id: 0,
        }
    }
}
