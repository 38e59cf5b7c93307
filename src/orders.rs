//! The [`Order`] type: per-order lifecycle state and the mutations the
//! matcher and engine are allowed to perform on it.

use crate::errors::EngineError;
use crate::types::{OrderId, OrderStatus, OrderType, Price, Quantity, Side, Timestamp};

/// A single order and its lifecycle state.
///
/// Invariant held at every observable point: `quantity == remaining + executed`.
#[derive(Debug, Clone)]
pub struct Order {
    pub timestamp: Timestamp,
    pub id: OrderId,
    pub instrument: String,
    pub side: Side,
    pub order_type: OrderType,
    /// Original requested quantity (`Q`).
    pub quantity: Quantity,
    /// Quantity still unfilled (`R`).
    pub remaining: Quantity,
    /// Quantity filled so far (`E`).
    pub executed: Quantity,
    /// Limit price; always 0 for MARKET orders.
    pub price: Price,
    pub last_execution_price: Price,
    pub last_counterparty: OrderId,
    pub status: OrderStatus,
}

impl Order {
    /// Constructs a new order in `PENDING` state with nothing filled.
    ///
    /// MARKET orders discard the supplied price and store 0. LIMIT orders
    /// require a strictly positive price.
    pub fn new(
        timestamp: Timestamp,
        id: OrderId,
        instrument: impl Into<String>,
        side: Side,
        order_type: OrderType,
        quantity: Quantity,
        price: Price,
    ) -> Result<Self, EngineError> {
        if id == 0 {
            return Err(EngineError::invalid(id, "order id must be non-zero"));
        }
        let instrument = instrument.into();
        if instrument.is_empty() {
            return Err(EngineError::invalid(id, "instrument must not be empty"));
        }
        if quantity == 0 {
            return Err(EngineError::invalid(id, "quantity must be > 0"));
        }
        let stored_price = match order_type {
            OrderType::Market => 0.0,
            OrderType::Limit => {
                if price <= 0.0 {
                    return Err(EngineError::invalid(
                        id,
                        "limit order requires a positive price",
                    ));
                }
                price
            }
        };

        Ok(Order {
            timestamp,
            id,
            instrument,
            side,
            order_type,
            quantity,
            remaining: quantity,
            executed: 0,
            price: stored_price,
            last_execution_price: 0.0,
            last_counterparty: 0,
            status: OrderStatus::Pending,
        })
    }

    /// An order is active while it can still absorb fills.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Pending | OrderStatus::PartiallyExecuted
        )
    }

    /// Replaces the order's quantity, as part of a MODIFY.
    ///
    /// If the new quantity is at or below what has already executed, the
    /// order has nothing left to give: remaining clamps to 0 and the order
    /// becomes EXECUTED rather than going negative.
    pub fn update_quantity(&mut self, new_quantity: Quantity) -> Result<(), EngineError> {
        if new_quantity == 0 {
            return Err(EngineError::invalid(self.id, "quantity must be > 0"));
        }
        self.quantity = new_quantity;
        if new_quantity <= self.executed {
            self.remaining = 0;
            self.status = OrderStatus::Executed;
        } else {
            self.remaining = new_quantity - self.executed;
        }
        Ok(())
    }

    /// Replaces the order's limit price, as part of a MODIFY. A no-op for
    /// MARKET orders.
    pub fn update_price(&mut self, new_price: Price) -> Result<(), EngineError> {
        if self.order_type == OrderType::Market {
            return Ok(());
        }
        if new_price <= 0.0 {
            return Err(EngineError::invalid(
                self.id,
                "limit order requires a positive price",
            ));
        }
        self.price = new_price;
        Ok(())
    }

    /// Records a fill of `qty` at `price` against `counterparty`.
    pub fn execute(
        &mut self,
        qty: Quantity,
        price: Price,
        counterparty: OrderId,
    ) -> Result<(), EngineError> {
        if qty > self.remaining {
            return Err(EngineError::invalid(
                self.id,
                "execution quantity exceeds remaining quantity",
            ));
        }
        self.executed += qty;
        self.remaining -= qty;
        self.last_execution_price = price;
        self.last_counterparty = counterparty;
        self.status = if self.remaining == 0 {
            OrderStatus::Executed
        } else {
            OrderStatus::PartiallyExecuted
        };
        Ok(())
    }

    /// Cancels the order. Fails if it is already fully executed.
    pub fn cancel(&mut self) -> Result<(), EngineError> {
        if self.status == OrderStatus::Executed {
            return Err(EngineError::invalid(self.id, "cannot cancel a filled order"));
        }
        self.status = OrderStatus::Canceled;
        Ok(())
    }
}
