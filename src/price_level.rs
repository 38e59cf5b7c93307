//! [`PriceLevel`]: the FIFO queue of resting orders at one price.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::errors::EngineError;
use crate::orders::Order;
use crate::types::{OrderId, Price, Quantity};

/// Shared handle to a resting order. The same handle is held by the price
/// level it rests in, the book's id index, and the engine's order history —
/// there is exactly one logical [`Order`] behind it.
pub type OrderRef = Rc<RefCell<Order>>;

/// All orders resting at a single price, in arrival (time-priority) order.
pub struct PriceLevel {
    price: Price,
    orders: VecDeque<OrderRef>,
    total_quantity: Quantity,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        PriceLevel {
            price,
            orders: VecDeque::new(),
            total_quantity: 0,
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Appends `order` to the tail of the queue, preserving time priority.
    pub fn add_order(&mut self, order: OrderRef) {
        self.total_quantity += order.borrow().remaining;
        self.orders.push_back(order);
    }

    /// Removes the order with `id`, wherever it sits in the queue.
    ///
    /// Levels are expected to stay short, so a linear scan is fine; an
    /// auxiliary id-to-node index could make this O(1) if profiling ever
    /// demands it.
    pub fn remove_order(&mut self, id: OrderId) -> Result<OrderRef, EngineError> {
        let pos = self
            .orders
            .iter()
            .position(|o| o.borrow().id == id)
            .ok_or(EngineError::OrderNotFound { id })?;
        let order = self.orders.remove(pos).unwrap();
        self.total_quantity -= order.borrow().remaining;
        Ok(order)
    }

    pub fn front(&self) -> Option<&OrderRef> {
        self.orders.front()
    }

    /// Pops the head of the queue once it has been fully filled. The caller
    /// is responsible for having already [`PriceLevel::debit`]-ed its
    /// quantity; this does not touch `total_quantity` itself.
    pub fn pop_front(&mut self) -> Option<OrderRef> {
        self.orders.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrderRef> {
        self.orders.iter()
    }

    /// Subtracts `qty` from the level's aggregate resting quantity, without
    /// touching the queue. Used by the matcher while walking a level: the
    /// order itself is updated in place, and the level's aggregate is kept
    /// in sync as each fill happens rather than recomputed afterward.
    pub fn debit(&mut self, qty: Quantity) {
        self.total_quantity -= qty;
    }
}
