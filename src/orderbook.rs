//! [`OrderBook`]: one instrument's bid side, ask side, and resting-order
//! index.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::book_side::BookSide;
use crate::errors::EngineError;
use crate::orders::Order;
use crate::price_level::OrderRef;
use crate::types::{OrderId, Price, Side};

/// Owns both sides of the book plus the id index covering currently
/// resting orders. MARKET orders never appear in either side or the index.
pub struct OrderBook {
    pub bids: BookSide,
    pub asks: BookSide,
    index: HashMap<OrderId, (OrderRef, Price)>,
}

impl OrderBook {
    pub fn new() -> Self {
        OrderBook {
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            index: HashMap::new(),
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Rests `order` and records it in the id index. A no-op for MARKET
    /// orders, which the underlying [`BookSide`] refuses to hold.
    pub fn add_order(&mut self, order: OrderRef) {
        let (id, side, price) = {
            let o = order.borrow();
            (o.id, o.side, o.price)
        };
        self.side_mut(side).add_order(order.clone());
        self.index.insert(id, (order, price));
    }

    /// Removes the resting order `id`, wherever it sits.
    pub fn remove_order(&mut self, id: OrderId) -> Result<OrderRef, EngineError> {
        let (order, price) = self
            .index
            .remove(&id)
            .ok_or(EngineError::OrderNotFound { id })?;
        let side = order.borrow().side;
        self.side_mut(side).remove_order(id, price)
    }

    /// Looks up a resting order without removing it.
    pub fn find_order(&self, id: OrderId) -> Option<OrderRef> {
        self.index.get(&id).map(|(order, _)| order.clone())
    }

    pub fn is_resting(&self, id: OrderId) -> bool {
        self.index.contains_key(&id)
    }

    /// Drops `id` from the resting-order index only, without touching
    /// either [`BookSide`]. For the matcher, which removes a fully-filled
    /// resting order from its [`crate::price_level::PriceLevel`] directly
    /// (it only ever borrows one side, not the whole book) and so must
    /// report the id back here separately to keep the index in sync.
    pub fn forget_resting(&mut self, id: OrderId) {
        self.index.remove(&id);
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps a freshly-validated [`Order`] in the shared handle the book,
/// history, and matcher all hold.
pub fn new_order_ref(order: Order) -> OrderRef {
    Rc::new(RefCell::new(order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderType;

    fn limit_ref(id: OrderId, side: Side, qty: u64, price: Price) -> OrderRef {
        new_order_ref(Order::new(1, id, "AAPL", side, OrderType::Limit, qty, price).unwrap())
    }

    #[test]
    fn add_order_populates_index_and_side() {
        let mut book = OrderBook::new();
        book.add_order(limit_ref(1, Side::Buy, 10, 100.0));
        assert!(book.is_resting(1));
        assert_eq!(book.bids.best_price(), Some(100.0));
    }

    #[test]
    fn remove_order_clears_index_and_side() {
        let mut book = OrderBook::new();
        book.add_order(limit_ref(1, Side::Sell, 10, 100.0));
        book.remove_order(1).unwrap();
        assert!(!book.is_resting(1));
        assert!(book.asks.is_empty());
    }

    #[test]
    fn remove_order_missing_errors() {
        let mut book = OrderBook::new();
        assert!(matches!(
            book.remove_order(1),
            Err(EngineError::OrderNotFound { id: 1 })
        ));
    }

    #[test]
    fn find_order_returns_shared_handle() {
        let mut book = OrderBook::new();
        book.add_order(limit_ref(1, Side::Buy, 10, 100.0));
        let found = book.find_order(1).unwrap();
        found.borrow_mut().execute(5, 100.0, 2).unwrap();
        assert_eq!(book.find_order(1).unwrap().borrow().remaining, 5);
    }
}
