//! [`BookSide`]: one side (bids or asks) of an [`crate::orderbook::OrderBook`].
//!
//! Both sides share the same underlying [`BTreeMap`] keyed by price; they
//! differ only in which direction is "best". Bids want the highest price
//! first, asks want the lowest, so rather than keep two map types we keep
//! one ascending map per side and walk it forwards or backwards depending
//! on which side it is.

use std::collections::BTreeMap;
use std::collections::btree_map;

use ordered_float::OrderedFloat;

use crate::errors::EngineError;
use crate::price_level::{OrderRef, PriceLevel};
use crate::types::{OrderId, OrderType, Price, Side};

type PriceKey = OrderedFloat<f64>;

/// Unifies forward (ascending) and reverse (descending) iteration over the
/// level map so the matcher can walk "best first" without caring which side
/// it is on.
pub enum BestFirstIter<'a> {
    Ascending(btree_map::IterMut<'a, PriceKey, PriceLevel>),
    Descending(std::iter::Rev<btree_map::IterMut<'a, PriceKey, PriceLevel>>),
}

impl<'a> Iterator for BestFirstIter<'a> {
    type Item = (&'a PriceKey, &'a mut PriceLevel);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            BestFirstIter::Ascending(it) => it.next(),
            BestFirstIter::Descending(it) => it.next(),
        }
    }
}

pub struct BookSide {
    side: Side,
    levels: BTreeMap<PriceKey, PriceLevel>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        BookSide {
            side,
            levels: BTreeMap::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Rests `order` in the book. A no-op for MARKET orders, which never
    /// rest.
    pub fn add_order(&mut self, order: OrderRef) {
        let (price, order_type) = {
            let o = order.borrow();
            (o.price, o.order_type)
        };
        if order_type == OrderType::Market {
            return;
        }
        self.levels
            .entry(OrderedFloat(price))
            .or_insert_with(|| PriceLevel::new(price))
            .add_order(order);
    }

    /// Removes the order with `id` resting at `price`, deleting the level
    /// if it becomes empty.
    pub fn remove_order(&mut self, id: OrderId, price: Price) -> Result<OrderRef, EngineError> {
        let key = OrderedFloat(price);
        let level = self
            .levels
            .get_mut(&key)
            .ok_or(EngineError::OrderNotFound { id })?;
        let order = level.remove_order(id)?;
        if level.is_empty() {
            self.levels.remove(&key);
        }
        Ok(order)
    }

    /// Deletes `price` if its level has become empty. Used by the matcher
    /// after staged fills are removed mid-walk.
    pub fn prune_if_empty(&mut self, price: Price) {
        let key = OrderedFloat(price);
        if self.levels.get(&key).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&key);
        }
    }

    pub fn best_price(&self) -> Option<Price> {
        self.best_level().map(PriceLevel::price)
    }

    pub fn best_level(&self) -> Option<&PriceLevel> {
        match self.side {
            Side::Buy => self.levels.values().next_back(),
            Side::Sell => self.levels.values().next(),
        }
    }

    /// Iterates levels best-first: descending for bids, ascending for asks.
    pub fn levels_best_first(&mut self) -> BestFirstIter<'_> {
        match self.side {
            Side::Buy => BestFirstIter::Descending(self.levels.iter_mut().rev()),
            Side::Sell => BestFirstIter::Ascending(self.levels.iter_mut()),
        }
    }
}
