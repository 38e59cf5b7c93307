//! [`Engine`]: the per-instrument facade. Dispatches NEW/MODIFY/CANCEL,
//! invokes the matcher, and derives the order-event stream.

use std::collections::HashMap;

use crate::errors::EngineError;
use crate::event::OrderEvent;
use crate::matcher;
use crate::orderbook::{OrderBook, new_order_ref};
use crate::orders::Order;
use crate::price_level::OrderRef;
use crate::types::{Action, OrderId, OrderStatus, OrderType, Price, Quantity, Side, Timestamp};

/// One parsed action row, scoped to a single instrument.
#[derive(Debug, Clone)]
pub struct OrderAction {
    pub timestamp: Timestamp,
    pub order_id: OrderId,
    pub instrument: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Quantity,
    pub price: Price,
    pub action: Action,
}

/// A single instrument's order book, event log, and order history.
pub struct Engine {
    instrument: String,
    book: OrderBook,
    events: Vec<OrderEvent>,
    /// Every order ever seen for this instrument, active or terminal. Grows
    /// unboundedly for the process lifetime by design (see module docs on
    /// retention in the top-level spec); needed to resolve counterparties
    /// and to CANCEL orders that have already left the book.
    history: HashMap<OrderId, OrderRef>,
}

impl Engine {
    pub fn new(instrument: impl Into<String>) -> Self {
        Engine {
            instrument: instrument.into(),
            book: OrderBook::new(),
            events: Vec::new(),
            history: HashMap::new(),
        }
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn events(&self) -> &[OrderEvent] {
        &self.events
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Dispatches one action. On error the engine's state is left exactly
    /// as it was before the call — a failed validation has no observable
    /// side effect.
    pub fn process(&mut self, action: &OrderAction) -> Result<(), EngineError> {
        match action.action {
            Action::New => self.handle_new(action),
            Action::Modify => self.handle_modify(action),
            Action::Cancel => self.handle_cancel(action),
        }
    }

    fn handle_new(&mut self, a: &OrderAction) -> Result<(), EngineError> {
        let order = Order::new(
            a.timestamp,
            a.order_id,
            a.instrument.clone(),
            a.side,
            a.order_type,
            a.quantity,
            a.price,
        )?;
        let order_ref = new_order_ref(order);
        self.history.insert(a.order_id, order_ref.clone());

        let trades = matcher::match_order(order_ref.clone(), &mut self.book);

        if trades.is_empty() {
            let incoming = order_ref.borrow();
            if incoming.order_type == OrderType::Limit && incoming.is_active() {
                self.events.push(OrderEvent::status_only(
                    a.timestamp,
                    Action::New,
                    &incoming,
                    incoming.status,
                    incoming.remaining,
                    incoming.price,
                ));
            }
        } else {
            // The incoming order (a.order_id) is the taker in every trade
            // this match produced; the other leg is the resting maker.
            // Events are emitted maker-then-taker.
            for trade in &trades {
                let taker_id = a.order_id;
                let maker_id = if trade.buy_id == taker_id { trade.sell_id } else { trade.buy_id };
                let maker_order = self.history.get(&maker_id).expect("counterparty in history");
                let taker_order = self.history.get(&taker_id).expect("incoming order in history");
                self.events.push(OrderEvent::fill(
                    trade.timestamp,
                    Action::New,
                    &maker_order.borrow(),
                    trade.quantity,
                    trade.price,
                    taker_id,
                ));
                self.events.push(OrderEvent::fill(
                    trade.timestamp,
                    Action::New,
                    &taker_order.borrow(),
                    trade.quantity,
                    trade.price,
                    maker_id,
                ));
            }
        }

        let incoming = order_ref.borrow();
        if incoming.order_type == OrderType::Market && incoming.status == OrderStatus::Canceled {
            self.events.push(OrderEvent::market_residual_canceled(a.timestamp, &incoming));
        }

        Ok(())
    }

    fn handle_modify(&mut self, a: &OrderAction) -> Result<(), EngineError> {
        if !self.book.is_resting(a.order_id) {
            return Err(EngineError::not_found(a.order_id));
        }
        let order_ref = self
            .book
            .find_order(a.order_id)
            .expect("just confirmed resting");
        if order_ref.borrow().order_type == OrderType::Market {
            return Err(EngineError::invalid(a.order_id, "cannot modify a market order"));
        }

        // MODIFY forfeits time priority: pull it out before reapplying.
        self.book.remove_order(a.order_id)?;
        {
            let mut order = order_ref.borrow_mut();
            order.update_quantity(a.quantity)?;
            order.update_price(a.price)?;
        }

        let trades = matcher::match_order(order_ref.clone(), &mut self.book);

        if trades.is_empty() {
            let order = order_ref.borrow();
            if order.is_active() {
                self.events.push(OrderEvent::status_only(
                    a.timestamp,
                    Action::Modify,
                    &order,
                    order.status,
                    order.remaining,
                    order.price,
                ));
            }
        } else {
            // a.order_id (the modified order) is the taker in every trade
            // this re-match produced, same as in handle_new; it alone
            // carries Action::Modify, the resting maker always Action::New.
            for trade in &trades {
                let taker_id = a.order_id;
                let maker_id = if trade.buy_id == taker_id { trade.sell_id } else { trade.buy_id };
                let maker_order = self.history.get(&maker_id).expect("counterparty in history");
                let taker_order = self.history.get(&taker_id).expect("incoming order in history");
                self.events.push(OrderEvent::fill(
                    trade.timestamp,
                    Action::New,
                    &maker_order.borrow(),
                    trade.quantity,
                    trade.price,
                    taker_id,
                ));
                self.events.push(OrderEvent::fill(
                    trade.timestamp,
                    Action::Modify,
                    &taker_order.borrow(),
                    trade.quantity,
                    trade.price,
                    maker_id,
                ));
            }
        }

        Ok(())
    }

    fn handle_cancel(&mut self, a: &OrderAction) -> Result<(), EngineError> {
        let order_ref = self
            .book
            .find_order(a.order_id)
            .or_else(|| self.history.get(&a.order_id).cloned())
            .ok_or(EngineError::not_found(a.order_id))?;

        let was_active = order_ref.borrow().is_active();
        if was_active {
            order_ref.borrow_mut().cancel()?;
            if self.book.is_resting(a.order_id) {
                self.book.remove_order(a.order_id)?;
            }
        }

        self.events.push(OrderEvent::status_only(
            a.timestamp,
            Action::Cancel,
            &order_ref.borrow(),
            OrderStatus::Canceled,
            0,
            0.0,
        ));
        Ok(())
    }
}
