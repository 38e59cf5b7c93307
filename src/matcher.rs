//! The matching algorithm: pure with respect to the outside world, but
//! mutates both the incoming order and the book it is matched against.

use crate::book_side::BookSide;
use crate::orderbook::OrderBook;
use crate::price_level::OrderRef;
use crate::trade::Trade;
use crate::types::{OrderId, OrderType, Price, Side};

/// Matches `incoming` against `book` and returns the trades produced, in
/// execution order.
///
/// LIMIT orders that remain active after matching are rested in the book.
/// MARKET orders never rest: any unfilled residual is canceled.
pub fn match_order(incoming: OrderRef, book: &mut OrderBook) -> Vec<Trade> {
    let (side, order_type) = {
        let o = incoming.borrow();
        (o.side, o.order_type)
    };
    let opposite_side = side.opposite();

    let (trades, filled_ids) = {
        let opposite = match opposite_side {
            Side::Buy => &mut book.bids,
            Side::Sell => &mut book.asks,
        };
        match_against_side(&incoming, side, order_type, opposite)
    };
    // `match_against_side` only had `&mut BookSide`, not the book's id
    // index, so orders it fully filled and popped off their price level
    // are still listed there until we erase them now.
    for id in filled_ids {
        book.forget_resting(id);
    }

    match order_type {
        OrderType::Limit => {
            if incoming.borrow().remaining > 0 {
                book.add_order(incoming);
            }
        }
        OrderType::Market => {
            if incoming.borrow().remaining > 0 {
                // An order that still has quantity to give cannot already
                // be EXECUTED, so cancel() cannot fail here.
                incoming.borrow_mut().cancel().expect("residual market order is not executed");
            }
        }
    }

    trades
}

fn crosses(order_type: OrderType, incoming_side: Side, incoming_price: Price, level_price: Price) -> bool {
    match order_type {
        OrderType::Market => true,
        OrderType::Limit => match incoming_side {
            Side::Buy => incoming_price >= level_price,
            Side::Sell => incoming_price <= level_price,
        },
    }
}

fn match_against_side(
    incoming: &OrderRef,
    incoming_side: Side,
    order_type: OrderType,
    opposite: &mut BookSide,
) -> (Vec<Trade>, Vec<OrderId>) {
    let mut trades = Vec::new();
    let mut filled_ids = Vec::new();
    let mut exhausted_prices = Vec::new();

    'outer: for (price_key, level) in opposite.levels_best_first() {
        let level_price = price_key.0;
        let incoming_price = incoming.borrow().price;
        if !crosses(order_type, incoming_side, incoming_price, level_price) {
            break;
        }

        loop {
            if incoming.borrow().remaining == 0 {
                break 'outer;
            }
            let Some(resting) = level.front().cloned() else {
                break;
            };

            let trade_qty = {
                let incoming_remaining = incoming.borrow().remaining;
                let resting_remaining = resting.borrow().remaining;
                incoming_remaining.min(resting_remaining)
            };
            if trade_qty == 0 {
                break;
            }

            let resting_id = resting.borrow().id;
            let incoming_id = incoming.borrow().id;
            let timestamp = incoming.borrow().timestamp;
            let instrument = incoming.borrow().instrument.clone();

            incoming
                .borrow_mut()
                .execute(trade_qty, level_price, resting_id)
                .expect("trade quantity never exceeds incoming remaining");
            resting
                .borrow_mut()
                .execute(trade_qty, level_price, incoming_id)
                .expect("trade quantity never exceeds resting remaining");
            level.debit(trade_qty);

            let (buy_id, sell_id) = match incoming_side {
                Side::Buy => (incoming_id, resting_id),
                Side::Sell => (resting_id, incoming_id),
            };
            trades.push(Trade {
                timestamp,
                buy_id,
                sell_id,
                instrument,
                quantity: trade_qty,
                price: level_price,
            });

            if resting.borrow().remaining == 0 {
                level.pop_front();
                filled_ids.push(resting_id);
            }
        }

        if level.is_empty() {
            exhausted_prices.push(level_price);
        }
        if incoming.borrow().remaining == 0 {
            break;
        }
    }

    for price in exhausted_prices {
        opposite.prune_if_empty(price);
    }

    (trades, filled_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orderbook::{OrderBook, new_order_ref};
    use crate::orders::Order;

    fn limit(id: u64, side: Side, qty: u64, price: f64) -> OrderRef {
        new_order_ref(Order::new(1, id, "AAPL", side, OrderType::Limit, qty, price).unwrap())
    }

    fn market(id: u64, side: Side, qty: u64) -> OrderRef {
        new_order_ref(Order::new(1, id, "AAPL", side, OrderType::Market, qty, 0.0).unwrap())
    }

    #[test]
    fn market_buy_walks_multiple_ask_levels() {
        let mut book = OrderBook::new();
        book.add_order(limit(1, Side::Sell, 5, 101.0));
        book.add_order(limit(2, Side::Sell, 3, 102.0));

        let trades = match_order(market(100, Side::Buy, 6), &mut book);

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].quantity, 5);
        assert_eq!(trades[0].price, 101.0);
        assert_eq!(trades[1].quantity, 1);
        assert_eq!(trades[1].price, 102.0);
        assert_eq!(book.find_order(2).unwrap().borrow().remaining, 2);
    }

    #[test]
    fn market_order_with_no_liquidity_cancels_with_no_trades() {
        let mut book = OrderBook::new();
        let incoming = market(1, Side::Buy, 10);
        let trades = match_order(incoming.clone(), &mut book);
        assert!(trades.is_empty());
        assert_eq!(incoming.borrow().status, crate::types::OrderStatus::Canceled);
        assert!(!book.is_resting(1));
    }

    #[test]
    fn market_sell_residual_cancels_after_partial_fill() {
        let mut book = OrderBook::new();
        book.add_order(limit(1, Side::Buy, 4, 100.0));
        let incoming = market(200, Side::Sell, 10);
        let trades = match_order(incoming.clone(), &mut book);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].quantity, 4);
        assert_eq!(incoming.borrow().remaining, 0);
        assert_eq!(incoming.borrow().status, crate::types::OrderStatus::Canceled);
        assert_eq!(incoming.borrow().executed, 6);
        assert!(book.bids.is_empty());
    }

    #[test]
    fn limit_order_rests_remainder_after_partial_match() {
        let mut book = OrderBook::new();
        book.add_order(limit(1, Side::Sell, 5, 100.0));
        let incoming = limit(2, Side::Buy, 10, 101.0);
        let trades = match_order(incoming, &mut book);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].quantity, 5);
        assert_eq!(book.bids.best_price(), Some(101.0));
        assert_eq!(book.find_order(2).unwrap().borrow().remaining, 5);
    }

    #[test]
    fn limit_order_with_no_match_rests_fully() {
        let mut book = OrderBook::new();
        let incoming = limit(10, Side::Buy, 8, 90.0);
        let trades = match_order(incoming, &mut book);
        assert!(trades.is_empty());
        assert_eq!(book.bids.best_price(), Some(90.0));
    }

    #[test]
    fn fifo_fairness_within_a_price_level() {
        let mut book = OrderBook::new();
        book.add_order(limit(1, Side::Sell, 4, 100.0));
        book.add_order(limit(2, Side::Sell, 6, 100.0));

        let trades = match_order(market(3, Side::Buy, 9), &mut book);

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].sell_id, 1);
        assert_eq!(trades[0].quantity, 4);
        assert_eq!(trades[1].sell_id, 2);
        assert_eq!(trades[1].quantity, 5);
        assert_eq!(book.find_order(2).unwrap().borrow().remaining, 1);
    }

    #[test]
    fn crossing_limit_order_executes_at_resting_price_not_its_own() {
        let mut book = OrderBook::new();
        book.add_order(limit(1, Side::Sell, 5, 105.0));
        let trades = match_order(limit(2, Side::Buy, 3, 110.0), &mut book);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, 105.0);
        assert!(!book.is_resting(2));
        assert_eq!(book.find_order(1).unwrap().borrow().remaining, 2);
    }

    #[test]
    fn fully_filled_resting_order_is_dropped_from_the_index() {
        let mut book = OrderBook::new();
        book.add_order(limit(1, Side::Sell, 5, 100.0));
        let trades = match_order(limit(2, Side::Buy, 5, 100.0), &mut book);
        assert_eq!(trades.len(), 1);
        assert!(!book.is_resting(1));
        assert!(book.find_order(1).is_none());
    }

    #[test]
    fn buy_ids_and_sell_ids_are_role_sorted_regardless_of_incoming_side() {
        let mut book = OrderBook::new();
        book.add_order(limit(1, Side::Buy, 5, 100.0));
        let trades = match_order(limit(2, Side::Sell, 5, 90.0), &mut book);
        assert_eq!(trades[0].buy_id, 1);
        assert_eq!(trades[0].sell_id, 2);
    }
}
