use crate::types::{OrderId, Price, Quantity, Timestamp};

/// A matched transaction produced by the [`crate::matcher`].
///
/// - `price` is always the resting (maker) level's price — price improvement
///   accrues to the incoming (taker) side.
/// - `buy_id` / `sell_id` are role-sorted and independent of which side was
///   incoming.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub timestamp: Timestamp,
    pub buy_id: OrderId,
    pub sell_id: OrderId,
    pub instrument: String,
    pub quantity: Quantity,
    pub price: Price,
}
