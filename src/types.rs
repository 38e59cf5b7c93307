//! Scalar and enumerated types shared across the engine.

use std::fmt;

/// Non-zero order identifier, unique within a single instrument's engine.
pub type OrderId = u64;

/// Monotonic nanosecond-ish timestamp supplied by the caller. Not validated.
pub type Timestamp = u64;

/// Non-negative order size.
pub type Quantity = u64;

/// IEEE-754 price. Compared by strict equality; callers own tick alignment.
pub type Price = f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    Limit,
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    New,
    Modify,
    Cancel,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::New => "NEW",
            Action::Modify => "MODIFY",
            Action::Cancel => "CANCEL",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    PartiallyExecuted,
    Executed,
    Canceled,
    Rejected,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::PartiallyExecuted => "PARTIALLY_EXECUTED",
            OrderStatus::Executed => "EXECUTED",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::Rejected => "REJECTED",
        })
    }
}
