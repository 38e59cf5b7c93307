//! [`InstrumentManager`]: fans actions out to per-instrument [`Engine`]s and
//! merges their event logs into one chronological stream.

use std::collections::BTreeMap;

use crate::engine::{Engine, OrderAction};
use crate::errors::EngineError;
use crate::event::OrderEvent;

/// Owns one [`Engine`] per instrument, created lazily on first use.
///
/// Engines are kept in a [`BTreeMap`] rather than a [`std::collections::HashMap`]
/// so that cross-instrument merge order is deterministic for a given input:
/// when two events from different instruments share a timestamp, the one
/// from the lexicographically earlier instrument sorts first. Within an
/// instrument, order is always the submission order (see [`Self::all_events`]).
#[derive(Default)]
pub struct InstrumentManager {
    engines: BTreeMap<String, Engine>,
}

impl InstrumentManager {
    pub fn new() -> Self {
        InstrumentManager {
            engines: BTreeMap::new(),
        }
    }

    fn get_or_create(&mut self, instrument: &str) -> &mut Engine {
        self.engines
            .entry(instrument.to_string())
            .or_insert_with(|| Engine::new(instrument))
    }

    /// Routes `action` to the engine for its instrument.
    pub fn process_order(&mut self, action: OrderAction) -> Result<(), EngineError> {
        self.get_or_create(&action.instrument).process(&action)
    }

    pub fn engine(&self, instrument: &str) -> Option<&Engine> {
        self.engines.get(instrument)
    }

    /// Concatenates every engine's event log and returns it sorted stably
    /// by `timestamp` ascending. The sort is stable, so within a timestamp
    /// each engine's own append order (submission order) is preserved, and
    /// ties between engines fall back to [`BTreeMap`] iteration order.
    pub fn all_events(&self) -> Vec<OrderEvent> {
        let mut merged: Vec<OrderEvent> = self
            .engines
            .values()
            .flat_map(|engine| engine.events().iter().cloned())
            .collect();
        merged.sort_by_key(|event| event.timestamp);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, OrderType, Side};

    fn action(ts: u64, id: u64, instrument: &str, side: Side, price: f64) -> OrderAction {
        OrderAction {
            timestamp: ts,
            order_id: id,
            instrument: instrument.to_string(),
            side,
            order_type: OrderType::Limit,
            quantity: 10,
            price,
            action: Action::New,
        }
    }

    // S6 — cross-instrument merge.
    #[test]
    fn all_events_are_sorted_by_timestamp_across_instruments() {
        let mut manager = InstrumentManager::new();
        manager
            .process_order(action(3000, 1, "MSFT", Side::Buy, 300.0))
            .unwrap();
        manager
            .process_order(action(1000, 2, "AAPL", Side::Buy, 150.0))
            .unwrap();
        manager
            .process_order(action(2000, 3, "AAPL", Side::Sell, 151.0))
            .unwrap();

        let events = manager.all_events();
        let timestamps: Vec<u64> = events.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![1000, 2000, 3000]);
    }

    #[test]
    fn creates_engines_lazily_per_instrument() {
        let mut manager = InstrumentManager::new();
        assert!(manager.engine("AAPL").is_none());
        manager
            .process_order(action(1000, 1, "AAPL", Side::Buy, 150.0))
            .unwrap();
        assert!(manager.engine("AAPL").is_some());
    }
}
