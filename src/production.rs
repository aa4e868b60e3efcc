//! # Production Line
//!
//! Ticks at a fixed rate, manufactures exactly one unicorn per tick and
//! delivers it to demand: the currently active order receives production
//! until it is production-complete, then the line advances to the oldest
//! backlog entry. Production never stalls or speeds up based on backlog
//! depth; surplus goes to the overflow store.

use crate::factory::UnicornFactory;
use crate::model::Unicorn;
use crate::order::Order;
use crate::storage::UnicornStorage;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Errors raised while placing orders on the line.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductionError {
    /// The order cannot receive production, e.g. it is already
    /// production-complete at placement.
    #[error("invalid production order")]
    InvalidOrder,
}

#[derive(Debug)]
struct LineState {
    /// Order actively receiving production, if any.
    current: Option<Arc<Order>>,
    /// Backlog of orders awaiting activation, oldest arrival first.
    backlog: VecDeque<Arc<Order>>,
}

/// The unicorn production line.
pub struct ProductionLine {
    rate: Duration,
    factory: Arc<dyn UnicornFactory>,
    storage: Option<Arc<dyn UnicornStorage>>,
    state: Mutex<LineState>,
}

impl ProductionLine {
    /// Sets up a new production line manufacturing one unicorn per `rate`.
    pub fn new(rate: Duration, factory: Arc<dyn UnicornFactory>) -> Self {
        Self {
            rate,
            factory,
            storage: None,
            state: Mutex::new(LineState {
                current: None,
                backlog: VecDeque::new(),
            }),
        }
    }

    /// Configures a storage to save excess unicorn production.
    pub fn with_storage(mut self, storage: Arc<dyn UnicornStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// The unicorn production rate for this line.
    pub fn rate(&self) -> Duration {
        self.rate
    }

    /// Adds a unicorn order to the production line.
    ///
    /// If no order is currently active the new order starts receiving
    /// production immediately; otherwise it joins the backlog.
    pub fn place_order(&self, order: Arc<Order>) -> Result<(), ProductionError> {
        if order.completed() {
            return Err(ProductionError::InvalidOrder);
        }

        let mut state = self.state.lock();
        if state.current.is_none() {
            debug!(order_id = %order.id(), amount = order.amount(), "order activated");
            state.current = Some(order);
        } else {
            debug!(order_id = %order.id(), amount = order.amount(), backlog = state.backlog.len() + 1, "order queued");
            state.backlog.push_back(order);
        }
        Ok(())
    }

    /// Runs the production loop until the shutdown signal fires.
    ///
    /// Each tick is atomic: the signal is only observed between ticks, so
    /// the loop exits within one tick interval with no partial work.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let start = tokio::time::Instant::now() + self.rate;
        let mut ticks = tokio::time::interval_at(start, self.rate);

        info!(rate_ms = self.rate.as_millis() as u64, "production line running");

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    let unicorn = self.factory.new_unicorn();
                    self.fulfill(unicorn);
                }
                _ = shutdown.recv() => {
                    info!("production line stopped");
                    break;
                }
            }
        }
    }

    /// Delivers one manufactured unicorn to the correct order.
    fn fulfill(&self, unicorn: Unicorn) {
        let mut state = self.state.lock();

        // Advance past a finished (or absent) current order, oldest
        // arrival first.
        if state.current.as_ref().map_or(true, |o| o.completed()) {
            state.current = state.backlog.pop_front();
        }

        match state.current.as_ref() {
            Some(order) => match order.add(unicorn) {
                Ok(()) => debug!(order_id = %order.id(), produced = order.produced(), "unicorn produced for order"),
                Err(rejected) => {
                    // An inconsistent order must never stall production;
                    // reroute the unicorn instead of propagating.
                    warn!(order_id = %order.id(), "completed order rejected unicorn, rerouting");
                    self.overflow(rejected);
                }
            },
            None => self.overflow(unicorn),
        }
    }

    fn overflow(&self, unicorn: Unicorn) {
        match &self.storage {
            Some(storage) => storage.store(unicorn),
            // Without a store the unicorn is lost. Kept from the original
            // design; the orchestrator always configures a store.
            None => warn!(unicorn = %unicorn.name, "no storage configured, unicorn lost"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderId;
    use crate::storage::LifoStorage;

    struct StaticFactory;

    impl UnicornFactory for StaticFactory {
        fn new_unicorn(&self) -> Unicorn {
            Unicorn {
                name: "test-unicorn".to_string(),
                capabilities: vec!["flying".to_string()],
            }
        }
    }

    fn line(rate_ms: u64) -> ProductionLine {
        ProductionLine::new(Duration::from_millis(rate_ms), Arc::new(StaticFactory))
    }

    fn order(id: &str, amount: usize) -> Arc<Order> {
        Arc::new(Order::new(OrderId::from(id), amount))
    }

    fn tick(line: &ProductionLine) {
        line.fulfill(StaticFactory.new_unicorn());
    }

    #[test]
    fn rejects_completed_order_at_placement() {
        let line = line(10);
        let done = order("done", 1);
        done.add(StaticFactory.new_unicorn()).unwrap();

        assert_eq!(
            line.place_order(done),
            Err(ProductionError::InvalidOrder)
        );
    }

    #[test]
    fn production_is_allocated_fifo() {
        let line = line(10);
        let first = order("first", 3);
        let second = order("second", 2);

        line.place_order(Arc::clone(&first)).unwrap();
        line.place_order(Arc::clone(&second)).unwrap();

        for _ in 0..3 {
            tick(&line);
        }
        assert!(first.completed());
        assert_eq!(second.produced(), 0, "second order must wait for the first");

        for _ in 0..2 {
            tick(&line);
        }
        assert!(second.completed());
    }

    #[test]
    fn surplus_goes_to_storage() {
        let store = Arc::new(LifoStorage::new());
        let line = line(10).with_storage(Arc::clone(&store) as Arc<dyn UnicornStorage>);

        let only = order("only", 1);
        line.place_order(Arc::clone(&only)).unwrap();

        tick(&line);
        tick(&line);
        tick(&line);

        assert!(only.completed());
        assert_eq!(store.in_storage(), 2);
    }

    #[test]
    fn idle_line_without_storage_drops_production() {
        let line = line(10);
        tick(&line);
        // Nothing to assert beyond not panicking; the unicorn is lost.
    }

    #[tokio::test]
    async fn run_produces_at_rate_and_stops_on_shutdown() {
        let line = Arc::new(line(5));
        let target = order("timed", 3);
        line.place_order(Arc::clone(&target)).unwrap();

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(Arc::clone(&line).run(shutdown_rx));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(target.completed());

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("production loop should observe shutdown promptly")
            .unwrap();
    }
}
