//! # Order State Machine
//!
//! An [`Order`] tracks one client demand request from placement to
//! fulfillment:
//!
//! - *producing*: `produced < amount`
//! - *production-complete*: `produced == amount`, `collected < amount`
//! - *fulfilled*: `collected == amount` (terminal)
//!
//! `0 <= collected <= produced <= amount` holds at every observation
//! point. The production line raises `produced`; the service raises
//! `collected`; storage top-ups raise both together since those unicorns
//! bypass the ready-queue.
//!
//! Mutating operations take the order's exclusive lock, status queries the
//! shared side, so a production tick and a client poll can never race on
//! the counters.

use crate::model::{OrderId, Unicorn};
use crate::storage::UnicornStorage;
use parking_lot::RwLock;
use std::collections::VecDeque;
use thiserror::Error;

/// Errors raised by order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The order no longer accepts the operation because it is already
    /// complete.
    #[error("order completed")]
    Completed,
}

#[derive(Debug)]
struct OrderState {
    produced: usize,
    collected: usize,
    /// Unicorns produced for this order but not yet collected.
    ready: VecDeque<Unicorn>,
}

/// One client's request for a fixed quantity of unicorns.
#[derive(Debug)]
pub struct Order {
    id: OrderId,
    amount: usize,
    state: RwLock<OrderState>,
}

impl Order {
    /// Creates a new production order for `amount` unicorns.
    pub fn new(id: OrderId, amount: usize) -> Self {
        Self {
            id,
            amount,
            state: RwLock::new(OrderState {
                produced: 0,
                collected: 0,
                ready: VecDeque::new(),
            }),
        }
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Target quantity, fixed at creation.
    pub fn amount(&self) -> usize {
        self.amount
    }

    /// Hands a freshly produced unicorn to the order.
    ///
    /// Once production for the order is complete the unicorn is rejected
    /// and handed back, so the caller can reroute it to storage.
    pub fn add(&self, unicorn: Unicorn) -> Result<(), Unicorn> {
        let mut state = self.state.write();
        if state.produced >= self.amount {
            return Err(unicorn);
        }
        state.ready.push_back(unicorn);
        state.produced += 1;
        Ok(())
    }

    /// Drains the entire ready-queue, counting the drained unicorns as
    /// collected. Returns an empty vector when none are ready yet.
    pub fn collect(&self) -> Vec<Unicorn> {
        let mut state = self.state.write();
        let unicorns: Vec<Unicorn> = state.ready.drain(..).collect();
        state.collected += unicorns.len();
        unicorns
    }

    /// Covers the remaining production shortfall from the overflow store.
    ///
    /// Storage-sourced unicorns count as produced and collected at once
    /// since they never pass through the ready-queue. The withdrawal is
    /// clamped to `amount - produced`, so a production tick landing
    /// between a drain and this top-up can never push `produced` past the
    /// target.
    pub fn collect_from_storage(
        &self,
        storage: &dyn UnicornStorage,
    ) -> Result<Vec<Unicorn>, OrderError> {
        let mut state = self.state.write();
        if state.collected >= self.amount {
            return Err(OrderError::Completed);
        }

        let shortfall = self.amount - state.produced;
        if shortfall == 0 {
            return Ok(Vec::new());
        }

        let unicorns = storage.collect(shortfall);
        state.produced += unicorns.len();
        state.collected += unicorns.len();
        Ok(unicorns)
    }

    /// Whether production for this order has been completed.
    pub fn completed(&self) -> bool {
        self.state.read().produced >= self.amount
    }

    /// Whether every ordered unicorn has been collected. Terminal.
    pub fn is_fulfilled(&self) -> bool {
        self.state.read().collected >= self.amount
    }

    /// Number of unicorns the client is still waiting for.
    pub fn pending(&self) -> usize {
        self.amount - self.state.read().collected
    }

    /// Unicorns manufactured for this order so far.
    pub fn produced(&self) -> usize {
        self.state.read().produced
    }

    /// Unicorns handed to the client so far.
    pub fn collected(&self) -> usize {
        self.state.read().collected
    }
}
