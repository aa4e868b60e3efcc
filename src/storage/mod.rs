//! # Overflow Storage
//!
//! When production outpaces demand, surplus unicorns are parked in an
//! overflow store and recycled into later orders. This module defines the
//! [`UnicornStorage`] contract, the LIFO implementation ([`LifoStorage`])
//! and a logging decorator ([`LoggingStorage`]).

mod lifo;
mod logger;

pub use lifo::LifoStorage;
pub use logger::LoggingStorage;

use crate::model::Unicorn;

/// A buffer for produced-but-unallocated unicorns.
///
/// Implementations serialize their own access; none of the operations
/// block on anything but the store's internal lock and none of them fail.
pub trait UnicornStorage: Send + Sync {
    /// Places a unicorn in storage. Unconditional, O(1).
    fn store(&self, unicorn: Unicorn);

    /// Returns the number of unicorns currently in storage.
    fn in_storage(&self) -> usize;

    /// Best-effort withdrawal of up to `n` unicorns.
    ///
    /// If fewer than `n` are present, returns all of them and the store
    /// becomes empty. `collect(0)` returns nothing.
    fn collect(&self, n: usize) -> Vec<Unicorn>;
}
