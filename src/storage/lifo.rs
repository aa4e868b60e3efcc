//! LIFO overflow store: the most recently stored unicorn is collected
//! first.

use super::UnicornStorage;
use crate::model::Unicorn;
use parking_lot::RwLock;

/// Stack-backed unicorn store.
///
/// All mutating operations serialize on one exclusive lock; size reads
/// take the shared side so concurrent observers do not contend.
#[derive(Debug, Default)]
pub struct LifoStorage {
    stack: RwLock<Vec<Unicorn>>,
}

impl LifoStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UnicornStorage for LifoStorage {
    fn store(&self, unicorn: Unicorn) {
        self.stack.write().push(unicorn);
    }

    fn in_storage(&self) -> usize {
        self.stack.read().len()
    }

    fn collect(&self, n: usize) -> Vec<Unicorn> {
        let mut stack = self.stack.write();
        let take = n.min(stack.len());
        let mut unicorns = Vec::with_capacity(take);
        for _ in 0..take {
            if let Some(unicorn) = stack.pop() {
                unicorns.push(unicorn);
            }
        }
        unicorns
    }
}
