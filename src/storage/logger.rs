//! Logging decorator for unicorn storages.

use super::UnicornStorage;
use crate::model::Unicorn;
use tracing::debug;

/// Wraps any [`UnicornStorage`] and emits a structured event for every
/// store and collect.
#[derive(Debug)]
pub struct LoggingStorage<S> {
    inner: S,
}

impl<S: UnicornStorage> LoggingStorage<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: UnicornStorage> UnicornStorage for LoggingStorage<S> {
    fn store(&self, unicorn: Unicorn) {
        let name = unicorn.name.clone();
        self.inner.store(unicorn);
        debug!(unicorn = %name, in_storage = self.inner.in_storage(), "unicorn stored");
    }

    fn in_storage(&self) -> usize {
        self.inner.in_storage()
    }

    fn collect(&self, n: usize) -> Vec<Unicorn> {
        let unicorns = self.inner.collect(n);
        debug!(collected = unicorns.len(), requested = n, "collected from storage");
        unicorns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LifoStorage;

    #[test]
    fn delegates_to_inner_store() {
        let store = LoggingStorage::new(LifoStorage::new());
        store.store(Unicorn {
            name: "dreamy-nimbus".to_string(),
            capabilities: vec![],
        });

        assert_eq!(store.in_storage(), 1);
        assert_eq!(store.collect(5).len(), 1);
        assert_eq!(store.in_storage(), 0);
    }
}
