//! # Allocation Service
//!
//! The client-facing façade over the allocation engine. It keeps the
//! table of pending orders, registers new demand with the production
//! line and answers polls by draining an order's ready-queue, topping up
//! from overflow storage when the order is still short.
//!
//! The table lock is held only for O(1) lookup/insert/delete steps; the
//! heavier per-order work runs under that order's own lock. Lock order is
//! always table before order, never the reverse.

use crate::model::{OrderId, Unicorn};
use crate::order::{Order, OrderError};
use crate::production::{ProductionError, ProductionLine};
use crate::storage::UnicornStorage;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors reported to service callers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// A non-positive order size was requested.
    #[error("invalid unicorn amount of {0}")]
    InvalidAmount(i64),

    /// The order ID is unknown, stale or fabricated.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The production line refused the order.
    #[error(transparent)]
    Production(#[from] ProductionError),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Length of generated order IDs.
    pub id_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { id_length: 16 }
    }
}

/// The service that produces happy beautiful unicorns.
#[async_trait]
pub trait UnicornService: Send + Sync {
    /// Initiates a new unicorn production request and returns its ID for
    /// subsequent pooling.
    async fn order_unicorns(&self, amount: i64) -> Result<OrderId, ServiceError>;

    /// Returns the unicorns currently available for an order.
    async fn pool(&self, id: &OrderId) -> Result<Vec<Unicorn>, ServiceError>;

    /// Whether the ID has a live order in process.
    async fn validate(&self, id: &OrderId) -> bool;

    /// How many unicorns are left to deliver for an order.
    async fn pending_unicorns(&self, id: &OrderId) -> Result<usize, ServiceError>;
}

/// In-memory unicorn service backed by one production line and an
/// overflow store.
pub struct Service {
    config: ServiceConfig,
    line: Arc<ProductionLine>,
    storage: Arc<dyn UnicornStorage>,
    /// Pending orders, from creation until fulfilled and drained.
    orders: RwLock<HashMap<OrderId, Arc<Order>>>,
}

impl Service {
    /// Creates a new unicorn service.
    pub fn new(
        config: ServiceConfig,
        line: Arc<ProductionLine>,
        storage: Arc<dyn UnicornStorage>,
    ) -> Self {
        Self {
            config,
            line,
            storage,
            orders: RwLock::new(HashMap::new()),
        }
    }

    fn remove(&self, id: &OrderId) {
        self.orders.write().remove(id);
        debug!(order_id = %id, "order removed from table");
    }
}

#[async_trait]
impl UnicornService for Service {
    async fn order_unicorns(&self, amount: i64) -> Result<OrderId, ServiceError> {
        if amount <= 0 {
            return Err(ServiceError::InvalidAmount(amount));
        }

        let order = Arc::new(Order::new(
            OrderId::random(self.config.id_length),
            amount as usize,
        ));
        let id = order.id().clone();

        self.orders.write().insert(id.clone(), Arc::clone(&order));
        if let Err(err) = self.line.place_order(order) {
            self.orders.write().remove(&id);
            return Err(err.into());
        }

        info!(order_id = %id, amount, "unicorns ordered");
        Ok(id)
    }

    async fn pool(&self, id: &OrderId) -> Result<Vec<Unicorn>, ServiceError> {
        let order = self
            .orders
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::OrderNotFound(id.clone()))?;

        // A fulfilled order already handed everything over; drop the
        // table entry so stale re-polls stay harmless.
        if order.is_fulfilled() {
            self.remove(id);
            return Ok(Vec::new());
        }

        let mut unicorns = order.collect();

        if order.pending() > 0 {
            match order.collect_from_storage(self.storage.as_ref()) {
                Ok(from_storage) => unicorns.extend(from_storage),
                // A racing poll fulfilled the order first; nothing left
                // to top up.
                Err(OrderError::Completed) => {}
            }
            if order.is_fulfilled() {
                self.remove(id);
            }
        }

        debug!(
            order_id = %id,
            collected = unicorns.len(),
            pending = order.pending(),
            "order pooled"
        );
        Ok(unicorns)
    }

    async fn validate(&self, id: &OrderId) -> bool {
        self.orders
            .read()
            .get(id)
            .map(|order| !order.is_fulfilled())
            .unwrap_or(false)
    }

    async fn pending_unicorns(&self, id: &OrderId) -> Result<usize, ServiceError> {
        let order = self
            .orders
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::OrderNotFound(id.clone()))?;

        if order.is_fulfilled() {
            return Ok(0);
        }
        Ok(order.pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::UnicornFactory;
    use crate::storage::LifoStorage;
    use std::collections::HashSet;
    use std::time::Duration;

    struct StaticFactory;

    impl UnicornFactory for StaticFactory {
        fn new_unicorn(&self) -> Unicorn {
            Unicorn {
                name: "test-unicorn".to_string(),
                capabilities: vec![],
            }
        }
    }

    /// A service whose production line never ticks, so tests drive
    /// production by hand.
    fn idle_service() -> (Service, Arc<LifoStorage>) {
        let storage = Arc::new(LifoStorage::new());
        let line = Arc::new(
            ProductionLine::new(Duration::from_secs(3600), Arc::new(StaticFactory))
                .with_storage(Arc::clone(&storage) as Arc<dyn UnicornStorage>),
        );
        let service = Service::new(
            ServiceConfig::default(),
            line,
            Arc::clone(&storage) as Arc<dyn UnicornStorage>,
        );
        (service, storage)
    }

    fn unicorn(name: &str) -> Unicorn {
        Unicorn {
            name: name.to_string(),
            capabilities: vec![],
        }
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts() {
        let (service, _) = idle_service();

        assert_eq!(
            service.order_unicorns(0).await,
            Err(ServiceError::InvalidAmount(0))
        );
        assert_eq!(
            service.order_unicorns(-1).await,
            Err(ServiceError::InvalidAmount(-1))
        );
        assert!(service.orders.read().is_empty());
    }

    #[tokio::test]
    async fn issues_unique_validatable_ids() {
        let (service, _) = idle_service();

        let mut ids = HashSet::new();
        for _ in 0..50 {
            let id = service.order_unicorns(1).await.unwrap();
            assert!(service.validate(&id).await);
            ids.insert(id);
        }
        assert_eq!(ids.len(), 50);
    }

    #[tokio::test]
    async fn unknown_ids_are_rejected() {
        let (service, _) = idle_service();
        let id = OrderId::from("no-such-order");

        assert_eq!(
            service.pool(&id).await,
            Err(ServiceError::OrderNotFound(id.clone()))
        );
        assert_eq!(
            service.pending_unicorns(&id).await,
            Err(ServiceError::OrderNotFound(id.clone()))
        );
        assert!(!service.validate(&id).await);
    }

    #[tokio::test]
    async fn pool_drains_ready_queue_and_reports_pending() {
        let (service, _) = idle_service();
        let id = service.order_unicorns(3).await.unwrap();

        let order = service.orders.read().get(&id).cloned().unwrap();
        order.add(unicorn("a")).unwrap();
        order.add(unicorn("b")).unwrap();

        let unicorns = service.pool(&id).await.unwrap();
        assert_eq!(unicorns.len(), 2);
        assert_eq!(service.pending_unicorns(&id).await.unwrap(), 1);
        assert!(service.validate(&id).await);
    }

    #[tokio::test]
    async fn fulfilled_order_survives_exactly_one_repoll() {
        let (service, _) = idle_service();
        let id = service.order_unicorns(2).await.unwrap();

        let order = service.orders.read().get(&id).cloned().unwrap();
        order.add(unicorn("a")).unwrap();
        order.add(unicorn("b")).unwrap();

        // The fulfilling poll returns the final unicorns.
        assert_eq!(service.pool(&id).await.unwrap().len(), 2);
        assert_eq!(service.pending_unicorns(&id).await.unwrap(), 0);
        assert!(!service.validate(&id).await);

        // One idempotent re-poll, then the entry is gone.
        assert!(service.pool(&id).await.unwrap().is_empty());
        assert_eq!(
            service.pool(&id).await,
            Err(ServiceError::OrderNotFound(id))
        );
    }

    #[tokio::test]
    async fn overflow_round_trip_fulfills_from_storage() {
        let (service, storage) = idle_service();
        for i in 0..5 {
            storage.store(unicorn(&format!("stored-{i}")));
        }

        let id = service.order_unicorns(5).await.unwrap();
        let unicorns = service.pool(&id).await.unwrap();

        assert_eq!(unicorns.len(), 5);
        assert_eq!(storage.in_storage(), 0);
        // Fulfilled via storage: the entry is removed in the same call.
        assert_eq!(
            service.pool(&id).await,
            Err(ServiceError::OrderNotFound(id))
        );
    }

    #[tokio::test]
    async fn partial_storage_topup_keeps_order_live() {
        let (service, storage) = idle_service();
        storage.store(unicorn("stored"));

        let id = service.order_unicorns(3).await.unwrap();
        let unicorns = service.pool(&id).await.unwrap();

        assert_eq!(unicorns.len(), 1);
        assert_eq!(service.pending_unicorns(&id).await.unwrap(), 2);
        assert!(service.validate(&id).await);
    }
}
