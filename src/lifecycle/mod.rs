//! # System Lifecycle & Orchestration
//!
//! Wires the components together and manages their runtime lifecycle:
//! build the factory, overflow storage, production line and service,
//! spawn the production task, and coordinate a clean shutdown.
//!
//! The production loop observes cancellation through a broadcast channel,
//! so [`UnicornSystem::shutdown`] returns once the loop has exited.

pub mod tracing;

pub use self::tracing::setup_tracing;

use crate::factory::{FactoryError, RandomFactory};
use crate::production::ProductionLine;
use crate::service::{Service, ServiceConfig};
use crate::storage::{LifoStorage, LoggingStorage, UnicornStorage};
use ::tracing::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Top-level configuration for a running unicorn system.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    /// Interval between two manufactured unicorns.
    pub rate: Duration,
    /// Capability tags attributed to each unicorn.
    pub capabilities_per_unicorn: usize,
    /// Service-level settings.
    pub service: ServiceConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            rate: Duration::from_millis(500),
            capabilities_per_unicorn: 3,
            service: ServiceConfig::default(),
        }
    }
}

/// A fully wired unicorn production system.
pub struct UnicornSystem {
    /// The client-facing allocation service.
    pub service: Arc<Service>,
    /// The overflow store, exposed so surplus can be inspected or primed.
    pub storage: Arc<dyn UnicornStorage>,
    shutdown: broadcast::Sender<()>,
    production: JoinHandle<()>,
}

impl UnicornSystem {
    /// Builds every component and starts the production loop.
    ///
    /// A store is always configured so surplus production is never lost.
    pub fn start(config: SystemConfig) -> Result<Self, FactoryError> {
        let factory = Arc::new(RandomFactory::with_capabilities(
            config.capabilities_per_unicorn,
        )?);
        let storage: Arc<dyn UnicornStorage> =
            Arc::new(LoggingStorage::new(LifoStorage::new()));

        let line = Arc::new(
            ProductionLine::new(config.rate, factory).with_storage(Arc::clone(&storage)),
        );
        let service = Arc::new(Service::new(
            config.service,
            Arc::clone(&line),
            Arc::clone(&storage),
        ));

        let (shutdown, shutdown_rx) = broadcast::channel(1);
        let production = tokio::spawn(line.run(shutdown_rx));

        info!("unicorn system started");
        Ok(Self {
            service,
            storage,
            shutdown,
            production,
        })
    }

    /// Signals the production loop to stop and waits for it to exit.
    pub async fn shutdown(self) {
        info!("shutting down unicorn system");
        let _ = self.shutdown.send(());
        if let Err(err) = self.production.await {
            error!(error = %err, "production task failed");
        }
        info!("unicorn system stopped");
    }
}
