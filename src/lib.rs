//! # Unicorn Factory
//!
//! A production facility that manufactures unicorns at a fixed cadence
//! and allocates them to client orders, oldest order first. Surplus
//! production lands in an overflow store and is recycled into later
//! orders.
//!
//! ## Module Tour
//!
//! ### The Engine ([`order`], [`production`], [`storage`])
//! The allocation core: the per-order state machine, the ticking
//! production loop with its FIFO backlog, and the LIFO overflow store.
//!
//! ### The Interface ([`service`], [`http`])
//! [`Service`](service::Service) is the façade clients talk to: place an
//! order, poll for ready unicorns, check what is pending. The [`http`]
//! module binds it to a small JSON API.
//!
//! ### The Collaborators ([`factory`], [`model`])
//! The random name/capability generator behind the
//! [`UnicornFactory`](factory::UnicornFactory) trait, and the shared data
//! types.
//!
//! ### The Orchestrator ([`lifecycle`])
//! [`UnicornSystem`](lifecycle::UnicornSystem) wires everything together,
//! spawns the production task and coordinates graceful shutdown.
//!
//! ## Concurrency Model
//!
//! One background task drives the production loop; all service calls may
//! run concurrently with it. Four independent lock domains keep unrelated
//! orders from serializing on each other: the order table, each order,
//! the overflow store and the line's own backlog state. Lock acquisition
//! is always table before order and line before order, never the
//! reverse.
//!
//! ## Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! curl 'http://127.0.0.1:8000/unicorns?amount=3'
//! ```

pub mod factory;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod order;
pub mod production;
pub mod service;
pub mod storage;

pub use factory::{FactoryError, RandomFactory, UnicornFactory};
pub use lifecycle::{SystemConfig, UnicornSystem};
pub use model::{OrderId, Unicorn};
pub use order::{Order, OrderError};
pub use production::{ProductionError, ProductionLine};
pub use service::{Service, ServiceConfig, ServiceError, UnicornService};
pub use storage::{LifoStorage, LoggingStorage, UnicornStorage};
