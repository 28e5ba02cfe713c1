//! # Domain Events
//!
//! Business operations emit a [`DomainEvent`] after their mutation commits;
//! the [`EventBus`] fans it out to the registered domain handlers without the
//! caller waiting on them.
//!
//! ## Key Components
//!
//! - [`types`] - event payloads (entity ids only) and their names
//! - [`bus`] - listener registry, supervised per-listener dispatch, diagnostics stream
//! - [`handlers`] - listeners that render notifications and create reminder tasks

pub mod bus;
pub mod handlers;
pub mod types;

pub use bus::{EmitHandle, EmitReport, EventBus, EventListener};
pub use handlers::register_default_handlers;
pub use types::{DomainEvent, EventKind, PublishedEvent};
