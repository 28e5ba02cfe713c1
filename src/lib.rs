#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # LabFlow Core
//!
//! Workflow automation core for a dental-lab order pipeline.
//!
//! ## Overview
//!
//! Business operations in the surrounding services (inquiries, quotes,
//! orders, chat, clinic accounts) emit a domain event after their mutation
//! commits. The workflow core turns those events into role-specific
//! notifications and into reminder tasks, and periodically re-checks every
//! pending task so that the humans responsible are nudged, and escalated to
//! their admins, until the action is done.
//!
//! ## Architecture
//!
//! - **Event bus**: fire-and-forget fan-out to supervised listeners; a failing
//!   listener never reaches the emitter or its siblings.
//! - **Task store + sweeper**: pending human actions with due dates. A
//!   periodic sweep claims what is due by end of day, asks the task type's
//!   policy whether the action is still pending, escalates, and regenerates
//!   recurring reminders.
//! - **Notification queue + dispatcher**: drafts rendered once per recipient
//!   are queued; the dispatcher persists them, pushes to live sessions and
//!   sends e-mail, retrying with backoff.
//! - **Template manager**: role-specific message text per channel.
//!
//! ## Module Organization
//!
//! - [`events`] - domain events, the bus and the domain handlers
//! - [`orchestration`] - sweeper, task policies, bootstrap and lifecycle
//! - [`messaging`] - job queue, dispatcher, live sessions and mail
//! - [`store`] - task and notification persistence (memory and PostgreSQL)
//! - [`templates`] - the message catalog and placeholder substitution
//! - [`models`] - tasks, notifications and the entity projections read
//! - [`repositories`] - read access to business entities owned elsewhere
//! - [`query_builder`] - typed filters rendered to SQL for the stores
//! - [`config`] - YAML configuration with environment overrides
//! - [`error`] - structured error handling
//! - [`logging`] - structured logging setup and operation helpers
//! - [`test_helpers`] - in-memory fixtures for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use labflow_core::events::DomainEvent;
//! use labflow_core::orchestration::{BootstrapConfig, WorkflowBootstrap};
//! use labflow_core::test_helpers::InMemoryEntityRepository;
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! # async fn example() -> labflow_core::Result<()> {
//! let entities = Arc::new(InMemoryEntityRepository::new());
//! let (system, handle) = WorkflowBootstrap::bootstrap(
//!     BootstrapConfig {
//!         auto_start: true,
//!         ..BootstrapConfig::default()
//!     },
//!     entities,
//! )
//! .await?;
//!
//! system.emit(DomainEvent::InquiryCreated { inquiry: Uuid::new_v4() });
//!
//! if let Some(handle) = handle {
//!     handle.shutdown().await;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test                                # in-memory stores only
//! cargo test --features test-database       # also PostgreSQL store tests
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod orchestration;
pub mod query_builder;
pub mod repositories;
pub mod store;
pub mod templates;
pub mod test_helpers;

pub use config::{ConfigManager, ConfigurationError, WorkflowConfig};
pub use constants::{
    AssociatedType, NotificationType, OrderStatus, QuoteStatus, RoleCode, TaskType,
};
pub use error::{Result, WorkflowError};
pub use events::{DomainEvent, EventBus, EventKind, EventListener};
pub use messaging::{NotificationDispatcher, NotificationQueue, QueueConsumer, QueueJob};
pub use models::{NewTask, Notification, NotificationDraft, Task, TaskDetails};
pub use orchestration::{
    BootstrapConfig, TaskPolicy, TaskPolicyRegistry, TaskSweeper, WorkflowBootstrap,
    WorkflowHandle, WorkflowSystem,
};
pub use repositories::EntityRepository;
pub use store::{NotificationStore, TaskStore};
pub use templates::{Channel, TemplateManager, TemplateName};
