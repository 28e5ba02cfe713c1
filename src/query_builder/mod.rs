//! # Query Builder System
//!
//! Typed query construction for the PostgreSQL stores.
//!
//! ## Key Components
//!
//! - [`conditions`] - WHERE conditions rendered with numbered placeholders
//! - [`builder`] - single-table SELECT builder
//! - [`pagination`] - LIMIT/OFFSET with 1-based pages
//! - [`filters`] - one tagged variant per query shape the stores support

pub mod builder;
pub mod conditions;
pub mod filters;
pub mod pagination;

pub use builder::{BuiltQuery, QueryBuilder};
pub use conditions::{Condition, SqlValue};
pub use filters::{NotificationFilter, TaskFilter, NOTIFICATIONS_TABLE, TASKS_TABLE};
pub use pagination::Pagination;
