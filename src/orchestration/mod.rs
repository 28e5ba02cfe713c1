//! # Orchestration
//!
//! The time-driven half of the workflow core.
//!
//! ## Key Components
//!
//! - [`sweeper`] - periodic claim-evaluate-escalate pass over due tasks
//! - [`policies`] - per-task-type strategies deciding whether an action is still pending
//! - [`context`] - collaborators shared by policies and event handlers
//! - [`clock`] - injectable time source and the end-of-day cutoff
//! - [`bootstrap`] - assembles the whole system and runs its background loops

pub mod bootstrap;
pub mod clock;
pub mod context;
pub mod policies;
pub mod sweeper;

pub use bootstrap::{
    mail_sender_from_config, BootstrapConfig, WorkflowBootstrap, WorkflowDependencies,
    WorkflowHandle, WorkflowSystem,
};
pub use clock::{end_of_day, Clock, FixedClock, SystemClock};
pub use context::WorkflowContext;
pub use policies::{PolicyOutcome, TaskPolicy, TaskPolicyRegistry};
pub use sweeper::{SweepReport, TaskSweeper};
