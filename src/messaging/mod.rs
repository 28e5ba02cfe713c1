//! # Messaging
//!
//! Everything between a rendered notification draft and the recipient:
//! the durable job queue, the dispatcher that drains it, the live-session
//! registry for real-time push, and outbound mail.

pub mod dispatcher;
pub mod mail;
pub mod pg_queue;
pub mod queue;
pub mod sessions;

pub use dispatcher::{DispatchOutcome, NotificationDispatcher};
pub use mail::{LoggingMailSender, MailSender, SmtpMailSender};
pub use pg_queue::PgJobQueue;
pub use queue::{
    FailedJob, InProcessQueue, NotificationQueue, QueueConsumer, QueueJob, QueueStats,
    RetryDecision,
};
pub use sessions::{SessionHandle, SessionMessage, SessionRegistry};
