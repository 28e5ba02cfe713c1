//! # Models
//!
//! Tasks and notifications owned by the workflow core, plus read-only
//! projections of the business entities it inspects.

pub mod entities;
pub mod notification;
pub mod task;

pub use entities::{ClinicRecord, InquiryRecord, OrderRecord, SubOrderRecord, UserRecord};
pub use notification::{
    ChatParticipant, MessageDetails, Notification, NotificationDraft, PushedNotification,
};
pub use task::{NewTask, Task, TaskDetails};
