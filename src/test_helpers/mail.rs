//! Mail sender that keeps every message instead of sending it.

use crate::error::{Result, WorkflowError};
use crate::messaging::MailSender;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct RecordingMailSender {
    sent: Mutex<Vec<SentMail>>,
    failing: AtomicBool,
}

impl RecordingMailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail with a delivery error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, address: &str) -> Vec<SentMail> {
        self.sent
            .lock()
            .iter()
            .filter(|mail| mail.to == address)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MailSender for RecordingMailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(WorkflowError::delivery("email", "recording sender set to fail"));
        }
        self.sent.lock().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
