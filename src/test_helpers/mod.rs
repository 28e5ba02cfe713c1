//! # Test Helpers
//!
//! Shared infrastructure for unit and integration tests: an in-memory entity
//! repository, a recording mail sender, a wired-up workflow harness with a
//! settable clock, and database helpers for the PostgreSQL store tests.

pub mod entities;
pub mod fixtures;
pub mod mail;
pub mod test_utils;

pub use entities::InMemoryEntityRepository;
pub use fixtures::{monday_morning, test_config, LabFixture, WorkflowTestHarness};
pub use mail::{RecordingMailSender, SentMail};
pub use test_utils::{get_test_database_url, DEFAULT_TEST_DATABASE_URL, MIGRATOR};
