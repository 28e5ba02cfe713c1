//! # Labflow Configuration System
//!
//! YAML-based configuration with per-environment overrides.
//!
//! ## Architecture
//!
//! - **Single Source of Truth**: values come from `config/labflow-config.yaml`
//! - **Environment Awareness**: `development`/`test`/`production` sections are
//!   merged over the base values
//! - **Explicit Validation**: zero intervals and empty identifiers are rejected
//!   before any component is built
//!
//! ## Usage
//!
//! ```rust,no_run
//! use labflow_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let sweep_every = manager.config().sweeper.interval();
//! let portal = &manager.config().templates.portal_name;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::system;
use chrono::{Duration as ChronoDuration, FixedOffset};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration for the workflow core
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub environment: String,
    pub database: DatabaseConfig,
    pub sweeper: SweeperConfig,
    pub dispatcher: DispatcherConfig,
    pub events: EventsConfig,
    pub templates: TemplatesConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL; `${VAR}` is expanded from the environment
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    pub enabled: bool,
    /// Seconds between sweep passes
    pub interval_seconds: u64,
    /// Claims older than this are considered abandoned
    pub claim_timeout_seconds: u64,
    /// Maximum tasks claimed per pass
    pub batch_size: u32,
    /// Fixed increment between links of a recurring reminder chain
    pub reminder_interval_days: i64,
    /// UTC offset defining "end of day"; host local time when unset
    pub day_boundary_utc_offset_minutes: Option<i32>,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 15 * 60,
            claim_timeout_seconds: 10 * 60,
            batch_size: 500,
            reminder_interval_days: 2,
            day_boundary_utc_offset_minutes: None,
        }
    }
}

impl SweeperConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn claim_timeout(&self) -> ChronoDuration {
        ChronoDuration::seconds(self.claim_timeout_seconds as i64)
    }

    pub fn reminder_interval(&self) -> ChronoDuration {
        ChronoDuration::days(self.reminder_interval_days)
    }

    pub fn day_boundary_offset(&self) -> Option<FixedOffset> {
        self.day_boundary_utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Attempts per job before it is parked as failed
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    pub queue_capacity: usize,
    /// Idle wait between polls of the database-backed queue
    pub poll_interval_ms: u64,
    /// How long a read job stays invisible to other consumers
    pub visibility_timeout_seconds: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base_ms: 1_000,
            backoff_max_ms: 60_000,
            queue_capacity: 10_000,
            poll_interval_ms: 500,
            visibility_timeout_seconds: 30,
        }
    }
}

impl DispatcherConfig {
    /// Exponential backoff for the given (1-based) failed attempt, capped
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.backoff_base_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.backoff_max_ms))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Capacity of the diagnostics broadcast stream
    pub broadcast_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub portal_name: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            portal_name: system::DEFAULT_PORTAL_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from_address: "Deutsche Aligners <no-reply@localhost>".to_string(),
        }
    }
}

impl WorkflowConfig {
    /// Reject values that would stall or spin the background loops
    pub fn validate(&self) -> ConfigResult<()> {
        if self.sweeper.interval_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "sweeper.interval_seconds",
                "0",
                "sweep interval must be positive",
            ));
        }
        if self.sweeper.reminder_interval_days <= 0 {
            return Err(ConfigurationError::invalid_value(
                "sweeper.reminder_interval_days",
                self.sweeper.reminder_interval_days.to_string(),
                "regenerated reminders must be due strictly later",
            ));
        }
        if self.sweeper.batch_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "sweeper.batch_size",
                "0",
                "batch size must be positive",
            ));
        }
        if let Some(minutes) = self.sweeper.day_boundary_utc_offset_minutes {
            if self.sweeper.day_boundary_offset().is_none() {
                return Err(ConfigurationError::invalid_value(
                    "sweeper.day_boundary_utc_offset_minutes",
                    minutes.to_string(),
                    "offset must be within +/- 24 hours",
                ));
            }
        }
        if self.dispatcher.max_attempts == 0 {
            return Err(ConfigurationError::invalid_value(
                "dispatcher.max_attempts",
                "0",
                "at least one delivery attempt is required",
            ));
        }
        if self.dispatcher.queue_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "dispatcher.queue_capacity",
                "0",
                "queue capacity must be positive",
            ));
        }
        if self.events.broadcast_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "events.broadcast_capacity",
                "0",
                "broadcast capacity must be positive",
            ));
        }
        if self.templates.portal_name.trim().is_empty() {
            return Err(ConfigurationError::validation_error(
                "templates.portal_name must not be empty",
            ));
        }
        if self.mail.enabled && self.mail.smtp_host.trim().is_empty() {
            return Err(ConfigurationError::validation_error(
                "mail.smtp_host is required when mail is enabled",
            ));
        }
        Ok(())
    }
}
