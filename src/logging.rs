//! # Structured Logging Module
//!
//! Environment-aware structured logging to the console and to a JSON log file,
//! plus helpers that give sweep, notification and event operations a uniform
//! shape in the logs.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// `RUST_LOG` wins over the environment default when set. Calling this more
/// than once, or after another subscriber was installed, is harmless.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(filter());

        let log_dir = PathBuf::from("log");
        let pid = process::id();
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let log_filename = format!("{environment}.{pid}.{timestamp}.log");

        let file_layer = match fs::create_dir_all(&log_dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::never(&log_dir, &log_filename);
                let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
                // The writer thread must outlive every span in the process
                std::mem::forget(guard);
                Some(
                    fmt::layer()
                        .with_writer(file_writer)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_level(true)
                        .with_ansi(false)
                        .json()
                        .with_filter(filter()),
                )
            }
            Err(e) => {
                eprintln!("labflow: file logging disabled, cannot create {}: {e}", log_dir.display());
                None
            }
        };

        let has_file_output = file_layer.is_some();
        let subscriber = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = pid,
            environment = %environment,
            log_file = %log_dir.join(&log_filename).display(),
            file_output = has_file_output,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Current environment from LABFLOW_ENV or APP_ENV
fn get_environment() -> String {
    std::env::var("LABFLOW_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log one step of a sweep pass
pub fn log_sweep_operation(
    operation: &str,
    task_id: Option<&str>,
    task_type: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        task_id = task_id,
        task_type = task_type,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🧹 SWEEP_OPERATION"
    );
}

/// Log a notification queue or delivery step
pub fn log_notification_operation(
    operation: &str,
    recipient: Option<&str>,
    notification_type: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        recipient = recipient,
        notification_type = notification_type,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📨 NOTIFICATION_OPERATION"
    );
}

/// Log a domain event emission or handler outcome
pub fn log_event_operation(event: &str, listener: Option<&str>, status: &str, details: Option<&str>) {
    tracing::info!(
        event = %event,
        listener = listener,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📣 EVENT_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
