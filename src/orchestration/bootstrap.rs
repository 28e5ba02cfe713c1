//! # Workflow Bootstrap
//!
//! Wires the event bus, sweeper and dispatcher to one set of collaborators and
//! manages the lifecycle of the two background loops.
//!
//! ## Deployment Modes
//!
//! - **PostgreSQL**: `database.url` is set; tasks, notifications and queue
//!   jobs live in the tables under `migrations/`, which are applied on start.
//! - **In-memory**: no database URL; stores and queue are process-local.
//!   Used by tests and by embedding applications that persist elsewhere.
//!
//! Entity repositories are always supplied by the embedding application; the
//! workflow core never owns business entities.

use super::clock::{Clock, SystemClock};
use super::context::WorkflowContext;
use super::policies::TaskPolicyRegistry;
use super::sweeper::TaskSweeper;
use crate::config::{ConfigManager, MailConfig, WorkflowConfig};
use crate::error::{Result, WorkflowError};
use crate::events::{register_default_handlers, DomainEvent, EmitHandle, EventBus};
use crate::messaging::{
    InProcessQueue, LoggingMailSender, MailSender, NotificationDispatcher, NotificationQueue,
    PgJobQueue, QueueConsumer, SessionRegistry, SmtpMailSender,
};
use crate::repositories::EntityRepository;
use crate::store::postgres::run_migrations;
use crate::store::{
    InMemoryNotificationStore, InMemoryTaskStore, NotificationStore, PgNotificationStore,
    PgTaskStore, TaskStore,
};
use crate::templates::TemplateManager;
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Pause after a failed queue read before polling again
const DISPATCH_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Mail sender selected by `mail.enabled`
pub fn mail_sender_from_config(config: &MailConfig) -> Result<Arc<dyn MailSender>> {
    if config.enabled {
        Ok(Arc::new(SmtpMailSender::from_config(config)?))
    } else {
        Ok(Arc::new(LoggingMailSender))
    }
}

/// Storage, queue and delivery collaborators
#[derive(Clone)]
pub struct WorkflowDependencies {
    pub entities: Arc<dyn EntityRepository>,
    pub tasks: Arc<dyn TaskStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub queue: Arc<dyn NotificationQueue>,
    pub consumer: Arc<dyn QueueConsumer>,
    pub mail: Arc<dyn MailSender>,
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for WorkflowDependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowDependencies").finish_non_exhaustive()
    }
}

impl WorkflowDependencies {
    /// Process-local stores and queue
    pub fn in_memory(entities: Arc<dyn EntityRepository>, config: &WorkflowConfig) -> Result<Self> {
        let queue = Arc::new(InProcessQueue::new(config.dispatcher.clone()));
        Ok(Self {
            entities,
            tasks: Arc::new(InMemoryTaskStore::new()),
            notifications: Arc::new(InMemoryNotificationStore::new()),
            queue: queue.clone(),
            consumer: queue,
            mail: mail_sender_from_config(&config.mail)?,
            clock: Arc::new(SystemClock),
        })
    }

    /// PostgreSQL stores and job queue; applies pending migrations first
    pub async fn postgres(
        entities: Arc<dyn EntityRepository>,
        config: &WorkflowConfig,
        database_url: &str,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(database_url)
            .await
            .map_err(|e| WorkflowError::database("connect", e))?;
        run_migrations(&pool).await?;

        let queue = Arc::new(PgJobQueue::new(pool.clone(), config.dispatcher.clone()));
        Ok(Self {
            entities,
            tasks: Arc::new(PgTaskStore::new(pool.clone())),
            notifications: Arc::new(PgNotificationStore::new(pool)),
            queue: queue.clone(),
            consumer: queue,
            mail: mail_sender_from_config(&config.mail)?,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_mail(mut self, mail: Arc<dyn MailSender>) -> Self {
        self.mail = mail;
        self
    }
}

/// The assembled workflow core
pub struct WorkflowSystem {
    config: WorkflowConfig,
    context: WorkflowContext,
    bus: Arc<EventBus>,
    sessions: Arc<SessionRegistry>,
    notifications: Arc<dyn NotificationStore>,
    consumer: Arc<dyn QueueConsumer>,
    sweeper: Arc<TaskSweeper>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl std::fmt::Debug for WorkflowSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowSystem")
            .field("environment", &self.config.environment)
            .field("bus", &self.bus)
            .field("sweeper", &self.sweeper)
            .finish()
    }
}

impl WorkflowSystem {
    pub fn new(config: WorkflowConfig, deps: WorkflowDependencies) -> Self {
        let templates = Arc::new(TemplateManager::new(config.templates.portal_name.clone()));
        let context = WorkflowContext {
            entities: deps.entities.clone(),
            templates,
            tasks: deps.tasks,
            queue: deps.queue,
            clock: deps.clock.clone(),
        };

        let bus = Arc::new(EventBus::new(config.events.broadcast_capacity));
        register_default_handlers(&bus, &context);

        let sweeper = Arc::new(TaskSweeper::new(
            context.clone(),
            Arc::new(TaskPolicyRegistry::with_defaults()),
            config.sweeper.clone(),
        ));

        let sessions = Arc::new(SessionRegistry::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(
            deps.notifications.clone(),
            deps.entities,
            sessions.clone(),
            deps.mail,
            deps.clock,
        ));

        Self {
            config,
            context,
            bus,
            sessions,
            notifications: deps.notifications,
            consumer: deps.consumer,
            sweeper,
            dispatcher,
        }
    }

    /// Fire-and-forget entry point for business operations
    pub fn emit(&self, event: DomainEvent) -> EmitHandle {
        self.bus.emit(event)
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn context(&self) -> &WorkflowContext {
        &self.context
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub fn notifications(&self) -> &Arc<dyn NotificationStore> {
        &self.notifications
    }

    pub fn consumer(&self) -> &Arc<dyn QueueConsumer> {
        &self.consumer
    }

    pub fn sweeper(&self) -> &Arc<TaskSweeper> {
        &self.sweeper
    }

    pub fn dispatcher(&self) -> &Arc<NotificationDispatcher> {
        &self.dispatcher
    }

    /// Spawn the dispatcher loop, and the sweeper loop when enabled
    pub fn start(&self) -> WorkflowHandle {
        let (shutdown, receiver) = watch::channel(false);
        let mut tasks = Vec::with_capacity(2);

        tasks.push(tokio::spawn(self.dispatcher.clone().run(
            self.consumer.clone(),
            receiver.clone(),
            DISPATCH_ERROR_BACKOFF,
        )));

        if self.config.sweeper.enabled {
            tasks.push(tokio::spawn(self.sweeper.clone().run(receiver)));
        } else {
            warn!("Task sweeper disabled by configuration");
        }

        info!(
            environment = %self.config.environment,
            loops = tasks.len(),
            "🎉 Workflow system started"
        );
        WorkflowHandle { shutdown, tasks }
    }
}

/// Running background loops
#[derive(Debug)]
pub struct WorkflowHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl WorkflowHandle {
    pub fn is_running(&self) -> bool {
        !*self.shutdown.borrow() && self.tasks.iter().any(|task| !task.is_finished())
    }

    /// Signal both loops and wait for them to finish their current unit of work
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Background loop ended abnormally");
            }
        }
        info!("🛑 Workflow system stopped");
    }
}

/// Where to load configuration from
#[derive(Debug, Clone, Default)]
pub struct BootstrapConfig {
    /// Custom configuration directory (None = auto-detect)
    pub config_directory: Option<PathBuf>,
    /// Environment override (None = auto-detect)
    pub environment_override: Option<String>,
    /// Start the background loops immediately
    pub auto_start: bool,
}

impl BootstrapConfig {
    pub fn for_testing() -> Self {
        Self {
            config_directory: None,
            environment_override: Some("test".to_string()),
            auto_start: false,
        }
    }
}

pub struct WorkflowBootstrap;

impl WorkflowBootstrap {
    /// Load configuration, build collaborators for it and assemble the system
    pub async fn bootstrap(
        bootstrap: BootstrapConfig,
        entities: Arc<dyn EntityRepository>,
    ) -> Result<(WorkflowSystem, Option<WorkflowHandle>)> {
        info!("🚀 BOOTSTRAP: Starting workflow system bootstrap");

        let manager = match &bootstrap.environment_override {
            Some(env) => {
                ConfigManager::load_from_directory_with_env(bootstrap.config_directory.clone(), env)?
            }
            None => ConfigManager::load_from_directory(bootstrap.config_directory.clone())?,
        };
        let config = manager.config().clone();
        info!(environment = %manager.environment(), "✅ BOOTSTRAP: Configuration loaded");

        let deps = match config.database.url.as_deref() {
            Some(url) if !url.is_empty() => {
                let deps = WorkflowDependencies::postgres(entities, &config, url).await?;
                info!("✅ BOOTSTRAP: PostgreSQL stores ready");
                deps
            }
            _ => {
                info!("📋 BOOTSTRAP: No database URL, using in-memory stores");
                WorkflowDependencies::in_memory(entities, &config)?
            }
        };

        let system = WorkflowSystem::new(config, deps);
        let handle = bootstrap.auto_start.then(|| system.start());
        Ok((system, handle))
    }
}
