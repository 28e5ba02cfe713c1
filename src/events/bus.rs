//! # Event Bus
//!
//! In-process publish/subscribe for [`DomainEvent`]s.
//!
//! `emit` returns as soon as the listener invocations are spawned. Each
//! listener runs in its own tokio task, so an error or a panic in one listener
//! is logged at that task's boundary and never reaches the emitter or the
//! other listeners. The returned [`EmitHandle`] may be awaited by callers that
//! need to know when every listener finished (tests, graceful shutdown); most
//! business operations simply drop it.
//!
//! Every emitted event is also published on a broadcast channel for
//! diagnostics. Having no subscriber there is not an error.

use super::types::{DomainEvent, EventKind, PublishedEvent};
use crate::error::Result;
use crate::logging::{log_error, log_event_operation};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, Instrument};

#[async_trait]
pub trait EventListener: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    async fn handle(&self, event: &DomainEvent) -> Result<()>;
}

/// Completion of one emit across its listeners
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    pub succeeded: usize,
    pub failed: usize,
    pub panicked: usize,
}

/// Join handles of the listener tasks spawned by one emit
#[derive(Debug, Default)]
pub struct EmitHandle {
    handles: Vec<JoinHandle<bool>>,
}

impl EmitHandle {
    pub fn listener_count(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every listener of this emit to finish
    pub async fn join(self) -> EmitReport {
        let mut report = EmitReport::default();
        for outcome in join_all(self.handles).await {
            match outcome {
                Ok(true) => report.succeeded += 1,
                Ok(false) => report.failed += 1,
                Err(_) => report.panicked += 1,
            }
        }
        report
    }
}

pub struct EventBus {
    listeners: RwLock<HashMap<EventKind, Vec<Arc<dyn EventListener>>>>,
    diagnostics: broadcast::Sender<PublishedEvent>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("event_kinds", &self.listeners.read().len())
            .field("subscribers", &self.diagnostics.receiver_count())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl EventBus {
    /// Create a bus whose diagnostics stream buffers `broadcast_capacity` events
    pub fn new(broadcast_capacity: usize) -> Self {
        let (diagnostics, _) = broadcast::channel(broadcast_capacity.max(1));
        Self {
            listeners: RwLock::new(HashMap::new()),
            diagnostics,
        }
    }

    /// Register `listener` for every event of `kind`
    pub fn on(&self, kind: EventKind, listener: Arc<dyn EventListener>) {
        debug!(event = %kind, listener = listener.name(), "Listener registered");
        self.listeners.write().entry(kind).or_default().push(listener);
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.read().get(&kind).map(Vec::len).unwrap_or(0)
    }

    /// Fan the event out to its listeners without waiting for them
    pub fn emit(&self, event: DomainEvent) -> EmitHandle {
        let kind = event.kind();
        let listeners = self.listeners.read().get(&kind).cloned().unwrap_or_default();

        let _ = self.diagnostics.send(PublishedEvent {
            event: event.clone(),
            listeners: listeners.len(),
            published_at: Utc::now(),
        });

        if listeners.is_empty() {
            debug!(event = %kind, "No listeners registered for event");
            return EmitHandle::default();
        }

        let event = Arc::new(event);
        let handles = listeners
            .into_iter()
            .map(|listener| {
                let event = Arc::clone(&event);
                let span = tracing::info_span!("event_listener", event = %kind, listener = listener.name());
                tokio::spawn(
                    async move {
                        match listener.handle(&event).await {
                            Ok(()) => {
                                log_event_operation(kind.as_str(), Some(listener.name()), "handled", None);
                                true
                            }
                            Err(e) => {
                                let context = format!("listener={}", listener.name());
                                log_error("event_bus", kind.as_str(), &e.to_string(), Some(context.as_str()));
                                false
                            }
                        }
                    }
                    .instrument(span),
                )
            })
            .collect();

        EmitHandle { handles }
    }

    /// Observe every emitted event
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.diagnostics.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.diagnostics.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkflowError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EventListener for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn handle(&self, _event: &DomainEvent) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl EventListener for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn handle(&self, _event: &DomainEvent) -> Result<()> {
            Err(WorkflowError::Internal("listener blew up".to_string()))
        }
    }

    struct Panicking;

    #[async_trait]
    impl EventListener for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn handle(&self, _event: &DomainEvent) -> Result<()> {
            panic!("listener panicked");
        }
    }

    fn clinic_created() -> DomainEvent {
        DomainEvent::ClinicCreated {
            clinic: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_failing_listeners_do_not_affect_siblings() {
        let bus = EventBus::default();
        let counting = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        bus.on(EventKind::ClinicCreated, Arc::new(Failing));
        bus.on(EventKind::ClinicCreated, Arc::new(Panicking));
        bus.on(EventKind::ClinicCreated, counting.clone());

        let report = bus.emit(clinic_created()).join().await;

        assert_eq!(
            report,
            EmitReport {
                succeeded: 1,
                failed: 1,
                panicked: 1
            }
        );
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_emit_only_reaches_matching_kind() {
        let bus = EventBus::default();
        let counting = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        bus.on(EventKind::BalanceUpdated, counting.clone());

        let handle = bus.emit(clinic_created());
        assert_eq!(handle.listener_count(), 0);
        handle.join().await;
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_diagnostics_stream_sees_every_event() {
        let bus = EventBus::new(8);
        let mut stream = bus.subscribe();

        bus.emit(clinic_created()).join().await;

        let published = stream.recv().await.unwrap();
        assert_eq!(published.event.kind(), EventKind::ClinicCreated);
        assert_eq!(published.listeners, 0);
    }
}
