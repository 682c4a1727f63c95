//! Event notifier: a per-client observable surfacing request lifecycle events.
//!
//! Emission is synchronous; listeners run on the emitting task, in
//! subscription order. When debug mode is enabled every event is additionally
//! written to the `tracing` sink (target `yunpian::events`) without altering
//! delivery to regular listeners.

use std::sync::{PoisonError, RwLock};

use serde::Serialize;

use crate::client::Failure;
use crate::dispatch::{DispatchItem, DispatchReport};

/// Discriminant for [`Event`], used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RequestIssued,
    ResponseReceived,
    ItemSentOk,
    ItemSentFailed,
    Progress,
    BatchComplete,
    Error,
}

impl EventKind {
    /// Wire name of the event, as exposed to external monitoring layers.
    pub fn name(self) -> &'static str {
        match self {
            Self::RequestIssued => "request-issued",
            Self::ResponseReceived => "response-received",
            Self::ItemSentOk => "item-sent-ok",
            Self::ItemSentFailed => "item-sent-failed",
            Self::Progress => "progress",
            Self::BatchComplete => "batch-complete",
            Self::Error => "error",
        }
    }
}

/// A lifecycle event published by the client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Event {
    /// A POST is about to be issued.
    RequestIssued {
        resource: String,
        action: String,
        url: String,
        params: Vec<(String, String)>,
    },
    /// The HTTP exchange finished (successfully or not), before classification.
    ResponseReceived {
        status: Option<u16>,
        body: Option<String>,
        transport_error: Option<String>,
    },
    /// One bulk-send item resolved successfully.
    ItemSentOk { item: DispatchItem },
    /// One bulk-send item failed.
    ItemSentFailed { item: DispatchItem },
    /// Batch completion fraction in `[0, 1]`, recomputed after every item.
    Progress { fraction: f64 },
    /// All items of a batch are accounted for.
    BatchComplete { report: DispatchReport },
    /// A single call was classified as failed.
    Error { failure: Failure },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::RequestIssued { .. } => EventKind::RequestIssued,
            Self::ResponseReceived { .. } => EventKind::ResponseReceived,
            Self::ItemSentOk { .. } => EventKind::ItemSentOk,
            Self::ItemSentFailed { .. } => EventKind::ItemSentFailed,
            Self::Progress { .. } => EventKind::Progress,
            Self::BatchComplete { .. } => EventKind::BatchComplete,
            Self::Error { .. } => EventKind::Error,
        }
    }
}

type Listener = Box<dyn Fn(&Event) + Send + Sync>;

/// Synchronous multi-listener event bus owned by one client instance.
pub struct EventBus {
    listeners: RwLock<Vec<(Option<EventKind>, Listener)>>,
    debug: bool,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("EventBus")
            .field("listeners", &count)
            .field("debug", &self.debug)
            .finish()
    }
}

impl EventBus {
    pub(crate) fn new(debug: bool) -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            debug,
        }
    }

    /// Subscribe to one event kind.
    pub fn on(&self, kind: EventKind, listener: impl Fn(&Event) + Send + Sync + 'static) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((Some(kind), Box::new(listener)));
    }

    /// Subscribe to every event.
    pub fn on_any(&self, listener: impl Fn(&Event) + Send + Sync + 'static) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((None, Box::new(listener)));
    }

    /// Deliver an event to matching listeners, in subscription order.
    pub(crate) fn emit(&self, event: Event) {
        if self.debug {
            tracing::debug!(
                target: "yunpian::events",
                event = event.kind().name(),
                payload = %serde_json::to_string(&event).unwrap_or_default(),
            );
        }
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        let kind = event.kind();
        for (filter, listener) in listeners.iter() {
            if filter.is_none() || *filter == Some(kind) {
                listener(&event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn listeners_fire_in_subscription_order() {
        let bus = EventBus::new(false);
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            bus.on_any(move |_| order.lock().unwrap().push(tag));
        }

        bus.emit(Event::Progress { fraction: 0.5 });
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn kind_filter_only_matches_subscribed_events() {
        let bus = EventBus::new(false);
        let progress_seen = Arc::new(AtomicUsize::new(0));
        let error_seen = Arc::new(AtomicUsize::new(0));

        {
            let progress_seen = progress_seen.clone();
            bus.on(EventKind::Progress, move |_| {
                progress_seen.fetch_add(1, Ordering::SeqCst);
            });
        }
        {
            let error_seen = error_seen.clone();
            bus.on(EventKind::Error, move |_| {
                error_seen.fetch_add(1, Ordering::SeqCst);
            });
        }

        bus.emit(Event::Progress { fraction: 1.0 });
        bus.emit(Event::Progress { fraction: 1.0 });

        assert_eq!(progress_seen.load(Ordering::SeqCst), 2);
        assert_eq!(error_seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn debug_tee_does_not_disturb_delivery() {
        let bus = EventBus::new(true);
        let seen = Arc::new(AtomicUsize::new(0));
        {
            let seen = seen.clone();
            bus.on_any(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }

        bus.emit(Event::Progress { fraction: 0.25 });
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn event_names_match_wire_surface() {
        assert_eq!(EventKind::RequestIssued.name(), "request-issued");
        assert_eq!(EventKind::ResponseReceived.name(), "response-received");
        assert_eq!(EventKind::ItemSentOk.name(), "item-sent-ok");
        assert_eq!(EventKind::ItemSentFailed.name(), "item-sent-failed");
        assert_eq!(EventKind::Progress.name(), "progress");
        assert_eq!(EventKind::BatchComplete.name(), "batch-complete");
        assert_eq!(EventKind::Error.name(), "error");
    }
}
