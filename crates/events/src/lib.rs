#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in provmirror
//!
//! Library crates never print. Sync and retention operations report what
//! they do by emitting domain events over an unbounded channel; the CLI
//! drains the channel and turns each event into a structured log record.
//!
//! ## Architecture
//!
//! - **Domain events**: grouped by functional domain (sync, retention, general)
//! - **Unified `EventEmitter` trait**: one API for every emission site
//! - **Metadata envelope**: every event travels with level, source and timestamp

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{AppEvent, FailureContext, GeneralEvent, RetentionEvent, SyncEvent};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// An event together with its metadata
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    /// Wrap an event, deriving level and source from the event itself
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        Self { meta, event }
    }

    /// Wrap an event with a correlation identifier
    #[must_use]
    pub fn correlated(event: AppEvent, correlation_id: impl Into<String>) -> Self {
        let mut message = Self::from_event(event);
        message.meta = message.meta.with_correlation_id(correlation_id);
        message
    }
}

/// Type alias for event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for event receiver
pub type EventReceiver = UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout provmirror
///
/// Implemented by the raw `EventSender` and by any context struct that
/// carries one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Receiver gone means nobody is listening; keep going
            let _ = sender.send(EventMessage::from_event(event));
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit a warning event with context
    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning_with_context(
            message, context,
        )));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl EventEmitter for Silent {
        fn event_sender(&self) -> Option<&EventSender> {
            None
        }
    }

    #[tokio::test]
    async fn emitted_events_carry_metadata() {
        let (tx, mut rx) = channel();
        tx.emit_warning("registry returned an unparseable version");
        tx.emit(AppEvent::Retention(RetentionEvent::VersionDeleted {
            provider: "aws".into(),
            version: "1.0.0".into(),
        }));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.meta.level, EventLevel::Warn);
        assert_eq!(first.meta.source, EventSource::General);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.meta.source, EventSource::Retention);
        assert_eq!(second.meta.level, EventLevel::Info);
    }

    #[test]
    fn emitting_without_sender_is_a_no_op() {
        Silent.emit_debug("dropped");
    }

    #[test]
    fn dropped_receiver_does_not_panic() {
        let (tx, rx) = channel();
        drop(rx);
        tx.emit_error("nobody listens");
    }

    #[test]
    fn messages_serialize_with_domain_tag() {
        let message = EventMessage::correlated(
            AppEvent::Sync(SyncEvent::VersionResolved {
                provider: "hashicorp/aws".into(),
                version: "6.26.0".into(),
            }),
            "acme/aws/6.26.0",
        );
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["event"]["domain"], "sync");
        assert_eq!(json["meta"]["correlationId"], "acme/aws/6.26.0");
    }
}
