#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in splashtrack
//!
//! The presentation boundary is a channel of [`EventMessage`] values: every
//! component emits structured events instead of printing or logging
//! directly, and the consuming side (CLI, UI layer) decides how to render
//! or log them.

pub mod events;
pub mod meta;

pub use events::TrackerEvent;
pub use meta::{EventLevel, EventMeta, EventSource};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// An event together with its emission metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: TrackerEvent,
}

impl EventMessage {
    /// Wrap an event with metadata derived from its level and source.
    #[must_use]
    pub fn new(event: TrackerEvent) -> Self {
        let meta = EventMeta::new(event.level(), event.source());
        Self { meta, event }
    }
}

/// Type alias for event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout splashtrack
///
/// Implementors only provide the sender; emission is silently dropped when
/// no consumer is attached or the receiver has gone away.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: TrackerEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(EventMessage::new(event));
        }
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
