//! Lifecycle events and the channel that carries them.
//!
//! A detection run reports everything it does through a stream of
//! [`TagEvent`] values. The sending half ([`EventSink`]) is a cheap clone
//! handle shared by the session controller and every in-flight unit of
//! background work for the run's duration; the consuming half
//! ([`EventStream`]) is held by the application. The stream ends (yields
//! `None`) once every sink clone for the run has been dropped.

use crate::types::{Modulation, TagUid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

/// Payload of a [`TagEvent::Detected`] event.
///
/// Snapshot of a target the moment it was selected: identifier bytes, the
/// modulation it answered on, a reserved marker that is always zero, and a
/// UTC timestamp.
///
/// # Examples
///
/// ```
/// use tagwatch_core::{Modulation, TagDetection, TagUid};
///
/// let uid = TagUid::new(vec![0x04, 0x9A, 0x3B, 0x01]).unwrap();
/// let detection = TagDetection::new(uid, Modulation::MIFARE);
///
/// assert_eq!(detection.uid_len(), 4);
/// assert_eq!(detection.reserved, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDetection {
    /// Identifier bytes reported by the reader.
    pub uid: TagUid,

    /// Modulation the target answered on.
    pub modulation: Modulation,

    /// Reserved marker field, always zero.
    pub reserved: u8,

    /// When the target was selected.
    pub at: DateTime<Utc>,
}

impl TagDetection {
    /// Create a detection payload stamped with the current time.
    #[must_use]
    pub fn new(uid: TagUid, modulation: Modulation) -> Self {
        Self {
            uid,
            modulation,
            reserved: 0,
            at: Utc::now(),
        }
    }

    /// Identifier length in bytes.
    #[must_use]
    pub fn uid_len(&self) -> usize {
        self.uid.len()
    }

    /// Identifier as an uppercase hexadecimal string.
    #[must_use]
    pub fn uid_hex(&self) -> String {
        self.uid.to_hex()
    }
}

/// Lifecycle event of a detection run.
///
/// Events for a run arrive strictly in transition order:
/// `Listening`, then alternating `Detected`/`Removed`, closed out by a
/// single terminal `Closed`. A setup failure produces exactly one `Error`
/// and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TagEvent {
    /// Reader opened and initiator configured; polling has begun.
    Listening,

    /// A target was selected in the field.
    Detected(TagDetection),

    /// The previously selected target no longer answers.
    Removed,

    /// Reader setup failed; the run never started.
    Error {
        /// Human-readable failure description.
        message: String,
    },

    /// Device closed and context released; the run is over.
    Closed,
}

/// Sending half of the event channel.
///
/// Clones share the same underlying channel. Emission never fails: events
/// offered after the consumer has dropped its [`EventStream`] are discarded.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<TagEvent>,
}

impl EventSink {
    /// Deliver an event to the consumer.
    ///
    /// Waits for channel capacity if the consumer is behind. A closed
    /// channel (consumer gone) drops the event silently.
    pub async fn emit(&self, event: TagEvent) {
        if self.tx.send(event).await.is_err() {
            debug!("event dropped: consumer closed the stream");
        }
    }

    /// Returns `true` if the consuming half has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consuming half of the event channel.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<TagEvent>,
}

impl EventStream {
    /// Receive the next event.
    ///
    /// Returns `None` once every [`EventSink`] clone has been dropped and
    /// the buffer is drained, which marks the end of the run.
    pub async fn next(&mut self) -> Option<TagEvent> {
        self.rx.recv().await
    }
}

/// Create a bounded event channel.
///
/// # Panics
///
/// Panics if `capacity` is zero (tokio channel requirement).
///
/// # Examples
///
/// ```
/// use tagwatch_core::{TagEvent, event_channel};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (sink, mut stream) = event_channel(32);
/// sink.emit(TagEvent::Listening).await;
/// drop(sink);
///
/// assert_eq!(stream.next().await, Some(TagEvent::Listening));
/// assert_eq!(stream.next().await, None);
/// # }
/// ```
#[must_use]
pub fn event_channel(capacity: usize) -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSink { tx }, EventStream { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_reserved_is_zero() {
        let uid = TagUid::new(vec![0x01, 0x02, 0x03, 0x04]).unwrap();
        let detection = TagDetection::new(uid, Modulation::MIFARE);
        assert_eq!(detection.reserved, 0);
        assert_eq!(detection.uid_len(), 4);
        assert_eq!(detection.uid_hex(), "01020304");
    }

    #[test]
    fn test_event_serde_round_trip() {
        let uid = TagUid::new(vec![0x04, 0x9A, 0x3B, 0x01]).unwrap();
        let event = TagEvent::Detected(TagDetection::new(uid, Modulation::MIFARE));
        let json = serde_json::to_string(&event).unwrap();
        let back: TagEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[tokio::test]
    async fn test_events_arrive_in_emission_order() {
        let (sink, mut stream) = event_channel(8);

        sink.emit(TagEvent::Listening).await;
        sink.emit(TagEvent::Removed).await;
        sink.emit(TagEvent::Closed).await;
        drop(sink);

        assert_eq!(stream.next().await, Some(TagEvent::Listening));
        assert_eq!(stream.next().await, Some(TagEvent::Removed));
        assert_eq!(stream.next().await, Some(TagEvent::Closed));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn test_emit_after_consumer_gone_is_silent() {
        let (sink, stream) = event_channel(1);
        drop(stream);

        assert!(sink.is_closed());
        // Must not block or panic.
        sink.emit(TagEvent::Listening).await;
    }

    #[tokio::test]
    async fn test_sink_clones_share_the_stream() {
        let (sink, mut stream) = event_channel(8);
        let clone = sink.clone();

        clone.emit(TagEvent::Listening).await;
        drop(sink);
        drop(clone);

        assert_eq!(stream.next().await, Some(TagEvent::Listening));
        assert_eq!(stream.next().await, None);
    }
}
