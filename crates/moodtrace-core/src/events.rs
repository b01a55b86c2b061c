//! Event types emitted while a session accumulates detections.
//!
//! Events are published by the shared engine handle for consumption by
//! observers (live dashboards, log sinks) running beside the capture loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::EmotionLabel;

/// Unique identifier for an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies one session: the span between engine construction (or the last
/// reset) and the next reset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event emitted by a running session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    pub id: EventId,
    pub session_id: SessionId,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

impl SessionEvent {
    pub fn new(session_id: SessionId, payload: EventPayload) -> Self {
        Self {
            id: EventId::new(),
            session_id,
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// The event payload, tagged by type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event_type")]
pub enum EventPayload {
    /// A present detection was scored and folded into the session.
    DetectionRecorded {
        /// `None` when the detection carried no labels.
        dominant: Option<EmotionLabel>,
        confidence: f64,
        clarity: f64,
        total_detections: u64,
    },
    /// The classifier found no face; nothing was recorded.
    DetectionAbsent,
    /// The session was cleared and a new one started.
    SessionReset { cleared_detections: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_roundtrip() {
        let event = SessionEvent::new(
            SessionId::new(),
            EventPayload::DetectionRecorded {
                dominant: Some(EmotionLabel::Happy),
                confidence: 92.5,
                clarity: 40.0,
                total_detections: 3,
            },
        );

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: SessionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event.id, deserialized.id);
        assert_eq!(event.payload, deserialized.payload);
    }

    #[test]
    fn event_payload_tags() {
        let payload = EventPayload::SessionReset {
            cleared_detections: 12,
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"event_type\":\"SessionReset\""));
        assert!(json.contains("\"cleared_detections\":12"));
    }
}
