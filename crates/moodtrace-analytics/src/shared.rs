//! Thread-safe handle for driving one session from several tasks.
//!
//! A capture task records detections while other tasks read statistics.
//! `record` and `reset` hold the write lock for their whole duration,
//! including publishing their event, so a reader never observes sequences of
//! inconsistent length and subscribers never see events out of order. Queries
//! share the read lock. Clone is cheap (inner Arc).

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;

use moodtrace_core::events::{EventPayload, SessionEvent, SessionId};
use moodtrace_core::{Detection, EmotionLabel};

use crate::engine::SessionEngine;
use crate::histogram::DominantHistogram;
use crate::scoring::ObservationScore;
use crate::summary::SessionSummary;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct SharedSessionEngine {
    inner: Arc<RwLock<SessionEngine>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for SharedSessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedSessionEngine {
    pub fn new() -> Self {
        Self::with_engine(SessionEngine::new())
    }

    /// Share an existing engine, keeping whatever it has accumulated.
    pub fn with_engine(engine: SessionEngine) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(engine)),
            events,
        }
    }

    /// Receive every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Record a detection atomically and publish the outcome.
    ///
    /// The event is sent before the write lock is released, so subscribers see
    /// events in the same order the engine applied them.
    pub fn record(&self, detection: Option<&Detection>) -> Option<ObservationScore> {
        let mut engine = self.write();
        let observation = engine.record(detection);
        let payload = match observation {
            Some(score) => EventPayload::DetectionRecorded {
                dominant: score.dominant_label(),
                confidence: score.confidence,
                clarity: score.clarity,
                total_detections: engine.total_detections(),
            },
            None => EventPayload::DetectionAbsent,
        };
        self.publish(SessionEvent::new(engine.session_id(), payload));
        observation
    }

    /// Clear the session atomically. Returns the number of detections discarded.
    pub fn reset(&self) -> u64 {
        let mut engine = self.write();
        let previous = engine.session_id();
        let cleared = engine.reset();
        self.publish(SessionEvent::new(
            previous,
            EventPayload::SessionReset {
                cleared_detections: cleared,
            },
        ));
        cleared
    }

    /// Run several queries against one consistent snapshot.
    pub fn read<R>(&self, f: impl FnOnce(&SessionEngine) -> R) -> R {
        let engine = self.read_guard();
        f(&*engine)
    }

    pub fn session_id(&self) -> SessionId {
        self.read(SessionEngine::session_id)
    }

    pub fn total_detections(&self) -> u64 {
        self.read(SessionEngine::total_detections)
    }

    pub fn average_emotions(&self) -> BTreeMap<EmotionLabel, f64> {
        self.read(SessionEngine::average_emotions)
    }

    pub fn non_neutral_emotion_averages(&self) -> BTreeMap<EmotionLabel, f64> {
        self.read(SessionEngine::non_neutral_emotion_averages)
    }

    pub fn average_confidence(&self) -> f64 {
        self.read(SessionEngine::average_confidence)
    }

    pub fn average_clarity(&self) -> f64 {
        self.read(SessionEngine::average_clarity)
    }

    pub fn dominant_emotion_histogram(&self) -> DominantHistogram {
        self.read(SessionEngine::dominant_emotion_histogram)
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        self.read(SessionEngine::summary)
    }

    // Called with the write guard held; `broadcast::Sender::send` never blocks.
    fn publish(&self, event: SessionEvent) {
        // No subscribers is the normal case when nobody is watching.
        if self.events.send(event).is_err() {
            tracing::trace!("Session event dropped, no subscribers");
        }
    }

    // Every mutation completes before its guard drops, so a poisoned lock
    // still guards consistent state.
    fn read_guard(&self) -> RwLockReadGuard<'_, SessionEngine> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionEngine> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
