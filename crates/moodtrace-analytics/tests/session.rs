//! End-to-end behaviour of a session: ingestion, queries, reset, and shared use
//! across tasks.

use std::collections::{HashMap, HashSet};
use std::thread;

use tokio::sync::broadcast::error::TryRecvError;

use moodtrace_analytics::{ConfidenceRating, SessionEngine, SharedSessionEngine};
use moodtrace_core::events::{EventPayload, SessionId};
use moodtrace_core::{ClassifierOutput, Detection, EmotionLabel};

fn detection(scores: &[(EmotionLabel, f64)]) -> Detection {
    Detection::from_scores(scores.iter().copied())
}

/// Every query an empty session answers, gathered for comparison.
fn observe(engine: &SessionEngine) -> String {
    format!(
        "{} {:?} {:?} {} {} {:?} {:?}",
        engine.total_detections(),
        engine.average_emotions(),
        engine.non_neutral_emotion_averages(),
        engine.average_confidence(),
        engine.average_clarity(),
        engine.dominant_emotion_histogram(),
        engine.summary(),
    )
}

#[test]
fn fresh_and_reset_sessions_are_indistinguishable() {
    let fresh = SessionEngine::new();
    let mut used = SessionEngine::new();
    used.record(Some(&detection(&[(EmotionLabel::Happy, 88.0), (EmotionLabel::Sad, 4.0)])));
    used.record(Some(&Detection::new()));
    used.record(None);
    used.reset();

    assert_eq!(observe(&fresh), observe(&used));
}

#[test]
fn count_invariant_holds_over_mixed_input() {
    let mut engine = SessionEngine::new();
    let inputs = [
        Some(detection(&[(EmotionLabel::Happy, 60.0), (EmotionLabel::Neutral, 30.0)])),
        None,
        Some(Detection::new()),
        Some(detection(&[(EmotionLabel::Fear, 100.0)])),
        None,
        Some(detection(&[(EmotionLabel::Angry, 50.0), (EmotionLabel::Happy, 50.0)])),
    ];

    for input in &inputs {
        engine.record(input.as_ref());
        let total = engine.total_detections() as usize;
        assert_eq!(engine.confidence_scores().len(), total);
        assert_eq!(engine.clarity_scores().len(), total);
        assert_eq!(engine.dominant_history().len(), total);
    }

    assert_eq!(engine.total_detections(), 4);
    assert_eq!(engine.samples(EmotionLabel::Happy).len(), 2);
    assert_eq!(engine.samples(EmotionLabel::Fear).len(), 1);
    assert_eq!(engine.samples(EmotionLabel::Surprise).len(), 0);
    assert!(engine
        .confidence_scores()
        .iter()
        .all(|c| (45.0..=100.0).contains(c)));
}

#[test]
fn literal_scoring_cases() {
    let mut engine = SessionEngine::new();

    let neutral = engine
        .record(Some(&detection(&[
            (EmotionLabel::Neutral, 100.0),
            (EmotionLabel::Happy, 0.0),
            (EmotionLabel::Fear, 0.0),
            (EmotionLabel::Sad, 0.0),
            (EmotionLabel::Disgust, 0.0),
            (EmotionLabel::Angry, 0.0),
            (EmotionLabel::Surprise, 0.0),
        ])))
        .unwrap();
    assert!((neutral.confidence - 100.0).abs() < 1e-9);

    let fear = engine
        .record(Some(&detection(&[(EmotionLabel::Fear, 100.0)])))
        .unwrap();
    assert!((fear.confidence - 45.0).abs() < 1e-9);

    let clear = engine
        .record(Some(&detection(&[
            (EmotionLabel::Happy, 70.0),
            (EmotionLabel::Sad, 50.0),
            (EmotionLabel::Neutral, 10.0),
        ])))
        .unwrap();
    assert!((clear.clarity - 20.0).abs() < 1e-9);

    let tie = engine
        .record(Some(&detection(&[(EmotionLabel::Angry, 50.0), (EmotionLabel::Happy, 50.0)])))
        .unwrap();
    assert_eq!(tie.dominant_label(), Some(EmotionLabel::Angry));
}

#[test]
fn rating_thresholds() {
    assert_eq!(SessionEngine::confidence_rating(80.0).as_str(), "Very High");
    assert_eq!(SessionEngine::confidence_rating(79.999).as_str(), "High");
    assert_eq!(SessionEngine::confidence_rating(20.0).as_str(), "Low");
    assert_eq!(SessionEngine::confidence_rating(19.999).as_str(), "Very Low");
}

#[test]
fn reset_clears_all_averages() {
    let mut engine = SessionEngine::new();
    for i in 0..10 {
        engine.record(Some(&detection(&[
            (EmotionLabel::Happy, 10.0 * i as f64),
            (EmotionLabel::Neutral, 100.0 - 10.0 * i as f64),
        ])));
    }
    assert_eq!(engine.total_detections(), 10);

    engine.reset();

    assert_eq!(engine.total_detections(), 0);
    assert_eq!(engine.average_confidence(), 0.0);
    assert_eq!(engine.average_clarity(), 0.0);
    assert!(engine.average_emotions().values().all(|&v| v == 0.0));
    assert!(engine.non_neutral_emotion_averages().values().all(|&v| v == 0.0));
    assert!(engine.dominant_emotion_histogram().most_frequent().is_none());
}

#[test]
fn classifier_output_feeds_engine() {
    let frames = [
        r#"[{"emotion": {"happy": 92.0, "neutral": 6.0, "sad": 2.0}, "dominant_emotion": "happy"}]"#,
        "null",
        "[]",
        r#"{"neutral": 75.0, "surprise": 25.0}"#,
    ];

    let mut engine = SessionEngine::new();
    for frame in frames {
        let detection = ClassifierOutput::from_json_str(frame)
            .unwrap()
            .into_detection()
            .unwrap();
        engine.record(detection.as_ref());
    }

    let summary = engine.summary().unwrap();
    assert_eq!(summary.total_detections, 2);
    assert_eq!(summary.emotion_averages[0].emotion, EmotionLabel::Happy);
    assert!((summary.average_clarity - ((92.0 - 6.0) + (75.0 - 25.0)) / 2.0).abs() < 1e-9);
    assert_eq!(summary.confidence_rating, ConfidenceRating::VeryHigh);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_see_partial_records() {
    let shared = SharedSessionEngine::new();

    let writer = {
        let shared = shared.clone();
        tokio::spawn(async move {
            for i in 0..500u32 {
                let score = f64::from(i % 100);
                shared.record(Some(&Detection::from_scores([
                    (EmotionLabel::Happy, score),
                    (EmotionLabel::Neutral, 100.0 - score),
                ])));
                if i % 97 == 0 {
                    shared.reset();
                }
                tokio::task::yield_now().await;
            }
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let shared = shared.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    shared.read(|engine| {
                        let total = engine.total_detections() as usize;
                        assert_eq!(engine.confidence_scores().len(), total);
                        assert_eq!(engine.clarity_scores().len(), total);
                        assert_eq!(engine.dominant_history().len(), total);
                        assert_eq!(engine.samples(EmotionLabel::Happy).len(), total);
                    });
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }

    // Last reset followed the record at i = 485; records 486..=499 remain.
    assert_eq!(shared.total_detections(), 14);
}

#[tokio::test]
async fn subscribers_receive_events_in_order() {
    let shared = SharedSessionEngine::new();
    let mut rx = shared.subscribe();

    shared.record(Some(&Detection::new().with(EmotionLabel::Sad, 80.0)));
    shared.record(None);
    shared.reset();

    let first = rx.recv().await.unwrap();
    assert!(matches!(
        first.payload,
        EventPayload::DetectionRecorded {
            dominant: Some(EmotionLabel::Sad),
            total_detections: 1,
            ..
        }
    ));
    assert_eq!(rx.recv().await.unwrap().payload, EventPayload::DetectionAbsent);
    assert_eq!(
        rx.recv().await.unwrap().payload,
        EventPayload::SessionReset {
            cleared_detections: 1
        }
    );
}

#[test]
fn concurrent_events_follow_engine_order() {
    let shared = SharedSessionEngine::new();
    let mut rx = shared.subscribe();
    let mut ended: HashSet<SessionId> = HashSet::new();
    let mut recorded: HashMap<SessionId, u64> = HashMap::new();
    let mut events = 0u64;

    for _ in 0..200 {
        thread::scope(|s| {
            s.spawn(|| {
                for i in 0..50u32 {
                    let score = f64::from(i);
                    shared.record(Some(&Detection::new().with(EmotionLabel::Happy, score)));
                }
            });
            s.spawn(|| {
                for _ in 0..10 {
                    shared.reset();
                }
            });
        });

        // 60 events per round stay well under the channel capacity.
        loop {
            let event = match rx.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => break,
                Err(e) => panic!("subscriber fell behind: {e}"),
            };
            events += 1;
            assert!(
                !ended.contains(&event.session_id),
                "event for a session that was already reset: {event:?}"
            );
            match event.payload {
                EventPayload::DetectionRecorded {
                    total_detections, ..
                } => {
                    let count = recorded.entry(event.session_id).or_insert(0);
                    *count += 1;
                    assert_eq!(total_detections, *count);
                }
                EventPayload::SessionReset { cleared_detections } => {
                    let count = recorded.get(&event.session_id).copied().unwrap_or(0);
                    assert_eq!(cleared_detections, count);
                    ended.insert(event.session_id);
                }
                EventPayload::DetectionAbsent => {}
            }
        }
    }

    assert_eq!(events, 200 * 60);
}
