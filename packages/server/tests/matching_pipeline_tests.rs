//! End-to-end tests of the matching pipeline wired from the in-memory test
//! doubles: queue -> matching pass -> circle factory -> store + push.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};

use circle_core::domains::circles::models::MatchFoundNotification;
use circle_core::domains::circles::CircleFactory;
use circle_core::domains::matching::engine::MatchingService;
use circle_core::domains::matching::models::{ComfortLevel, EmotionalTheme, MatchRequest};
use circle_core::domains::matching::queue::{BaseMatchQueue, TestMatchQueue};
use circle_core::domains::midnight::{midnight_theme_for, ExpirySweeper};
use circle_core::kernel::{
    FixedClock, MockVoiceService, TestCircleStore, TestPushChannel,
};

const MIN_CIRCLE_SIZE: usize = 3;
const MAX_CIRCLE_SIZE: usize = 4;

struct Pipeline {
    queue: Arc<TestMatchQueue>,
    store: Arc<TestCircleStore>,
    voice: Arc<MockVoiceService>,
    push: Arc<TestPushChannel>,
    matching: MatchingService,
}

fn pipeline_at(now: NaiveDateTime) -> Pipeline {
    let queue = Arc::new(TestMatchQueue::new());
    let store = Arc::new(TestCircleStore::new());
    let voice = Arc::new(MockVoiceService::new());
    let push = Arc::new(TestPushChannel::new());

    let factory = CircleFactory::new(
        store.clone(),
        voice.clone(),
        push.clone(),
        Arc::new(FixedClock::new(now)),
        MIN_CIRCLE_SIZE,
        MAX_CIRCLE_SIZE,
    );
    let matching = MatchingService::new(
        queue.clone(),
        factory,
        MIN_CIRCLE_SIZE,
        MAX_CIRCLE_SIZE,
    );

    Pipeline {
        queue,
        store,
        voice,
        push,
        matching,
    }
}

fn afternoon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 10)
        .unwrap()
        .and_hms_opt(15, 0, 0)
        .unwrap()
}

fn late_night() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 10)
        .unwrap()
        .and_hms_opt(23, 30, 0)
        .unwrap()
}

fn request(session_id: &str, theme: EmotionalTheme, intensity: i32) -> MatchRequest {
    MatchRequest {
        session_id: session_id.to_string(),
        theme,
        intensity,
        comfort_level: ComfortLevel::SharingSometimes,
        timezone: "UTC".to_string(),
        duration: 20,
        enqueued_at: Utc::now(),
    }
}

async fn enqueue(pipeline: &Pipeline, requests: &[MatchRequest]) {
    for request in requests {
        pipeline.queue.enqueue(request).await.unwrap();
    }
}

#[tokio::test]
async fn test_compatible_trio_forms_one_circle_and_empties_queue() {
    let p = pipeline_at(afternoon());
    enqueue(
        &p,
        &[
            request("a", EmotionalTheme::Anxiety, 5),
            request("b", EmotionalTheme::Anxiety, 6),
            request("c", EmotionalTheme::Anxiety, 7),
        ],
    )
    .await;

    p.matching.run_matching_pass().await;

    let circles = p.store.circles();
    assert_eq!(circles.len(), 1);
    assert_eq!(circles[0].theme, "anxiety");
    assert_eq!(circles[0].status, "waiting");
    assert_eq!(circles[0].participants, vec!["a", "b", "c"]);
    assert!(p.queue.is_empty());
}

#[tokio::test]
async fn test_intensity_outlier_blocks_the_whole_bucket() {
    // The anxiety bucket has three members, but one is 15 intensity points
    // away from the anchor: after refinement only two remain, below the
    // minimum, so no circle forms and everyone stays queued.
    let p = pipeline_at(afternoon());
    enqueue(
        &p,
        &[
            request("a", EmotionalTheme::Anxiety, 5),
            request("b", EmotionalTheme::Anxiety, 6),
            request("c", EmotionalTheme::Anxiety, 20),
            request("d", EmotionalTheme::Loneliness, 5),
        ],
    )
    .await;

    p.matching.run_matching_pass().await;

    assert_eq!(p.store.circle_count(), 0);
    assert_eq!(p.queue.len(), 4);
    assert_eq!(p.push.publish_count(), 0);
}

#[tokio::test]
async fn test_under_minimum_demand_does_nothing() {
    let p = pipeline_at(afternoon());
    enqueue(
        &p,
        &[
            request("a", EmotionalTheme::Anxiety, 5),
            request("b", EmotionalTheme::Anxiety, 5),
        ],
    )
    .await;

    p.matching.run_matching_pass().await;

    assert_eq!(p.store.circle_count(), 0);
    assert_eq!(p.queue.len(), 2);
}

#[tokio::test]
async fn test_no_session_is_matched_twice_in_one_pass() {
    let p = pipeline_at(afternoon());
    let requests: Vec<MatchRequest> = (0..8)
        .map(|i| request(&format!("s{}", i), EmotionalTheme::Anxiety, 5))
        .collect();
    enqueue(&p, &requests).await;

    p.matching.run_matching_pass().await;

    let circles = p.store.circles();
    assert_eq!(circles.len(), 2);

    let mut seen: Vec<&str> = circles
        .iter()
        .flat_map(|c| c.participants.iter().map(String::as_str))
        .collect();
    let total = seen.len();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), total, "a session appeared in two circles");
    assert_eq!(total, 8);
    assert!(p.queue.is_empty());
}

#[tokio::test]
async fn test_each_participant_is_notified_exactly_once() {
    let p = pipeline_at(afternoon());
    enqueue(
        &p,
        &[
            request("a", EmotionalTheme::Grief, 4),
            request("b", EmotionalTheme::Grief, 4),
            request("c", EmotionalTheme::Grief, 4),
        ],
    )
    .await;

    p.matching.run_matching_pass().await;

    assert_eq!(p.push.publish_count(), 3);
    for session_id in ["a", "b", "c"] {
        let subject = format!("sessions.{}.match_found", session_id);
        let messages = p.push.messages_for_subject(&subject);
        assert_eq!(messages.len(), 1, "expected one notification on {}", subject);

        let notification: MatchFoundNotification =
            p.push.deserialize_message(&messages[0]).unwrap();
        assert_eq!(notification.theme, "grief");
        assert_eq!(notification.participant_count, 3);
    }
}

#[tokio::test]
async fn test_persistence_failure_leaves_members_queued() {
    let p = pipeline_at(afternoon());
    p.store.set_fail_inserts(true);
    enqueue(
        &p,
        &[
            request("a", EmotionalTheme::Anxiety, 5),
            request("b", EmotionalTheme::Anxiety, 6),
            request("c", EmotionalTheme::Anxiety, 7),
        ],
    )
    .await;

    p.matching.run_matching_pass().await;

    assert_eq!(p.store.circle_count(), 0);
    assert_eq!(p.queue.len(), 3, "members must stay eligible for retry");
    assert_eq!(p.push.publish_count(), 0);

    // Next pass succeeds once the store recovers
    p.store.set_fail_inserts(false);
    p.matching.run_matching_pass().await;

    assert_eq!(p.store.circle_count(), 1);
    assert!(p.queue.is_empty());
}

#[tokio::test]
async fn test_one_failing_theme_does_not_block_others() {
    // Loneliness refines below minimum; grief still gets its circle.
    let p = pipeline_at(afternoon());
    enqueue(
        &p,
        &[
            request("l1", EmotionalTheme::Loneliness, 1),
            request("l2", EmotionalTheme::Loneliness, 9),
            request("l3", EmotionalTheme::Loneliness, 5),
            request("g1", EmotionalTheme::Grief, 5),
            request("g2", EmotionalTheme::Grief, 5),
            request("g3", EmotionalTheme::Grief, 5),
        ],
    )
    .await;

    p.matching.run_matching_pass().await;

    let circles = p.store.circles();
    assert_eq!(circles.len(), 1);
    assert_eq!(circles[0].theme, "grief");
    assert_eq!(p.queue.len(), 3);
}

#[tokio::test]
async fn test_midnight_group_gets_special_theme_and_sunrise_expiry() {
    let now = late_night();
    let p = pipeline_at(now);
    enqueue(
        &p,
        &[
            request("a", EmotionalTheme::Loneliness, 5),
            request("b", EmotionalTheme::Loneliness, 6),
            request("c", EmotionalTheme::Loneliness, 7),
        ],
    )
    .await;

    p.matching.run_matching_pass().await;

    let circles = p.store.circles();
    assert_eq!(circles.len(), 1);
    assert_eq!(circles[0].circle_type, "midnight");
    assert_eq!(circles[0].theme, midnight_theme_for(now));
    assert_eq!(
        circles[0].auto_delete_at,
        Some(
            NaiveDate::from_ymd_opt(2025, 6, 11)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap()
        )
    );
}

#[tokio::test]
async fn test_voice_outage_still_produces_a_joinable_circle() {
    let p = pipeline_at(afternoon());
    p.voice.set_fail(true);
    enqueue(
        &p,
        &[
            request("a", EmotionalTheme::Overwhelm, 5),
            request("b", EmotionalTheme::Overwhelm, 5),
            request("c", EmotionalTheme::Overwhelm, 5),
        ],
    )
    .await;

    p.matching.run_matching_pass().await;

    let circles = p.store.circles();
    assert_eq!(circles.len(), 1);
    assert_eq!(circles[0].voice_app_id, "placeholder_app_id");
    assert!(p.queue.is_empty());
    assert_eq!(p.push.publish_count(), 3);
}

#[tokio::test]
async fn test_submit_triggers_an_immediate_pass() {
    let p = pipeline_at(afternoon());
    enqueue(
        &p,
        &[
            request("a", EmotionalTheme::Anxiety, 5),
            request("b", EmotionalTheme::Anxiety, 5),
        ],
    )
    .await;

    // The third join completes the group without waiting for the backstop
    p.matching
        .submit_match_request(request("c", EmotionalTheme::Anxiety, 5))
        .await
        .unwrap();

    assert_eq!(p.store.circle_count(), 1);
    assert!(p.queue.is_empty());
}

#[tokio::test]
async fn test_queue_position_is_one_based() {
    let p = pipeline_at(afternoon());
    enqueue(
        &p,
        &[
            request("a", EmotionalTheme::Anxiety, 5),
            request("b", EmotionalTheme::Grief, 5),
        ],
    )
    .await;

    assert_eq!(p.matching.queue_position("a").await.unwrap(), 1);
    assert_eq!(p.matching.queue_position("b").await.unwrap(), 2);
    assert_eq!(p.matching.queue_position("missing").await.unwrap(), -1);

    p.matching.withdraw_match_request("a").await.unwrap();
    assert_eq!(p.matching.queue_position("b").await.unwrap(), 1);
}

#[tokio::test]
async fn test_matched_midnight_circle_is_swept_after_sunrise() {
    let now = late_night();
    let p = pipeline_at(now);
    enqueue(
        &p,
        &[
            request("a", EmotionalTheme::Loneliness, 5),
            request("b", EmotionalTheme::Loneliness, 6),
            request("c", EmotionalTheme::Loneliness, 7),
        ],
    )
    .await;

    p.matching.run_matching_pass().await;
    assert_eq!(p.store.circle_count(), 1);
    let circle_id = p.store.circles()[0].circle_id.clone();

    // Past sunrise the sweeper deletes the circle and its summaries
    let after_sunrise = NaiveDate::from_ymd_opt(2025, 6, 11)
        .unwrap()
        .and_hms_opt(7, 0, 0)
        .unwrap();
    let sweeper = ExpirySweeper::new(p.store.clone(), Arc::new(FixedClock::new(after_sunrise)));
    sweeper.sweep_expired_midnight_circles().await;

    assert_eq!(p.store.circle_count(), 0);
    assert_eq!(p.store.deleted_summary_ids(), vec![circle_id]);
}
