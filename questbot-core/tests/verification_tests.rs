mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use common::{failure_reason, harness, make_task, make_user, Harness};
use questbot_common::models::user_task::UserTaskStatus;
use questbot_common::models::verification::{
    FailureReason, FollowupAction, QuestEvidence, VerificationOutcome,
};
use questbot_common::models::video_view::{VideoView, VideoViewStatus};
use questbot_core::platforms::telegram::ChatMemberStatus;
use questbot_core::platforms::twitter::TwitterCheck;
use questbot_core::services::verification::{TwitterQuest, WatchSession};
use questbot_core::test_utils::{InMemoryStore, ScriptedTelegram, ScriptedTwitter};

fn default_harness() -> Harness {
    harness(
        Arc::new(ScriptedTwitter::answering(TwitterCheck::Confirmed)),
        Arc::new(ScriptedTelegram::member(ChatMemberStatus::Member, None)),
    )
}

#[tokio::test]
async fn generic_quest_awards_points_exactly_once() {
    let h = default_harness();
    let user = make_user(1001, Some("alice"));
    let task = make_task("website_visit", 50, None);
    h.store.add_user(&user);
    h.store.add_task(&task);

    let evidence = QuestEvidence::default();
    let (outcome, balance) = h.engine.verify(&user, &task, &evidence).await.unwrap();
    assert!(matches!(
        outcome,
        VerificationOutcome::Success {
            points_awarded: 50,
            ..
        }
    ));
    assert_eq!(balance.unwrap().points, 50);

    // A second claim is refused and moves no points.
    let (again, balance) = h.engine.verify(&user, &task, &evidence).await.unwrap();
    assert_eq!(failure_reason(&again), Some(FailureReason::AlreadyCompleted));
    assert!(balance.is_none());
    assert_eq!(h.store.transaction_count(), 1);
    assert_eq!(h.store.user(user.user_id).unwrap().points, 50);
}

#[tokio::test]
async fn banned_users_and_inactive_tasks_are_refused() {
    let h = default_harness();
    let mut user = make_user(1002, None);
    user.is_banned = true;
    let task = make_task("website_visit", 10, None);

    let (outcome, _) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert_eq!(failure_reason(&outcome), Some(FailureReason::UserBanned));

    user.is_banned = false;
    let mut inactive = task.clone();
    inactive.is_active = false;
    let (outcome, _) = h
        .engine
        .verify(&user, &inactive, &QuestEvidence::default())
        .await
        .unwrap();
    assert_eq!(failure_reason(&outcome), Some(FailureReason::TaskInactive));
}

#[tokio::test]
async fn daily_checkin_is_once_per_utc_date() {
    let h = default_harness();
    let user = make_user(1003, None);
    let task = make_task("daily_checkin", 5, None);
    h.store.add_user(&user);

    let (first, _) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert!(!first.is_failure());

    let (second, _) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert_eq!(
        failure_reason(&second),
        Some(FailureReason::AlreadyCheckedInToday)
    );

    // Backdate yesterday's check-in past the UTC midnight boundary.
    let mut record = h.store.user_task_for(user.user_id, task.task_id).unwrap();
    record.completed_at = Some(Utc::now() - Duration::days(1));
    h.store.put_user_task(&record);

    let (third, _) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert!(!third.is_failure());
    assert_eq!(h.store.transaction_count(), 2);
}

#[tokio::test]
async fn daily_checkin_window_is_the_utc_calendar_date() {
    let h = default_harness();
    let user = make_user(1017, None);
    let task = make_task("daily_checkin", 5, None);
    h.store.add_user(&user);

    let (first, _) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert!(!first.is_failure());

    // 23:59:59 yesterday is another calendar date, however close to
    // midnight: a new check-in goes through.
    let today = Utc::now().date_naive();
    let just_before_midnight = today
        .pred_opt()
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap()
        .and_utc();
    let mut record = h.store.user_task_for(user.user_id, task.task_id).unwrap();
    record.completed_at = Some(just_before_midnight);
    h.store.put_user_task(&record);

    let (second, _) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert!(!second.is_failure());

    // 00:00:01 today is the same calendar date: refused.
    let just_after_midnight = today.and_hms_opt(0, 0, 1).unwrap().and_utc();
    let mut record = h.store.user_task_for(user.user_id, task.task_id).unwrap();
    record.completed_at = Some(just_after_midnight);
    h.store.put_user_task(&record);

    let (third, _) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert_eq!(
        failure_reason(&third),
        Some(FailureReason::AlreadyCheckedInToday)
    );
}

#[tokio::test]
async fn instant_video_code_is_case_insensitive() {
    let h = default_harness();
    let user = make_user(1004, None);
    let task = make_task(
        "youtube_watch",
        25,
        Some(serde_json::json!({"method": "video_code", "verification_code": "SECRET42"})),
    );
    h.store.add_user(&user);

    let no_code = QuestEvidence::default();
    let (outcome, _) = h.engine.verify(&user, &task, &no_code).await.unwrap();
    assert_eq!(failure_reason(&outcome), Some(FailureReason::CodeRequired));

    let wrong = QuestEvidence {
        code: Some("nope".to_string()),
        ..Default::default()
    };
    let (outcome, _) = h.engine.verify(&user, &task, &wrong).await.unwrap();
    assert_eq!(failure_reason(&outcome), Some(FailureReason::WrongCode));

    let right = QuestEvidence {
        code: Some("secret42".to_string()),
        ..Default::default()
    };
    let (outcome, balance) = h.engine.verify(&user, &task, &right).await.unwrap();
    assert!(!outcome.is_failure());
    assert_eq!(balance.unwrap().points, 25);
}

fn timed_task(points: i64) -> questbot_common::models::task::Task {
    make_task(
        "youtube_watch",
        points,
        Some(serde_json::json!({
            "method": "time_delay_code",
            "verification_code": "ALPHA",
            "min_watch_time_seconds": 120,
            "max_attempts": 3
        })),
    )
}

/// Plants an open session that started `seconds_ago` in the past.
fn plant_session(store: &InMemoryStore, user_id: Uuid, task_id: Uuid, seconds_ago: i64) {
    let mut view = VideoView::start(user_id, task_id);
    view.started_at = Utc::now() - Duration::seconds(seconds_ago);
    store.add_video_view(&view);
}

#[tokio::test]
async fn timed_code_rejects_early_submissions_with_remaining_seconds() {
    let h = default_harness();
    let user = make_user(1005, None);
    let task = timed_task(30);
    h.store.add_user(&user);

    let session = h.engine.start_video_session(&user, &task).await.unwrap();
    assert!(matches!(session, WatchSession::Open(_)));
    // Restarting reuses the open session instead of resetting the clock.
    let again = h.engine.start_video_session(&user, &task).await.unwrap();
    match (session, again) {
        (WatchSession::Open(a), WatchSession::Open(b)) => {
            assert_eq!(a.video_view_id, b.video_view_id)
        }
        _ => panic!("expected open sessions"),
    }

    let evidence = QuestEvidence {
        code: Some("ALPHA".to_string()),
        ..Default::default()
    };
    let (outcome, _) = h.engine.verify(&user, &task, &evidence).await.unwrap();
    match outcome {
        VerificationOutcome::Failure { reason, message } => {
            assert_eq!(reason, FailureReason::TooSoon);
            assert!(message.contains("seconds"), "message was: {message}");
        }
        other => panic!("expected too_soon, got {other:?}"),
    }

    // The early submission still burned an attempt.
    let view = h.store.latest_view(user.user_id, task.task_id).unwrap();
    assert_eq!(view.code_attempts, 1);
}

#[tokio::test]
async fn timed_code_enforces_the_attempt_ceiling() {
    let h = default_harness();
    let user = make_user(1006, None);
    let task = timed_task(30);
    h.store.add_user(&user);
    plant_session(&h.store, user.user_id, task.task_id, 600);

    let wrong = QuestEvidence {
        code: Some("BETA".to_string()),
        ..Default::default()
    };
    for _ in 0..2 {
        let (outcome, _) = h.engine.verify(&user, &task, &wrong).await.unwrap();
        assert_eq!(failure_reason(&outcome), Some(FailureReason::WrongCode));
        let view = h.store.latest_view(user.user_id, task.task_id).unwrap();
        assert_eq!(view.status, VideoViewStatus::Watching);
    }

    // The third wrong submission consumes the last attempt and kills
    // the session right there.
    let (outcome, _) = h.engine.verify(&user, &task, &wrong).await.unwrap();
    assert_eq!(failure_reason(&outcome), Some(FailureReason::MaxAttempts));
    let view = h.store.latest_view(user.user_id, task.task_id).unwrap();
    assert_eq!(view.status, VideoViewStatus::Failed);
    assert_eq!(view.code_attempts, 3);

    // And the failure is sticky for later submissions and restarts,
    // even with the right code.
    let right = QuestEvidence {
        code: Some("ALPHA".to_string()),
        ..Default::default()
    };
    let (outcome, _) = h.engine.verify(&user, &task, &right).await.unwrap();
    assert_eq!(failure_reason(&outcome), Some(FailureReason::MaxAttempts));
    assert!(matches!(
        h.engine.start_video_session(&user, &task).await.unwrap(),
        WatchSession::Exhausted
    ));
    assert_eq!(h.store.transaction_count(), 0);
}

#[tokio::test]
async fn early_submissions_can_exhaust_the_attempts() {
    let h = default_harness();
    let user = make_user(1016, None);
    let task = timed_task(30);
    h.store.add_user(&user);
    plant_session(&h.store, user.user_id, task.task_id, 10);

    // Too-early submissions burn attempts; the last one is terminal.
    let evidence = QuestEvidence {
        code: Some("ALPHA".to_string()),
        ..Default::default()
    };
    for _ in 0..2 {
        let (outcome, _) = h.engine.verify(&user, &task, &evidence).await.unwrap();
        assert_eq!(failure_reason(&outcome), Some(FailureReason::TooSoon));
    }
    let (outcome, _) = h.engine.verify(&user, &task, &evidence).await.unwrap();
    assert_eq!(failure_reason(&outcome), Some(FailureReason::MaxAttempts));
    let view = h.store.latest_view(user.user_id, task.task_id).unwrap();
    assert_eq!(view.status, VideoViewStatus::Failed);
}

#[tokio::test]
async fn timed_code_succeeds_after_minimum_watch_time() {
    let h = default_harness();
    let user = make_user(1007, None);
    let task = timed_task(30);
    h.store.add_user(&user);
    plant_session(&h.store, user.user_id, task.task_id, 300);

    let evidence = QuestEvidence {
        code: Some("alpha".to_string()),
        ..Default::default()
    };
    let (outcome, balance) = h.engine.verify(&user, &task, &evidence).await.unwrap();
    assert!(!outcome.is_failure());
    assert_eq!(balance.unwrap().points, 30);
    let view = h.store.latest_view(user.user_id, task.task_id).unwrap();
    assert_eq!(view.status, VideoViewStatus::Completed);
}

#[tokio::test]
async fn timed_code_without_a_session_is_refused() {
    let h = default_harness();
    let user = make_user(1008, None);
    let task = timed_task(30);
    h.store.add_user(&user);

    let evidence = QuestEvidence {
        code: Some("ALPHA".to_string()),
        ..Default::default()
    };
    let (outcome, _) = h.engine.verify(&user, &task, &evidence).await.unwrap();
    assert_eq!(
        failure_reason(&outcome),
        Some(FailureReason::NoActiveSession)
    );
}

#[tokio::test]
async fn twitter_unavailability_degrades_to_manual_review() {
    let h = harness(
        Arc::new(ScriptedTwitter::answering(TwitterCheck::Unavailable)),
        Arc::new(ScriptedTelegram::member(ChatMemberStatus::Member, None)),
    );
    let user = make_user(1009, None);
    let task = make_task("twitter_follow", 40, None);
    h.store.add_user(&user);

    let evidence = QuestEvidence {
        twitter_username: Some("@alice".to_string()),
        ..Default::default()
    };
    let (outcome, balance) = h.engine.verify(&user, &task, &evidence).await.unwrap();
    match outcome {
        VerificationOutcome::Pending {
            requires_followup, ..
        } => assert_eq!(requires_followup, FollowupAction::ManualReview),
        other => panic!("expected pending, got {other:?}"),
    }
    assert!(balance.is_none());
    assert_eq!(h.store.transaction_count(), 0);

    let record = h.store.user_task_for(user.user_id, task.task_id).unwrap();
    assert_eq!(record.status, UserTaskStatus::Submitted);
}

#[tokio::test]
async fn twitter_requires_a_handle_and_maps_negative_answers() {
    let api = Arc::new(ScriptedTwitter::answering(TwitterCheck::NotConfirmed));
    let h = harness(
        api.clone(),
        Arc::new(ScriptedTelegram::member(ChatMemberStatus::Member, None)),
    );
    let user = make_user(1010, None);
    let task = make_task("twitter_follow", 40, None);
    h.store.add_user(&user);

    // No handle anywhere: refused before any API call.
    let (outcome, _) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert_eq!(
        failure_reason(&outcome),
        Some(FailureReason::TwitterUsernameRequired)
    );
    assert_eq!(api.call_count(), 0);

    let evidence = QuestEvidence {
        twitter_username: Some("alice".to_string()),
        ..Default::default()
    };
    let (outcome, _) = h.engine.verify(&user, &task, &evidence).await.unwrap();
    assert_eq!(failure_reason(&outcome), Some(FailureReason::NotFollowing));
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn twitter_cache_short_circuits_repeat_checks() {
    let api = Arc::new(ScriptedTwitter::answering(TwitterCheck::Confirmed));
    let store = Arc::new(InMemoryStore::new());
    let user = make_user(1011, None);
    store.add_user(&user);
    let task = make_task("twitter_follow", 40, None);

    let quest = TwitterQuest::new(api.clone(), store.clone(), store.clone());
    let evidence = QuestEvidence {
        twitter_username: Some("alice".to_string()),
        ..Default::default()
    };

    let first = quest.verify(&user, &task, &evidence).await.unwrap();
    assert!(!first.is_failure());
    assert_eq!(api.call_count(), 1);

    // Second check inside the 24h window never reaches the API.
    let second = quest.verify(&user, &task, &evidence).await.unwrap();
    assert!(!second.is_failure());
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn telegram_membership_succeeds_and_announces_join() {
    let api = Arc::new(ScriptedTelegram::member(
        ChatMemberStatus::Member,
        Some("alice"),
    ));
    let h = harness(
        Arc::new(ScriptedTwitter::answering(TwitterCheck::Confirmed)),
        api.clone(),
    );
    let user = make_user(1012, Some("Alice"));
    let task = make_task(
        "telegram_join_group",
        20,
        Some(serde_json::json!({"chat_id": "-100777", "chat_type": "Join_Group"})),
    );
    h.store.add_user(&user);

    let (outcome, balance) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert!(!outcome.is_failure());
    assert_eq!(balance.unwrap().points, 20);
    assert_eq!(api.sent_count(), 1);
}

#[tokio::test]
async fn telegram_announcement_failure_is_swallowed() {
    let api = Arc::new(
        ScriptedTelegram::member(ChatMemberStatus::Member, None).with_failing_send(),
    );
    let h = harness(
        Arc::new(ScriptedTwitter::answering(TwitterCheck::Confirmed)),
        api,
    );
    let user = make_user(1013, None);
    let task = make_task(
        "telegram_join_group",
        20,
        Some(serde_json::json!({"chat_id": "-100777", "chat_type": "join_group"})),
    );
    h.store.add_user(&user);

    let (outcome, _) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert!(!outcome.is_failure());
}

#[tokio::test]
async fn telegram_refusals_and_faults() {
    let user = make_user(1014, Some("alice"));
    let data = serde_json::json!({"channel_username": "questchannel"});

    // Not a member.
    let h = harness(
        Arc::new(ScriptedTwitter::answering(TwitterCheck::Confirmed)),
        Arc::new(ScriptedTelegram::member(ChatMemberStatus::Left, None)),
    );
    h.store.add_user(&user);
    let task = make_task("telegram_join_channel", 20, Some(data.clone()));
    let (outcome, _) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert_eq!(failure_reason(&outcome), Some(FailureReason::NotAMember));

    // Username mismatch: the id belongs to somebody else.
    let h = harness(
        Arc::new(ScriptedTwitter::answering(TwitterCheck::Confirmed)),
        Arc::new(ScriptedTelegram::member(
            ChatMemberStatus::Member,
            Some("mallory"),
        )),
    );
    h.store.add_user(&user);
    let (outcome, _) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert_eq!(
        failure_reason(&outcome),
        Some(FailureReason::UsernameMismatch)
    );

    // API down: expected failure, not an Err.
    let h = harness(
        Arc::new(ScriptedTwitter::answering(TwitterCheck::Confirmed)),
        Arc::new(ScriptedTelegram::unreachable()),
    );
    h.store.add_user(&user);
    let (outcome, _) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert_eq!(
        failure_reason(&outcome),
        Some(FailureReason::ExternalApiError)
    );

    // Config without any chat reference.
    let h = harness(
        Arc::new(ScriptedTwitter::answering(TwitterCheck::Confirmed)),
        Arc::new(ScriptedTelegram::member(ChatMemberStatus::Member, None)),
    );
    h.store.add_user(&user);
    let broken = make_task("telegram_join_group", 20, None);
    let (outcome, _) = h
        .engine
        .verify(&user, &broken, &QuestEvidence::default())
        .await
        .unwrap();
    assert_eq!(
        failure_reason(&outcome),
        Some(FailureReason::InvalidQuestConfig)
    );
}

#[tokio::test]
async fn manual_review_requires_proof_and_parks_the_submission() {
    let h = default_harness();
    let user = make_user(1015, None);
    let task = make_task("manual_review", 100, None);
    h.store.add_user(&user);

    let (outcome, _) = h
        .engine
        .verify(&user, &task, &QuestEvidence::default())
        .await
        .unwrap();
    assert_eq!(failure_reason(&outcome), Some(FailureReason::ProofRequired));

    let evidence = QuestEvidence {
        submission_text: Some("done, see https://example.com/proof/9".to_string()),
        ..Default::default()
    };
    let (outcome, balance) = h.engine.verify(&user, &task, &evidence).await.unwrap();
    match outcome {
        VerificationOutcome::Pending {
            requires_followup, ..
        } => assert_eq!(requires_followup, FollowupAction::AdminApproval),
        other => panic!("expected pending, got {other:?}"),
    }
    assert!(balance.is_none());

    let record = h.store.user_task_for(user.user_id, task.task_id).unwrap();
    assert_eq!(record.status, UserTaskStatus::Submitted);
    assert_eq!(
        record.proof_url.as_deref(),
        Some("https://example.com/proof/9")
    );
}
