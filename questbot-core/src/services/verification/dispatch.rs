// questbot-core/src/services/verification/dispatch.rs
//
// Maps a task onto the strategy that verifies it. Pure and total:
// every task resolves to exactly one strategy, unknown types fall
// through to Generic (auto-success, for "visit a website" style quests
// with nothing to check).

use questbot_common::models::task::Task;
use questbot_common::models::verification::{
    parse_config, TelegramConfig, TimeDelayCodeConfig, TwitterAction, TwitterConfig,
    YouTubeCodeConfig,
};
use questbot_common::Error;
use url::Url;

use crate::platforms::twitter::extract_tweet_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Twitter,
    Telegram,
    YouTubeCode,
    TimeDelayCode,
    DailyCheckin,
    ManualReview,
    Generic,
}

/// First matching predicate wins; the order is load-bearing (a
/// `twitter_follow` task with `platform = "telegram"` is still Twitter).
pub fn resolve(task: &Task) -> StrategyKind {
    let task_type = task.task_type.as_str();

    if task_type.starts_with("twitter_") {
        return StrategyKind::Twitter;
    }
    if task_type.starts_with("telegram_") || task_type == "telegram" || task.platform_is("telegram")
    {
        return StrategyKind::Telegram;
    }
    if task_type == "youtube" || task_type == "youtube_watch" {
        return match task.verification_method() {
            Some("time_delay_code") => StrategyKind::TimeDelayCode,
            Some("video_code") | Some("youtube_code") => StrategyKind::YouTubeCode,
            _ => StrategyKind::Generic,
        };
    }
    if task_type == "daily_checkin" {
        return StrategyKind::DailyCheckin;
    }
    if task_type == "manual_review" {
        return StrategyKind::ManualReview;
    }
    StrategyKind::Generic
}

/// Checks the typed strategy config when a quest is created, so a broken
/// quest is refused up front instead of failing every user at runtime.
pub fn validate_config(task: &Task) -> Result<(), Error> {
    if let Some(raw) = task.url.as_deref() {
        let parsed = Url::parse(raw)
            .map_err(|e| Error::Validation(format!("task '{}': bad url: {e}", task.title)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Validation(format!(
                "task '{}': url must be http(s)",
                task.title
            )));
        }
    }
    match resolve(task) {
        StrategyKind::Twitter => {
            let config: TwitterConfig = parse_config(task).unwrap_or_default();
            match TwitterAction::from_task_type(&task.task_type) {
                TwitterAction::Like | TwitterAction::Retweet => {
                    let has_tweet = config.tweet_id.is_some()
                        || task.url.as_deref().and_then(extract_tweet_id).is_some();
                    if !has_tweet {
                        return Err(Error::Validation(format!(
                            "task '{}' needs a tweet_id or a status URL",
                            task.title
                        )));
                    }
                }
                TwitterAction::Follow => {}
            }
            Ok(())
        }
        StrategyKind::Telegram => {
            let config: TelegramConfig = parse_config(task).unwrap_or_default();
            if config.chat_ref().is_none() {
                return Err(Error::Validation(format!(
                    "task '{}' needs a chat_id or channel_username",
                    task.title
                )));
            }
            Ok(())
        }
        StrategyKind::YouTubeCode => {
            let config: YouTubeCodeConfig = parse_config(task)?;
            if config.verification_code.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "task '{}' has an empty verification_code",
                    task.title
                )));
            }
            Ok(())
        }
        StrategyKind::TimeDelayCode => {
            let config: TimeDelayCodeConfig = parse_config(task)?;
            if config.verification_code.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "task '{}' has an empty verification_code",
                    task.title
                )));
            }
            if config.min_watch_time_seconds <= 0 || config.max_attempts <= 0 {
                return Err(Error::Validation(format!(
                    "task '{}' has non-positive watch time or attempt limits",
                    task.title
                )));
            }
            Ok(())
        }
        StrategyKind::DailyCheckin | StrategyKind::ManualReview | StrategyKind::Generic => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn task_of(task_type: &str, platform: Option<&str>, data: Option<serde_json::Value>) -> Task {
        let now = Utc::now();
        Task {
            task_id: Uuid::new_v4(),
            title: "t".to_string(),
            description: None,
            task_type: task_type.to_string(),
            platform: platform.map(String::from),
            url: None,
            points_reward: 10,
            is_bonus: false,
            is_active: true,
            verification_required: true,
            verification_data: data,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn twitter_prefix_wins_over_platform() {
        let t = task_of("twitter_follow", Some("telegram"), None);
        assert_eq!(resolve(&t), StrategyKind::Twitter);
    }

    #[test]
    fn telegram_by_type_or_platform() {
        assert_eq!(
            resolve(&task_of("telegram_join_group", None, None)),
            StrategyKind::Telegram
        );
        assert_eq!(resolve(&task_of("telegram", None, None)), StrategyKind::Telegram);
        assert_eq!(
            resolve(&task_of("join_channel", Some("Telegram"), None)),
            StrategyKind::Telegram
        );
    }

    #[test]
    fn youtube_sub_dispatches_on_method() {
        let timed = task_of(
            "youtube_watch",
            None,
            Some(serde_json::json!({"method": "time_delay_code", "verification_code": "X"})),
        );
        assert_eq!(resolve(&timed), StrategyKind::TimeDelayCode);

        let instant = task_of(
            "youtube",
            None,
            Some(serde_json::json!({"method": "video_code", "verification_code": "X"})),
        );
        assert_eq!(resolve(&instant), StrategyKind::YouTubeCode);

        let alias = task_of(
            "youtube",
            None,
            Some(serde_json::json!({"method": "youtube_code", "verification_code": "X"})),
        );
        assert_eq!(resolve(&alias), StrategyKind::YouTubeCode);

        // No method configured: nothing to check, auto-success.
        assert_eq!(resolve(&task_of("youtube", None, None)), StrategyKind::Generic);
    }

    #[test]
    fn every_task_type_resolves() {
        for tt in [
            "daily_checkin",
            "manual_review",
            "website_visit",
            "",
            "TWITTER_FOLLOW",
            "some_future_type",
        ] {
            // must not panic, whatever the type
            let _ = resolve(&task_of(tt, None, None));
        }
        assert_eq!(
            resolve(&task_of("daily_checkin", None, None)),
            StrategyKind::DailyCheckin
        );
        assert_eq!(
            resolve(&task_of("manual_review", None, None)),
            StrategyKind::ManualReview
        );
        assert_eq!(
            resolve(&task_of("website_visit", None, None)),
            StrategyKind::Generic
        );
    }

    #[test]
    fn config_validation_catches_broken_quests() {
        // Telegram without any chat reference.
        let t = task_of("telegram_join_group", None, None);
        assert!(validate_config(&t).is_err());
        let t = task_of(
            "telegram_join_group",
            None,
            Some(serde_json::json!({"chat_id": "-100123"})),
        );
        assert!(validate_config(&t).is_ok());

        // Like quest with no tweet anywhere.
        let t = task_of("twitter_like", None, None);
        assert!(validate_config(&t).is_err());
        let mut t = task_of("twitter_like", None, None);
        t.url = Some("https://x.com/acct/status/42".to_string());
        assert!(validate_config(&t).is_ok());

        // Timed code with a zero attempt budget.
        let t = task_of(
            "youtube_watch",
            None,
            Some(serde_json::json!({
                "method": "time_delay_code",
                "verification_code": "A",
                "max_attempts": 0
            })),
        );
        assert!(validate_config(&t).is_err());

        // Generic quests need no config at all.
        assert!(validate_config(&task_of("website_visit", None, None)).is_ok());

        // But a garbage url is refused regardless of type.
        let mut t = task_of("website_visit", None, None);
        t.url = Some("notaurl".to_string());
        assert!(validate_config(&t).is_err());
    }
}
