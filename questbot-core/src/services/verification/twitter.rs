// questbot-core/src/services/verification/twitter.rs
//
// Twitter quest verification: follow / like / retweet, checked through
// the read API. A confirmed action is cached for 24h so retries and
// re-verification do not burn the monthly read budget. When the API is
// unavailable (rate limit, budget gone, transport trouble) the quest
// degrades to human review instead of failing the user.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use questbot_common::models::task::Task;
use questbot_common::models::twitter::TwitterVerification;
use questbot_common::models::user::User;
use questbot_common::models::verification::{
    parse_config, FailureReason, FollowupAction, QuestEvidence, TwitterAction, TwitterConfig,
    VerificationOutcome,
};
use questbot_common::traits::repository_traits::{TwitterVerificationRepository, UserRepository};
use questbot_common::Error;

use crate::platforms::twitter::{extract_tweet_id, TwitterApi, TwitterCheck};

pub struct TwitterQuest {
    api: Arc<dyn TwitterApi + Send + Sync>,
    cache_repo: Arc<dyn TwitterVerificationRepository + Send + Sync>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
}

impl TwitterQuest {
    pub fn new(
        api: Arc<dyn TwitterApi + Send + Sync>,
        cache_repo: Arc<dyn TwitterVerificationRepository + Send + Sync>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            api,
            cache_repo,
            user_repo,
        }
    }

    pub async fn verify(
        &self,
        user: &User,
        task: &Task,
        evidence: &QuestEvidence,
    ) -> Result<VerificationOutcome, Error> {
        let handle = evidence
            .twitter_username
            .as_deref()
            .or(user.twitter_username.as_deref())
            .map(|h| h.trim_start_matches('@').to_string())
            .filter(|h| !h.is_empty());
        let Some(handle) = handle else {
            return Ok(VerificationOutcome::failure(
                FailureReason::TwitterUsernameRequired,
                "Please provide your Twitter username first.",
            ));
        };

        let action = TwitterAction::from_task_type(&task.task_type);

        // Cache hit within the TTL skips the API entirely.
        if let Some(cached) = self
            .cache_repo
            .get_for_pair(user.user_id, task.task_id)
            .await?
        {
            if cached.action == action.as_str()
                && cached.twitter_username.eq_ignore_ascii_case(&handle)
                && cached.is_fresh(Utc::now())
            {
                info!(
                    "Twitter {} for @{} confirmed from cache",
                    action.as_str(),
                    handle
                );
                return Ok(VerificationOutcome::success(
                    success_message(action),
                    task.points_reward,
                ));
            }
        }

        let check = match action {
            TwitterAction::Follow => {
                let config: TwitterConfig = parse_config(task).unwrap_or_default();
                let target = config.target_username.unwrap_or_default();
                self.api.verify_follow(&handle, &target).await?
            }
            TwitterAction::Like | TwitterAction::Retweet => {
                let config: TwitterConfig = parse_config(task).unwrap_or_default();
                let tweet_id = config
                    .tweet_id
                    .or_else(|| task.url.as_deref().and_then(extract_tweet_id));
                let Some(tweet_id) = tweet_id else {
                    return Ok(VerificationOutcome::failure(
                        FailureReason::InvalidQuestConfig,
                        "This quest is missing its tweet id. Please contact an admin.",
                    ));
                };
                match action {
                    TwitterAction::Like => self.api.verify_like(&handle, &tweet_id).await?,
                    _ => self.api.verify_retweet(&handle, &tweet_id).await?,
                }
            }
        };

        match check {
            TwitterCheck::Confirmed => {
                let verification =
                    TwitterVerification::new(user.user_id, task.task_id, action.as_str(), &handle);
                self.cache_repo.upsert(&verification).await?;
                self.remember_handle(user, &handle).await;
                Ok(VerificationOutcome::success(
                    success_message(action),
                    task.points_reward,
                ))
            }
            TwitterCheck::NotConfirmed => Ok(VerificationOutcome::failure(
                negative_reason(action),
                negative_message(action),
            )),
            TwitterCheck::UserNotFound => Ok(VerificationOutcome::failure(
                FailureReason::TwitterUserNotFound,
                format!("Twitter user @{handle} was not found. Check the username and try again."),
            )),
            TwitterCheck::Unavailable => {
                warn!("Twitter API unavailable, routing task '{}' to manual review", task.title);
                Ok(VerificationOutcome::pending(
                    "Twitter verification is temporarily unavailable. \
                     Your submission was recorded and will be reviewed by an admin.",
                    FollowupAction::ManualReview,
                ))
            }
        }
    }

    /// Stores the confirmed handle on the user profile so the next quest
    /// does not ask for it again. Best effort.
    async fn remember_handle(&self, user: &User, handle: &str) {
        let mut updated = user.clone();
        updated.twitter_username = Some(handle.to_string());
        updated.twitter_verified = true;
        if let Err(e) = self.user_repo.update(&updated).await {
            warn!("Failed to store verified Twitter handle: {e}");
        }
    }
}

fn success_message(action: TwitterAction) -> &'static str {
    match action {
        TwitterAction::Follow => "Follow confirmed!",
        TwitterAction::Like => "Like confirmed!",
        TwitterAction::Retweet => "Retweet confirmed!",
    }
}

fn negative_reason(action: TwitterAction) -> FailureReason {
    match action {
        TwitterAction::Follow => FailureReason::NotFollowing,
        TwitterAction::Like => FailureReason::NotLiked,
        TwitterAction::Retweet => FailureReason::NotRetweeted,
    }
}

fn negative_message(action: TwitterAction) -> &'static str {
    match action {
        TwitterAction::Follow => "We couldn't confirm the follow yet. Follow the account and try again.",
        TwitterAction::Like => "We couldn't confirm the like yet. Like the tweet and try again.",
        TwitterAction::Retweet => "We couldn't confirm the retweet yet. Retweet and try again.",
    }
}
