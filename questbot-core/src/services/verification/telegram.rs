// questbot-core/src/services/verification/telegram.rs
//
// Telegram membership quests: the bot must be an admin of the target
// chat for `getChatMember` to answer. For join-group quests a short
// announcement is posted into the group; losing that message is fine.

use std::sync::Arc;

use tracing::warn;

use questbot_common::models::task::Task;
use questbot_common::models::user::User;
use questbot_common::models::verification::{
    parse_config, FailureReason, TelegramConfig, VerificationOutcome,
};
use questbot_common::Error;

use crate::platforms::telegram::TelegramApi;

pub struct TelegramQuest {
    api: Arc<dyn TelegramApi + Send + Sync>,
}

impl TelegramQuest {
    pub fn new(api: Arc<dyn TelegramApi + Send + Sync>) -> Self {
        Self { api }
    }

    pub async fn verify(&self, user: &User, task: &Task) -> Result<VerificationOutcome, Error> {
        let config: TelegramConfig = parse_config(task).unwrap_or_default();
        let Some(chat) = config.chat_ref() else {
            return Ok(VerificationOutcome::failure(
                FailureReason::InvalidQuestConfig,
                "This quest is missing its chat id. Please contact an admin.",
            ));
        };

        let member = match self.api.get_chat_member(&chat, user.telegram_id).await {
            Ok(m) => m,
            Err(e) => {
                warn!("getChatMember failed for chat {chat}: {e}");
                return Ok(VerificationOutcome::failure(
                    FailureReason::ExternalApiError,
                    "Telegram did not answer the membership check. Please try again later.",
                ));
            }
        };

        if !member.status.is_member() {
            return Ok(VerificationOutcome::failure(
                FailureReason::NotAMember,
                "You don't appear to be a member yet. Join and try again.",
            ));
        }

        // The API tells us who actually holds that telegram_id; a claimed
        // username that disagrees means someone is verifying someone else's
        // membership.
        if let (Some(api_username), Some(claimed)) =
            (member.username.as_deref(), user.username.as_deref())
        {
            if !api_username.eq_ignore_ascii_case(claimed) {
                return Ok(VerificationOutcome::failure(
                    FailureReason::UsernameMismatch,
                    "The Telegram username on your profile doesn't match this account.",
                ));
            }
        }

        if config.announces_on_join() {
            let who = user
                .username
                .as_deref()
                .map(|u| format!("@{u}"))
                .or_else(|| user.first_name.clone())
                .unwrap_or_else(|| "A new member".to_string());
            let text = format!("{who} just completed the quest '{}'. Welcome!", task.title);
            if let Err(e) = self.api.send_message(&chat, &text).await {
                warn!("Join announcement failed for chat {chat}: {e}");
            }
        }

        Ok(VerificationOutcome::success(
            "Membership confirmed!",
            task.points_reward,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::telegram::client::MockTelegramApi;
    use crate::platforms::telegram::{ChatMemberInfo, ChatMemberStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn join_task() -> Task {
        let now = Utc::now();
        Task {
            task_id: Uuid::new_v4(),
            title: "join".to_string(),
            description: None,
            task_type: "telegram_join_group".to_string(),
            platform: None,
            url: None,
            points_reward: 15,
            is_bonus: false,
            is_active: true,
            verification_required: true,
            verification_data: Some(
                serde_json::json!({"chat_id": "-100500", "chat_type": "join_group"}),
            ),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn member_check_passes_the_configured_chat() {
        let user = User::new(42, Some("alice"), None, None);
        let mut api = MockTelegramApi::new();
        api.expect_get_chat_member()
            .withf(|chat, telegram_id| chat == "-100500" && *telegram_id == 42)
            .times(1)
            .returning(|_, _| {
                Ok(ChatMemberInfo {
                    status: ChatMemberStatus::Member,
                    username: Some("alice".to_string()),
                })
            });
        api.expect_send_message().times(1).returning(|_, _| Ok(()));

        let quest = TelegramQuest::new(std::sync::Arc::new(api));
        let outcome = quest.verify(&user, &join_task()).await.unwrap();
        assert!(!outcome.is_failure());
    }

    #[tokio::test]
    async fn kicked_users_are_not_members() {
        let user = User::new(42, None, None, None);
        let mut api = MockTelegramApi::new();
        api.expect_get_chat_member().returning(|_, _| {
            Ok(ChatMemberInfo {
                status: ChatMemberStatus::Kicked,
                username: None,
            })
        });
        api.expect_send_message().never();

        let quest = TelegramQuest::new(std::sync::Arc::new(api));
        match quest.verify(&user, &join_task()).await.unwrap() {
            VerificationOutcome::Failure { reason, .. } => {
                assert_eq!(reason, FailureReason::NotAMember)
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
