// questbot-core/src/services/redemption.rs
//
// Reward redemption. Stock is claimed before the debit; if the debit
// refuses, the claim is released.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use questbot_common::models::notification::Notification;
use questbot_common::models::points::{PointsBalance, TransactionType};
use questbot_common::models::reward::UserReward;
use questbot_common::models::user::User;
use questbot_common::models::verification::FailureReason;
use questbot_common::traits::repository_traits::{
    NotificationRepository, RewardRepository, UserRewardRepository,
};
use questbot_common::Error;

use crate::services::ledger::PointsLedger;
use crate::utils::generate_redemption_code;

pub enum RedemptionOutcome {
    Redeemed {
        user_reward: UserReward,
        balance: PointsBalance,
    },
    Refused {
        reason: FailureReason,
        message: String,
    },
}

pub struct RedemptionService {
    reward_repo: Arc<dyn RewardRepository + Send + Sync>,
    user_reward_repo: Arc<dyn UserRewardRepository + Send + Sync>,
    notification_repo: Arc<dyn NotificationRepository + Send + Sync>,
    ledger: PointsLedger,
}

impl RedemptionService {
    pub fn new(
        reward_repo: Arc<dyn RewardRepository + Send + Sync>,
        user_reward_repo: Arc<dyn UserRewardRepository + Send + Sync>,
        notification_repo: Arc<dyn NotificationRepository + Send + Sync>,
        ledger: PointsLedger,
    ) -> Self {
        Self {
            reward_repo,
            user_reward_repo,
            notification_repo,
            ledger,
        }
    }

    pub async fn redeem(&self, user: &User, reward_id: Uuid) -> Result<RedemptionOutcome, Error> {
        let reward = self
            .reward_repo
            .get(reward_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("reward {reward_id} not found")))?;

        if !reward.is_active {
            return Ok(RedemptionOutcome::Refused {
                reason: FailureReason::RewardNotAvailable,
                message: "This reward is no longer available.".to_string(),
            });
        }

        if !self.reward_repo.claim_stock(reward_id).await? {
            return Ok(RedemptionOutcome::Refused {
                reason: FailureReason::RewardNotAvailable,
                message: "This reward is out of stock.".to_string(),
            });
        }

        let balance = self
            .ledger
            .debit(
                user.user_id,
                reward.points_cost,
                TransactionType::Spent,
                Some(reward.reward_id),
                Some(&format!("Redeemed: {}", reward.title)),
            )
            .await?;
        let Some(balance) = balance else {
            if let Err(e) = self.reward_repo.release_stock(reward_id).await {
                error!("Failed to release claimed stock for reward {reward_id}: {e}");
            }
            return Ok(RedemptionOutcome::Refused {
                reason: FailureReason::InsufficientPoints,
                message: format!(
                    "You need {} points to redeem '{}'.",
                    reward.points_cost, reward.title
                ),
            });
        };

        let code = generate_redemption_code(reward.code_prefix.as_deref());
        let user_reward = UserReward::new(user.user_id, reward.reward_id, code);
        self.user_reward_repo.insert(&user_reward).await?;

        info!(
            "User {} redeemed '{}' for {} points",
            user.user_id, reward.title, reward.points_cost
        );

        let notification = Notification::new(
            user.user_id,
            "Reward redeemed",
            &format!(
                "You redeemed '{}'. Your code: {}",
                reward.title, user_reward.redemption_code
            ),
            "reward_redemption",
        );
        if let Err(e) = self.notification_repo.insert(&notification).await {
            warn!("Failed to insert redemption notification: {e}");
        }

        Ok(RedemptionOutcome::Redeemed {
            user_reward,
            balance,
        })
    }
}
