// questbot-core/src/services/verification/manual.rs

use questbot_common::models::task::Task;
use questbot_common::models::verification::{
    FailureReason, FollowupAction, QuestEvidence, VerificationOutcome,
};
use questbot_common::Error;

use crate::utils::extract_url;

/// Quests a machine cannot check: the user hands in proof, an admin
/// approves or rejects it later.
pub struct ManualReviewQuest;

impl ManualReviewQuest {
    pub async fn verify(
        &self,
        task: &Task,
        evidence: &QuestEvidence,
    ) -> Result<VerificationOutcome, Error> {
        let text = evidence
            .submission_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let proof = evidence
            .proof_url
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .or_else(|| text.and_then(extract_url));

        if proof.is_none() && text.is_none() {
            return Ok(VerificationOutcome::failure(
                FailureReason::ProofRequired,
                "Please attach proof (a link or a short description) for this quest.",
            ));
        }

        Ok(VerificationOutcome::pending(
            format!(
                "Your submission for '{}' was received and is awaiting admin review.",
                task.title
            ),
            FollowupAction::AdminApproval,
        ))
    }
}
