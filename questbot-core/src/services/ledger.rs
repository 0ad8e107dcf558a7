// questbot-core/src/services/ledger.rs
//
// Points ledger: the only path through which balances change. Every
// movement is a signed, append-only transaction row applied atomically
// with the balance update by the repository.

use std::sync::Arc;

use uuid::Uuid;

use questbot_common::models::points::{PointsBalance, PointsTransaction, TransactionType};
use questbot_common::traits::repository_traits::LedgerRepository;
use questbot_common::Error;

#[derive(Clone)]
pub struct PointsLedger {
    ledger_repo: Arc<dyn LedgerRepository + Send + Sync>,
}

impl PointsLedger {
    pub fn new(ledger_repo: Arc<dyn LedgerRepository + Send + Sync>) -> Self {
        Self { ledger_repo }
    }

    /// Adds `amount` (>= 0) to the user's balance. Earning types also grow
    /// the lifetime counter.
    pub async fn credit(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        reference_id: Option<Uuid>,
        description: Option<&str>,
    ) -> Result<PointsBalance, Error> {
        if amount < 0 {
            return Err(Error::Validation(format!(
                "credit amount must be non-negative, got {amount}"
            )));
        }
        self.ledger_repo
            .apply(user_id, amount, transaction_type, reference_id, description)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {user_id} not found")))
    }

    /// Removes `amount` (>= 0) from the user's balance. Returns `None`
    /// when the balance is insufficient; nothing is written in that case.
    pub async fn debit(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        reference_id: Option<Uuid>,
        description: Option<&str>,
    ) -> Result<Option<PointsBalance>, Error> {
        if amount < 0 {
            return Err(Error::Validation(format!(
                "debit amount must be non-negative, got {amount}"
            )));
        }
        self.ledger_repo
            .apply(user_id, -amount, transaction_type, reference_id, description)
            .await
    }

    pub async fn history(&self, user_id: Uuid) -> Result<Vec<PointsTransaction>, Error> {
        self.ledger_repo.list_for_user(user_id).await
    }

    pub async fn total_points_distributed(&self) -> Result<i64, Error> {
        self.ledger_repo.total_points_distributed().await
    }
}
