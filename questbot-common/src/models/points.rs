use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Earned,
    Spent,
    Bonus,
    Refund,
    Adjustment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Earned => "earned",
            TransactionType::Spent => "spent",
            TransactionType::Bonus => "bonus",
            TransactionType::Refund => "refund",
            TransactionType::Adjustment => "adjustment",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "spent" => TransactionType::Spent,
            "bonus" => TransactionType::Bonus,
            "refund" => TransactionType::Refund,
            "adjustment" => TransactionType::Adjustment,
            _ => TransactionType::Earned,
        }
    }

    /// Whether a positive amount of this type also grows the lifetime counter.
    pub fn counts_as_earned(&self) -> bool {
        matches!(
            self,
            TransactionType::Earned | TransactionType::Bonus | TransactionType::Refund
        )
    }
}

/// Immutable, append-only ledger row. The signed `amount` is positive for
/// credits and negative for debits.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PointsTransaction {
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub transaction_type: TransactionType,
    pub reference_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Denormalized running balance snapshot returned by ledger operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointsBalance {
    pub points: i64,
    pub total_earned_points: i64,
}
