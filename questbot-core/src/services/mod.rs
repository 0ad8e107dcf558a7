// questbot-core/src/services/mod.rs

pub mod completion;
pub mod ledger;
pub mod redemption;
pub mod user_service;
pub mod verification;

pub use completion::CompletionRecorder;
pub use ledger::PointsLedger;
pub use redemption::{RedemptionOutcome, RedemptionService};
pub use user_service::UserService;
pub use verification::VerificationEngine;
