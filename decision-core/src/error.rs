//! Error types for the decision core

use crate::types::{AccountId, PaymentMethod, TransactionId};
use thiserror::Error;

/// Result type for decision-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Decision pipeline errors
///
/// Every variant is an integrity error: the batch is internally inconsistent
/// and the run must halt rather than emit partial decisions. Missing
/// reference data (unknown payer or region) is deliberately *not* an error;
/// it fails closed inside the rule evaluator instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A transaction id present in one stage's output is missing from
    /// another it must join with
    #[error("transaction {transaction_id} missing from {stage} output")]
    StageMismatch {
        /// The unmatched transaction
        transaction_id: TransactionId,
        /// The stage whose output lacks the id
        stage: &'static str,
    },

    /// A transaction id appears more than once in a derived table
    #[error("duplicate transaction {transaction_id} in {stage} output")]
    DuplicateTransaction {
        /// The duplicated transaction
        transaction_id: TransactionId,
        /// The table containing the duplicate
        stage: &'static str,
    },

    /// A resolved payer account has no limit configured for the
    /// transaction's payment method
    #[error("account {account} has no {method} limit configured")]
    MissingLimit {
        /// The payer account
        account: AccountId,
        /// The unconfigured payment method
        method: PaymentMethod,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
