//! Deterministic rule checks
//!
//! Checks run in a fixed order per transaction, stopping at the first
//! failure:
//!
//! 1. Balance: opening balance must cover the amount
//! 2. Method limit: the amount must not exceed the payer's limit for the
//!    transaction's payment method
//!
//! A payer id that does not resolve to a registered account fails closed
//! (`RuleCheck::UnknownPayer`); it is never treated as an approval. A
//! resolved account with no limit configured for the method is an integrity
//! error and aborts the run.
//!
//! Pure function of (transactions, account registry); every transaction is
//! evaluated against the *original* opening balance. Joint overdraw by
//! multiple transactions of one payer is handled later, by the solvency
//! reconciler.

use crate::{
    error::{Error, Result},
    types::{AccountRegistry, RuleCheck, RuleOutcome, Transaction},
};

/// Evaluate the rule checks for a full batch, preserving input order
pub fn evaluate_rules(
    transactions: &[Transaction],
    accounts: &AccountRegistry,
) -> Result<Vec<RuleOutcome>> {
    let mut outcomes = Vec::with_capacity(transactions.len());

    for tx in transactions {
        let failed_check = match accounts.get(&tx.payer) {
            None => {
                tracing::warn!(
                    "transaction {} references unknown payer {}, failing closed",
                    tx.id,
                    tx.payer
                );
                Some(RuleCheck::UnknownPayer)
            }
            Some(account) => {
                if account.balance < tx.amount {
                    Some(RuleCheck::Balance)
                } else {
                    let limit = account.limits.limit_for(tx.method).ok_or_else(|| {
                        Error::MissingLimit {
                            account: account.id.clone(),
                            method: tx.method,
                        }
                    })?;

                    if tx.amount > limit {
                        Some(RuleCheck::MethodLimit)
                    } else {
                        None
                    }
                }
            }
        };

        outcomes.push(RuleOutcome {
            transaction_id: tx.id,
            payer: tx.payer.clone(),
            amount: tx.amount,
            verdict: failed_check.is_none(),
            failed_check,
        });
    }

    Ok(outcomes)
}
