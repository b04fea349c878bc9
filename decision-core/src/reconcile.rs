//! Solvency reconciliation
//!
//! The rule and risk stages evaluate each transaction against the payer's
//! *original* balance in isolation, so several transactions from one payer
//! can each pass individually while jointly overdrawing the account. This
//! stage restores conservation: it sums the committed spend of every payer
//! over their combined-approved transactions and, where that total exceeds
//! the opening balance, revokes **all** of the payer's combined approvals.
//!
//! Revocation is deliberately all-or-nothing per payer; no ordered partial
//! subset is admitted. This is the only stage with cross-transaction state,
//! and it requires a full pass over the batch before any final verdict.

use crate::types::{AccountId, AccountRegistry, CombinedDecision, FinalDecision};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Apply the solvency pass, preserving input order
pub fn reconcile_solvency(
    combined: &[CombinedDecision],
    accounts: &AccountRegistry,
) -> Vec<FinalDecision> {
    // Whole-batch reduction: committed spend per payer over combined
    // approvals.
    let mut committed: HashMap<&AccountId, Decimal> = HashMap::new();
    for decision in combined.iter().filter(|d| d.verdict) {
        *committed.entry(&decision.payer).or_insert(Decimal::ZERO) += decision.amount;
    }

    // Payers whose committed spend exceeds the opening balance. A payer
    // with no account record cannot be solvent for any committed amount.
    let overdrawn: HashSet<&AccountId> = committed
        .iter()
        .filter(|(payer, total)| match accounts.get(payer) {
            Some(account) => **total > account.balance,
            None => true,
        })
        .map(|(payer, _)| *payer)
        .collect();

    if !overdrawn.is_empty() {
        tracing::info!(
            "solvency reconciliation revoking approvals for {} payer(s)",
            overdrawn.len()
        );
    }

    combined
        .iter()
        .map(|decision| {
            let revoked = decision.verdict && overdrawn.contains(&decision.payer);
            FinalDecision {
                transaction_id: decision.transaction_id,
                payer: decision.payer.clone(),
                amount: decision.amount,
                combined_verdict: decision.verdict,
                revoked,
                verdict: decision.verdict && !revoked,
            }
        })
        .collect()
}
