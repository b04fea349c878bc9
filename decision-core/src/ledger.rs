//! Closing-balance projection
//!
//! For each payer, `new_balance = max(0, opening − Σ final-approved
//! outgoing amounts)`. Accounts with no final-approved outgoing
//! transactions keep their opening balance. The clamp is a balance floor,
//! not a transaction re-evaluation; individual transactions are never
//! dropped here.

use crate::types::{AccountBalance, AccountId, AccountRegistry, FinalDecision};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Project closing balances for every account, sorted by account id
pub fn project_balances(
    finals: &[FinalDecision],
    accounts: &AccountRegistry,
) -> Vec<AccountBalance> {
    let mut spent: HashMap<&AccountId, Decimal> = HashMap::new();
    for decision in finals.iter().filter(|d| d.verdict) {
        *spent.entry(&decision.payer).or_insert(Decimal::ZERO) += decision.amount;
    }

    let mut balances: Vec<AccountBalance> = accounts
        .iter()
        .map(|account| {
            let debit = spent.get(&account.id).copied().unwrap_or(Decimal::ZERO);
            AccountBalance {
                account_id: account.id.clone(),
                balance: (account.balance - debit).max(Decimal::ZERO),
            }
        })
        .collect();

    balances.sort_by(|a, b| a.account_id.cmp(&b.account_id));
    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Account, MethodLimits, RegionId, TransactionId};
    use uuid::Uuid;

    fn account(id: &str, balance: i64) -> Account {
        Account {
            id: AccountId::new(id),
            region: RegionId::new("SP"),
            balance: Decimal::from(balance),
            limits: MethodLimits::shared(Decimal::from(1_000)),
        }
    }

    fn approved(payer: &str, amount: i64) -> FinalDecision {
        FinalDecision {
            transaction_id: TransactionId::new(Uuid::new_v4()),
            payer: AccountId::new(payer),
            amount: Decimal::from(amount),
            combined_verdict: true,
            revoked: false,
            verdict: true,
        }
    }

    #[test]
    fn test_approved_debits_applied() {
        let registry = AccountRegistry::from_accounts(&[account("A", 500)]);
        let finals = vec![approved("A", 120), approved("A", 80)];

        let balances = project_balances(&finals, &registry);
        assert_eq!(balances[0].balance, Decimal::from(300));
    }

    #[test]
    fn test_untouched_account_keeps_balance() {
        let registry = AccountRegistry::from_accounts(&[account("A", 500), account("B", 50)]);
        let finals = vec![approved("A", 100)];

        let balances = project_balances(&finals, &registry);
        assert_eq!(balances[0].account_id, AccountId::new("A"));
        assert_eq!(balances[0].balance, Decimal::from(400));
        assert_eq!(balances[1].balance, Decimal::from(50));
    }

    #[test]
    fn test_revoked_decision_is_not_a_debit() {
        let registry = AccountRegistry::from_accounts(&[account("A", 500)]);
        let finals = vec![FinalDecision {
            verdict: false,
            revoked: true,
            ..approved("A", 100)
        }];

        let balances = project_balances(&finals, &registry);
        assert_eq!(balances[0].balance, Decimal::from(500));
    }

    #[test]
    fn test_balance_floored_at_zero() {
        // Exercises the floor directly, bypassing the reconciler.
        let registry = AccountRegistry::from_accounts(&[account("A", 100)]);
        let finals = vec![approved("A", 150)];

        let balances = project_balances(&finals, &registry);
        assert_eq!(balances[0].balance, Decimal::ZERO);
    }

    #[test]
    fn test_output_sorted_by_account_id() {
        let registry = AccountRegistry::from_accounts(&[
            account("C", 1),
            account("A", 2),
            account("B", 3),
        ]);
        let balances = project_balances(&[], &registry);
        let ids: Vec<&str> = balances.iter().map(|b| b.account_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }
}
