//! Rule/risk verdict combination
//!
//! Joins the rule evaluator's and risk scorer's outputs on transaction id
//! and ANDs the verdicts. The two stages must enumerate the identical
//! transaction set; any id missing from either side, or duplicated on
//! either side, is an integrity error that aborts the run.

use crate::{
    error::{Error, Result},
    types::{CombinedDecision, RiskAssessment, RuleOutcome, TransactionId},
};
use std::collections::{HashMap, HashSet};

/// Combine rule and risk verdicts per transaction, preserving rule-stage
/// (input) order
pub fn combine_verdicts(
    rules: &[RuleOutcome],
    risks: &[RiskAssessment],
) -> Result<Vec<CombinedDecision>> {
    let mut risk_by_id: HashMap<TransactionId, &RiskAssessment> =
        HashMap::with_capacity(risks.len());
    for risk in risks {
        if risk_by_id.insert(risk.transaction_id, risk).is_some() {
            return Err(Error::DuplicateTransaction {
                transaction_id: risk.transaction_id,
                stage: "risk",
            });
        }
    }

    let mut seen: HashSet<TransactionId> = HashSet::with_capacity(rules.len());
    let mut combined = Vec::with_capacity(rules.len());

    for rule in rules {
        if !seen.insert(rule.transaction_id) {
            return Err(Error::DuplicateTransaction {
                transaction_id: rule.transaction_id,
                stage: "rule",
            });
        }

        let risk = risk_by_id
            .remove(&rule.transaction_id)
            .ok_or(Error::StageMismatch {
                transaction_id: rule.transaction_id,
                stage: "risk",
            })?;

        combined.push(CombinedDecision {
            transaction_id: rule.transaction_id,
            payer: rule.payer.clone(),
            amount: rule.amount,
            rule_verdict: rule.verdict,
            risk_verdict: risk.verdict,
            verdict: rule.verdict && risk.verdict,
        });
    }

    // Anything left was scored but never rule-evaluated.
    if let Some(id) = risk_by_id.keys().next() {
        return Err(Error::StageMismatch {
            transaction_id: *id,
            stage: "rule",
        });
    }

    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountId;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn rule(id: TransactionId, verdict: bool) -> RuleOutcome {
        RuleOutcome {
            transaction_id: id,
            payer: AccountId::new("ACC001"),
            amount: Decimal::from(100),
            verdict,
            failed_check: None,
        }
    }

    fn risk(id: TransactionId, verdict: bool) -> RiskAssessment {
        RiskAssessment {
            transaction_id: id,
            geo_score: 0.0,
            value_score: 0.0,
            time_score: 0.0,
            total_score: 0.0,
            verdict,
        }
    }

    fn tx_id() -> TransactionId {
        TransactionId::new(Uuid::new_v4())
    }

    #[test]
    fn test_and_semantics() {
        let (a, b, c, d) = (tx_id(), tx_id(), tx_id(), tx_id());
        let rules = vec![rule(a, true), rule(b, true), rule(c, false), rule(d, false)];
        let risks = vec![risk(a, true), risk(b, false), risk(c, true), risk(d, false)];

        let combined = combine_verdicts(&rules, &risks).unwrap();
        assert_eq!(
            combined.iter().map(|d| d.verdict).collect::<Vec<_>>(),
            vec![true, false, false, false]
        );
    }

    #[test]
    fn test_missing_risk_side_is_fatal() {
        let (a, b) = (tx_id(), tx_id());
        let rules = vec![rule(a, true), rule(b, true)];
        let risks = vec![risk(a, true)];

        let err = combine_verdicts(&rules, &risks).unwrap_err();
        assert!(matches!(
            err,
            Error::StageMismatch { stage: "risk", .. }
        ));
    }

    #[test]
    fn test_missing_rule_side_is_fatal() {
        let (a, b) = (tx_id(), tx_id());
        let rules = vec![rule(a, true)];
        let risks = vec![risk(a, true), risk(b, true)];

        let err = combine_verdicts(&rules, &risks).unwrap_err();
        assert!(matches!(
            err,
            Error::StageMismatch { stage: "rule", .. }
        ));
    }

    #[test]
    fn test_duplicate_id_is_fatal() {
        let a = tx_id();
        let rules = vec![rule(a, true), rule(a, true)];
        let risks = vec![risk(a, true)];

        let err = combine_verdicts(&rules, &risks).unwrap_err();
        assert!(matches!(err, Error::DuplicateTransaction { .. }));
    }
}
