//! Pipeline orchestration
//!
//! Stages run strictly forward over a fully materialized batch:
//!
//! ```text
//! rules ─┐
//!        ├─ combine ─ reconcile ─ project balances
//! risk ──┘
//! ```
//!
//! Each stage is a pure batch-wide transform producing a new derived table,
//! consumed read-only by the next stage. Integrity errors abort the run
//! before any downstream stage executes. Re-running on identical inputs
//! yields an identical report.

use crate::{
    combine::combine_verdicts,
    config::PipelineConfig,
    error::{Error, Result},
    ledger::project_balances,
    reconcile::reconcile_solvency,
    rules::evaluate_rules,
    scoring::RiskScorer,
    types::{
        Account, AccountBalance, AccountRegistry, CombinedDecision, FinalDecision, Region,
        RegionTable, RiskAssessment, RuleOutcome, Transaction, TransactionId,
    },
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A fully materialized input batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    /// Transactions to decide
    pub transactions: Vec<Transaction>,

    /// Account registry relation
    pub accounts: Vec<Account>,

    /// Region reference relation
    pub regions: Vec<Region>,
}

/// One derived table per pipeline stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Rule-stage verdicts
    pub rule_outcomes: Vec<RuleOutcome>,

    /// Risk-stage assessments
    pub risk_assessments: Vec<RiskAssessment>,

    /// Combined rule ∧ risk decisions
    pub combined_decisions: Vec<CombinedDecision>,

    /// Final decisions after solvency reconciliation
    pub final_decisions: Vec<FinalDecision>,

    /// Projected closing balances for every account
    pub closing_balances: Vec<AccountBalance>,
}

impl BatchReport {
    /// Transaction ids with a final approval, in batch order
    pub fn approved_ids(&self) -> Vec<TransactionId> {
        self.final_decisions
            .iter()
            .filter(|d| d.verdict)
            .map(|d| d.transaction_id)
            .collect()
    }
}

/// The multi-stage decision pipeline
pub struct DecisionPipeline {
    config: PipelineConfig,
}

impl DecisionPipeline {
    /// Create a pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline over one batch
    pub fn run(&self, input: &BatchInput) -> Result<BatchReport> {
        // Each transaction id may appear at most once per derived table;
        // a duplicate in the input would poison every stage.
        let mut seen: HashSet<TransactionId> = HashSet::with_capacity(input.transactions.len());
        for tx in &input.transactions {
            if !seen.insert(tx.id) {
                return Err(Error::DuplicateTransaction {
                    transaction_id: tx.id,
                    stage: "input",
                });
            }
        }

        let accounts = AccountRegistry::from_accounts(&input.accounts);
        let regions = RegionTable::from_regions(&input.regions);
        tracing::info!(
            "batch loaded: {} transactions, {} accounts, {} regions",
            input.transactions.len(),
            accounts.len(),
            regions.len()
        );

        let rule_outcomes = evaluate_rules(&input.transactions, &accounts)?;
        tracing::info!(
            "rule stage: {}/{} passed",
            rule_outcomes.iter().filter(|o| o.verdict).count(),
            rule_outcomes.len()
        );

        let scorer = RiskScorer::new(self.config.risk_threshold);
        let risk_assessments = scorer.assess_batch(&input.transactions, &accounts, &regions);
        tracing::info!(
            "risk stage: {}/{} above threshold {}",
            risk_assessments.iter().filter(|a| a.verdict).count(),
            risk_assessments.len(),
            self.config.risk_threshold
        );

        let combined_decisions = combine_verdicts(&rule_outcomes, &risk_assessments)?;

        let final_decisions = reconcile_solvency(&combined_decisions, &accounts);
        tracing::info!(
            "reconciliation: {} approved, {} revoked",
            final_decisions.iter().filter(|d| d.verdict).count(),
            final_decisions.iter().filter(|d| d.revoked).count()
        );

        let closing_balances = project_balances(&final_decisions, &accounts);

        Ok(BatchReport {
            rule_outcomes,
            risk_assessments,
            combined_decisions,
            final_decisions,
            closing_balances,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountId, MethodLimits, PaymentMethod, RegionId};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn small_batch() -> BatchInput {
        let region = Region {
            id: RegionId::new("SP"),
            latitude: -23.55,
            longitude: -46.63,
            mean_monthly_value: Decimal::from(1_000),
            fraud_count_30d: 3,
        };
        let account = Account {
            id: AccountId::new("ACC001"),
            region: RegionId::new("SP"),
            balance: Decimal::from(1_000),
            limits: MethodLimits::shared(Decimal::from(500)),
        };
        let tx = Transaction {
            id: TransactionId::new(Uuid::new_v4()),
            payer: AccountId::new("ACC001"),
            payee: AccountId::new("ACC002"),
            origin_region: RegionId::new("SP"),
            method: PaymentMethod::Pix,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap(),
            amount: Decimal::from(100),
        };
        BatchInput {
            transactions: vec![tx],
            accounts: vec![account],
            regions: vec![region],
        }
    }

    #[test]
    fn test_run_produces_all_stage_tables() {
        let pipeline = DecisionPipeline::new(PipelineConfig::default());
        let report = pipeline.run(&small_batch()).unwrap();

        assert_eq!(report.rule_outcomes.len(), 1);
        assert_eq!(report.risk_assessments.len(), 1);
        assert_eq!(report.combined_decisions.len(), 1);
        assert_eq!(report.final_decisions.len(), 1);
        assert_eq!(report.closing_balances.len(), 1);

        // A single-transaction batch normalizes every sub-score to 0.0, so
        // its total never exceeds the threshold and nothing is approved.
        assert!(report.approved_ids().is_empty());
    }

    #[test]
    fn test_duplicate_input_id_is_fatal() {
        let mut batch = small_batch();
        batch.transactions.push(batch.transactions[0].clone());

        let pipeline = DecisionPipeline::new(PipelineConfig::default());
        let err = pipeline.run(&batch).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateTransaction { stage: "input", .. }
        ));
    }
}
