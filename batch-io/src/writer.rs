//! Per-stage artifact persistence
//!
//! Writes one CSV artifact per pipeline step into a single output
//! directory, intermediates included:
//!
//! - `base_join.csv` — transactions joined with payer balance and limit
//! - `rule_outcomes.csv` — rule verdicts with the failed check name
//! - `balance_passed.csv` / `limit_passed.csv` — survivors of each rule
//!   check in order
//! - `geo_join.csv` — origin and payer-region coordinates plus distance
//! - `risk_geo.csv` / `risk_value.csv` / `risk_time.csv` — per-component
//!   normalized scores
//! - `risk_scores.csv` — all components plus the aggregate and verdict
//! - `combined_decisions.csv`, `final_decisions.csv`,
//!   `approved_transactions.csv`, `closing_balances.csv`

use crate::error::Result;
use chrono::{DateTime, Utc};
use decision_core::scoring::haversine_km;
use decision_core::{AccountRegistry, BatchInput, BatchReport, RegionTable, RuleCheck};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct BaseJoinRow<'a> {
    transaction_id: String,
    payer: &'a str,
    payee: &'a str,
    origin_region: &'a str,
    payment_method: &'static str,
    timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    payer_balance: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    method_limit: Option<Decimal>,
}

#[derive(Debug, Serialize)]
struct RuleOutcomeRow<'a> {
    transaction_id: String,
    payer: &'a str,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
    verdict: bool,
    failed_check: String,
}

#[derive(Debug, Serialize)]
struct CheckPassRow<'a> {
    transaction_id: String,
    payer: &'a str,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
}

#[derive(Debug, Serialize)]
struct GeoJoinRow<'a> {
    transaction_id: String,
    origin_region: &'a str,
    origin_latitude: Option<f64>,
    origin_longitude: Option<f64>,
    payer_region: Option<&'a str>,
    payer_latitude: Option<f64>,
    payer_longitude: Option<f64>,
    distance_km: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ComponentScoreRow {
    transaction_id: String,
    score: f64,
}

#[derive(Debug, Serialize)]
struct RiskScoreRow {
    transaction_id: String,
    geo_score: f64,
    value_score: f64,
    time_score: f64,
    total_score: f64,
    verdict: bool,
}

#[derive(Debug, Serialize)]
struct CombinedDecisionRow<'a> {
    transaction_id: String,
    payer: &'a str,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
    rule_verdict: bool,
    risk_verdict: bool,
    verdict: bool,
}

#[derive(Debug, Serialize)]
struct FinalDecisionRow<'a> {
    transaction_id: String,
    payer: &'a str,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
    combined_verdict: bool,
    revoked: bool,
    verdict: bool,
}

#[derive(Debug, Serialize)]
struct ApprovedRow {
    transaction_id: String,
}

#[derive(Debug, Serialize)]
struct BalanceRow<'a> {
    account_id: &'a str,
    #[serde(with = "rust_decimal::serde::str")]
    balance: Decimal,
}

/// Writes the per-stage CSV artifacts into one output directory
pub struct ArtifactWriter {
    out_dir: PathBuf,
}

impl ArtifactWriter {
    /// Create a writer targeting the given directory (created on demand)
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Persist every stage table, intermediates included, returning the
    /// written paths
    pub fn write_report(&self, input: &BatchInput, report: &BatchReport) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.out_dir)?;
        let mut written = Vec::new();

        let accounts = AccountRegistry::from_accounts(&input.accounts);
        let regions = RegionTable::from_regions(&input.regions);

        written.push(self.write_table(
            "base_join.csv",
            input.transactions.iter().map(|tx| {
                let account = accounts.get(&tx.payer);
                BaseJoinRow {
                    transaction_id: tx.id.to_string(),
                    payer: tx.payer.as_str(),
                    payee: tx.payee.as_str(),
                    origin_region: tx.origin_region.as_str(),
                    payment_method: tx.method.code(),
                    timestamp: tx.timestamp,
                    amount: tx.amount,
                    payer_balance: account.map(|a| a.balance),
                    method_limit: account.and_then(|a| a.limits.limit_for(tx.method)),
                }
            }),
        )?);

        written.push(self.write_table(
            "rule_outcomes.csv",
            report.rule_outcomes.iter().map(|o| RuleOutcomeRow {
                transaction_id: o.transaction_id.to_string(),
                payer: o.payer.as_str(),
                amount: o.amount,
                verdict: o.verdict,
                failed_check: o
                    .failed_check
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
            }),
        )?);

        // Survivors of each rule check, in check order. A transaction
        // passed the balance check iff it failed nothing earlier than the
        // method-limit check.
        written.push(self.write_table(
            "balance_passed.csv",
            report
                .rule_outcomes
                .iter()
                .filter(|o| {
                    !matches!(
                        o.failed_check,
                        Some(RuleCheck::UnknownPayer) | Some(RuleCheck::Balance)
                    )
                })
                .map(|o| CheckPassRow {
                    transaction_id: o.transaction_id.to_string(),
                    payer: o.payer.as_str(),
                    amount: o.amount,
                }),
        )?);

        written.push(self.write_table(
            "limit_passed.csv",
            report
                .rule_outcomes
                .iter()
                .filter(|o| o.verdict)
                .map(|o| CheckPassRow {
                    transaction_id: o.transaction_id.to_string(),
                    payer: o.payer.as_str(),
                    amount: o.amount,
                }),
        )?);

        written.push(self.write_table(
            "geo_join.csv",
            input.transactions.iter().map(|tx| {
                let origin = regions.get(&tx.origin_region);
                let payer_region_id = accounts.get(&tx.payer).map(|a| &a.region);
                let payer_region = payer_region_id.and_then(|id| regions.get(id));
                let distance_km = match (origin, payer_region) {
                    (Some(o), Some(p)) => {
                        Some(haversine_km(o.latitude, o.longitude, p.latitude, p.longitude))
                    }
                    _ => None,
                };
                GeoJoinRow {
                    transaction_id: tx.id.to_string(),
                    origin_region: tx.origin_region.as_str(),
                    origin_latitude: origin.map(|r| r.latitude),
                    origin_longitude: origin.map(|r| r.longitude),
                    payer_region: payer_region_id.map(|r| r.as_str()),
                    payer_latitude: payer_region.map(|r| r.latitude),
                    payer_longitude: payer_region.map(|r| r.longitude),
                    distance_km,
                }
            }),
        )?);

        for (name, pick) in [
            ("risk_geo.csv", (|a| a.geo_score) as fn(&decision_core::RiskAssessment) -> f64),
            ("risk_value.csv", |a| a.value_score),
            ("risk_time.csv", |a| a.time_score),
        ] {
            written.push(self.write_table(
                name,
                report.risk_assessments.iter().map(|a| ComponentScoreRow {
                    transaction_id: a.transaction_id.to_string(),
                    score: pick(a),
                }),
            )?);
        }

        written.push(self.write_table(
            "risk_scores.csv",
            report.risk_assessments.iter().map(|a| RiskScoreRow {
                transaction_id: a.transaction_id.to_string(),
                geo_score: a.geo_score,
                value_score: a.value_score,
                time_score: a.time_score,
                total_score: a.total_score,
                verdict: a.verdict,
            }),
        )?);

        written.push(self.write_table(
            "combined_decisions.csv",
            report.combined_decisions.iter().map(|d| CombinedDecisionRow {
                transaction_id: d.transaction_id.to_string(),
                payer: d.payer.as_str(),
                amount: d.amount,
                rule_verdict: d.rule_verdict,
                risk_verdict: d.risk_verdict,
                verdict: d.verdict,
            }),
        )?);

        written.push(self.write_table(
            "final_decisions.csv",
            report.final_decisions.iter().map(|d| FinalDecisionRow {
                transaction_id: d.transaction_id.to_string(),
                payer: d.payer.as_str(),
                amount: d.amount,
                combined_verdict: d.combined_verdict,
                revoked: d.revoked,
                verdict: d.verdict,
            }),
        )?);

        written.push(self.write_table(
            "approved_transactions.csv",
            report.approved_ids().into_iter().map(|id| ApprovedRow {
                transaction_id: id.to_string(),
            }),
        )?);

        written.push(self.write_table(
            "closing_balances.csv",
            report.closing_balances.iter().map(|b| BalanceRow {
                account_id: b.account_id.as_str(),
                balance: b.balance,
            }),
        )?);

        tracing::info!("wrote {} artifacts to {}", written.len(), self.out_dir.display());
        Ok(written)
    }

    fn write_table<T: Serialize>(
        &self,
        name: &str,
        rows: impl Iterator<Item = T>,
    ) -> Result<PathBuf> {
        let path = self.out_dir.join(name);
        let mut wtr = csv::Writer::from_path(&path)?;
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(path)
    }

    /// Target directory
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}
