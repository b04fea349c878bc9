//! Decision core for Arbiter
//!
//! Batch approval pipeline for instant-payment transactions. A closed batch
//! of transactions is evaluated against three independent classes of checks:
//!
//! 1. Hard balance/limit rules ([`rules`])
//! 2. A normalized multi-factor risk score ([`scoring`])
//! 3. A post-hoc solvency reconciliation across all transactions approved
//!    for the same payer ([`reconcile`])
//!
//! Verdicts only tighten as a transaction moves through the stages:
//! `final_verdict` implies `combined_verdict` implies
//! `rule_verdict AND risk_verdict`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod combine;
pub mod config;
pub mod error;
pub mod ledger;
pub mod pipeline;
pub mod reconcile;
pub mod rules;
pub mod scoring;
pub mod types;

pub use combine::combine_verdicts;
pub use config::{LimitMode, PipelineConfig};
pub use error::{Error, Result};
pub use ledger::project_balances;
pub use pipeline::{BatchInput, BatchReport, DecisionPipeline};
pub use reconcile::reconcile_solvency;
pub use rules::evaluate_rules;
pub use scoring::RiskScorer;
pub use types::*;
