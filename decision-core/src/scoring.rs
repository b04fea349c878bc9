//! Multi-factor risk scoring
//!
//! Three independent sub-scores per transaction:
//!
//! - geographic: great-circle distance between the transaction's stated
//!   origin region and the payer's registered region
//! - relative value: amount divided by the origin region's mean monthly
//!   transactional value
//! - time of day: `|hour − 12| / 12` (midday near 0, midnight near 1)
//!
//! Each sub-score is min-max normalized over the *full batch*, so scoring is
//! necessarily two-pass: all raw scores first, then normalization, then the
//! threshold. The risk verdict is the literal comparison `total > τ`, ANDed
//! unchanged into the combined verdict downstream. A batch where a sub-score
//! is identical for every transaction normalizes that sub-score to 0.0
//! (degenerate-batch fallback).
//!
//! A transaction whose origin region or payer region cannot be resolved gets
//! a raw score of 0.0 for the affected sub-score; the rule stage already
//! fails such transactions closed.

use crate::types::{AccountRegistry, RegionTable, RiskAssessment, Transaction};
use chrono::Timelike;
use rust_decimal::prelude::ToPrimitive;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, spherical law of haversines
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Raw (un-normalized) sub-scores for one transaction
struct RawScores {
    geo: f64,
    value: f64,
    time: f64,
}

/// Batch risk scorer
pub struct RiskScorer {
    /// Risk threshold τ: the verdict is `total_score > τ`
    threshold: f64,
}

impl RiskScorer {
    /// Create a scorer with the given threshold τ
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Score a full batch, preserving input order
    pub fn assess_batch(
        &self,
        transactions: &[Transaction],
        accounts: &AccountRegistry,
        regions: &RegionTable,
    ) -> Vec<RiskAssessment> {
        // Pass 1: raw scores for every transaction.
        let raw: Vec<RawScores> = transactions
            .iter()
            .map(|tx| self.raw_scores(tx, accounts, regions))
            .collect();

        // Pass 2: batch-wide min-max normalization per sub-score.
        let geo = normalize(raw.iter().map(|r| r.geo).collect());
        let value = normalize(raw.iter().map(|r| r.value).collect());
        let time = normalize(raw.iter().map(|r| r.time).collect());

        transactions
            .iter()
            .enumerate()
            .map(|(i, tx)| {
                let total_score = geo[i] + value[i] + time[i];
                RiskAssessment {
                    transaction_id: tx.id,
                    geo_score: geo[i],
                    value_score: value[i],
                    time_score: time[i],
                    total_score,
                    verdict: total_score > self.threshold,
                }
            })
            .collect()
    }

    fn raw_scores(
        &self,
        tx: &Transaction,
        accounts: &AccountRegistry,
        regions: &RegionTable,
    ) -> RawScores {
        let origin = regions.get(&tx.origin_region);
        let payer_region = accounts
            .get(&tx.payer)
            .and_then(|account| regions.get(&account.region));

        let geo = match (origin, payer_region) {
            (Some(o), Some(p)) => {
                haversine_km(o.latitude, o.longitude, p.latitude, p.longitude)
            }
            _ => 0.0,
        };

        let value = origin
            .map(|o| o.mean_monthly_value.to_f64().unwrap_or(0.0))
            .filter(|mean| *mean > 0.0)
            .map(|mean| tx.amount.to_f64().unwrap_or(0.0) / mean)
            .unwrap_or(0.0);

        let hour = f64::from(tx.timestamp.hour());
        let time = (hour - 12.0).abs() / 12.0;

        RawScores { geo, value, time }
    }
}

/// Min-max scale a column of raw scores to [0, 1]
///
/// `max == min` (including the empty batch) scales everything to 0.0 to
/// avoid a zero denominator.
fn normalize(raw: Vec<f64>) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if !(max > min) {
        return vec![0.0; raw.len()];
    }

    raw.iter().map(|v| (v - min) / (max - min)).collect()
}
