//! Core types for the decision pipeline
//!
//! Reference records (transactions, accounts, regions) are immutable for the
//! whole pipeline. Each stage produces a new derived table of per-transaction
//! records; no stage mutates another's inputs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Transaction identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create from a raw UUID
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Region identifier (2-letter code)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    /// Create new region ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payment method (Brazilian instant-payment rails)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Instant payment
    #[serde(rename = "PIX")]
    Pix,
    /// Same-day wire transfer
    #[serde(rename = "TED")]
    Ted,
    /// Next-day wire transfer
    #[serde(rename = "DOC")]
    Doc,
    /// Bank slip
    #[serde(rename = "Boleto")]
    Boleto,
}

impl PaymentMethod {
    /// All methods, in a fixed order
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Pix,
        PaymentMethod::Ted,
        PaymentMethod::Doc,
        PaymentMethod::Boleto,
    ];

    /// Wire code
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Ted => "TED",
            PaymentMethod::Doc => "DOC",
            PaymentMethod::Boleto => "Boleto",
        }
    }

    /// Parse from the wire code
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PIX" => Some(PaymentMethod::Pix),
            "TED" => Some(PaymentMethod::Ted),
            "DOC" => Some(PaymentMethod::Doc),
            "Boleto" => Some(PaymentMethod::Boleto),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single transaction, read-only through the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction id
    pub id: TransactionId,

    /// Account being debited
    pub payer: AccountId,

    /// Account being credited
    pub payee: AccountId,

    /// Region the transaction originated from
    pub origin_region: RegionId,

    /// Payment method
    pub method: PaymentMethod,

    /// When the transaction was created
    pub timestamp: DateTime<Utc>,

    /// Transaction amount (non-negative)
    pub amount: Decimal,
}

/// Per-method transaction limits for an account
///
/// A method with no configured limit is representable (`None`); the rule
/// evaluator treats hitting one as a fatal integrity error, never as an
/// implicit approval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodLimits {
    /// PIX limit
    pub pix: Option<Decimal>,
    /// TED limit
    pub ted: Option<Decimal>,
    /// DOC limit
    pub doc: Option<Decimal>,
    /// Boleto limit
    pub boleto: Option<Decimal>,
}

impl MethodLimits {
    /// One shared limit for all four methods
    pub fn shared(limit: Decimal) -> Self {
        Self {
            pix: Some(limit),
            ted: Some(limit),
            doc: Some(limit),
            boleto: Some(limit),
        }
    }

    /// Four independent limits
    pub fn per_method(pix: Decimal, ted: Decimal, doc: Decimal, boleto: Decimal) -> Self {
        Self {
            pix: Some(pix),
            ted: Some(ted),
            doc: Some(doc),
            boleto: Some(boleto),
        }
    }

    /// Limit configured for a method, if any
    pub fn limit_for(&self, method: PaymentMethod) -> Option<Decimal> {
        match method {
            PaymentMethod::Pix => self.pix,
            PaymentMethod::Ted => self.ted,
            PaymentMethod::Doc => self.doc,
            PaymentMethod::Boleto => self.boleto,
        }
    }
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique account id
    pub id: AccountId,

    /// Region the account is registered in
    pub region: RegionId,

    /// Opening balance for the batch
    pub balance: Decimal,

    /// Per-method transaction limits
    pub limits: MethodLimits,
}

/// A reference region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Unique 2-letter region code
    pub id: RegionId,

    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Mean monthly transactional value for the region
    pub mean_monthly_value: Decimal,

    /// Fraud count over the last 30 days (schema contract; not used by the
    /// current decision logic)
    pub fraud_count_30d: u32,
}

/// Hash index over accounts, built once per batch
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    by_id: HashMap<AccountId, Account>,
}

impl AccountRegistry {
    /// Build the index from a slice of accounts. Later duplicates replace
    /// earlier ones.
    pub fn from_accounts(accounts: &[Account]) -> Self {
        let by_id = accounts
            .iter()
            .map(|a| (a.id.clone(), a.clone()))
            .collect();
        Self { by_id }
    }

    /// Look up an account by id
    pub fn get(&self, id: &AccountId) -> Option<&Account> {
        self.by_id.get(id)
    }

    /// Number of indexed accounts
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Iterate over all accounts
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.by_id.values()
    }
}

/// Hash index over regions, built once per batch
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    by_id: HashMap<RegionId, Region>,
}

impl RegionTable {
    /// Build the index from a slice of regions
    pub fn from_regions(regions: &[Region]) -> Self {
        let by_id = regions
            .iter()
            .map(|r| (r.id.clone(), r.clone()))
            .collect();
        Self { by_id }
    }

    /// Look up a region by id
    pub fn get(&self, id: &RegionId) -> Option<&Region> {
        self.by_id.get(id)
    }

    /// Number of indexed regions
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// The deterministic check that failed a transaction in the rule stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCheck {
    /// Payer id did not resolve to a registered account (fail closed)
    UnknownPayer,
    /// Opening balance below the transaction amount
    Balance,
    /// Amount above the limit for the transaction's payment method
    MethodLimit,
}

impl fmt::Display for RuleCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleCheck::UnknownPayer => "unknown_payer",
            RuleCheck::Balance => "balance",
            RuleCheck::MethodLimit => "method_limit",
        };
        write!(f, "{}", name)
    }
}

/// Rule-stage verdict for one transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Transaction this verdict belongs to
    pub transaction_id: TransactionId,

    /// Payer account (carried forward for later stages)
    pub payer: AccountId,

    /// Transaction amount (carried forward for later stages)
    pub amount: Decimal,

    /// True if every rule check passed
    pub verdict: bool,

    /// First check that failed, if any
    pub failed_check: Option<RuleCheck>,
}

/// Risk-stage verdict for one transaction
///
/// Sub-scores are min-max normalized over the full batch to [0, 1]; the
/// total is their sum in [0, 3].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Transaction this assessment belongs to
    pub transaction_id: TransactionId,

    /// Normalized geographic distance score
    pub geo_score: f64,

    /// Normalized relative-value score
    pub value_score: f64,

    /// Normalized time-of-day score
    pub time_score: f64,

    /// Sum of the three normalized sub-scores
    pub total_score: f64,

    /// The comparison `total_score > τ`, carried into the combined verdict
    pub verdict: bool,
}

/// Combined rule + risk verdict for one transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedDecision {
    /// Transaction this decision belongs to
    pub transaction_id: TransactionId,

    /// Payer account
    pub payer: AccountId,

    /// Transaction amount
    pub amount: Decimal,

    /// Rule-stage verdict
    pub rule_verdict: bool,

    /// Risk-stage verdict
    pub risk_verdict: bool,

    /// `rule_verdict AND risk_verdict`
    pub verdict: bool,
}

/// Final verdict for one transaction, after solvency reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalDecision {
    /// Transaction this decision belongs to
    pub transaction_id: TransactionId,

    /// Payer account
    pub payer: AccountId,

    /// Transaction amount
    pub amount: Decimal,

    /// Verdict entering reconciliation
    pub combined_verdict: bool,

    /// True if reconciliation revoked a combined approval
    pub revoked: bool,

    /// Final verdict; implies `combined_verdict`
    pub verdict: bool,
}

/// Projected closing balance for one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account id
    pub account_id: AccountId,

    /// Closing balance after final-approved debits, floored at zero
    pub balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_roundtrip() {
        for method in PaymentMethod::ALL {
            assert_eq!(PaymentMethod::parse(method.code()), Some(method));
        }
        assert_eq!(PaymentMethod::parse("CREDITO"), None);
    }

    #[test]
    fn test_shared_limits_cover_all_methods() {
        let limits = MethodLimits::shared(Decimal::from(1_000));
        for method in PaymentMethod::ALL {
            assert_eq!(limits.limit_for(method), Some(Decimal::from(1_000)));
        }
    }

    #[test]
    fn test_unconfigured_limit_is_representable() {
        let limits = MethodLimits {
            pix: Some(Decimal::from(500)),
            ..Default::default()
        };
        assert_eq!(limits.limit_for(PaymentMethod::Pix), Some(Decimal::from(500)));
        assert_eq!(limits.limit_for(PaymentMethod::Ted), None);
    }

    #[test]
    fn test_registry_lookup() {
        let account = Account {
            id: AccountId::new("ACC001"),
            region: RegionId::new("SP"),
            balance: Decimal::from(100),
            limits: MethodLimits::shared(Decimal::from(1_000)),
        };
        let registry = AccountRegistry::from_accounts(&[account]);

        assert_eq!(registry.len(), 1);
        assert!(registry.get(&AccountId::new("ACC001")).is_some());
        assert!(registry.get(&AccountId::new("ACC999")).is_none());
    }
}
