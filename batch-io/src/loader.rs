//! CSV materialization of the three input relations
//!
//! Expected schemas (header row required):
//!
//! - transactions: `transaction_id, payer_id, payee_id, region_id,
//!   payment_method, timestamp, amount`
//! - accounts (shared limit mode): `account_id, region_id, balance, limit`
//! - accounts (per-method mode): `account_id, region_id, balance,
//!   limit_pix, limit_ted, limit_doc, limit_boleto`
//! - regions: `region_id, latitude, longitude, mean_monthly_value,
//!   fraud_count_30d`
//!
//! An empty limit cell loads as an unconfigured limit; the rule evaluator
//! raises an integrity error if a transaction ever needs it.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use decision_core::{
    Account, AccountId, LimitMode, MethodLimits, PaymentMethod, Region, RegionId, Transaction,
    TransactionId,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct TransactionRow {
    transaction_id: Uuid,
    payer_id: String,
    payee_id: String,
    region_id: String,
    payment_method: String,
    timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
}

#[derive(Debug, Deserialize)]
struct SharedLimitAccountRow {
    account_id: String,
    region_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    balance: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    limit: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct PerMethodAccountRow {
    account_id: String,
    region_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    balance: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    limit_pix: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    limit_ted: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    limit_doc: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    limit_boleto: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct RegionRow {
    region_id: String,
    latitude: f64,
    longitude: f64,
    #[serde(with = "rust_decimal::serde::str")]
    mean_monthly_value: Decimal,
    fraud_count_30d: u32,
}

/// Load the transactions relation from a CSV file
pub fn load_transactions(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    read_transactions(File::open(path)?)
}

/// Load the accounts relation from a CSV file
pub fn load_accounts(path: impl AsRef<Path>, mode: LimitMode) -> Result<Vec<Account>> {
    read_accounts(File::open(path)?, mode)
}

/// Load the regions relation from a CSV file
pub fn load_regions(path: impl AsRef<Path>) -> Result<Vec<Region>> {
    read_regions(File::open(path)?)
}

/// Read transactions from any CSV source
pub fn read_transactions<R: io::Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut transactions = Vec::new();

    for (i, row) in rdr.deserialize::<TransactionRow>().enumerate() {
        let row = row?;
        let line = i + 2; // 1-based, after the header

        let method = PaymentMethod::parse(&row.payment_method).ok_or(Error::InvalidField {
            field: "payment_method",
            value: row.payment_method.clone(),
            line,
        })?;

        if row.amount < Decimal::ZERO {
            return Err(Error::InvalidField {
                field: "amount",
                value: row.amount.to_string(),
                line,
            });
        }

        transactions.push(Transaction {
            id: TransactionId::new(row.transaction_id),
            payer: AccountId::new(row.payer_id),
            payee: AccountId::new(row.payee_id),
            origin_region: RegionId::new(row.region_id),
            method,
            timestamp: row.timestamp,
            amount: row.amount,
        });
    }

    tracing::debug!("loaded {} transactions", transactions.len());
    Ok(transactions)
}

/// Read accounts from any CSV source
pub fn read_accounts<R: io::Read>(reader: R, mode: LimitMode) -> Result<Vec<Account>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut accounts = Vec::new();

    match mode {
        LimitMode::Shared => {
            for row in rdr.deserialize::<SharedLimitAccountRow>() {
                let row = row?;
                accounts.push(Account {
                    id: AccountId::new(row.account_id),
                    region: RegionId::new(row.region_id),
                    balance: row.balance,
                    limits: row.limit.map(MethodLimits::shared).unwrap_or_default(),
                });
            }
        }
        LimitMode::PerMethod => {
            for row in rdr.deserialize::<PerMethodAccountRow>() {
                let row = row?;
                accounts.push(Account {
                    id: AccountId::new(row.account_id),
                    region: RegionId::new(row.region_id),
                    balance: row.balance,
                    limits: MethodLimits {
                        pix: row.limit_pix,
                        ted: row.limit_ted,
                        doc: row.limit_doc,
                        boleto: row.limit_boleto,
                    },
                });
            }
        }
    }

    tracing::debug!("loaded {} accounts", accounts.len());
    Ok(accounts)
}

/// Read regions from any CSV source
pub fn read_regions<R: io::Read>(reader: R) -> Result<Vec<Region>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut regions = Vec::new();

    for row in rdr.deserialize::<RegionRow>() {
        let row = row?;
        regions.push(Region {
            id: RegionId::new(row.region_id),
            latitude: row.latitude,
            longitude: row.longitude,
            mean_monthly_value: row.mean_monthly_value,
            fraud_count_30d: row.fraud_count_30d,
        });
    }

    tracing::debug!("loaded {} regions", regions.len());
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_transactions() {
        let data = "\
transaction_id,payer_id,payee_id,region_id,payment_method,timestamp,amount
8d86a2b4-2c2c-4b86-b781-48a9cbbaad10,ACC001,ACC002,SP,PIX,2024-05-10T14:30:00Z,1250.50
2f8e33bd-70a5-40cf-8c23-86ae51ab8ae4,ACC002,ACC001,RJ,Boleto,2024-05-10T02:00:00Z,80.00
";
        let txs = read_transactions(data.as_bytes()).unwrap();

        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].payer, AccountId::new("ACC001"));
        assert_eq!(txs[0].method, PaymentMethod::Pix);
        assert_eq!(txs[0].amount, Decimal::new(1250_50, 2));
        assert_eq!(txs[1].method, PaymentMethod::Boleto);
    }

    #[test]
    fn test_bad_payment_method_is_rejected() {
        let data = "\
transaction_id,payer_id,payee_id,region_id,payment_method,timestamp,amount
8d86a2b4-2c2c-4b86-b781-48a9cbbaad10,ACC001,ACC002,SP,CREDITO,2024-05-10T14:30:00Z,10.00
";
        let err = read_transactions(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField {
                field: "payment_method",
                line: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let data = "\
transaction_id,payer_id,payee_id,region_id,payment_method,timestamp,amount
8d86a2b4-2c2c-4b86-b781-48a9cbbaad10,ACC001,ACC002,SP,PIX,2024-05-10T14:30:00Z,-1.00
";
        let err = read_transactions(data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidField { field: "amount", .. }));
    }

    #[test]
    fn test_bad_timestamp_is_a_csv_error() {
        let data = "\
transaction_id,payer_id,payee_id,region_id,payment_method,timestamp,amount
8d86a2b4-2c2c-4b86-b781-48a9cbbaad10,ACC001,ACC002,SP,PIX,10/05/2024 14:30,10.00
";
        let err = read_transactions(data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn test_read_accounts_shared_mode() {
        let data = "\
account_id,region_id,balance,limit
ACC001,SP,50000.00,2000.00
ACC002,RJ,120.25,
";
        let accounts = read_accounts(data.as_bytes(), LimitMode::Shared).unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(
            accounts[0].limits.limit_for(PaymentMethod::Doc),
            Some(Decimal::new(2000_00, 2))
        );
        // Empty limit cell: unconfigured for every method.
        assert_eq!(accounts[1].limits.limit_for(PaymentMethod::Pix), None);
    }

    #[test]
    fn test_read_accounts_per_method_mode() {
        let data = "\
account_id,region_id,balance,limit_pix,limit_ted,limit_doc,limit_boleto
ACC001,SP,50000.00,1000.00,2000.00,3000.00,
";
        let accounts = read_accounts(data.as_bytes(), LimitMode::PerMethod).unwrap();

        let limits = &accounts[0].limits;
        assert_eq!(limits.limit_for(PaymentMethod::Pix), Some(Decimal::new(1000_00, 2)));
        assert_eq!(limits.limit_for(PaymentMethod::Ted), Some(Decimal::new(2000_00, 2)));
        assert_eq!(limits.limit_for(PaymentMethod::Doc), Some(Decimal::new(3000_00, 2)));
        assert_eq!(limits.limit_for(PaymentMethod::Boleto), None);
    }

    #[test]
    fn test_read_regions() {
        let data = "\
region_id,latitude,longitude,mean_monthly_value,fraud_count_30d
SP,-23.55,-46.63,4200.00,42
RJ,-22.91,-43.17,3100.00,17
";
        let regions = read_regions(data.as_bytes()).unwrap();

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].id, RegionId::new("SP"));
        assert_eq!(regions[0].fraud_count_30d, 42);
        assert!((regions[1].latitude + 22.91).abs() < 1e-9);
    }

    #[test]
    fn test_missing_column_is_a_csv_error() {
        let data = "\
region_id,latitude
SP,-23.55
";
        let err = read_regions(data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }
}
