//! Payment list loading.
//!
//! Records are `{ "wallet": ..., "amount": ... }` objects as stored by the
//! creator database export. A record is kept only if `wallet` is a non-empty
//! string and `amount` is a number (or numeric string) greater than zero;
//! everything else is dropped and counted. Address syntax is checked later,
//! per payment, by the instruction builder.

use crate::error::{CreatorPaySdkError, Result};
use crate::types::{Payment, PaymentList};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Anything that yields the raw list of payments for a batch.
pub trait PaymentSource {
    fn load(&self) -> Result<PaymentList>;
}

/// Reads a JSON array of payment records from disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PaymentSource for JsonFileSource {
    fn load(&self) -> Result<PaymentList> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            CreatorPaySdkError::Source(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let list = parse_payment_records(&contents)?;
        info!(
            path = %self.path.display(),
            payments = list.len(),
            dropped = list.dropped,
            "Loaded payment list"
        );
        Ok(list)
    }
}

impl PaymentSource for Vec<Payment> {
    fn load(&self) -> Result<PaymentList> {
        Ok(PaymentList::new(self.clone(), 0))
    }
}

#[derive(Debug, Deserialize)]
struct RawPaymentRecord {
    #[serde(default)]
    wallet: Value,
    #[serde(default)]
    amount: Value,
}

/// Parse and filter a JSON array of payment records
pub fn parse_payment_records(json: &str) -> Result<PaymentList> {
    let records: Vec<RawPaymentRecord> =
        serde_json::from_str(json).map_err(|e| CreatorPaySdkError::Source(e.to_string()))?;

    let total = records.len();
    let payments: Vec<Payment> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let payment = normalize(record);
            if payment.is_none() {
                debug!(index, "Dropping malformed payment record");
            }
            payment
        })
        .collect();

    let dropped = total - payments.len();
    Ok(PaymentList::new(payments, dropped))
}

fn normalize(record: RawPaymentRecord) -> Option<Payment> {
    let wallet = match record.wallet {
        Value::String(wallet) if !wallet.is_empty() => wallet,
        _ => return None,
    };

    let amount = match record.amount {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }

    Some(Payment::new(wallet, amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_well_formed_records() {
        let list = parse_payment_records(
            r#"[
                {"wallet": "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU", "amount": 12.5},
                {"wallet": "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin", "amount": "3"}
            ]"#,
        )
        .unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.dropped, 0);
        assert_eq!(list.payments()[1].amount, 3.0);
        assert_eq!(list.total(), 15.5);
    }

    #[test]
    fn drops_records_failing_shape_checks() {
        let list = parse_payment_records(
            r#"[
                {"wallet": "", "amount": 1},
                {"wallet": 42, "amount": 1},
                {"amount": 1},
                {"wallet": "abc", "amount": 0},
                {"wallet": "abc", "amount": -2},
                {"wallet": "abc", "amount": "lots"},
                {"wallet": "abc"},
                {"wallet": "abc", "amount": 1, "name": "extra fields are fine"}
            ]"#,
        )
        .unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list.dropped, 7);
        assert_eq!(list.payments()[0], Payment::new("abc", 1.0));
    }

    #[test]
    fn rejects_non_array_documents() {
        assert!(matches!(
            parse_payment_records(r#"{"wallet": "abc"}"#),
            Err(CreatorPaySdkError::Source(_))
        ));
    }
}
