//! Monthly report aggregation
//!
//! The month filter is month-of-year only: June 2023 and June 2024 both land
//! in the report for month 6.

use std::collections::BTreeMap;

use chrono::{Datelike, Month};
use serde::Serialize;

use super::result::{Error, Result};
use super::{Transaction, TransactionType};

/// Income/expense summary for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyReport {
    pub user: String,
    pub month: u32,
    pub month_name: String,
    pub income: i64,
    pub expense: i64,
    pub net: i64,
    /// All-time savings total, not month-filtered
    pub total_savings: i64,
    /// Expense totals per category name ("Uncategorized" when unset)
    pub categories: BTreeMap<String, i64>,
}

impl MonthlyReport {
    /// Aggregate `transactions` for `month`
    ///
    /// Entries from other months are ignored, so callers may pass a superset.
    pub fn build(
        user: &str,
        month: u32,
        transactions: &[Transaction],
        total_savings: i64,
    ) -> Result<Self> {
        let month_name = month_name(month)?;

        let mut income = 0i64;
        let mut expense = 0i64;
        let mut categories: BTreeMap<String, i64> = BTreeMap::new();

        for tx in transactions.iter().filter(|t| t.date_added.month() == month) {
            match tx.kind {
                TransactionType::Income => income = add(income, tx.amount)?,
                TransactionType::Expense => {
                    expense = add(expense, tx.amount)?;
                    let total = categories.entry(tx.category_name().to_string()).or_insert(0);
                    *total = add(*total, tx.amount)?;
                }
            }
        }

        let net = income
            .checked_sub(expense)
            .ok_or_else(|| Error::validation("monthly net is out of range"))?;

        Ok(Self {
            user: user.to_string(),
            month,
            month_name,
            income,
            expense,
            net,
            total_savings,
            categories,
        })
    }
}

fn add(total: i64, amount: i64) -> Result<i64> {
    total
        .checked_add(amount)
        .ok_or_else(|| Error::validation("monthly total is out of range"))
}

/// English month name for 1..=12
pub fn month_name(month: u32) -> Result<String> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .ok_or_else(|| Error::validation(format!("month must be between 1 and 12, got {}", month)))
}
