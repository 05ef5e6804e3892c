//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::{CategoryInfo, Owned};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::validation(format!(
                "transaction type must be 'income' or 'expense', got '{}'",
                other
            ))),
        }
    }
}

/// A single income or expense entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub title: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Joined from the categories table at query time
    pub category: Option<CategoryInfo>,
    pub date_added: NaiveDate,
    pub optional_notes: Option<String>,
    #[serde(skip_serializing)]
    pub user_id: i64,
}

impl Transaction {
    /// Category name, or the "Uncategorized" sentinel
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(UNCATEGORIZED)
    }
}

impl Owned for Transaction {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// Sentinel category name for transactions without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Input for a new transaction
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionInput {
    pub title: String,
    pub amount: i64,
    #[serde(rename = "type", default)]
    pub kind: TransactionType,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub optional_notes: Option<String>,
    /// Defaults to today
    #[serde(default)]
    pub date_added: Option<NaiveDate>,
}

impl TransactionInput {
    pub fn new(title: impl Into<String>, amount: i64, kind: TransactionType) -> Self {
        Self {
            title: title.into(),
            amount,
            kind,
            category_id: None,
            optional_notes: None,
            date_added: None,
        }
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.optional_notes = Some(notes.into());
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date_added = Some(date);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("title must not be empty"));
        }
        if self.amount < 0 {
            return Err(Error::validation("amount must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_parse() {
        assert_eq!("income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!(" Expense ".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_transaction_type_serde() {
        let json = serde_json::to_string(&TransactionType::Income).unwrap();
        assert_eq!(json, "\"income\"");
        assert_eq!(TransactionType::default(), TransactionType::Expense);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let input = TransactionInput::new("Refund", -5, TransactionType::Income);
        assert!(matches!(input.validate(), Err(Error::Validation(_))));
        assert!(TransactionInput::new("Coffee", 0, TransactionType::Expense).validate().is_ok());
    }

    #[test]
    fn test_category_name_sentinel() {
        let tx = Transaction {
            id: 1,
            title: "Bus".to_string(),
            amount: 3,
            kind: TransactionType::Expense,
            category: None,
            date_added: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            optional_notes: None,
            user_id: 1,
        };
        assert_eq!(tx.category_name(), "Uncategorized");
    }
}
