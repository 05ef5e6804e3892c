//! Savings domain model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Owned;

/// A savings deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Savings {
    pub id: i64,
    pub amount: i64,
    pub optional_notes: Option<String>,
    pub created_at: NaiveDate,
    pub user_id: i64,
}

impl Savings {
    /// Apply a partial update; fields left as `None` keep their value
    pub fn apply(&mut self, update: &SavingsUpdate) {
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(notes) = &update.optional_notes {
            self.optional_notes = Some(notes.clone());
        }
    }
}

impl Owned for Savings {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// Input for a new savings deposit
#[derive(Debug, Clone, Deserialize)]
pub struct SavingsInput {
    pub amount: i64,
    #[serde(default)]
    pub optional_notes: Option<String>,
}

/// Partial update of a savings deposit
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SavingsUpdate {
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub optional_notes: Option<String>,
}

impl SavingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.optional_notes.is_none()
    }
}

/// All-time savings total for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavingsTotal {
    pub user: String,
    pub savings: i64,
}
