//! Transaction service

use std::sync::Arc;

use chrono::Local;

use crate::domain::result::Result;
use crate::domain::{Transaction, TransactionInput, User};
use crate::ports::Repository;

use super::ensure_owner;

pub struct TransactionService {
    repository: Arc<dyn Repository>,
}

impl TransactionService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Record a transaction for the caller
    ///
    /// A category, when given, must be one of the caller's own.
    pub async fn add(&self, user: &User, input: &TransactionInput) -> Result<Transaction> {
        input.validate()?;

        if let Some(category_id) = input.category_id {
            ensure_owner(
                self.repository.get_category_by_id(category_id).await?,
                user,
                "Category",
            )?;
        }

        let date_added = input.date_added.unwrap_or_else(|| Local::now().date_naive());
        self.repository.add_transaction(user.id, input, date_added).await
    }

    /// The caller's full transaction history
    pub async fn history(&self, user: &User) -> Result<Vec<Transaction>> {
        self.repository.get_transactions(user.id).await
    }

    pub async fn get(&self, user: &User, id: i64) -> Result<Transaction> {
        ensure_owner(self.repository.get_transaction_by_id(id).await?, user, "Transaction")
    }

    pub async fn delete(&self, user: &User, id: i64) -> Result<()> {
        let transaction = self.get(user, id).await?;
        self.repository.delete_transaction(transaction.id).await
    }
}
