//! Repository port - database abstraction

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::result::Result;
use crate::domain::{Category, Savings, SavingsInput, Transaction, TransactionInput, User};

/// Database repository abstraction
///
/// Storage does not enforce ownership. Every record is returned regardless of
/// owner; callers run the ownership guard before acting on it.
#[async_trait]
pub trait Repository: Send + Sync {
    // === Users ===

    /// Persist a new user and return it with its assigned id
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        created_at: NaiveDate,
    ) -> Result<User>;

    /// Look up a user by unique username
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    // === Categories ===

    async fn add_category(&self, user_id: i64, name: &str) -> Result<Category>;

    /// All categories owned by a user
    async fn get_categories(&self, user_id: i64) -> Result<Vec<Category>>;

    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Delete a category, clearing it from any transaction that references it
    async fn delete_category(&self, id: i64) -> Result<()>;

    // === Transactions ===

    async fn add_transaction(
        &self,
        user_id: i64,
        input: &TransactionInput,
        date_added: NaiveDate,
    ) -> Result<Transaction>;

    /// All transactions owned by a user, with category names joined
    async fn get_transactions(&self, user_id: i64) -> Result<Vec<Transaction>>;

    /// A user's transactions whose date falls in `month` of any year
    async fn get_transactions_for_month(&self, user_id: i64, month: u32) -> Result<Vec<Transaction>>;

    async fn get_transaction_by_id(&self, id: i64) -> Result<Option<Transaction>>;

    async fn delete_transaction(&self, id: i64) -> Result<()>;

    // === Savings ===

    async fn add_savings(
        &self,
        user_id: i64,
        input: &SavingsInput,
        created_at: NaiveDate,
    ) -> Result<Savings>;

    async fn get_savings(&self, user_id: i64) -> Result<Vec<Savings>>;

    async fn get_savings_by_id(&self, id: i64) -> Result<Option<Savings>>;

    /// Overwrite amount and notes of an existing savings row
    async fn update_savings(&self, savings: &Savings) -> Result<Savings>;

    async fn delete_savings(&self, id: i64) -> Result<()>;

    /// Sum of a user's savings amounts, 0 when there are none
    async fn total_savings(&self, user_id: i64) -> Result<i64>;
}
