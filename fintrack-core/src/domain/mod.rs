//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.
//!
//! Each owned record stores only its owner's id. Reverse lookups (a user's
//! categories, transactions, savings) go through the repository.

mod category;
pub mod report;
pub mod result;
mod savings;
mod token;
mod transaction;
mod user;

pub use category::{Category, CategoryInfo};
pub use report::MonthlyReport;
pub use savings::{Savings, SavingsInput, SavingsTotal, SavingsUpdate};
pub use token::{AccessToken, Claims};
pub use transaction::{Transaction, TransactionInput, TransactionType, UNCATEGORIZED};
pub use user::{NewUser, User, UserView};

/// A record that belongs to exactly one user
pub trait Owned {
    fn owner_id(&self) -> i64;
}
