//! Savings service

use std::sync::Arc;

use chrono::Local;

use crate::domain::result::Result;
use crate::domain::{Savings, SavingsInput, SavingsUpdate, User};
use crate::ports::Repository;

use super::ensure_owner;

pub struct SavingsService {
    repository: Arc<dyn Repository>,
}

impl SavingsService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    pub async fn add(&self, user: &User, input: &SavingsInput) -> Result<Savings> {
        self.repository
            .add_savings(user.id, input, Local::now().date_naive())
            .await
    }

    pub async fn list(&self, user: &User) -> Result<Vec<Savings>> {
        self.repository.get_savings(user.id).await
    }

    pub async fn get(&self, user: &User, id: i64) -> Result<Savings> {
        ensure_owner(self.repository.get_savings_by_id(id).await?, user, "Savings")
    }

    /// Partially update a deposit; concurrent updates are last-write-wins
    pub async fn update(&self, user: &User, id: i64, update: &SavingsUpdate) -> Result<Savings> {
        let mut savings = self.get(user, id).await?;
        if update.is_empty() {
            return Ok(savings);
        }
        savings.apply(update);
        self.repository.update_savings(&savings).await
    }

    pub async fn delete(&self, user: &User, id: i64) -> Result<()> {
        let savings = self.get(user, id).await?;
        self.repository.delete_savings(savings.id).await
    }
}
