//! Category service

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{Category, User};
use crate::ports::Repository;

use super::ensure_owner;

pub struct CategoryService {
    repository: Arc<dyn Repository>,
}

impl CategoryService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    pub async fn add(&self, user: &User, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("category name must not be empty"));
        }
        self.repository.add_category(user.id, name).await
    }

    /// All of the caller's categories
    pub async fn list(&self, user: &User) -> Result<Vec<Category>> {
        self.repository.get_categories(user.id).await
    }

    pub async fn get(&self, user: &User, id: i64) -> Result<Category> {
        ensure_owner(self.repository.get_category_by_id(id).await?, user, "Category")
    }

    /// Delete a category; transactions that used it become uncategorized
    pub async fn delete(&self, user: &User, id: i64) -> Result<()> {
        let category = self.get(user, id).await?;
        self.repository.delete_category(category.id).await
    }
}
