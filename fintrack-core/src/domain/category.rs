//! Category domain model

use serde::{Deserialize, Serialize};

use super::Owned;

/// A spending/income category owned by exactly one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

impl Category {
    pub fn info(&self) -> CategoryInfo {
        CategoryInfo {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

impl Owned for Category {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// Category reference embedded in transaction views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: i64,
    pub name: String,
}
