//! Category service
//!
//! Categories are private to their owner. Looking up another user's category
//! behaves exactly like looking up one that does not exist.

use std::collections::HashMap;

use tracing::info;

use crate::error::{FinTrackError, FinTrackResult};
use crate::models::{Category, CategoryId, UserId};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// List a user's categories
    pub fn list(&self, user_id: UserId) -> FinTrackResult<Vec<Category>> {
        self.storage.categories.get_by_user(user_id)
    }

    /// Get one of a user's categories
    pub fn get(&self, user_id: UserId, id: CategoryId) -> FinTrackResult<Category> {
        self.storage
            .categories
            .get(id)?
            .filter(|c| c.user_id == user_id)
            .ok_or_else(|| FinTrackError::category_not_found(id.to_string()))
    }

    /// Find one of a user's categories by name (case-insensitive)
    pub fn find_by_name(&self, user_id: UserId, name: &str) -> FinTrackResult<Option<Category>> {
        self.storage.categories.get_by_name(user_id, name)
    }

    /// Map of category id to display name for a user
    pub fn names(&self, user_id: UserId) -> FinTrackResult<HashMap<CategoryId, String>> {
        Ok(self
            .list(user_id)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect())
    }

    /// Create a new category
    pub fn create(&self, user_id: UserId, name: &str) -> FinTrackResult<Category> {
        let name = name.trim();
        let category = Category::new(user_id, name);
        category
            .validate()
            .map_err(|e| FinTrackError::Validation(e.to_string()))?;

        let _guard = self.storage.lock_writes()?;

        if self.storage.categories.name_exists(user_id, name, None)? {
            return Err(FinTrackError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        info!(user_id = %user_id, category = %category.name, "category created");
        Ok(category)
    }

    /// Rename a category
    pub fn rename(&self, user_id: UserId, id: CategoryId, name: &str) -> FinTrackResult<Category> {
        let name = name.trim();
        let _guard = self.storage.lock_writes()?;
        let mut category = self.get(user_id, id)?;

        category.rename(name);
        category
            .validate()
            .map_err(|e| FinTrackError::Validation(e.to_string()))?;

        if self.storage.categories.name_exists(user_id, name, Some(id))? {
            return Err(FinTrackError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        Ok(category)
    }

    /// Delete a category and the transactions and budgets filed under it
    pub fn delete(&self, user_id: UserId, id: CategoryId) -> FinTrackResult<Category> {
        let _guard = self.storage.lock_writes()?;
        let category = self.get(user_id, id)?;

        let transactions = self.storage.transactions.delete_for_category(id)?;
        let budgets = self.storage.budgets.delete_for_category(id)?;
        self.storage.categories.delete(id)?;

        self.storage.transactions.save()?;
        self.storage.budgets.save()?;
        self.storage.categories.save()?;

        info!(
            user_id = %user_id,
            category = %category.name,
            transactions,
            budgets,
            "category deleted"
        );
        Ok(category)
    }
}
