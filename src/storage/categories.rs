//! Category repository for JSON storage
//!
//! Manages loading and saving categories to categories.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FinTrackError;
use crate::models::{Category, CategoryId, UserId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable category data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CategoryData {
    pub categories: Vec<Category>,
}

/// Repository for category persistence
pub struct CategoryRepository {
    path: PathBuf,
    categories: RwLock<HashMap<CategoryId, Category>>,
}

fn sort_categories(list: &mut [Category]) {
    list.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}

impl CategoryRepository {
    /// Create a new category repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            categories: RwLock::new(HashMap::new()),
        }
    }

    /// Load categories from disk
    pub fn load(&self) -> Result<(), FinTrackError> {
        let file_data: CategoryData = read_json(&self.path)?;

        let mut categories = self
            .categories
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        categories.clear();
        for category in file_data.categories {
            categories.insert(category.id, category);
        }

        Ok(())
    }

    /// Save categories to disk
    pub fn save(&self) -> Result<(), FinTrackError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = categories.values().cloned().collect();
        sort_categories(&mut list);

        write_json_atomic(&self.path, &CategoryData { categories: list })
    }

    /// Get a category by ID
    pub fn get(&self, id: CategoryId) -> Result<Option<Category>, FinTrackError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(categories.get(&id).cloned())
    }

    /// Get all categories
    pub fn get_all(&self) -> Result<Vec<Category>, FinTrackError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = categories.values().cloned().collect();
        sort_categories(&mut list);
        Ok(list)
    }

    /// Get the categories owned by a user
    pub fn get_by_user(&self, user_id: UserId) -> Result<Vec<Category>, FinTrackError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = categories
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        sort_categories(&mut list);
        Ok(list)
    }

    /// Find one of a user's categories by name (case-insensitive)
    pub fn get_by_name(
        &self,
        user_id: UserId,
        name: &str,
    ) -> Result<Option<Category>, FinTrackError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(categories
            .values()
            .find(|c| c.user_id == user_id && c.name_matches(name))
            .cloned())
    }

    /// Check if a user already has a category with this name
    pub fn name_exists(
        &self,
        user_id: UserId,
        name: &str,
        exclude_id: Option<CategoryId>,
    ) -> Result<bool, FinTrackError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(categories.values().any(|c| {
            c.user_id == user_id && c.name_matches(name) && Some(c.id) != exclude_id
        }))
    }

    /// Insert or update a category
    pub fn upsert(&self, category: Category) -> Result<(), FinTrackError> {
        let mut categories = self
            .categories
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        categories.insert(category.id, category);
        Ok(())
    }

    /// Delete a category
    pub fn delete(&self, id: CategoryId) -> Result<bool, FinTrackError> {
        let mut categories = self
            .categories
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(categories.remove(&id).is_some())
    }

    /// Delete every category owned by a user, returning how many were removed
    pub fn delete_for_user(&self, user_id: UserId) -> Result<usize, FinTrackError> {
        let mut categories = self
            .categories
            .write()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let before = categories.len();
        categories.retain(|_, c| c.user_id != user_id);
        Ok(before - categories.len())
    }

    /// Count categories
    pub fn count(&self) -> Result<usize, FinTrackError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| FinTrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(categories.len())
    }
}
