//! User service
//!
//! Account registration, credential checks and self-service profile
//! changes. New accounts are seeded with the default category set.

use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::{hash_password, validate_password, verify_password};
use crate::error::{FinTrackError, FinTrackResult};
use crate::models::user::{validate_email, validate_username};
use crate::models::{Category, User, UserId};
use crate::storage::Storage;

/// Message returned for every failed login, whatever the reason
pub const INVALID_CREDENTIALS: &str = "User or password is incorrect";

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
}

/// Input for registering a new account
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Partial update of an account; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl<'a> UserService<'a> {
    /// Create a new user service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register a new account and give it the default categories
    pub fn register(&self, input: RegisterInput) -> FinTrackResult<User> {
        let username = input.username.trim();
        let email = input.email.trim();

        validate_username(username).map_err(|e| FinTrackError::Validation(e.to_string()))?;
        validate_email(email).map_err(|e| FinTrackError::Validation(e.to_string()))?;
        validate_password(&input.password)?;

        let _guard = self.storage.lock_writes()?;

        if self.storage.users.username_exists(username, None)? {
            return Err(FinTrackError::Duplicate {
                entity_type: "User",
                identifier: username.to_string(),
            });
        }

        let user = User::new(username, email, hash_password(&input.password)?);

        self.storage.users.upsert(user.clone())?;
        for category in Category::defaults_for(user.id) {
            self.storage.categories.upsert(category)?;
        }

        self.storage.users.save()?;
        self.storage.categories.save()?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Check a username and password, returning the account on success
    pub fn authenticate(&self, username: &str, password: &str) -> FinTrackResult<User> {
        let invalid = || FinTrackError::Unauthorized(INVALID_CREDENTIALS.into());

        let user = self
            .storage
            .users
            .get_by_username(username)?
            .ok_or_else(invalid)?;

        let matches = match verify_password(password, &user.password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "stored password hash rejected");
                false
            }
        };

        if !matches || !user.is_active {
            return Err(invalid());
        }

        Ok(user)
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> FinTrackResult<User> {
        self.storage
            .users
            .get(id)?
            .ok_or_else(|| FinTrackError::user_not_found(id.to_string()))
    }

    /// Get a user by exact username
    pub fn find_by_username(&self, username: &str) -> FinTrackResult<Option<User>> {
        self.storage.users.get_by_username(username)
    }

    /// List all users, oldest first
    pub fn list(&self) -> FinTrackResult<Vec<User>> {
        self.storage.users.get_all()
    }

    /// Apply a partial update to an account
    pub fn update(&self, id: UserId, input: UpdateUserInput) -> FinTrackResult<User> {
        let _guard = self.storage.lock_writes()?;
        let mut user = self.get(id)?;

        if let Some(username) = input.username {
            let username = username.trim();
            validate_username(username).map_err(|e| FinTrackError::Validation(e.to_string()))?;
            if self.storage.users.username_exists(username, Some(id))? {
                return Err(FinTrackError::Duplicate {
                    entity_type: "User",
                    identifier: username.to_string(),
                });
            }
            user.username = username.to_string();
        }

        if let Some(email) = input.email {
            let email = email.trim();
            validate_email(email).map_err(|e| FinTrackError::Validation(e.to_string()))?;
            user.email = email.to_string();
        }

        if let Some(password) = input.password {
            validate_password(&password)?;
            user.password_hash = hash_password(&password)?;
        }

        user.updated_at = chrono::Utc::now();

        self.storage.users.upsert(user.clone())?;
        self.storage.users.save()?;

        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Delete an account together with everything it owns
    pub fn delete(&self, id: UserId) -> FinTrackResult<User> {
        let _guard = self.storage.lock_writes()?;
        let user = self.get(id)?;

        let transactions = self.storage.transactions.delete_for_user(id)?;
        let budgets = self.storage.budgets.delete_for_user(id)?;
        let categories = self.storage.categories.delete_for_user(id)?;
        self.storage.users.delete(id)?;

        self.storage.transactions.save()?;
        self.storage.budgets.save()?;
        self.storage.categories.save()?;
        self.storage.users.save()?;

        info!(
            user_id = %id,
            transactions,
            budgets,
            categories,
            "user deleted"
        );
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FinTrackPaths;
    use crate::models::category::DEFAULT_CATEGORIES;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FinTrackPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn register(service: &UserService, username: &str) -> User {
        service
            .register(RegisterInput {
                username: username.into(),
                email: format!("{}@example.com", username),
                password: "password123".into(),
            })
            .unwrap()
    }

    #[test]
    fn test_register_seeds_default_categories() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        let user = register(&service, "alice");
        let categories = storage.categories.get_by_user(user.id).unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
        assert!(categories.iter().any(|c| c.name == "Food"));
        assert_ne!(user.password_hash, "password123");
    }

    #[test]
    fn test_register_duplicate_username() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        register(&service, "alice");

        let result = service.register(RegisterInput {
            username: "ALICE".into(),
            email: "other@example.com".into(),
            password: "password123".into(),
        });
        assert!(matches!(result, Err(FinTrackError::Duplicate { .. })));
    }

    #[test]
    fn test_register_rejects_bad_input() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        let short_password = service.register(RegisterInput {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "short".into(),
        });
        assert!(short_password.unwrap_err().is_validation());

        let bad_email = service.register(RegisterInput {
            username: "bob".into(),
            email: "not-an-email".into(),
            password: "password123".into(),
        });
        assert!(bad_email.unwrap_err().is_validation());
        assert_eq!(storage.users.count().unwrap(), 0);
    }

    #[test]
    fn test_authenticate() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        let user = register(&service, "alice");

        let found = service.authenticate("alice", "password123").unwrap();
        assert_eq!(found.id, user.id);

        let wrong = service.authenticate("alice", "wrong-password").unwrap_err();
        assert_eq!(wrong.to_string(), format!("Unauthorized: {}", INVALID_CREDENTIALS));
        assert!(service.authenticate("nobody", "password123").is_err());
    }

    #[test]
    fn test_inactive_user_cannot_login() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        let mut user = register(&service, "alice");
        user.is_active = false;
        storage.users.upsert(user).unwrap();

        assert!(matches!(
            service.authenticate("alice", "password123"),
            Err(FinTrackError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_update() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        let alice = register(&service, "alice");
        register(&service, "bob");

        let taken = service.update(
            alice.id,
            UpdateUserInput {
                username: Some("Bob".into()),
                ..Default::default()
            },
        );
        assert!(matches!(taken, Err(FinTrackError::Duplicate { .. })));

        let updated = service
            .update(
                alice.id,
                UpdateUserInput {
                    email: Some("new@example.com".into()),
                    password: Some("another-password".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.username, "alice");
        assert!(service.authenticate("alice", "another-password").is_ok());
    }

    #[test]
    fn test_delete_cascades() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        let alice = register(&service, "alice");
        let bob = register(&service, "bob");

        service.delete(alice.id).unwrap();

        assert!(service.get(alice.id).unwrap_err().is_not_found());
        assert!(storage.categories.get_by_user(alice.id).unwrap().is_empty());
        assert_eq!(
            storage.categories.get_by_user(bob.id).unwrap().len(),
            DEFAULT_CATEGORIES.len()
        );
    }
}
