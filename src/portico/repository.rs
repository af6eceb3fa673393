//! User storage.
//!
//! Handlers depend on [`UserRepository`] only. The in-memory implementation
//! keeps users in insertion order for the lifetime of the process.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// A registered account. The password is only ever held as a bcrypt hash.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"***")
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("user with email {0} already exists")]
    Conflict(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exact, case-sensitive lookup.
    async fn find_by_email(&self, email: &str) -> Option<User>;

    async fn exists_by_email(&self, email: &str) -> bool;

    /// Append a user.
    ///
    /// # Errors
    /// Returns [`RepositoryError::Conflict`] if the email is already taken.
    async fn insert(&self, user: User) -> Result<(), RepositoryError>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned()
    }

    async fn exists_by_email(&self, email: &str) -> bool {
        self.users
            .read()
            .await
            .iter()
            .any(|user| user.email == email)
    }

    async fn insert(&self, user: User) -> Result<(), RepositoryError> {
        // check and append under one write lock
        let mut users = self.users.write().await;

        if users.iter().any(|existing| existing.email == user.email) {
            return Err(RepositoryError::Conflict(user.email));
        }

        users.push(user);

        Ok(())
    }
}
