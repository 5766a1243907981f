//! Persistence seam for users and posts.
//!
//! Handlers only talk to the [`Store`] trait. `PgStore` is the production
//! implementation; the test-suite swaps in an in-memory store so the HTTP
//! surface can be exercised without a database.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[cfg(test)]
pub(crate) mod memory;
mod postgres;

pub use postgres::PgStore;

/// Public user fields. Never carries the password hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// User plus stored password hash, only returned by the login lookup.
#[derive(Clone)]
pub struct CredentialRecord {
    pub user: User,
    pub password_hash: String,
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("user", &self.user)
            .field("password_hash", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome when attempting to create a new user.
#[derive(Debug)]
pub enum SignupOutcome {
    Created(User),
    Conflict,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a user; `email` must already be normalized.
    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<SignupOutcome>;

    /// Look up login data by normalized email.
    async fn find_credentials(&self, email: &str) -> Result<Option<CredentialRecord>>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;

    async fn insert_post(&self, author: &User, content: &str) -> Result<Post>;

    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<Post>>;

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>>;

    /// Replace the content of a post. `None` if the post no longer exists.
    async fn update_post(&self, id: Uuid, content: &str) -> Result<Option<Post>>;

    /// Remove a post. `false` if there was nothing to remove.
    async fn delete_post(&self, id: Uuid) -> Result<bool>;

    /// Connectivity check for `/health`.
    async fn ping(&self) -> Result<()>;
}
