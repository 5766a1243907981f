//! In-memory [`Store`] used by the router tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialRecord, Post, SignupOutcome, Store, User};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, CredentialRecord>,
    // Insertion order; list_posts sorts on top of it.
    posts: Vec<Post>,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Drop a user, simulating an account removed after its token was issued.
    pub(crate) async fn remove_user(&self, id: Uuid) {
        self.inner.write().await.users.remove(&id);
    }

    /// Make `ping` fail, as a lost database connection would.
    pub(crate) fn set_unavailable(&self) {
        self.unavailable.store(true, Ordering::Relaxed);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<SignupOutcome> {
        let mut inner = self.inner.write().await;
        let taken = inner
            .users
            .values()
            .any(|record| record.user.email.eq_ignore_ascii_case(email));
        if taken {
            return Ok(SignupOutcome::Conflict);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
        };
        inner.users.insert(
            user.id,
            CredentialRecord {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(SignupOutcome::Created(user))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<CredentialRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|record| record.user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).map(|record| record.user.clone()))
    }

    async fn insert_post(&self, author: &User, content: &str) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            content: content.to_string(),
            author_id: author.id,
            author_name: author.name.clone(),
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.posts.push(post.clone());
        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let inner = self.inner.read().await;
        let mut posts: Vec<Post> = inner.posts.iter().rev().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        let inner = self.inner.read().await;
        Ok(inner.posts.iter().find(|post| post.id == id).cloned())
    }

    async fn update_post(&self, id: Uuid, content: &str) -> Result<Option<Post>> {
        let mut inner = self.inner.write().await;
        Ok(inner.posts.iter_mut().find(|post| post.id == id).map(|post| {
            post.content = content.to_string();
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.posts.len();
        inner.posts.retain(|post| post.id != id);
        Ok(inner.posts.len() < before)
    }

    async fn ping(&self) -> Result<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            anyhow::bail!("store unavailable");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() -> Result<()> {
        let store = MemoryStore::new();
        assert!(matches!(
            store.insert_user("A", "a@x.com", "hash").await?,
            SignupOutcome::Created(_)
        ));
        assert!(matches!(
            store.insert_user("B", "A@X.COM", "hash").await?,
            SignupOutcome::Conflict
        ));
        Ok(())
    }

    #[tokio::test]
    async fn posts_list_newest_first_and_delete_once() -> Result<()> {
        let store = MemoryStore::new();
        let SignupOutcome::Created(author) = store.insert_user("A", "a@x.com", "hash").await? else {
            anyhow::bail!("expected user to be created");
        };

        let first = store.insert_post(&author, "first").await?;
        let second = store.insert_post(&author, "second").await?;

        let listed = store.list_posts().await?;
        assert_eq!(listed.first().map(|p| p.id), Some(second.id));
        assert_eq!(listed.last().map(|p| p.id), Some(first.id));

        assert!(store.delete_post(first.id).await?);
        assert!(!store.delete_post(first.id).await?);
        assert!(store.update_post(first.id, "gone").await?.is_none());
        Ok(())
    }
}
