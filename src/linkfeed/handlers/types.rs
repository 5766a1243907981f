//! Request/response types for the auth and post endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::linkfeed::storage::{Post, User};

#[derive(ToSchema, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct PostRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub content: String,
    pub author: Uuid,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            content: post.content,
            author: post.author_id,
            author_name: post.author_name,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PostEnvelope {
    pub message: String,
    pub post: PostResponse,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PostListResponse {
    pub message: String,
    pub posts: Vec<PostResponse>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn post_response_uses_camel_case() -> Result<()> {
        let now = Utc::now();
        let response = PostResponse {
            id: Uuid::new_v4(),
            content: "hi".to_string(),
            author: Uuid::new_v4(),
            author_name: "A".to_string(),
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&response)?;
        let author_name = value
            .get("authorName")
            .and_then(serde_json::Value::as_str)
            .context("missing authorName")?;
        assert_eq!(author_name, "A");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("author_name").is_none());
        Ok(())
    }

    #[test]
    fn missing_fields_default_to_empty() -> Result<()> {
        let request: SignupRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#)?;
        assert!(request.name.is_empty());
        assert!(request.password.is_empty());
        Ok(())
    }

    #[test]
    fn debug_redacts_passwords() -> Result<()> {
        let request: LoginRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"secret1"}"#)?;
        let debug = format!("{request:?}");
        assert!(!debug.contains("secret1"));
        Ok(())
    }
}
