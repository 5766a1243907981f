//! Post ownership rules for edit and delete.

use super::{error::ApiError, guard::Identity, storage::Post};

pub const POST_NOT_FOUND_MESSAGE: &str = "Post not found";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    Edit,
    Delete,
}

impl Mutation {
    const fn forbidden_message(self) -> &'static str {
        match self {
            Self::Edit => "You can only edit your own posts",
            Self::Delete => "You can only delete your own posts",
        }
    }
}

#[must_use]
pub fn can_mutate(post: &Post, identity: &Identity) -> bool {
    post.author_id == identity.id
}

/// Existence first, ownership second.
///
/// # Errors
/// `NotFound` when there is no post, `Forbidden` when the caller is not its author.
pub fn authorize_mutation(
    post: Option<Post>,
    identity: &Identity,
    mutation: Mutation,
) -> Result<Post, ApiError> {
    let post = post.ok_or(ApiError::NotFound(POST_NOT_FOUND_MESSAGE))?;

    if can_mutate(&post, identity) {
        Ok(post)
    } else {
        Err(ApiError::Forbidden(mutation.forbidden_message()))
    }
}
