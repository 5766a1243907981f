//! Post CRUD handlers.
//!
//! Every route here is mounted behind the auth guard, so handlers receive the
//! caller's [`Identity`] from the request extensions. Edits and deletes go
//! through the ownership check: a missing post is `404` before a foreign post
//! is `403`.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::types::{MessageResponse, PostEnvelope, PostListResponse, PostRequest, PostResponse};
use crate::linkfeed::{
    error::ApiError,
    guard::Identity,
    ownership::{authorize_mutation, Mutation, POST_NOT_FOUND_MESSAGE},
    storage::User,
    AppState,
};

pub const CONTENT_REQUIRED_MESSAGE: &str = "Post content is required";

/// Trimmed, non-empty post content from an optional JSON body.
fn required_content(payload: Option<Json<PostRequest>>) -> Result<String, ApiError> {
    let content = payload
        .map(|Json(request)| request.content)
        .unwrap_or_default();
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::invalid_input(CONTENT_REQUIRED_MESSAGE));
    }
    Ok(content.to_string())
}

/// Path ids that are not UUIDs cannot name a post.
fn parse_post_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(POST_NOT_FOUND_MESSAGE))
}

#[utoipa::path(
    get,
    path = "/api/posts",
    responses(
        (status = 200, description = "All posts, newest first", body = PostListResponse),
        (status = 401, description = "Missing or invalid bearer token", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[instrument(skip_all)]
pub async fn list_posts(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<PostListResponse>, ApiError> {
    let posts = state.store().list_posts().await?;

    Ok(Json(PostListResponse {
        message: "Posts retrieved successfully".to_string(),
        posts: posts.into_iter().map(PostResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = PostRequest,
    responses(
        (status = 201, description = "Post created", body = PostEnvelope),
        (status = 400, description = "Empty content", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[instrument(skip_all, fields(user_id = %identity.id))]
pub async fn create_post(
    Extension(state): Extension<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    payload: Option<Json<PostRequest>>,
) -> Result<(StatusCode, Json<PostEnvelope>), ApiError> {
    let content = required_content(payload)?;

    let post = state
        .store()
        .insert_post(&User::from(&identity), &content)
        .await?;

    info!(post_id = %post.id, "post created");

    Ok((
        StatusCode::CREATED,
        Json(PostEnvelope {
            message: "Post created successfully".to_string(),
            post: PostResponse::from(post),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    request_body = PostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostEnvelope),
        (status = 400, description = "Empty content", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = MessageResponse),
        (status = 403, description = "Caller is not the author", body = MessageResponse),
        (status = 404, description = "Post not found", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[instrument(skip_all, fields(user_id = %identity.id))]
pub async fn update_post(
    Extension(state): Extension<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    payload: Option<Json<PostRequest>>,
) -> Result<Json<PostEnvelope>, ApiError> {
    let content = required_content(payload)?;
    let post_id = parse_post_id(&id)?;

    let existing = state.store().find_post(post_id).await?;
    authorize_mutation(existing, &identity, Mutation::Edit)?;

    // The post may have been deleted since the lookup.
    let Some(post) = state.store().update_post(post_id, &content).await? else {
        debug!(%post_id, "post vanished before update");
        return Err(ApiError::NotFound(POST_NOT_FOUND_MESSAGE));
    };

    info!(%post_id, "post updated");

    Ok(Json(PostEnvelope {
        message: "Post updated successfully".to_string(),
        post: PostResponse::from(post),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = MessageResponse),
        (status = 403, description = "Caller is not the author", body = MessageResponse),
        (status = 404, description = "Post not found", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[instrument(skip_all, fields(user_id = %identity.id))]
pub async fn delete_post(
    Extension(state): Extension<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let post_id = parse_post_id(&id)?;

    let existing = state.store().find_post(post_id).await?;
    authorize_mutation(existing, &identity, Mutation::Delete)?;

    if !state.store().delete_post(post_id).await? {
        debug!(%post_id, "post already deleted");
        return Err(ApiError::NotFound(POST_NOT_FOUND_MESSAGE));
    }

    info!(%post_id, "post deleted");

    Ok(Json(MessageResponse {
        message: "Post deleted successfully".to_string(),
    }))
}
