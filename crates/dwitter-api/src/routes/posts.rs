use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use dwitter_types::{Post, PostId, PostThread};

use crate::{
    auth::CurrentCaller,
    error::{ApiError, ApiResult},
    routes::json_body,
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub text: String,
    pub reply_to: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: Uuid,
    pub owner: String,
    pub text: String,
    pub reply_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Reply tree, oldest first. Omitted when not loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<PostResponse>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPostsQuery {
    /// Page size (default 20, capped at 100)
    pub limit: Option<usize>,
    /// Number of posts to skip
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListPostsResponse {
    pub posts: Vec<PostResponse>,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

/// List posts, newest first, each with its replies
#[utoipa::path(
    get,
    path = "/api/posts",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Page of posts", body = ListPostsResponse),
        (status = 400, description = "Invalid query")
    ),
    tag = "posts"
)]
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    CurrentCaller(caller): CurrentCaller,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> ApiResult<Json<ListPostsResponse>> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let page = state
        .services
        .posts()
        .list(&caller, query.limit, query.offset.unwrap_or(0))
        .await?;

    Ok(Json(ListPostsResponse {
        posts: page.items.into_iter().map(thread_to_response).collect(),
        offset: page.offset,
        limit: page.limit,
        has_more: page.has_more,
    }))
}

/// Publish a post or a reply
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Not authenticated")
    ),
    tag = "posts"
)]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    CurrentCaller(caller): CurrentCaller,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PostResponse>)> {
    let payload = json_body(payload)?;
    let post = state.services.posts().create(&caller, &payload).await?;

    Ok((StatusCode::CREATED, Json(post_to_response(post))))
}

/// Get a post with its reply tree
#[utoipa::path(
    get,
    path = "/api/posts/{post_id}",
    params(
        ("post_id" = Uuid, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post and replies", body = PostResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    CurrentCaller(caller): CurrentCaller,
    Path(post_id): Path<String>,
) -> ApiResult<Json<PostResponse>> {
    let id = parse_post_id(&post_id)?;
    let thread = state.services.posts().retrieve(&caller, id).await?;

    Ok(Json(thread_to_response(thread)))
}

/// Edit a post's text. PUT and PATCH both apply a partial update.
#[utoipa::path(
    patch,
    path = "/api/posts/{post_id}",
    params(
        ("post_id" = Uuid, Path, description = "Post ID")
    ),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated post", body = PostResponse),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    CurrentCaller(caller): CurrentCaller,
    Path(post_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<PostResponse>> {
    let id = parse_post_id(&post_id)?;
    let payload = json_body(payload)?;
    let post = state.services.posts().update(&caller, id, &payload).await?;

    Ok(Json(post_to_response(post)))
}

// A malformed id cannot name an existing post
fn parse_post_id(raw: &str) -> ApiResult<PostId> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

fn post_to_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        owner: post.owner,
        text: post.text,
        reply_to: post.reply_to,
        created_at: post.created_at,
        replies: None,
    }
}

fn thread_to_response(thread: PostThread) -> PostResponse {
    let replies = thread.replies.into_iter().map(thread_to_response).collect();
    PostResponse {
        replies: Some(replies),
        ..post_to_response(thread.post)
    }
}
