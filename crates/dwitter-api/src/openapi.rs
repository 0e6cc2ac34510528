use axum::Json;
use utoipa::OpenApi;

use crate::routes::{accounts, health, posts};

#[derive(OpenApi)]
#[openapi(
    info(title = "Dwitter API", description = "Accounts, posts and session tokens"),
    paths(
        health::health_check,
        accounts::signup,
        accounts::login,
        accounts::logout,
        accounts::get_account,
        accounts::update_account,
        posts::list_posts,
        posts::create_post,
        posts::get_post,
        posts::update_post,
    ),
    components(schemas(
        health::HealthResponse,
        accounts::SignupRequest,
        accounts::AccountUpdateRequest,
        accounts::LoginRequest,
        accounts::LoginResponse,
        accounts::AccountResponse,
        posts::CreatePostRequest,
        posts::UpdatePostRequest,
        posts::PostResponse,
        posts::ListPostsResponse,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "accounts", description = "Registration, profiles and sessions"),
        (name = "posts", description = "Posts and reply threads")
    )
)]
pub struct ApiDoc;

/// OpenAPI document for the whole API
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
