use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use dwitter_dispatch::AccountView;
use dwitter_types::Session;

use crate::{auth::CurrentCaller, error::ApiResult, routes::json_body, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub password2: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// Account profile. `is_admin` and `date_joined` are only present for the
/// account itself and for administrators.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_joined: Option<DateTime<Utc>>,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/accounts",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid fields")
    ),
    tag = "accounts"
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    CurrentCaller(caller): CurrentCaller,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AccountResponse>)> {
    let payload = json_body(payload)?;
    let account = state.services.accounts().signup(&caller, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(view_to_response(AccountView::full(&account))),
    ))
}

/// Exchange credentials for a session token
#[utoipa::path(
    post,
    path = "/api/accounts/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "accounts"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    CurrentCaller(caller): CurrentCaller,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let payload = json_body(payload)?;
    let session = state
        .services
        .sessions()
        .authenticate(&caller, &payload)
        .await?;

    Ok(Json(session_to_response(session)))
}

/// Revoke the caller's session token
#[utoipa::path(
    post,
    path = "/api/accounts/logout",
    responses(
        (status = 202, description = "Logged out"),
        (status = 401, description = "Invalid token"),
        (status = 403, description = "Not authenticated"),
        (status = 404, description = "No active session")
    ),
    tag = "accounts"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    CurrentCaller(caller): CurrentCaller,
) -> ApiResult<StatusCode> {
    state.services.sessions().deauthenticate(&caller).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Get an account profile
#[utoipa::path(
    get,
    path = "/api/accounts/{username}",
    params(
        ("username" = String, Path, description = "Account username")
    ),
    responses(
        (status = 200, description = "Account profile", body = AccountResponse),
        (status = 403, description = "Not authenticated"),
        (status = 404, description = "Account not found")
    ),
    tag = "accounts"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    CurrentCaller(caller): CurrentCaller,
    Path(username): Path<String>,
) -> ApiResult<Json<AccountResponse>> {
    let view = state.services.accounts().retrieve(&caller, &username).await?;
    Ok(Json(view_to_response(view)))
}

/// Update an account profile. PUT and PATCH both apply a partial update.
#[utoipa::path(
    patch,
    path = "/api/accounts/{username}",
    params(
        ("username" = String, Path, description = "Account username")
    ),
    request_body = AccountUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = AccountResponse),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "Account not found")
    ),
    tag = "accounts"
)]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    CurrentCaller(caller): CurrentCaller,
    Path(username): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<AccountResponse>> {
    let payload = json_body(payload)?;
    let account = state
        .services
        .accounts()
        .update(&caller, &username, &payload)
        .await?;

    Ok(Json(view_to_response(AccountView::select(&caller, &account))))
}

fn view_to_response(view: AccountView) -> AccountResponse {
    match view {
        AccountView::Full {
            username,
            first_name,
            last_name,
            email,
            is_admin,
            date_joined,
        } => AccountResponse {
            username,
            first_name,
            last_name,
            email,
            is_admin: Some(is_admin),
            date_joined: Some(date_joined),
        },
        AccountView::Restricted {
            username,
            first_name,
            last_name,
            email,
        } => AccountResponse {
            username,
            first_name,
            last_name,
            email,
            is_admin: None,
            date_joined: None,
        },
    }
}

fn session_to_response(session: Session) -> LoginResponse {
    LoginResponse {
        token: session.token.into_inner(),
        username: session.username,
    }
}
