// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration, login and the caller's own identity.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::{
        authentication::{self, AccountError},
        permissions, Auth, AuthError, Role,
    },
    error::ApiError,
    models::Principal,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

/// Either `name` or `email` identifies the account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub display_name: String,
    #[schema(value_type = String, example = "student")]
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<Principal> for UserResponse {
    fn from(principal: Principal) -> Self {
        Self {
            id: principal.id,
            display_name: principal.display_name,
            role: principal.role,
            email: principal.email,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub message: String,
    /// Send as `Authorization: Bearer <token>`.
    pub token: String,
    /// Unix seconds.
    pub expires_at: i64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionsResponse {
    #[schema(value_type = String)]
    pub role: Role,
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Create a student account and sign it in.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 201, body = TokenResponse),
        (status = 400, description = "Missing name or password"),
        (status = 409, description = "Name or email already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let users = state.users.clone();
    // Password hashing is CPU-bound.
    let principal = tokio::task::spawn_blocking(move || {
        authentication::register(
            users.as_ref(),
            &request.name,
            request.email.as_deref(),
            &request.password,
        )
    })
    .await
    .map_err(ApiError::internal)??;

    let issued = state
        .guard
        .codec()
        .issue(&principal)
        .map_err(AccountError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            message: "User registered successfully".to_string(),
            token: issued.token,
            expires_at: issued.claims.exp,
            user: principal.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = TokenResponse),
        (status = 400, description = "Missing identifier"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let identifier = request
        .name
        .or(request.email)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("Name or email is required"))?;

    let users = state.users.clone();
    let guard = state.guard.clone();
    let (principal, issued) = tokio::task::spawn_blocking(move || {
        authentication::login(users.as_ref(), guard.codec(), &identifier, &request.password)
    })
    .await
    .map_err(ApiError::internal)??;

    Ok(Json(TokenResponse {
        message: "Login successful".to_string(),
        token: issued.token,
        expires_at: issued.claims.exp,
        user: principal.into(),
    }))
}

/// Credentials are stateless; the client discards its token.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 401, description = "Unauthorized - invalid or missing token")
    )
)]
pub async fn logout(Auth(_claims): Auth) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/v1/auth/me",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    Auth(claims): Auth,
) -> Result<Json<UserResponse>, ApiError> {
    let record = state
        .users
        .find_by_id(&claims.sub)?
        .ok_or(AuthError::Unauthenticated)?;
    Ok(Json(record.principal.into()))
}

/// Permissions held by the caller's role, sorted by name.
#[utoipa::path(
    get,
    path = "/v1/auth/permissions",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, body = PermissionsResponse),
        (status = 401, description = "Unauthorized - invalid or missing token")
    )
)]
pub async fn list_permissions(Auth(claims): Auth) -> Json<PermissionsResponse> {
    Json(PermissionsResponse {
        role: claims.role,
        permissions: permissions::permission_names(claims.role)
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}
