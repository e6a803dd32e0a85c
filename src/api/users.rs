// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User profile and progress endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::auth::UserResponse;
use super::allowed;
use crate::{
    auth::{guard, Auth, AuthError, Credential, Permission},
    error::ApiError,
    models::ChallengeId,
    progression::Availability,
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressResponse {
    pub user_id: String,
    /// Ascending.
    pub completed_challenges: Vec<ChallengeId>,
    pub challenges: Availability,
}

/// Own profile, or anyone's with `view_users`.
#[utoipa::path(
    get,
    path = "/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User identifier")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Not the owner and lacking view_users"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    credential: Credential,
) -> Result<Json<UserResponse>, ApiError> {
    allowed(
        &state,
        state
            .guard
            .authorize_owner_or_permission(credential.as_str(), &user_id, Permission::ViewUsers),
    )?;

    let record = state
        .users
        .find_by_id(&user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(record.principal.into()))
}

/// Completed challenges and availability for a user.
///
/// Teachers may read students' progress, admins anyone's.
#[utoipa::path(
    get,
    path = "/v1/users/{user_id}/progress",
    params(("user_id" = String, Path, description = "User identifier")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ProgressResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Auth(claims): Auth,
) -> Result<Json<ProgressResponse>, ApiError> {
    let viewer_permissions = [Permission::ViewStudentProgress, Permission::ViewAllProgress];
    if claims.sub != user_id {
        guard::check_any(&claims, &viewer_permissions)?;
    }

    let target = state
        .users
        .find_by_id(&user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if !guard::can_access_user_data(&claims, &target.principal) {
        return Err(AuthError::Forbidden {
            required: viewer_permissions.to_vec(),
        }
        .into());
    }

    let progress = state.progression.progress_for(&user_id)?;
    let mut completed_challenges: Vec<ChallengeId> = progress.completed.into_iter().collect();
    completed_challenges.sort();

    Ok(Json(ProgressResponse {
        user_id,
        completed_challenges,
        challenges: progress.availability,
    }))
}
