// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Challenge access and prerequisite endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::allowed;
use crate::{
    auth::{Credential, Permission},
    error::ApiError,
    models::ChallengeId,
    progression::{AccessCheck, Availability, ChainExpansion, ChallengeDescriptor, LearningStep},
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChallengeQuery {
    /// Only list challenges of this module.
    pub module_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LearningPathResponse {
    pub target: ChallengeId,
    /// In completion order. Empty when the target is already accessible.
    pub steps: Vec<LearningStep>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompletionResponse {
    pub challenge_id: ChallengeId,
    pub completed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_prerequisites: Vec<ChallengeDescriptor>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PrerequisiteUpdateRequest {
    pub prerequisites: Vec<ChallengeId>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationResponse {
    pub valid: bool,
}

/// Active challenges split into available and locked for the caller.
#[utoipa::path(
    get,
    path = "/v1/challenges",
    params(ChallengeQuery),
    tag = "Challenges",
    security(("bearer" = [])),
    responses(
        (status = 200, body = Availability),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Lacking view_challenges")
    )
)]
pub async fn list_challenges(
    State(state): State<AppState>,
    Query(query): Query<ChallengeQuery>,
    credential: Credential,
) -> Result<Json<Availability>, ApiError> {
    let claims = allowed(
        &state,
        state.guard.authorize(credential.as_str(), Permission::ViewChallenges),
    )?;
    let availability = state
        .progression
        .available_challenges(&claims.sub, query.module_id.as_deref())?;
    Ok(Json(availability))
}

/// Whether the caller has met every prerequisite.
///
/// An unknown challenge has no prerequisites to meet.
#[utoipa::path(
    get,
    path = "/v1/challenges/{challenge_id}/access",
    params(("challenge_id" = i64, Path, description = "Challenge identifier")),
    tag = "Challenges",
    security(("bearer" = [])),
    responses(
        (status = 200, body = AccessCheck),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Lacking view_challenges")
    )
)]
pub async fn check_access(
    State(state): State<AppState>,
    Path(challenge_id): Path<ChallengeId>,
    credential: Credential,
) -> Result<Json<AccessCheck>, ApiError> {
    let claims = allowed(
        &state,
        state.guard.authorize(credential.as_str(), Permission::ViewChallenges),
    )?;
    Ok(Json(state.progression.can_access(&claims.sub, challenge_id)?))
}

/// Transitive prerequisites with their depth.
#[utoipa::path(
    get,
    path = "/v1/challenges/{challenge_id}/chain",
    params(("challenge_id" = i64, Path, description = "Challenge identifier")),
    tag = "Challenges",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ChainExpansion),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Lacking view_challenges")
    )
)]
pub async fn prerequisite_chain(
    State(state): State<AppState>,
    Path(challenge_id): Path<ChallengeId>,
    credential: Credential,
) -> Result<Json<ChainExpansion>, ApiError> {
    allowed(
        &state,
        state.guard.authorize(credential.as_str(), Permission::ViewChallenges),
    )?;
    Ok(Json(state.progression.expand_chain(challenge_id)?))
}

/// Ordered challenges the caller still has to complete to unlock the target.
#[utoipa::path(
    get,
    path = "/v1/challenges/{challenge_id}/learning-path",
    params(("challenge_id" = i64, Path, description = "Target challenge")),
    tag = "Challenges",
    security(("bearer" = [])),
    responses(
        (status = 200, body = LearningPathResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Lacking view_challenges"),
        (status = 409, description = "Prerequisite data contains a cycle")
    )
)]
pub async fn learning_path(
    State(state): State<AppState>,
    Path(challenge_id): Path<ChallengeId>,
    credential: Credential,
) -> Result<Json<LearningPathResponse>, ApiError> {
    let claims = allowed(
        &state,
        state.guard.authorize(credential.as_str(), Permission::ViewChallenges),
    )?;
    let steps = state
        .progression
        .suggest_path_detailed(&claims.sub, challenge_id)?;
    Ok(Json(LearningPathResponse {
        target: challenge_id,
        steps,
    }))
}

/// Mark a challenge completed. Refused while prerequisites are unmet.
#[utoipa::path(
    post,
    path = "/v1/challenges/{challenge_id}/complete",
    params(("challenge_id" = i64, Path, description = "Challenge identifier")),
    tag = "Challenges",
    security(("bearer" = [])),
    responses(
        (status = 200, body = CompletionResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Prerequisites not met", body = CompletionResponse),
        (status = 404, description = "Challenge not found")
    )
)]
pub async fn complete_challenge(
    State(state): State<AppState>,
    Path(challenge_id): Path<ChallengeId>,
    credential: Credential,
) -> Result<(StatusCode, Json<CompletionResponse>), ApiError> {
    let claims = allowed(
        &state,
        state.guard.authorize(credential.as_str(), Permission::ViewChallenges),
    )?;
    let check = state.progression.complete(&claims.sub, challenge_id)?;

    let status = if check.accessible {
        tracing::info!(user_id = %claims.sub, challenge_id = %challenge_id, "challenge completed");
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    };
    Ok((
        status,
        Json(CompletionResponse {
            challenge_id,
            completed: check.accessible,
            missing_prerequisites: check.missing_prerequisites,
        }),
    ))
}

/// Challenges that list this one as a direct prerequisite.
#[utoipa::path(
    get,
    path = "/v1/challenges/{challenge_id}/dependents",
    params(("challenge_id" = i64, Path, description = "Challenge identifier")),
    tag = "Challenges",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [ChallengeDescriptor]),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Lacking edit_challenges")
    )
)]
pub async fn dependents(
    State(state): State<AppState>,
    Path(challenge_id): Path<ChallengeId>,
    credential: Credential,
) -> Result<Json<Vec<ChallengeDescriptor>>, ApiError> {
    allowed(
        &state,
        state.guard.authorize(credential.as_str(), Permission::EditChallenges),
    )?;
    Ok(Json(state.progression.dependents(challenge_id)?))
}

/// Dry-run a prerequisite edit. Nothing is written.
#[utoipa::path(
    post,
    path = "/v1/challenges/{challenge_id}/prerequisites/validate",
    params(("challenge_id" = i64, Path, description = "Challenge identifier")),
    request_body = PrerequisiteUpdateRequest,
    tag = "Challenges",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ValidationResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Lacking edit_challenges"),
        (status = 404, description = "Challenge not found"),
        (status = 409, description = "The edit would create a cycle")
    )
)]
pub async fn validate_prerequisites(
    State(state): State<AppState>,
    Path(challenge_id): Path<ChallengeId>,
    credential: Credential,
    Json(request): Json<PrerequisiteUpdateRequest>,
) -> Result<Json<ValidationResponse>, ApiError> {
    allowed(
        &state,
        state.guard.authorize(credential.as_str(), Permission::EditChallenges),
    )?;
    state
        .progression
        .validate_prerequisite_update(challenge_id, &request.prerequisites)?;
    Ok(Json(ValidationResponse { valid: true }))
}
