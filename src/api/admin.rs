// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only endpoints.

use axum::{extract::State, Json};

use super::allowed;
use crate::{
    auth::{Credential, Permission},
    error::ApiError,
    progression::PrerequisiteStatistics,
    state::AppState,
};

/// Catalog-wide prerequisite statistics, including every cyclic challenge.
#[utoipa::path(
    get,
    path = "/v1/admin/prerequisites/statistics",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, body = PrerequisiteStatistics),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Lacking manage_system")
    )
)]
pub async fn prerequisite_statistics(
    State(state): State<AppState>,
    credential: Credential,
) -> Result<Json<PrerequisiteStatistics>, ApiError> {
    allowed(
        &state,
        state.guard.authorize(credential.as_str(), Permission::ManageSystem),
    )?;
    Ok(Json(state.progression.statistics()?))
}
