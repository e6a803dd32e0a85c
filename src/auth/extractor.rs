// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for bearer credentials.
//!
//! `Credential` only reads the header; handlers pass it to the
//! [`Guard`](super::Guard) to get a decision. `Auth` verifies it as well:
//!
//! ```rust,ignore
//! async fn me(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims.sub is the caller's id
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, Claims};
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Raw credential text from `Authorization: Bearer <credential>`.
#[derive(Debug, Clone)]
pub struct Credential(pub String);

impl Credential {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Credential {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = header
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidAuthHeader)?;

        Ok(Credential(token.to_string()))
    }
}

/// Verified claims of the caller.
///
/// Successful verification records the caller's last activity. That update
/// never affects the outcome: failures are only logged.
pub struct Auth(pub Claims);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credential = Credential::from_request_parts(parts, state).await?;
        let claims = state.guard.authenticate(credential.as_str())?;

        state.record_activity(&claims.sub);
        Ok(Auth(claims))
    }
}
