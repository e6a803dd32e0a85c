// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Codec
//!
//! Issues and verifies compact bearer credentials.
//!
//! ## Format
//!
//! ```text
//! base64url(claims_json) "." base64url(HMAC-SHA256(secret, claims_json))
//! ```
//!
//! Both segments use the URL-safe alphabet without padding, so a credential
//! can be placed in an `Authorization: Bearer` header without escaping.
//!
//! ## Failure Reporting
//!
//! Malformed text, a signature mismatch and an expired credential all surface
//! as the same [`TokenError::Invalid`]. Callers cannot tell which check failed.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use super::Claims;
use crate::config::{SigningSecret, TokenConfig};
use crate::models::Principal;

type HmacSha256 = Hmac<Sha256>;

const SEGMENT_SEPARATOR: char = '.';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed, forged, tampered or expired. Deliberately opaque.
    #[error("credential is invalid")]
    Invalid,

    #[error("failed to issue credential: {0}")]
    Issue(String),
}

/// A freshly minted credential.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    /// Transport form, suitable for `Authorization: Bearer <token>`.
    pub token: String,
    pub claims: Claims,
}

/// Signs and verifies credentials with the process-wide secret.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    secret: SigningSecret,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            ttl: config.ttl,
        }
    }

    /// Issue a credential with the configured lifetime.
    pub fn issue(&self, principal: &Principal) -> Result<IssuedCredential, TokenError> {
        self.issue_at(principal, self.ttl, Utc::now())
    }

    /// Issue a credential as of `now`.
    pub fn issue_at(
        &self,
        principal: &Principal,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedCredential, TokenError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Issue("lifetime out of range".to_string()))?;
        let claims = Claims::for_principal(principal, now, expires_at);
        let payload = serde_json::to_vec(&claims).map_err(|e| TokenError::Issue(e.to_string()))?;

        let mut mac = self.mac().map_err(|_| TokenError::Issue("invalid key".to_string()))?;
        mac.update(&payload);
        let signature = mac.finalize().into_bytes();

        let token = format!(
            "{}{SEGMENT_SEPARATOR}{}",
            Base64UrlUnpadded::encode_string(&payload),
            Base64UrlUnpadded::encode_string(&signature)
        );

        tracing::debug!(principal_id = %claims.sub, exp = claims.exp, "issued credential");

        Ok(IssuedCredential { token, claims })
    }

    /// Verify a credential against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a credential as of `now`.
    ///
    /// The signature check runs before the claims are parsed and uses a
    /// constant-time comparison.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let (payload_b64, signature_b64) = token
            .trim()
            .split_once(SEGMENT_SEPARATOR)
            .ok_or(TokenError::Invalid)?;
        if signature_b64.contains(SEGMENT_SEPARATOR) {
            return Err(TokenError::Invalid);
        }

        let payload = Base64UrlUnpadded::decode_vec(payload_b64).map_err(|_| TokenError::Invalid)?;
        let signature =
            Base64UrlUnpadded::decode_vec(signature_b64).map_err(|_| TokenError::Invalid)?;

        let mut mac = self.mac().map_err(|_| TokenError::Invalid)?;
        mac.update(&payload);
        mac.verify_slice(&signature).map_err(|_| TokenError::Invalid)?;

        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Invalid)?;

        if claims.exp < claims.iat || claims.is_expired_at(now) {
            return Err(TokenError::Invalid);
        }

        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, hmac::digest::InvalidLength> {
        HmacSha256::new_from_slice(self.secret.expose())
    }
}
