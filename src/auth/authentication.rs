// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration and password login.
//!
//! Login resolves the identifier as a display name first, then as an email
//! when it contains `@`. Unknown users, wrong passwords and accounts without a
//! password all fail with the same [`AccountError::InvalidCredentials`].

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use super::password::{hash_password, verify_dummy, verify_password, PasswordError};
use super::token::{IssuedCredential, TokenCodec, TokenError};
use super::Role;
use crate::models::{Principal, UserRecord};
use crate::storage::{StoreError, UserDirectory};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Rejected input, e.g. a blank name.
    #[error("{0}")]
    Validation(String),

    /// Name or email already taken.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AccountError::Conflict(msg),
            other => AccountError::Store(other),
        }
    }
}

/// Input for a new account.
#[derive(Debug, Clone)]
pub struct NewAccount<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub password: &'a str,
    pub role: Role,
}

/// Create an account with an Argon2id password hash.
pub fn create_account(
    directory: &dyn UserDirectory,
    account: NewAccount<'_>,
) -> Result<Principal, AccountError> {
    let name = account.name.trim();
    if name.is_empty() {
        return Err(AccountError::Validation("Name is required".to_string()));
    }
    if account.password.is_empty() {
        return Err(AccountError::Validation("Password is required".to_string()));
    }
    if !account.role.is_known() {
        return Err(AccountError::Validation("Unknown role".to_string()));
    }

    let email = account
        .email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    if directory.find_by_name(name)?.is_some() {
        return Err(AccountError::Conflict(
            "User with this name already exists".to_string(),
        ));
    }
    if let Some(email) = email.as_deref() {
        if directory.find_by_email(email)?.is_some() {
            return Err(AccountError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }
    }

    let principal = Principal {
        id: Uuid::new_v4().to_string(),
        display_name: name.to_string(),
        role: account.role,
        email,
    };

    directory.insert(UserRecord {
        principal: principal.clone(),
        password_hash: Some(hash_password(account.password)?),
        created_at: Utc::now(),
        last_active_at: None,
    })?;

    tracing::info!(user_id = %principal.id, role = %principal.role, "account created");
    Ok(principal)
}

/// Self-service registration. Always creates a student.
pub fn register(
    directory: &dyn UserDirectory,
    name: &str,
    email: Option<&str>,
    password: &str,
) -> Result<Principal, AccountError> {
    create_account(
        directory,
        NewAccount {
            name,
            email,
            password,
            role: Role::Student,
        },
    )
}

pub fn authenticate(
    directory: &dyn UserDirectory,
    identifier: &str,
    password: &str,
) -> Result<Principal, AccountError> {
    let identifier = identifier.trim();

    let mut record = directory.find_by_name(identifier)?;
    if record.is_none() && identifier.contains('@') {
        record = directory.find_by_email(identifier)?;
    }
    let Some((record, hash)) = record.and_then(|r| {
        let hash = r.password_hash.clone()?;
        Some((r, hash))
    }) else {
        verify_dummy(password);
        return Err(AccountError::InvalidCredentials);
    };

    match verify_password(password, &hash) {
        Ok(true) => Ok(record.principal),
        Ok(false) => Err(AccountError::InvalidCredentials),
        Err(e) => {
            tracing::warn!(user_id = %record.principal.id, error = %e, "stored password hash is unreadable");
            Err(AccountError::InvalidCredentials)
        }
    }
}

/// Authenticate and issue a credential with the codec's configured lifetime.
pub fn login(
    directory: &dyn UserDirectory,
    codec: &TokenCodec,
    identifier: &str,
    password: &str,
) -> Result<(Principal, IssuedCredential), AccountError> {
    let principal = authenticate(directory, identifier, password)?;
    let issued = codec.issue(&principal)?;
    if let Err(e) = directory.touch_last_active(&principal.id, Utc::now()) {
        tracing::warn!(user_id = %principal.id, error = %e, "failed to record login activity");
    }
    Ok((principal, issued))
}
