// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer credentials and role-based authorization for the academy API.
//!
//! ## Auth Flow
//!
//! 1. Client logs in with name (or email) and password
//! 2. Server verifies the Argon2id hash and issues a signed credential
//! 3. Client sends `Authorization: Bearer <credential>`
//! 4. Server:
//!    - Verifies the HMAC-SHA256 signature in constant time
//!    - Rejects expired credentials
//!    - Checks the role's permissions for the requested operation
//!
//! ## Security
//!
//! - Every verification failure looks the same to the caller
//! - The signing secret is injected at startup and never logged
//! - The permission catalog is fixed at compile time; there is no API to
//!   grant permissions at runtime

pub mod authentication;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod guard;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod token;

pub use authentication::AccountError;
pub use claims::Claims;
pub use error::AuthError;
pub use extractor::{Auth, Credential};
pub use guard::{Decision, Denial, Guard};
pub use permissions::Permission;
pub use roles::Role;
pub use token::{IssuedCredential, TokenCodec, TokenError};
