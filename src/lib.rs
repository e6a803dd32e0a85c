// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Academy Server - Learning Platform Access & Progression Service
//!
//! Issues and verifies signed bearer credentials, enforces the
//! Student/Teacher/Admin permission catalog and gates challenge progression
//! through the prerequisite graph.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Credentials, roles, permissions and authorization decisions
//! - `progression` - Prerequisite graph resolution and learning paths
//! - `storage` - Ports to the user directory, catalog and progress records
//! - `store` - In-memory implementation of the storage ports

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod progression;
pub mod state;
pub mod storage;
pub mod store;
