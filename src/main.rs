// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc};

use academy_server::{
    api::router,
    auth::{
        authentication::{create_account, NewAccount},
        AccountError, Guard, Role, TokenCodec,
    },
    config::AppConfig,
    logging::init_tracing,
    state::AppState,
    store::InMemoryStore,
};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);

    let store = Arc::new(InMemoryStore::new());

    if let Some(path) = &config.catalog_path {
        match store.load_catalog_file(path) {
            Ok(count) => tracing::info!(path = %path.display(), challenges = count, "catalog loaded"),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to load catalog");
                std::process::exit(1);
            }
        }
    }

    if let Some(seed) = &config.seed_admin {
        let account = NewAccount {
            name: &seed.name,
            email: None,
            password: &seed.password,
            role: Role::Admin,
        };
        match create_account(store.as_ref(), account) {
            Ok(principal) => tracing::info!(user_id = %principal.id, "seeded admin account"),
            Err(AccountError::Conflict(_)) => {}
            Err(e) => {
                tracing::error!(error = %e, "failed to seed admin account");
                std::process::exit(1);
            }
        }
    }

    let guard = Guard::new(TokenCodec::new(&config.token));
    let app = router(AppState::in_memory(guard, store));

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(host = %config.host, port = config.port, error = %e, "invalid bind address");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, ttl_hours = config.token.ttl.num_hours(), "academy server listening (docs at /docs)");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
