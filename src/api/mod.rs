// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{Claims, Decision},
    error::ApiError,
    models::{Challenge, ChallengeId, Difficulty},
    progression::{
        AccessCheck, Availability, AvailableChallenge, ChainEntry, ChainExpansion,
        ChallengeDescriptor, ChallengeStatus, LearningStep, LockedChallenge,
        PrerequisiteStatistics,
    },
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod challenges;
pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/permissions", get(auth::list_permissions))
        .route("/users/{user_id}", get(users::get_user))
        .route("/users/{user_id}/progress", get(users::get_user_progress))
        .route("/challenges", get(challenges::list_challenges))
        .route(
            "/challenges/{challenge_id}/access",
            get(challenges::check_access),
        )
        .route(
            "/challenges/{challenge_id}/chain",
            get(challenges::prerequisite_chain),
        )
        .route(
            "/challenges/{challenge_id}/learning-path",
            get(challenges::learning_path),
        )
        .route(
            "/challenges/{challenge_id}/complete",
            post(challenges::complete_challenge),
        )
        .route(
            "/challenges/{challenge_id}/dependents",
            get(challenges::dependents),
        )
        .route(
            "/challenges/{challenge_id}/prerequisites/validate",
            post(challenges::validate_prerequisites),
        )
        .route(
            "/admin/prerequisites/statistics",
            get(admin::prerequisite_statistics),
        )
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

/// Claims of an allowed decision; records the caller's activity.
pub(crate) fn allowed(state: &AppState, decision: Decision) -> Result<Claims, ApiError> {
    let claims = decision.into_result()?;
    state.record_activity(&claims.sub);
    Ok(claims)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        auth::list_permissions,
        users::get_user,
        users::get_user_progress,
        challenges::list_challenges,
        challenges::check_access,
        challenges::prerequisite_chain,
        challenges::learning_path,
        challenges::complete_challenge,
        challenges::dependents,
        challenges::validate_prerequisites,
        admin::prerequisite_statistics
    ),
    components(
        schemas(
            Challenge,
            ChallengeId,
            Difficulty,
            AccessCheck,
            Availability,
            AvailableChallenge,
            LockedChallenge,
            ChallengeStatus,
            ChainEntry,
            ChainExpansion,
            ChallengeDescriptor,
            LearningStep,
            PrerequisiteStatistics,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::TokenResponse,
            auth::UserResponse,
            auth::PermissionsResponse,
            challenges::PrerequisiteUpdateRequest,
            challenges::LearningPathResponse,
            challenges::CompletionResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Auth", description = "Registration, login and identity"),
        (name = "Users", description = "Profiles and progress"),
        (name = "Challenges", description = "Challenge access and prerequisites"),
        (name = "Admin", description = "Catalog administration")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{AUTHORIZATION, CONTENT_TYPE},
            Method, Request, StatusCode,
        },
    };
    use chrono::Utc;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::auth::{Guard, Role, TokenCodec};
    use crate::config::{SigningSecret, TokenConfig};
    use crate::models::{Principal, UserRecord};
    use crate::storage::UserDirectory;
    use crate::store::InMemoryStore;

    struct TestApp {
        app: Router,
        codec: TokenCodec,
        store: Arc<InMemoryStore>,
    }

    impl TestApp {
        fn new() -> Self {
            let store = Arc::new(InMemoryStore::with_challenges([
                Challenge::new(1, "net", "Addressing"),
                Challenge::new(2, "net", "Subnetting").with_prerequisites([1]),
                Challenge::new(3, "net", "Routing").with_prerequisites([2]),
                Challenge::new(10, "loops", "Loop A").with_prerequisites([11]),
                Challenge::new(11, "loops", "Loop B").with_prerequisites([10]),
                Challenge::new(12, "loops", "Behind the loop").with_prerequisites([10]),
            ]));
            let codec = TokenCodec::new(&TokenConfig::new(
                SigningSecret::new("api-test-secret").unwrap(),
            ));
            let state = AppState::in_memory(Guard::new(codec.clone()), store.clone());
            Self {
                app: router(state),
                codec,
                store,
            }
        }

        /// Add a user without a password and return a credential for it.
        fn user(&self, id: &str, role: Role) -> String {
            let principal = Principal {
                id: id.to_string(),
                display_name: id.to_string(),
                role,
                email: None,
            };
            self.store
                .insert(UserRecord {
                    principal: principal.clone(),
                    password_hash: None,
                    created_at: Utc::now(),
                    last_active_at: None,
                })
                .unwrap();
            self.codec.issue(&principal).unwrap().token
        }

        async fn call(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(json) => builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }

        async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
            self.call(Method::GET, uri, Some(token), None).await
        }

        async fn post(&self, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
            self.call(Method::POST, uri, Some(token), body).await
        }
    }

    fn ids(value: &Value, field: &str) -> Vec<i64> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item[field].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn health_reports_catalog_size() {
        let t = TestApp::new();
        let (status, body) = t.call(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["checks"]["challenges"], 6);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let t = TestApp::new();
        let (status, body) = t.call(Method::GET, "/api-doc/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/v1/challenges/{challenge_id}/learning-path"].is_object());
    }

    #[tokio::test]
    async fn register_login_and_identity() {
        let t = TestApp::new();
        let (status, body) = t
            .call(
                Method::POST,
                "/v1/auth/register",
                None,
                Some(json!({"name": "ada", "email": "ada@example.com", "password": "pw-123"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["role"], "student");
        assert!(body["token"].as_str().is_some());

        let (status, body) = t
            .call(
                Method::POST,
                "/v1/auth/login",
                None,
                Some(json!({"email": "ada@example.com", "password": "pw-123"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, me) = t.get("/v1/auth/me", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["display_name"], "ada");

        let (status, perms) = t.get("/v1/auth/permissions", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(perms["role"], "student");
        let names: Vec<&str> = perms["permissions"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(names.contains(&"view_challenges"));
        assert!(!names.contains(&"manage_system"));

        let (status, _) = t.post("/v1/auth/logout", &token, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn registration_conflicts_and_bad_logins() {
        let t = TestApp::new();
        let register = json!({"name": "ada", "password": "pw-123"});
        let (status, _) = t
            .call(Method::POST, "/v1/auth/register", None, Some(register.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = t
            .call(Method::POST, "/v1/auth/register", None, Some(register))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = t
            .call(
                Method::POST,
                "/v1/auth/login",
                None,
                Some(json!({"name": "ada", "password": "wrong"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = t
            .call(
                Method::POST,
                "/v1/auth/login",
                None,
                Some(json!({"password": "pw-123"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_or_tampered_credentials_are_unauthenticated() {
        let t = TestApp::new();
        let (status, body) = t.call(Method::GET, "/v1/challenges", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "missing_auth_header");

        let token = t.user("s1", Role::Student);
        let tampered = format!("{token}x");
        let (status, _) = t.get("/v1/challenges", &tampered).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn completion_is_gated_by_prerequisites() {
        let t = TestApp::new();
        let token = t.user("s1", Role::Student);

        let (status, access) = t.get("/v1/challenges/2/access", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(access["accessible"], false);
        assert_eq!(ids(&access["missing_prerequisites"], "id"), vec![1]);

        let (status, path) = t.get("/v1/challenges/3/learning-path", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&path["steps"], "id"), vec![1, 2]);

        let (status, refused) = t.post("/v1/challenges/2/complete", &token, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(refused["completed"], false);

        let (status, _) = t.post("/v1/challenges/1/complete", &token, None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, access) = t.get("/v1/challenges/2/access", &token).await;
        assert_eq!(access["accessible"], true);

        let (_, path) = t.get("/v1/challenges/3/learning-path", &token).await;
        assert_eq!(ids(&path["steps"], "id"), vec![2]);

        let (status, _) = t.post("/v1/challenges/999/complete", &token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listing_partitions_by_availability() {
        let t = TestApp::new();
        let token = t.user("s1", Role::Student);

        let (status, body) = t.get("/v1/challenges?module_id=net", &token).await;
        assert_eq!(status, StatusCode::OK);
        let available: Vec<i64> = body["available"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["challenge"]["id"].as_i64().unwrap())
            .collect();
        assert_eq!(available, vec![1]);
        assert_eq!(body["locked"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn cycles_surface_as_conflict() {
        let t = TestApp::new();
        let token = t.user("s1", Role::Student);

        let (status, body) = t.get("/v1/challenges/12/learning-path", &token).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("circular"));

        let (status, chain) = t.get("/v1/challenges/10/chain", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(chain["cycle_pruned"], true);
    }

    #[tokio::test]
    async fn editing_endpoints_need_edit_permission() {
        let t = TestApp::new();
        let student = t.user("s1", Role::Student);
        let teacher = t.user("t1", Role::Teacher);

        let (status, body) = t.get("/v1/challenges/1/dependents", &student).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].is_string());

        let (status, body) = t.get("/v1/challenges/1/dependents", &teacher).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body, "id"), vec![2]);

        let uri = "/v1/challenges/1/prerequisites/validate";
        let (status, _) = t
            .post(uri, &teacher, Some(json!({"prerequisites": [3]})))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = t.post(uri, &teacher, Some(json!({"prerequisites": []}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);

        let (status, _) = t
            .post(
                "/v1/challenges/99/prerequisites/validate",
                &teacher,
                Some(json!({"prerequisites": []})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn statistics_are_admin_only() {
        let t = TestApp::new();
        let teacher = t.user("t1", Role::Teacher);
        let admin = t.user("a1", Role::Admin);

        let (status, _) = t.get("/v1/admin/prerequisites/statistics", &teacher).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, stats) = t.get("/v1/admin/prerequisites/statistics", &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_challenges"], 6);
        assert_eq!(stats["circular_dependencies"], json!([10, 11, 12]));
    }

    #[tokio::test]
    async fn profiles_follow_ownership_or_view_users() {
        let t = TestApp::new();
        let s1 = t.user("s1", Role::Student);
        t.user("s2", Role::Student);
        let teacher = t.user("t1", Role::Teacher);

        let (status, _) = t.get("/v1/users/s1", &s1).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = t.get("/v1/users/s2", &s1).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = t.get("/v1/users/s2", &teacher).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "student");

        let (status, _) = t.get("/v1/users/nobody", &teacher).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn progress_follows_user_data_rules() {
        let t = TestApp::new();
        let s1 = t.user("s1", Role::Student);
        let teacher = t.user("t1", Role::Teacher);
        let admin = t.user("a1", Role::Admin);

        t.post("/v1/challenges/1/complete", &s1, None).await;

        let (status, body) = t.get("/v1/users/s1/progress", &s1).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completed_challenges"], json!([1]));

        let (status, _) = t.get("/v1/users/s1/progress", &teacher).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = t.get("/v1/users/a1/progress", &teacher).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = t.get("/v1/users/t1/progress", &s1).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = t.get("/v1/users/t1/progress", &admin).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn authorized_requests_record_activity() {
        let t = TestApp::new();
        let token = t.user("s1", Role::Student);
        t.get("/v1/challenges/1/access", &token).await;

        let record = UserDirectory::find_by_id(t.store.as_ref(), "s1").unwrap().unwrap();
        assert!(record.last_active_at.is_some());
    }
}
