//! Router-level tests for the session-gated profile proxy.
//!
//! A stand-in user API is spawned on a loopback port so the forwarding
//! contract can be observed end to end; the application pool connects
//! lazily and no real database is required.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    routing::put,
    Json, Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use accountd::{
    app::build_app, auth::jwt::JwtKeys, state::AppState, users::repo::Role,
};
use axum::extract::FromRef;

#[derive(Clone)]
struct BackendState {
    hits: Arc<AtomicUsize>,
    status: StatusCode,
    body: serde_json::Value,
}

async fn backend_handler(State(s): State<BackendState>) -> (StatusCode, Json<serde_json::Value>) {
    s.hits.fetch_add(1, Ordering::SeqCst);
    (s.status, Json(s.body.clone()))
}

/// Spawns a stand-in user API that counts hits and answers a canned verdict.
async fn spawn_backend(
    status: StatusCode,
    body: serde_json::Value,
) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route("/users/:id/profile", put(backend_handler))
        .with_state(BackendState {
            hits: hits.clone(),
            status,
            body,
        });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), hits)
}

fn bearer(state: &AppState, user_id: Uuid, role: Role) -> String {
    JwtKeys::from_ref(state).sign(user_id, role).unwrap()
}

fn profile_request(token: Option<&str>, id: Uuid, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PUT")
        .uri(format!("/api/users/{id}/profile"))
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn rejects_requests_without_a_session() {
    let state = AppState::fake();
    let app = build_app(state);

    let response = app
        .oneshot(profile_request(None, Uuid::new_v4(), serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing Authorization header");
}

#[tokio::test]
async fn rejects_an_invalid_token() {
    let state = AppState::fake();
    let app = build_app(state);

    let response = app
        .oneshot(profile_request(
            Some("not-a-token"),
            Uuid::new_v4(),
            serde_json::json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forbids_cross_user_updates_and_issues_no_backend_call() {
    let (base, hits) = spawn_backend(StatusCode::OK, serde_json::json!({})).await;
    let state = AppState::fake_with_user_api(&base);
    let app = build_app(state.clone());

    let caller = Uuid::new_v4();
    let target = Uuid::new_v4();
    let token = bearer(&state, caller, Role::User);

    let response = app
        .oneshot(profile_request(
            Some(&token),
            target,
            serde_json::json!({ "email": "b@x.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "You can only update your own profile");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn relays_a_successful_update_for_the_user_themselves() {
    let user_id = Uuid::new_v4();
    let verdict = serde_json::json!({
        "message": "Profile updated successfully",
        "user": { "id": user_id, "email": "b@x.com", "role": "user" }
    });
    let (base, hits) = spawn_backend(StatusCode::OK, verdict.clone()).await;
    let state = AppState::fake_with_user_api(&base);
    let app = build_app(state.clone());

    let token = bearer(&state, user_id, Role::User);
    let response = app
        .oneshot(profile_request(
            Some(&token),
            user_id,
            serde_json::json!({ "email": "b@x.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, verdict);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn admins_may_target_other_users() {
    let (base, hits) = spawn_backend(
        StatusCode::OK,
        serde_json::json!({ "message": "Profile updated successfully" }),
    )
    .await;
    let state = AppState::fake_with_user_api(&base);
    let app = build_app(state.clone());

    let token = bearer(&state, Uuid::new_v4(), Role::Admin);
    let response = app
        .oneshot(profile_request(
            Some(&token),
            Uuid::new_v4(),
            serde_json::json!({ "email": "b@x.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn relays_backend_errors_verbatim() {
    let verdict =
        serde_json::json!({ "error": "New password must be at least 8 characters long" });
    let (base, _hits) = spawn_backend(StatusCode::BAD_REQUEST, verdict.clone()).await;
    let state = AppState::fake_with_user_api(&base);
    let app = build_app(state.clone());

    let user_id = Uuid::new_v4();
    let token = bearer(&state, user_id, Role::User);
    let response = app
        .oneshot(profile_request(
            Some(&token),
            user_id,
            serde_json::json!({ "currentPassword": "longenough1", "password": "short" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, verdict);
}

#[tokio::test]
async fn an_unreachable_backend_maps_to_a_generic_500() {
    // Nothing listens on the discard port
    let state = AppState::fake_with_user_api("http://127.0.0.1:9");
    let app = build_app(state.clone());

    let user_id = Uuid::new_v4();
    let token = bearer(&state, user_id, Role::User);
    let response = app
        .oneshot(profile_request(
            Some(&token),
            user_id,
            serde_json::json!({ "email": "b@x.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "An internal error occurred");
}
