use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use paydash_auth::password::hash_password;
use paydash_core::{Payment, PaymentStatus, Principal};
use paydash_db_memory::{InMemoryKeyValueStore, InMemoryPaymentStore, InMemoryUserStore};
use paydash_server::{AppConfig, AppState, build_app, config::StorageBackend};
use serde_json::Value;
use time::macros::datetime;
use tower::ServiceExt;

fn payment(id: &str, status: PaymentStatus, amount: &str, created_at: time::OffsetDateTime) -> Payment {
    Payment {
        id: id.into(),
        merchant: format!("merchant-{id}"),
        status,
        amount: amount.into(),
        created_at,
    }
}

fn app() -> Router {
    let mut cfg = AppConfig::default();
    cfg.storage.backend = StorageBackend::Memory;
    cfg.auth.jwt_secret = "integration-secret".into();

    let users = InMemoryUserStore::with_principals([Principal::new(
        "1",
        "cs@test.com",
        hash_password("password").unwrap(),
        "cs",
    )]);
    let payments = InMemoryPaymentStore::with_payments([
        payment("p1", PaymentStatus::Completed, "100.00", datetime!(2024-03-01 09:00 UTC)),
        payment("p2", PaymentStatus::Processing, "9.99", datetime!(2024-03-02 09:00 UTC)),
        payment("p3", PaymentStatus::Completed, "25.50", datetime!(2024-03-03 09:00 UTC)),
    ]);

    let state = AppState::from_stores(
        &cfg,
        Arc::new(users),
        Arc::new(payments),
        Arc::new(InMemoryKeyValueStore::new()),
    );
    build_app(state, &cfg)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(path: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get(path: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router) -> (String, String) {
    let (status, body) = send(
        app,
        post_json(
            "/dashboard/v1/auth/login",
            r#"{"email":"cs@test.com","password":"password"}"#.into(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        body["token"].as_str().unwrap().to_string(),
        body["refreshToken"].as_str().unwrap().to_string(),
    )
}

fn ids(body: &Value) -> Vec<&str> {
    body["payments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn healthz_is_public() {
    let (status, body) = send(&app(), get("/healthz", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn refresh_rotation_rejects_replay() {
    let app = app();
    let (_, refresh) = login(&app).await;

    let (status, body) = send(
        &app,
        post_json(
            "/dashboard/v1/auth/refresh",
            format!(r#"{{"refreshToken":"{refresh}"}}"#),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = body["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(rotated, refresh);

    let (status, body) = send(
        &app,
        post_json(
            "/dashboard/v1/auth/refresh",
            format!(r#"{{"refreshToken":"{refresh}"}}"#),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    // A replayed token clears the registry entry, ending the session.
    let (status, _) = send(
        &app,
        post_json(
            "/dashboard/v1/auth/refresh",
            format!(r#"{{"refreshToken":"{rotated}"}}"#),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, refresh) = login(&app).await;
    let (status, _) = send(
        &app,
        post_json(
            "/dashboard/v1/auth/refresh",
            format!(r#"{{"refreshToken":"{refresh}"}}"#),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn payments_require_an_access_token() {
    let app = app();

    let response = app
        .clone()
        .oneshot(get("/dashboard/v1/payments", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

    let (_, refresh) = login(&app).await;
    let (status, body) = send(&app, get("/dashboard/v1/payments", Some(&refresh))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid token type");

    let (status, _) = send(&app, get("/dashboard/v1/payments", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn payments_listing_filters_and_sorts() {
    let app = app();
    let (access, _) = login(&app).await;

    let (status, body) = send(&app, get("/dashboard/v1/payments", Some(&access))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), ["p3", "p2", "p1"]);
    assert_eq!(body["payments"][0]["created_at"], "2024-03-03T09:00:00Z");
    assert_eq!(body["payments"][0]["amount"], "25.50");

    let (status, body) = send(
        &app,
        get("/dashboard/v1/payments?sort=amount", Some(&access)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), ["p2", "p3", "p1"]);

    let (status, body) = send(
        &app,
        get(
            "/dashboard/v1/payments?status=completed&sort=-amount",
            Some(&access),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), ["p1", "p3"]);

    let (status, body) = send(
        &app,
        get("/dashboard/v1/payments?sort=bogus", Some(&access)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), ["p3", "p2", "p1"]);

    let (status, body) = send(&app, get("/dashboard/v1/payments?id=nope", Some(&access))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["payments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json("/dashboard/v1/auth/refresh", "{}".into()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, _) = send(
        &app,
        post_json("/dashboard/v1/auth/login", "[1,2".into()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn filter_values_cannot_alias_another_filter_set() {
    let app = app();
    let (access, _) = login(&app).await;

    let (status, body) = send(
        &app,
        get("/dashboard/v1/payments?id=p1;status=completed", Some(&access)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, body) = send(
        &app,
        get("/dashboard/v1/payments?id=p1&status=completed", Some(&access)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), ["p1"]);
}
