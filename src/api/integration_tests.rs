//! HTTP-level tests driving the full router: gate, handlers and an
//! in-memory database.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderValue, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::auth::{AuthConfig, DEFAULT_ISSUER, JwtProvider, UNAUTHENTICATED_MESSAGE};
use crate::db::{DatabaseConfig, create_connection, ensure_schema};
use crate::student::{
    MSG_CREATED, MSG_DELETED, MSG_ERROR, MSG_NOT_FOUND, MSG_PASSWORD_MISMATCH, MSG_SIGNED_IN,
    MSG_UPDATED,
};
use crate::types::Subject;

const SECRET: &str = "integration-secret";

fn test_auth_config(fail_open: bool) -> AuthConfig {
    AuthConfig {
        bcrypt_cost: 4,
        fail_open,
        ..AuthConfig::with_secret(SECRET)
    }
}

async fn setup_app(fail_open: bool) -> Router {
    let db = create_connection(DatabaseConfig::in_memory()).await.unwrap();
    ensure_schema(&db).await.unwrap();
    crate::build_router(db, &test_auth_config(fail_open))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn kim() -> Value {
    json!({
        "studentNumber": 1,
        "name": "Kim",
        "password": "pw",
        "age": 20,
        "address": "Seoul",
        "graduation": false
    })
}

#[tokio::test]
async fn test_student_scenario() {
    let app = setup_app(true).await;

    let (status, body) = send(&app, json_request("POST", "/student", kim())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, MSG_CREATED);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/student/sign-in",
            json!({ "studentNumber": 1, "password": "pw" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let signed_in: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(signed_in["message"], MSG_SIGNED_IN);
    assert!(signed_in["accessToken"].as_str().is_some());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/student/sign-in",
            json!({ "studentNumber": 1, "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, MSG_PASSWORD_MISMATCH);

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/student",
            json!({ "studentNumber": 1, "address": "Busan" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, MSG_UPDATED);

    let (status, body) = send(&app, empty_request("GET", "/student/1", None)).await;
    assert_eq!(status, StatusCode::OK);
    let student: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        student,
        json!({
            "studentNumber": 1,
            "name": "Kim",
            "age": 20,
            "address": "Busan",
            "graduation": false
        })
    );

    let (status, body) = send(&app, empty_request("DELETE", "/student/999", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, MSG_NOT_FOUND);
}

#[tokio::test]
async fn test_delete_then_missing() {
    let app = setup_app(true).await;
    send(&app, json_request("POST", "/student", kim())).await;

    let (status, body) = send(&app, empty_request("DELETE", "/student/1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, MSG_DELETED);

    let (status, body) = send(&app, empty_request("GET", "/student/1", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, MSG_NOT_FOUND);

    let (status, body) = send(&app, empty_request("DELETE", "/student/1", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, MSG_NOT_FOUND);
}

#[tokio::test]
async fn test_patch_missing_student() {
    let app = setup_app(true).await;
    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/student",
            json!({ "studentNumber": 5, "address": "Busan" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, MSG_NOT_FOUND);
}

#[tokio::test]
async fn test_sign_in_unknown_student() {
    let app = setup_app(true).await;
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/student/sign-in",
            json!({ "studentNumber": 42, "password": "pw" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, MSG_ERROR);
}

#[tokio::test]
async fn test_duplicate_student_conflict() {
    let app = setup_app(true).await;
    send(&app, json_request("POST", "/student", kim())).await;
    let (status, _) = send(&app, json_request("POST", "/student", kim())).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_principal_requires_token() {
    let app = setup_app(true).await;
    let (status, body) = send(&app, empty_request("GET", "/student/principal", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, UNAUTHENTICATED_MESSAGE);
}

#[tokio::test]
async fn test_principal_from_sign_in_token() {
    let app = setup_app(true).await;
    send(&app, json_request("POST", "/student", kim())).await;

    let (_, body) = send(
        &app,
        json_request(
            "POST",
            "/student/sign-in",
            json!({ "studentNumber": 1, "password": "pw" }),
        ),
    )
    .await;
    let signed_in: Value = serde_json::from_str(&body).unwrap();
    let token = signed_in["accessToken"].as_str().unwrap();

    let header = format!("Bearer {}", token);
    let (status, body) = send(
        &app,
        empty_request("GET", "/student/principal", Some(&header)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let principal: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(principal, json!({ "subject": "1", "authorities": [] }));
}

#[tokio::test]
async fn test_bad_credentials_never_block_public_routes() {
    let app = setup_app(true).await;
    send(&app, json_request("POST", "/student", kim())).await;

    let foreign = JwtProvider::new("another-secret", DEFAULT_ISSUER, 60)
        .issue(&Subject::new("1"))
        .unwrap();
    let foreign_header = format!("Bearer {}", foreign.access_token);

    for header in [
        "Bearer not-a-jwt",
        "bearer whatever",
        "Basic dXNlcjpwdw==",
        "   ",
        foreign_header.as_str(),
    ] {
        let (status, _) = send(&app, empty_request("GET", "/student/1", Some(header))).await;
        assert_eq!(status, StatusCode::OK, "header {:?}", header);

        let (status, _) = send(
            &app,
            empty_request("GET", "/student/principal", Some(header)),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {:?}", header);
    }
}

#[tokio::test]
async fn test_unreadable_header_policy() {
    let mut request = empty_request("GET", "/health", None);
    request.headers_mut().insert(
        header::AUTHORIZATION,
        HeaderValue::from_bytes(b"Bearer \xff").unwrap(),
    );
    let open = setup_app(true).await;
    let (status, _) = send(&open, request).await;
    assert_eq!(status, StatusCode::OK);

    let mut request = empty_request("GET", "/health", None);
    request.headers_mut().insert(
        header::AUTHORIZATION,
        HeaderValue::from_bytes(b"Bearer \xff").unwrap(),
    );
    let closed = setup_app(false).await;
    let (status, body) = send(&closed, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, UNAUTHENTICATED_MESSAGE);
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app(true).await;
    let (status, body) = send(&app, empty_request("GET", "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "healthy");
}
