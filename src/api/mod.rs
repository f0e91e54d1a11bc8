// REST API endpoints for student records

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::auth::{AuthenticationGate, MaybePrincipal, Principal, authentication_layer};
use crate::student::dto::{
    PatchStudentRequestDto, PostStudentRequestDto, SignInRequestDto, SignInResponseDto,
    StudentView,
};
use crate::student::{MSG_CREATED, MSG_DELETED, MSG_UPDATED, StudentError, StudentService};

#[cfg(test)]
mod integration_tests;

pub type AppState = Arc<StudentService>;

pub fn create_router(state: AppState, gate: Arc<AuthenticationGate>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/student", post(post_student).patch(patch_student))
        .route("/student/sign-in", post(sign_in))
        .route("/student/principal", get(current_principal))
        .route(
            "/student/{student_number}",
            get(get_student).delete(delete_student),
        )
        .layer(middleware::from_fn_with_state(gate, authentication_layer))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

async fn post_student(
    State(service): State<AppState>,
    Json(dto): Json<PostStudentRequestDto>,
) -> Result<(StatusCode, &'static str), StudentError> {
    service.post_student(dto).await?;
    Ok((StatusCode::CREATED, MSG_CREATED))
}

async fn patch_student(
    State(service): State<AppState>,
    MaybePrincipal(caller): MaybePrincipal,
    Json(dto): Json<PatchStudentRequestDto>,
) -> Result<(StatusCode, &'static str), StudentError> {
    debug!(
        "Patch of student {} requested by {}",
        dto.student_number,
        caller
            .as_ref()
            .map(|ctx| ctx.subject().as_str())
            .unwrap_or("anonymous")
    );
    service.patch_student(dto).await?;
    Ok((StatusCode::OK, MSG_UPDATED))
}

async fn delete_student(
    State(service): State<AppState>,
    MaybePrincipal(caller): MaybePrincipal,
    Path(student_number): Path<i64>,
) -> Result<(StatusCode, &'static str), StudentError> {
    debug!(
        "Delete of student {} requested by {}",
        student_number,
        caller
            .as_ref()
            .map(|ctx| ctx.subject().as_str())
            .unwrap_or("anonymous")
    );
    service.delete_student(student_number).await?;
    Ok((StatusCode::OK, MSG_DELETED))
}

async fn get_student(
    State(service): State<AppState>,
    Path(student_number): Path<i64>,
) -> Result<Json<StudentView>, StudentError> {
    service.get_student(student_number).await.map(Json)
}

async fn sign_in(
    State(service): State<AppState>,
    Json(dto): Json<SignInRequestDto>,
) -> Result<Json<SignInResponseDto>, StudentError> {
    service.sign_in(dto).await.map(Json)
}

/// Who is calling. Requires a valid bearer token.
async fn current_principal(Principal(ctx): Principal) -> Json<Value> {
    Json(serde_json::json!({
        "subject": ctx.subject(),
        "authorities": ctx.authorities(),
    }))
}
