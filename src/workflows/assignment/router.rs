use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CaId, RequestId, UserId};
use super::repository::{AssignmentRepository, Notifier, RepositoryError};
use super::service::{AssignmentError, AssignmentOutcome, AssignmentService};

/// Router builder exposing the assignment endpoints.
pub fn assignment_router<R, N>(service: Arc<AssignmentService<R, N>>) -> Router
where
    R: AssignmentRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/requests/:request_id/auto-assign",
            post(auto_assign_handler::<R, N>),
        )
        .route(
            "/api/v1/requests/:request_id/assign",
            post(manual_assign_handler::<R, N>),
        )
        .route(
            "/api/v1/requests/:request_id/override",
            post(override_handler::<R, N>),
        )
        .route(
            "/api/v1/requests/:request_id/recommendations",
            get(recommendations_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ManualAssignBody {
    pub ca_id: String,
    pub actor: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub override_specialization: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverrideBody {
    pub new_ca_id: String,
    pub actor: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationsQuery {
    #[serde(default = "default_recommendation_limit")]
    pub limit: usize,
}

fn default_recommendation_limit() -> usize {
    5
}

pub(crate) async fn auto_assign_handler<R, N>(
    State(service): State<Arc<AssignmentService<R, N>>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: AssignmentRepository + 'static,
    N: Notifier + 'static,
{
    match service.auto_assign(&RequestId(request_id)) {
        Ok(outcome) => outcome_response(outcome),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn manual_assign_handler<R, N>(
    State(service): State<Arc<AssignmentService<R, N>>>,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<ManualAssignBody>,
) -> Response
where
    R: AssignmentRepository + 'static,
    N: Notifier + 'static,
{
    let result = service.manual_assign(
        &RequestId(request_id),
        &CaId(body.ca_id),
        &UserId(body.actor),
        body.reason,
        body.override_specialization,
    );
    match result {
        Ok(request) => (StatusCode::OK, axum::Json(request.assignment_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn override_handler<R, N>(
    State(service): State<Arc<AssignmentService<R, N>>>,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<OverrideBody>,
) -> Response
where
    R: AssignmentRepository + 'static,
    N: Notifier + 'static,
{
    let result = service.override_assignment(
        &RequestId(request_id),
        &CaId(body.new_ca_id),
        &UserId(body.actor),
        body.reason,
    );
    match result {
        Ok(request) => (StatusCode::OK, axum::Json(request.assignment_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recommendations_handler<R, N>(
    State(service): State<Arc<AssignmentService<R, N>>>,
    Path(request_id): Path<String>,
    Query(query): Query<RecommendationsQuery>,
) -> Response
where
    R: AssignmentRepository + 'static,
    N: Notifier + 'static,
{
    match service.recommendations(&RequestId(request_id), query.limit) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

fn outcome_response(outcome: AssignmentOutcome) -> Response {
    match &outcome {
        AssignmentOutcome::Auto { .. } => {
            (StatusCode::OK, axum::Json(outcome)).into_response()
        }
        AssignmentOutcome::ManualRequired { reasons } => {
            let messages: Vec<String> = reasons.iter().map(|reason| reason.summary()).collect();
            let payload = json!({
                "method": "manual_required",
                "reasons": reasons,
                "messages": messages,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
    }
}

fn error_response(error: AssignmentError) -> Response {
    let status = match &error {
        AssignmentError::AlreadyAssigned => StatusCode::CONFLICT,
        AssignmentError::Forbidden => StatusCode::FORBIDDEN,
        AssignmentError::NotFound(_) => StatusCode::NOT_FOUND,
        AssignmentError::NotEligible(_)
        | AssignmentError::SpecializationMismatch
        | AssignmentError::NoTargetFirm => StatusCode::UNPROCESSABLE_ENTITY,
        AssignmentError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AssignmentError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AssignmentError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
