use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::workflows::assignment::domain::UserId;
use crate::workflows::assignment::repository::{Notifier, RepositoryError};

use super::domain::IndependentRequestId;
use super::service::{
    Decision, IndependentWorkError, IndependentWorkService, IndependentWorkSubmission,
};
use super::repository::IndependentWorkRepository;

/// Router builder exposing the independent-work endpoints.
pub fn independent_work_router<R, N>(service: Arc<IndependentWorkService<R, N>>) -> Router
where
    R: IndependentWorkRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/independent-work/requests",
            post(submit_handler::<R, N>),
        )
        .route(
            "/api/v1/independent-work/requests/:request_id",
            get(status_handler::<R, N>),
        )
        .route(
            "/api/v1/independent-work/requests/:request_id/decision",
            post(decide_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionBody {
    pub actor: String,
    #[serde(flatten)]
    pub decision: Decision,
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<IndependentWorkService<R, N>>>,
    axum::Json(submission): axum::Json<IndependentWorkSubmission>,
) -> Response
where
    R: IndependentWorkRepository + 'static,
    N: Notifier + 'static,
{
    match service.submit(submission, Utc::now()) {
        Ok(outcome) => {
            let payload = json!({
                "request": outcome.request.view(),
                "report": outcome.report,
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<IndependentWorkService<R, N>>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: IndependentWorkRepository + 'static,
    N: Notifier + 'static,
{
    match service.get(&IndependentRequestId(request_id)) {
        Ok(request) => (StatusCode::OK, axum::Json(request.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decide_handler<R, N>(
    State(service): State<Arc<IndependentWorkService<R, N>>>,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<DecisionBody>,
) -> Response
where
    R: IndependentWorkRepository + 'static,
    N: Notifier + 'static,
{
    let result = service.decide(
        &IndependentRequestId(request_id),
        &UserId(body.actor),
        body.decision,
    );
    match result {
        Ok(request) => (StatusCode::OK, axum::Json(request.view())).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: IndependentWorkError) -> Response {
    let status = match &error {
        IndependentWorkError::Policy(_) | IndependentWorkError::NotEligible => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        IndependentWorkError::Forbidden => StatusCode::FORBIDDEN,
        IndependentWorkError::NotFound(_) => StatusCode::NOT_FOUND,
        IndependentWorkError::AlreadyDecided => StatusCode::CONFLICT,
        IndependentWorkError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        IndependentWorkError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        IndependentWorkError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
