use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ReportId, ReportSubmission, VoteKind};
use super::repository::{ReportStore, SensorStore, StoreError};
use super::selection::SessionId;
use super::service::{PeerValidationService, ValidationServiceError};

/// Body accepted by both vote endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VoteRequest {
    pub vote: VoteKind,
}

/// Router builder exposing report intake, voting sessions, and the dashboard.
pub fn validation_router<R, S>(service: Arc<PeerValidationService<R, S>>) -> Router
where
    R: ReportStore + 'static,
    S: SensorStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/reports",
            post(submit_handler::<R, S>).get(list_handler::<R, S>),
        )
        .route("/api/v1/reports/eligible", get(eligible_handler::<R, S>))
        .route(
            "/api/v1/reports/:report_id/votes",
            post(vote_handler::<R, S>),
        )
        .route("/api/v1/sessions", post(open_session_handler::<R, S>))
        .route(
            "/api/v1/sessions/:session_id",
            get(session_handler::<R, S>).delete(close_session_handler::<R, S>),
        )
        .route(
            "/api/v1/sessions/:session_id/votes",
            post(session_vote_handler::<R, S>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<R, S>))
        .with_state(service)
}

pub(crate) async fn submit_handler<R, S>(
    State(service): State<Arc<PeerValidationService<R, S>>>,
    Json(submission): Json<ReportSubmission>,
) -> Response
where
    R: ReportStore + 'static,
    S: SensorStore + 'static,
{
    match service.submit(submission).await {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_handler<R, S>(
    State(service): State<Arc<PeerValidationService<R, S>>>,
) -> Response
where
    R: ReportStore + 'static,
    S: SensorStore + 'static,
{
    Json(service.reports()).into_response()
}

pub(crate) async fn eligible_handler<R, S>(
    State(service): State<Arc<PeerValidationService<R, S>>>,
) -> Response
where
    R: ReportStore + 'static,
    S: SensorStore + 'static,
{
    Json(service.eligible()).into_response()
}

pub(crate) async fn vote_handler<R, S>(
    State(service): State<Arc<PeerValidationService<R, S>>>,
    Path(report_id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> Response
where
    R: ReportStore + 'static,
    S: SensorStore + 'static,
{
    match service.cast_vote(&ReportId(report_id), request.vote).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn open_session_handler<R, S>(
    State(service): State<Arc<PeerValidationService<R, S>>>,
) -> Response
where
    R: ReportStore + 'static,
    S: SensorStore + 'static,
{
    (StatusCode::CREATED, Json(service.open_session())).into_response()
}

pub(crate) async fn session_handler<R, S>(
    State(service): State<Arc<PeerValidationService<R, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: ReportStore + 'static,
    S: SensorStore + 'static,
{
    match service.session(&SessionId(session_id)) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn close_session_handler<R, S>(
    State(service): State<Arc<PeerValidationService<R, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: ReportStore + 'static,
    S: SensorStore + 'static,
{
    match service.close_session(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn session_vote_handler<R, S>(
    State(service): State<Arc<PeerValidationService<R, S>>>,
    Path(session_id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> Response
where
    R: ReportStore + 'static,
    S: SensorStore + 'static,
{
    match service
        .vote_in_session(&SessionId(session_id), request.vote)
        .await
    {
        Ok(vote) => (StatusCode::OK, Json(vote)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn dashboard_handler<R, S>(
    State(service): State<Arc<PeerValidationService<R, S>>>,
) -> Response
where
    R: ReportStore + 'static,
    S: SensorStore + 'static,
{
    Json(service.dashboard()).into_response()
}

impl IntoResponse for ValidationServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ValidationServiceError::InvalidSubmission(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ValidationServiceError::NotEligible(_) | ValidationServiceError::NoReportAvailable => {
                StatusCode::CONFLICT
            }
            ValidationServiceError::UnknownReport(_)
            | ValidationServiceError::UnknownSession(_)
            | ValidationServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            ValidationServiceError::Store(StoreError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ValidationServiceError::Store(StoreError::Decode(_)) => StatusCode::BAD_GATEWAY,
        };

        let payload = json!({ "error": self.to_string() });
        (status, Json(payload)).into_response()
    }
}
