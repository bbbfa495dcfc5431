//! HTTP API for the timesheet engine.
//!
//! This module exposes the engine and the report service over a small
//! REST API built on [`axum`](https://crates.io/crates/axum).  Clients
//! can either post a complete [`TimesheetInput`] and receive the rows,
//! or ask for a report that is built from the configured data source.

use crate::calendar::DateRange;
use crate::config::Config;
use crate::engine::build_timesheet;
use crate::error::EngineError;
use crate::models::{TimesheetExtras, TimesheetInput, WeekendPolicy};
use crate::overtime::{compute_overtime, TimeWindow};
use crate::report::ReportService;
use crate::store::JsonDirSource;
use anyhow::Result;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

/// Application state shared across requests.
pub struct AppState {
    pub reports: ReportService,
}

/// Error returned by handlers.  Every variant renders as a JSON body
/// `{"error": <code>, "message": <text>}`.
#[derive(Debug)]
pub enum ApiError {
    /// Failure from the engine, the report service or the data source.
    Engine(EngineError),
    /// The request could not be extracted (bad JSON, bad query, bad path).
    Rejected(String),
    /// Anything the server is to blame for that is not a source failure.
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Engine(err)
    }
}

/// Client-side rejections become validation errors; the rare server-side
/// one (e.g. a body that could not be buffered) is internal.
fn rejection(status: StatusCode, text: String) -> ApiError {
    if status.is_server_error() {
        ApiError::Internal(text)
    } else {
        ApiError::Rejected(text)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        rejection(err.status(), err.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(err: QueryRejection) -> Self {
        rejection(err.status(), err.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(err: PathRejection) -> Self {
        rejection(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Engine(err) if err.is_source_failure() => {
                error!(error = %err, "data source failure");
                (StatusCode::BAD_GATEWAY, "source_error", err.to_string())
            }
            ApiError::Engine(err) => (StatusCode::BAD_REQUEST, "validation_error", err.to_string()),
            ApiError::Rejected(message) => (StatusCode::BAD_REQUEST, "validation_error", message),
            ApiError::Internal(message) => {
                error!(%message, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(json!({"error": code, "message": message}))).into_response()
    }
}

/// `Json` whose rejection is an [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
struct ApiJson<T>(T);

/// `Query` whose rejection is an [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
struct ApiQuery<T>(T);

/// `Path` whose rejection is an [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
struct ApiPath<T>(T);

/// Build the API router around an existing state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/timesheet", post(timesheet_handler))
        .route("/api/overtime", post(overtime_handler))
        .route("/api/reports/timesheet/:year/:month", get(monthly_report_handler))
        .route("/api/reports/overtime", get(overtime_report_handler))
        .route("/api/reports/performance", get(performance_report_handler))
        .route("/api/extras", put(save_extras_handler))
        .with_state(state)
}

/// Build the router and state backed by the JSON data directory named
/// in `config`.
pub fn build_router(config: &Config) -> (Router, Arc<AppState>) {
    let source = Arc::new(JsonDirSource::new(&config.data_dir));
    let state = Arc::new(AppState {
        reports: ReportService::new(source, config.weekend_policy),
    });
    (router(state.clone()), state)
}

/// Handler for POST /api/timesheet
async fn timesheet_handler(ApiJson(input): ApiJson<TimesheetInput>) -> impl IntoResponse {
    Json(build_timesheet(&input))
}

#[derive(Debug, Deserialize)]
struct OvertimeRequest {
    scheduled: TimeWindow,
    actual: TimeWindow,
}

#[derive(Debug, Serialize)]
struct OvertimeResponse {
    overtime_seconds: i64,
}

/// Handler for POST /api/overtime
async fn overtime_handler(ApiJson(request): ApiJson<OvertimeRequest>) -> impl IntoResponse {
    Json(OvertimeResponse {
        overtime_seconds: compute_overtime(&request.scheduled, &request.actual),
    })
}

#[derive(Debug, Deserialize)]
struct PolicyQuery {
    weekend_policy: Option<WeekendPolicy>,
}

/// Handler for GET /api/reports/timesheet/:year/:month
async fn monthly_report_handler(
    State(app_state): State<Arc<AppState>>,
    ApiPath((year, month)): ApiPath<(i32, u32)>,
    ApiQuery(query): ApiQuery<PolicyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .reports
        .monthly_timesheet(year, month, query.weekend_policy)
        .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    start: NaiveDate,
    end: NaiveDate,
}

impl RangeQuery {
    fn range(&self) -> Result<DateRange, EngineError> {
        DateRange::new(self.start, self.end)
    }
}

/// Handler for GET /api/reports/overtime
async fn overtime_report_handler(
    State(app_state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state.reports.overtime_report(query.range()?).await?;
    Ok(Json(report))
}

/// Handler for GET /api/reports/performance
async fn performance_report_handler(
    State(app_state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state.reports.performance_report(query.range()?).await?;
    Ok(Json(report))
}

/// Handler for PUT /api/extras
async fn save_extras_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(extras): ApiJson<TimesheetExtras>,
) -> Result<impl IntoResponse, ApiError> {
    let saved = app_state.reports.save_extras(extras).await?;
    Ok(Json(saved))
}

/// Launch the API server.  Blocks until the server terminates.
pub async fn serve(config: &Config) -> Result<()> {
    let (router, _state) = build_router(config);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, data_dir = %config.data_dir.display(), "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn errors_map_to_status_and_code() {
        let (status, body) = render(EngineError::InvalidMonth { year: 2024, month: 13 }.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "invalid month 2024-13");

        let source = EngineError::Io {
            path: "holidays.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let (status, body) = render(source.into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "source_error");

        let (status, body) = render(rejection(StatusCode::UNPROCESSABLE_ENTITY, "bad body".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "bad body");

        let (status, body) = render(rejection(StatusCode::INTERNAL_SERVER_ERROR, "body lost".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "body lost");
    }
}
