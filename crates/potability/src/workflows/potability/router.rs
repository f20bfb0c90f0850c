use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::dataset::{sample_dataset, Dataset, DatasetError};
use super::publisher::{ClassifyError, InputMode, ResultPublisher};
use super::service::{PotabilityService, ServiceError};

#[derive(Debug, Deserialize)]
pub(crate) struct UploadQuery {
    pub(crate) format: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExportQuery {
    #[serde(default)]
    pub(crate) label: Option<String>,
}

/// Router builder exposing validation, ingestion, and export endpoints.
pub fn potability_router<P>(service: Arc<PotabilityService<P>>) -> Router
where
    P: ResultPublisher + 'static,
{
    Router::new()
        .route("/api/v1/potability/validate", post(validate_handler::<P>))
        .route("/api/v1/potability/upload", post(upload_handler::<P>))
        .route(
            "/api/v1/potability/sample-dataset",
            get(sample_dataset_handler),
        )
        .route("/api/v1/potability/export", post(export_handler::<P>))
        .with_state(service)
}

pub(crate) async fn validate_handler<P>(
    State(service): State<Arc<PotabilityService<P>>>,
    Json(mode): Json<InputMode>,
) -> Response
where
    P: ResultPublisher + 'static,
{
    match service.classify(mode) {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(ServiceError::Classify(ClassifyError::Validation(error))) => {
            let violations: Vec<_> = error
                .violations
                .iter()
                .map(|violation| {
                    json!({
                        "field": violation.field,
                        "reason": violation.reason(),
                        "detail": violation.kind,
                    })
                })
                .collect();
            let payload = json!({
                "error": error.to_string(),
                "violations": violations,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(ServiceError::Classify(ClassifyError::EmptyDataset)) => {
            let payload = json!({
                "error": ClassifyError::EmptyDataset.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn upload_handler<P>(
    State(service): State<Arc<PotabilityService<P>>>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Response
where
    P: ResultPublisher + 'static,
{
    match service.accept_file(&body, &query.format) {
        Ok(dataset) => {
            let payload = json!({
                "rows": dataset.len(),
                "columns": dataset.columns(),
                "records": dataset,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(ServiceError::Dataset(
            error @ (DatasetError::UnsupportedFormat(_) | DatasetError::Parse(_)),
        )) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn sample_dataset_handler() -> Json<Dataset> {
    Json(sample_dataset())
}

pub(crate) async fn export_handler<P>(
    State(service): State<Arc<PotabilityService<P>>>,
    Query(query): Query<ExportQuery>,
    Json(dataset): Json<Dataset>,
) -> Response
where
    P: ResultPublisher + 'static,
{
    match service.export(&dataset, query.label.as_deref(), Utc::now()) {
        Ok(export) => {
            let disposition = format!("attachment; filename=\"{}\"", export.file_name);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                export.content,
            )
                .into_response()
        }
        Err(other) => internal_error(other),
    }
}

fn internal_error(error: ServiceError) -> Response {
    warn!(%error, "potability request failed");
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
