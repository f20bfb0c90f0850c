use crate::infra::{AppState, InMemoryResultPublisher};
use axum::body::Bytes;
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use potability::error::AppError;
use potability::workflows::potability::{
    potability_router, InputMode, PotabilityService, ResultPayload, ResultPublisher,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct ClassifyUploadQuery {
    pub(crate) format: String,
}

pub(crate) fn with_potability_routes(
    service: Arc<PotabilityService<InMemoryResultPublisher>>,
    results: InMemoryResultPublisher,
) -> Router {
    potability_router(service.clone())
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route(
            "/api/v1/potability/upload/classify",
            post(classify_upload_endpoint::<InMemoryResultPublisher>),
        )
        .route("/api/v1/potability/results/latest", get(latest_result_endpoint))
        .layer(Extension(service))
        .layer(Extension(results))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Upload and classify in one request; the first row is scored.
pub(crate) async fn classify_upload_endpoint<P>(
    Extension(service): Extension<Arc<PotabilityService<P>>>,
    Query(query): Query<ClassifyUploadQuery>,
    body: Bytes,
) -> Result<Json<ResultPayload>, AppError>
where
    P: ResultPublisher + 'static,
{
    let dataset = service.accept_file(&body, &query.format)?;
    let payload = service.classify(InputMode::dataset(dataset))?;
    Ok(Json(payload))
}

pub(crate) async fn latest_result_endpoint(
    Extension(results): Extension<InMemoryResultPublisher>,
) -> Response {
    match results.latest() {
        Some(payload) => (StatusCode::OK, Json(payload)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no result has been published yet" })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryResultPublisher;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        }
    }

    fn service() -> (
        Arc<PotabilityService<InMemoryResultPublisher>>,
        InMemoryResultPublisher,
    ) {
        let publisher = InMemoryResultPublisher::default();
        let service = Arc::new(PotabilityService::new(Arc::new(publisher.clone())));
        (service, publisher)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[tokio::test]
    async fn readiness_reflects_the_startup_flag() {
        let state = app_state(false);
        let pending = readiness_endpoint(Extension(state.clone()))
            .await
            .into_response();
        assert_eq!(pending.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let ready = readiness_endpoint(Extension(state)).await.into_response();
        assert_eq!(ready.status(), StatusCode::OK);
        assert_eq!(body_json(ready).await, json!({ "status": "ready" }));
    }

    #[tokio::test]
    async fn health_and_workflow_routes_share_one_router() {
        let (service, results) = service();
        let app = with_potability_routes(service, results).layer(Extension(app_state(true)));

        let health = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .expect("route executes");
        assert_eq!(health.status(), StatusCode::OK);

        let sample = app
            .oneshot(
                Request::get("/api/v1/potability/sample-dataset")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("route executes");
        assert_eq!(sample.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_prometheus_text() {
        let response = metrics_endpoint(Extension(app_state(true)))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn classify_upload_scores_the_first_row() {
        let (service, publisher) = service();
        let csv = "ph,hardness,solids,chloramines,sulfate,conductivity,organic_carbon,trihalomethanes,turbidity\n\
                   7.5,200,500,2.5,250,400,10,50,3.5\n";

        let Json(payload) = classify_upload_endpoint(
            Extension(service),
            Query(ClassifyUploadQuery {
                format: "csv".to_string(),
            }),
            Bytes::from(csv),
        )
        .await
        .expect("classifies");

        assert_eq!(payload.score, 100.0);
        assert_eq!(publisher.latest(), Some(payload));
    }

    #[tokio::test]
    async fn classify_upload_maps_workflow_errors_to_bad_request() {
        let (service, publisher) = service();

        let error = classify_upload_endpoint(
            Extension(service),
            Query(ClassifyUploadQuery {
                format: "csv".to_string(),
            }),
            Bytes::from_static(b"ph\n7.0\n"),
        )
        .await
        .expect_err("eight fields missing");

        assert!(matches!(error, AppError::Workflow(_)));
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
        assert!(publisher.latest().is_none());
    }

    #[tokio::test]
    async fn latest_result_route_serves_the_last_verdict() {
        let (service, results) = service();
        let app = with_potability_routes(service, results).layer(Extension(app_state(true)));

        let empty = app
            .clone()
            .oneshot(
                Request::get("/api/v1/potability/results/latest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("route executes");
        assert_eq!(empty.status(), StatusCode::NOT_FOUND);

        let classify = app
            .clone()
            .oneshot(
                Request::post("/api/v1/potability/validate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"mode":"manual","fields":{"ph":"9.5","hardness":"200","solids":"500","chloramines":"2.5","sulfate":"250","conductivity":"400","organic_carbon":"10","trihalomethanes":"50","turbidity":"3.5"}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .expect("route executes");
        assert_eq!(classify.status(), StatusCode::OK);

        let latest = app
            .oneshot(
                Request::get("/api/v1/potability/results/latest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("route executes");
        assert_eq!(latest.status(), StatusCode::OK);
        let payload = body_json(latest).await;
        assert_eq!(payload["score"], json!(70.0));
        assert_eq!(payload["category"], json!("Moderate"));
    }
}
