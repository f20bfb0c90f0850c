use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryResultPublisher};
use crate::routes::with_potability_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use potability::config::AppConfig;
use potability::error::AppError;
use potability::telemetry;
use potability::workflows::potability::PotabilityService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let results = InMemoryResultPublisher::default();
    let service = Arc::new(
        PotabilityService::new(Arc::new(results.clone()))
            .with_export_label(config.validation.export_label.clone()),
    );

    let app = with_potability_routes(service, results)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "potability screening service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
