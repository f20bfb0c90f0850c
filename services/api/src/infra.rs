use metrics_exporter_prometheus::PrometheusHandle;
use potability::workflows::potability::{PublishError, ResultPayload, ResultPublisher};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Results view: holds only the most recently published verdict.
#[derive(Default, Clone)]
pub(crate) struct InMemoryResultPublisher {
    latest: Arc<Mutex<Option<ResultPayload>>>,
}

impl ResultPublisher for InMemoryResultPublisher {
    fn publish(&self, payload: &ResultPayload) -> Result<(), PublishError> {
        let mut guard = self
            .latest
            .lock()
            .map_err(|_| PublishError::Unavailable("results view lock poisoned".to_string()))?;
        *guard = Some(payload.clone());
        Ok(())
    }
}

impl InMemoryResultPublisher {
    pub(crate) fn latest(&self) -> Option<ResultPayload> {
        match self.latest.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Parses a `name=value` pair given on the command line.
pub(crate) fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}
