use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::potability::domain::{Parameter, RawFields, Sample};
use crate::workflows::potability::publisher::{PublishError, ResultPayload, ResultPublisher};
use crate::workflows::potability::scoring::RubricClassifier;
use crate::workflows::potability::service::PotabilityService;

/// The reference sample: scores 100 under the standard rubric.
pub(super) fn reference_fields() -> RawFields {
    RawFields::new()
        .with("ph", "7.5")
        .with("hardness", "200")
        .with("solids", "500")
        .with("chloramines", "2.5")
        .with("sulfate", "250")
        .with("conductivity", "400")
        .with("organic_carbon", "10")
        .with("trihalomethanes", "50")
        .with("turbidity", "3.5")
}

pub(super) fn reference_sample() -> Sample {
    Sample::from_ordered([7.5, 200.0, 500.0, 2.5, 250.0, 400.0, 10.0, 50.0, 3.5])
}

pub(super) fn fields_with(parameter: Parameter, value: &str) -> RawFields {
    reference_fields().with(parameter.key(), value)
}

pub(super) fn classifier() -> RubricClassifier {
    RubricClassifier::default()
}

#[derive(Default)]
pub(super) struct MemoryPublisher {
    payloads: Mutex<Vec<ResultPayload>>,
}

impl ResultPublisher for MemoryPublisher {
    fn publish(&self, payload: &ResultPayload) -> Result<(), PublishError> {
        self.payloads
            .lock()
            .expect("publisher mutex poisoned")
            .push(payload.clone());
        Ok(())
    }
}

impl MemoryPublisher {
    pub(super) fn payloads(&self) -> Vec<ResultPayload> {
        self.payloads
            .lock()
            .expect("publisher mutex poisoned")
            .clone()
    }
}

pub(super) struct OfflinePublisher;

impl ResultPublisher for OfflinePublisher {
    fn publish(&self, _payload: &ResultPayload) -> Result<(), PublishError> {
        Err(PublishError::Unavailable("results view closed".to_string()))
    }
}

pub(super) fn memory_service() -> (Arc<PotabilityService<MemoryPublisher>>, Arc<MemoryPublisher>) {
    let publisher = Arc::new(MemoryPublisher::default());
    let service = Arc::new(PotabilityService::new(publisher.clone()));
    (service, publisher)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
