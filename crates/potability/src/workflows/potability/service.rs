use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::dataset::{
    accept_file, CsvExport, Dataset, DatasetError, DatasetLoader, ExportError,
    DEFAULT_EXPORT_LABEL,
};
use super::domain::{RawFields, Sample};
use super::publisher::{
    classify, ClassifyError, InputMode, PublishError, ResultPayload, ResultPublisher,
};
use super::scoring::{Classifier, RubricClassifier, ScoreResult};
use super::session::{SessionError, ValidationSession};
use super::validation::{validate, ValidationError};

/// Facade composing validation, scoring, ingestion, export, and publication.
pub struct PotabilityService<P> {
    classifier: Arc<dyn Classifier>,
    publisher: Arc<P>,
    loader: DatasetLoader,
    export_label: String,
}

impl<P> PotabilityService<P>
where
    P: ResultPublisher + 'static,
{
    /// Service backed by the standard rubric heuristic.
    pub fn new(publisher: Arc<P>) -> Self {
        Self::with_classifier(Arc::new(RubricClassifier::default()), publisher)
    }

    pub fn with_classifier(classifier: Arc<dyn Classifier>, publisher: Arc<P>) -> Self {
        Self {
            classifier,
            publisher,
            loader: DatasetLoader::new(),
            export_label: DEFAULT_EXPORT_LABEL.to_string(),
        }
    }

    pub fn with_export_label(mut self, label: impl Into<String>) -> Self {
        self.export_label = label.into();
        self
    }

    pub fn export_label(&self) -> &str {
        &self.export_label
    }

    pub fn validate(&self, fields: &RawFields) -> Result<Sample, ValidationError> {
        validate(fields)
    }

    pub fn score(&self, sample: &Sample) -> ScoreResult {
        self.classifier.score(sample)
    }

    /// Classify without delay and publish the payload.
    pub fn classify(&self, mode: InputMode) -> Result<ResultPayload, ServiceError> {
        let payload = classify(mode, self.classifier.as_ref())?;
        self.publisher.publish(&payload)?;
        Ok(payload)
    }

    pub fn accept_file(
        &self,
        bytes: &[u8],
        declared_extension: &str,
    ) -> Result<Dataset, ServiceError> {
        Ok(accept_file(bytes, declared_extension)?)
    }

    pub async fn load_path<Q: AsRef<Path>>(&self, path: Q) -> Result<Dataset, ServiceError> {
        Ok(self.loader.load_path(path).await?)
    }

    /// Builds a named CSV artifact; a blank label falls back to the configured one.
    pub fn export(
        &self,
        dataset: &Dataset,
        label: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Result<CsvExport, ServiceError> {
        let label = label
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(self.export_label.as_str());
        Ok(CsvExport::build(dataset, label, timestamp)?)
    }

    /// Opens a latency-delayed session sharing this service's classifier and publisher.
    pub fn session(&self, latency: Duration) -> ValidationSession<P> {
        ValidationSession::new(self.classifier.clone(), self.publisher.clone(), latency)
    }
}

/// Error raised by the potability service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
