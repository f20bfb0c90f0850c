//! Water potability screening workflow.
//!
//! Raw form text or uploaded rows are normalized by the validator, scored by a
//! [`Classifier`], and wrapped with their originating input into a
//! [`ResultPayload`] for the presentation layer.

pub mod dataset;
pub mod domain;
pub mod publisher;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;
pub mod validation;

#[cfg(test)]
mod tests;

pub use dataset::{
    accept_file, export_file_name, sample_dataset, to_csv, CsvExport, Dataset, DatasetError,
    DatasetLoader, FileFormat, ParseError, Record,
};
pub use domain::{Parameter, RawFields, Sample};
pub use publisher::{
    classify, ClassifyError, InputMode, PublishError, ResultPayload, ResultPublisher,
    ResultSource, TracingResultPublisher,
};
pub use router::potability_router;
pub use scoring::{Category, Classifier, Rubric, RubricClassifier, ScoreComponent, ScoreResult};
pub use service::{PotabilityService, ServiceError};
pub use session::{SessionError, SessionSnapshot, ValidationSession};
pub use validation::{validate, ValidationError, Violation, ViolationKind};
