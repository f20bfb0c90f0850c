use serde::{Deserialize, Serialize};
use tracing::info;

use super::dataset::Dataset;
use super::domain::{RawFields, Sample};
use super::scoring::{Category, Classifier, ScoreComponent};
use super::validation::{validate, ValidationError};

/// Where the sample under classification came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InputMode {
    /// Values typed into the manual entry form.
    Manual { fields: RawFields },
    /// Rows from an upload or the built-in sample dataset.
    Dataset { records: Dataset },
}

impl InputMode {
    pub fn manual(fields: RawFields) -> Self {
        InputMode::Manual { fields }
    }

    pub fn dataset(records: Dataset) -> Self {
        InputMode::Dataset { records }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InputMode::Manual { .. } => "manual",
            InputMode::Dataset { .. } => "dataset",
        }
    }
}

/// The originating input carried alongside a verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResultSource {
    Manual {
        form: RawFields,
        sample: Sample,
    },
    /// The full table is kept for display and export even though only the
    /// first row was classified.
    Dataset {
        table: Dataset,
        total_rows: usize,
        classified_rows: usize,
    },
}

/// Payload handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPayload {
    pub category: Category,
    pub score: f64,
    pub components: Vec<ScoreComponent>,
    pub source: ResultSource,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("dataset contains no rows to classify")]
    EmptyDataset,
}

/// Validates and scores the input described by `mode`.
///
/// Dataset mode classifies the first row only and keeps the whole table in
/// the payload.
pub fn classify(
    mode: InputMode,
    classifier: &dyn Classifier,
) -> Result<ResultPayload, ClassifyError> {
    match mode {
        InputMode::Manual { fields } => {
            let sample = validate(&fields)?;
            let result = classifier.score(&sample);
            Ok(ResultPayload {
                category: result.category,
                score: result.score,
                components: result.components,
                source: ResultSource::Manual {
                    form: fields,
                    sample,
                },
            })
        }
        InputMode::Dataset { records } => {
            let first = records.first().ok_or(ClassifyError::EmptyDataset)?;
            let sample = validate(&RawFields::from_record(first))?;
            let result = classifier.score(&sample);
            let total_rows = records.len();
            Ok(ResultPayload {
                category: result.category,
                score: result.score,
                components: result.components,
                source: ResultSource::Dataset {
                    table: records,
                    total_rows,
                    classified_rows: 1,
                },
            })
        }
    }
}

/// Hand-off point to whatever renders results (UI, CLI, HTTP response).
pub trait ResultPublisher: Send + Sync {
    fn publish(&self, payload: &ResultPayload) -> Result<(), PublishError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("presentation layer unavailable: {0}")]
    Unavailable(String),
}

/// Publisher that only records the verdict in the trace log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingResultPublisher;

impl ResultPublisher for TracingResultPublisher {
    fn publish(&self, payload: &ResultPayload) -> Result<(), PublishError> {
        let (mode, rows) = match &payload.source {
            ResultSource::Manual { .. } => ("manual", 1),
            ResultSource::Dataset { total_rows, .. } => ("dataset", *total_rows),
        };
        info!(
            category = %payload.category,
            score = payload.score,
            mode,
            rows,
            "potability result published"
        );
        Ok(())
    }
}
