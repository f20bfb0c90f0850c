use std::fmt;

use serde::Serialize;

use super::domain::{Parameter, RawFields, Sample};

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// Field absent or blank.
    Missing,
    NotANumber { raw: String },
    /// Parsed value outside the parameter's physical domain.
    OutOfRange { value: f64, min: f64, max: f64 },
}

/// One rejected field together with the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub field: Parameter,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl Violation {
    pub fn reason(&self) -> String {
        match &self.kind {
            ViolationKind::Missing => format!("{} is required", self.field.label()),
            ViolationKind::NotANumber { raw } => {
                format!("{} must be a number (got '{}')", self.field.label(), raw)
            }
            ViolationKind::OutOfRange { min, max, .. } => {
                let unit = self.field.unit();
                if unit.is_empty() {
                    format!("{} must be between {} and {}", self.field.label(), min, max)
                } else {
                    format!(
                        "{} must be between {} and {} {}",
                        self.field.label(),
                        min,
                        max,
                        unit
                    )
                }
            }
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.kind, ViolationKind::Missing)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason())
    }
}

/// Every violation found in a submission, in canonical parameter order.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn missing_fields(&self) -> Vec<Parameter> {
        self.violations
            .iter()
            .filter(|violation| violation.is_missing())
            .map(|violation| violation.field)
            .collect()
    }

    pub fn fields(&self) -> Vec<Parameter> {
        self.violations
            .iter()
            .map(|violation| violation.field)
            .collect()
    }
}

fn summarize(violations: &[Violation]) -> String {
    let details = violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!("{} field(s) failed validation: {}", violations.len(), details)
}

/// Normalizes raw field text into a [`Sample`], accumulating every violation.
///
/// Each parameter is checked independently of the others, so the reported set
/// does not depend on check order.
pub fn validate(raw: &RawFields) -> Result<Sample, ValidationError> {
    let mut values = [0.0_f64; 9];
    let mut violations = Vec::new();

    for (slot, parameter) in values.iter_mut().zip(Parameter::ALL) {
        match check_field(parameter, raw.get(parameter.key())) {
            Ok(value) => *slot = value,
            Err(kind) => violations.push(Violation {
                field: parameter,
                kind,
            }),
        }
    }

    if !violations.is_empty() {
        return Err(ValidationError { violations });
    }

    Ok(Sample::from_ordered(values))
}

fn check_field(parameter: Parameter, raw: Option<&str>) -> Result<f64, ViolationKind> {
    let text = raw
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(ViolationKind::Missing)?;

    let value = text
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ViolationKind::NotANumber {
            raw: text.to_string(),
        })?;

    if let Some((min, max)) = parameter.domain() {
        if !(min..=max).contains(&value) {
            return Err(ViolationKind::OutOfRange { value, min, max });
        }
    }

    Ok(value)
}
