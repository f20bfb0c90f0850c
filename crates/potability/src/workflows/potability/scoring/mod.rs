mod policy;
mod rubric;

pub use policy::{Category, GOOD_THRESHOLD, MODERATE_THRESHOLD};
pub use rubric::{Band, BandMatch, Bound, RangePolicy, Rubric};

use serde::{Deserialize, Serialize};

use super::domain::{Parameter, Sample};

/// Upper bound of every reported score.
pub const MAX_SCORE: f64 = 100.0;

/// Seam for swapping the placeholder heuristic for a trained model.
///
/// Implementations must be deterministic for a given sample and keep the
/// score within `0..=MAX_SCORE`.
pub trait Classifier: Send + Sync {
    fn score(&self, sample: &Sample) -> ScoreResult;
}

/// Points a single parameter contributed, for transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub parameter: Parameter,
    pub value: f64,
    pub band: BandMatch,
    pub points: f64,
    pub notes: String,
}

/// Composite score, its category, and the contribution trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: f64,
    pub category: Category,
    #[serde(default)]
    pub components: Vec<ScoreComponent>,
}

impl ScoreResult {
    /// Clamps the summed points into range and derives the category.
    pub fn from_components(components: Vec<ScoreComponent>) -> Self {
        let raw: f64 = components.iter().map(|component| component.points).sum();
        Self::from_score(raw, components)
    }

    pub fn from_score(score: f64, components: Vec<ScoreComponent>) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, MAX_SCORE)
        };

        Self {
            score,
            category: Category::from_score(score),
            components,
        }
    }
}

/// Additive rule-based classifier driven by a [`Rubric`].
#[derive(Debug, Clone, Default)]
pub struct RubricClassifier {
    rubric: Rubric,
}

impl RubricClassifier {
    pub fn new(rubric: Rubric) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }
}

impl Classifier for RubricClassifier {
    fn score(&self, sample: &Sample) -> ScoreResult {
        let components = self
            .rubric
            .policies()
            .iter()
            .map(|policy| {
                let value = sample.value(policy.parameter);
                let (points, band) = policy.award(value);
                let notes = match band {
                    BandMatch::Optimal => {
                        format!("{} {} within optimal {}", policy.parameter, value, policy.optimal)
                    }
                    BandMatch::Acceptable => match policy.acceptable {
                        Some(acceptable) => format!(
                            "{} {} within acceptable {}",
                            policy.parameter, value, acceptable
                        ),
                        None => format!("{} {} acceptable", policy.parameter, value),
                    },
                    BandMatch::Outside => format!(
                        "{} {} outside recommended {}",
                        policy.parameter, value, policy.optimal
                    ),
                };

                ScoreComponent {
                    parameter: policy.parameter,
                    value,
                    band,
                    points,
                    notes,
                }
            })
            .collect();

        let result = ScoreResult::from_components(components);
        tracing::debug!(score = result.score, category = %result.category, "sample scored");
        result
    }
}
