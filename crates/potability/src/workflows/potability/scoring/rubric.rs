use std::fmt;

use serde::{Deserialize, Serialize};

use super::super::domain::Parameter;

/// One end of a band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Bound {
    Unbounded,
    Inclusive(f64),
    Exclusive(f64),
}

impl Bound {
    fn admits_from_below(self, value: f64) -> bool {
        match self {
            Bound::Unbounded => true,
            Bound::Inclusive(limit) => value >= limit,
            Bound::Exclusive(limit) => value > limit,
        }
    }

    fn admits_from_above(self, value: f64) -> bool {
        match self {
            Bound::Unbounded => true,
            Bound::Inclusive(limit) => value <= limit,
            Bound::Exclusive(limit) => value < limit,
        }
    }
}

/// A value range worth a fixed number of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lower: Bound,
    pub upper: Bound,
    pub points: f64,
}

impl Band {
    pub fn between(min: f64, max: f64, points: f64) -> Self {
        Self {
            lower: Bound::Inclusive(min),
            upper: Bound::Inclusive(max),
            points,
        }
    }

    pub fn below(limit: f64, points: f64) -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Exclusive(limit),
            points,
        }
    }

    pub fn at_most(limit: f64, points: f64) -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Inclusive(limit),
            points,
        }
    }

    /// NaN never falls inside a band.
    pub fn contains(&self, value: f64) -> bool {
        self.lower.admits_from_below(value) && self.upper.admits_from_above(value)
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lower, self.upper) {
            (Bound::Unbounded, Bound::Unbounded) => write!(f, "any value"),
            (Bound::Unbounded, Bound::Exclusive(max)) => write!(f, "< {max}"),
            (Bound::Unbounded, Bound::Inclusive(max)) => write!(f, "<= {max}"),
            (Bound::Exclusive(min), Bound::Unbounded) => write!(f, "> {min}"),
            (Bound::Inclusive(min), Bound::Unbounded) => write!(f, ">= {min}"),
            (lower, upper) => {
                let (open, min) = match lower {
                    Bound::Exclusive(min) => ('(', min),
                    Bound::Inclusive(min) => ('[', min),
                    Bound::Unbounded => ('(', f64::NEG_INFINITY),
                };
                let (close, max) = match upper {
                    Bound::Exclusive(max) => (')', max),
                    Bound::Inclusive(max) => (']', max),
                    Bound::Unbounded => (')', f64::INFINITY),
                };
                write!(f, "{open}{min}, {max}{close}")
            }
        }
    }
}

/// Which band, if any, a value landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandMatch {
    Optimal,
    Acceptable,
    Outside,
}

/// Scoring policy for a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangePolicy {
    pub parameter: Parameter,
    pub optimal: Band,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptable: Option<Band>,
}

impl RangePolicy {
    pub fn optimal(parameter: Parameter, band: Band) -> Self {
        Self {
            parameter,
            optimal: band,
            acceptable: None,
        }
    }

    pub fn with_acceptable(mut self, band: Band) -> Self {
        self.acceptable = Some(band);
        self
    }

    /// The optimal band is checked first, so overlapping bands award the larger share.
    pub fn award(&self, value: f64) -> (f64, BandMatch) {
        if self.optimal.contains(value) {
            return (self.optimal.points, BandMatch::Optimal);
        }

        match self.acceptable {
            Some(band) if band.contains(value) => (band.points, BandMatch::Acceptable),
            _ => (0.0, BandMatch::Outside),
        }
    }
}

/// Ordered set of per-parameter policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    policies: Vec<RangePolicy>,
}

impl Rubric {
    pub fn new(policies: Vec<RangePolicy>) -> Self {
        Self { policies }
    }

    /// Screening rubric used by the placeholder heuristic.
    pub fn standard() -> Self {
        Self::new(vec![
            RangePolicy::optimal(Parameter::Ph, Band::between(6.5, 8.5, 30.0))
                .with_acceptable(Band::between(6.0, 9.0, 15.0)),
            RangePolicy::optimal(Parameter::Hardness, Band::between(150.0, 300.0, 10.0)),
            RangePolicy::optimal(Parameter::Solids, Band::below(600.0, 10.0)),
            RangePolicy::optimal(Parameter::Chloramines, Band::below(4.0, 10.0)),
            RangePolicy::optimal(Parameter::Sulfate, Band::at_most(250.0, 10.0)),
            RangePolicy::optimal(Parameter::Conductivity, Band::between(200.0, 800.0, 10.0)),
            RangePolicy::optimal(Parameter::OrganicCarbon, Band::below(10.0, 10.0)),
            RangePolicy::optimal(Parameter::Trihalomethanes, Band::below(80.0, 10.0)),
            RangePolicy::optimal(Parameter::Turbidity, Band::below(5.0, 10.0)),
        ])
    }

    pub fn policies(&self) -> &[RangePolicy] {
        &self.policies
    }

    pub fn policy(&self, parameter: Parameter) -> Option<&RangePolicy> {
        self.policies
            .iter()
            .find(|policy| policy.parameter == parameter)
    }

    /// Sum of optimal points; may exceed the reported score ceiling.
    pub fn max_points(&self) -> f64 {
        self.policies.iter().map(|policy| policy.optimal.points).sum()
    }
}

impl Default for Rubric {
    fn default() -> Self {
        Self::standard()
    }
}
