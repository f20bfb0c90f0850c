use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Physicochemical parameters scored by the classifier, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Ph,
    Hardness,
    Solids,
    Chloramines,
    Sulfate,
    Conductivity,
    OrganicCarbon,
    Trihalomethanes,
    Turbidity,
}

impl Parameter {
    pub const ALL: [Parameter; 9] = [
        Parameter::Ph,
        Parameter::Hardness,
        Parameter::Solids,
        Parameter::Chloramines,
        Parameter::Sulfate,
        Parameter::Conductivity,
        Parameter::OrganicCarbon,
        Parameter::Trihalomethanes,
        Parameter::Turbidity,
    ];

    /// Field name used on forms, in uploaded headers, and on the wire.
    pub fn key(self) -> &'static str {
        match self {
            Parameter::Ph => "ph",
            Parameter::Hardness => "hardness",
            Parameter::Solids => "solids",
            Parameter::Chloramines => "chloramines",
            Parameter::Sulfate => "sulfate",
            Parameter::Conductivity => "conductivity",
            Parameter::OrganicCarbon => "organic_carbon",
            Parameter::Trihalomethanes => "trihalomethanes",
            Parameter::Turbidity => "turbidity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Parameter::Ph => "pH",
            Parameter::Hardness => "Hardness",
            Parameter::Solids => "Total dissolved solids",
            Parameter::Chloramines => "Chloramines",
            Parameter::Sulfate => "Sulfate",
            Parameter::Conductivity => "Conductivity",
            Parameter::OrganicCarbon => "Organic carbon",
            Parameter::Trihalomethanes => "Trihalomethanes",
            Parameter::Turbidity => "Turbidity",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Parameter::Ph => "",
            Parameter::Hardness | Parameter::Sulfate | Parameter::OrganicCarbon => "mg/L",
            Parameter::Solids | Parameter::Chloramines => "ppm",
            Parameter::Conductivity => "μS/cm",
            Parameter::Trihalomethanes => "μg/L",
            Parameter::Turbidity => "NTU",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let normalized = key.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|parameter| parameter.key() == normalized)
    }

    /// Physical bounds enforced at validation time, where the domain defines any.
    pub fn domain(self) -> Option<(f64, f64)> {
        match self {
            Parameter::Ph => Some((0.0, 14.0)),
            Parameter::Hardness => Some((0.0, 1000.0)),
            _ => None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A fully normalized water sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub ph: f64,
    pub hardness: f64,
    pub solids: f64,
    pub chloramines: f64,
    pub sulfate: f64,
    pub conductivity: f64,
    pub organic_carbon: f64,
    pub trihalomethanes: f64,
    pub turbidity: f64,
}

impl Sample {
    /// Builds a sample from values listed in [`Parameter::ALL`] order.
    pub fn from_ordered(values: [f64; 9]) -> Self {
        let [
            ph,
            hardness,
            solids,
            chloramines,
            sulfate,
            conductivity,
            organic_carbon,
            trihalomethanes,
            turbidity,
        ] = values;
        Self {
            ph,
            hardness,
            solids,
            chloramines,
            sulfate,
            conductivity,
            organic_carbon,
            trihalomethanes,
            turbidity,
        }
    }

    pub fn value(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Ph => self.ph,
            Parameter::Hardness => self.hardness,
            Parameter::Solids => self.solids,
            Parameter::Chloramines => self.chloramines,
            Parameter::Sulfate => self.sulfate,
            Parameter::Conductivity => self.conductivity,
            Parameter::OrganicCarbon => self.organic_carbon,
            Parameter::Trihalomethanes => self.trihalomethanes,
            Parameter::Turbidity => self.turbidity,
        }
    }

    pub fn with_value(mut self, parameter: Parameter, value: f64) -> Self {
        let slot = match parameter {
            Parameter::Ph => &mut self.ph,
            Parameter::Hardness => &mut self.hardness,
            Parameter::Solids => &mut self.solids,
            Parameter::Chloramines => &mut self.chloramines,
            Parameter::Sulfate => &mut self.sulfate,
            Parameter::Conductivity => &mut self.conductivity,
            Parameter::OrganicCarbon => &mut self.organic_carbon,
            Parameter::Trihalomethanes => &mut self.trihalomethanes,
            Parameter::Turbidity => &mut self.turbidity,
        };
        *slot = value;
        self
    }
}

/// Raw per-field text exactly as a form or uploaded row supplied it.
///
/// Deserialization accepts JSON numbers as well as strings so API clients may
/// post either; both are kept as text until the validator normalizes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct RawFields(BTreeMap<String, String>);

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every parameter key mapped to an empty value, the blank-form state.
    pub fn blank() -> Self {
        Parameter::ALL
            .into_iter()
            .map(|parameter| (parameter.key().to_string(), String::new()))
            .collect()
    }

    /// Projects a loosely typed record onto the parameter keys it carries.
    pub fn from_record(record: &serde_json::Map<String, Value>) -> Self {
        record
            .iter()
            .map(|(key, value)| (key.trim().to_string(), value_text(value)))
            .collect()
    }
}

impl FromIterator<(String, String)> for RawFields {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for RawFields {
    fn from(value: BTreeMap<String, Value>) -> Self {
        value
            .into_iter()
            .map(|(key, value)| (key, value_text(&value)))
            .collect()
    }
}

/// Text rendering of a loosely typed cell; `null` reads as an empty cell.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
