use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest score classified as [`Category::Good`].
pub const GOOD_THRESHOLD: f64 = 80.0;
/// Lowest score classified as [`Category::Moderate`].
pub const MODERATE_THRESHOLD: f64 = 50.0;

/// Potability verdict handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Good,
    Moderate,
    Poor,
}

impl Category {
    /// Maps a score onto exactly one category; every real score has one.
    pub fn from_score(score: f64) -> Self {
        if score >= GOOD_THRESHOLD {
            Category::Good
        } else if score >= MODERATE_THRESHOLD {
            Category::Moderate
        } else {
            Category::Poor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::Poor => "Poor",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Category::Good => "parameters sit within recommended drinking water ranges",
            Category::Moderate => "some parameters fall outside recommended ranges",
            Category::Poor => "several parameters exceed recommended ranges",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
