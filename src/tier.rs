//! Qualitative tiers derived from a 1-10 aesthetic score.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "BELOW AVERAGE")]
    BelowAverage,
    #[serde(rename = "AVERAGE")]
    Average,
    #[serde(rename = "ABOVE AVERAGE")]
    AboveAverage,
    #[serde(rename = "ATTRACTIVE")]
    Attractive,
    #[serde(rename = "VERY ATTRACTIVE")]
    VeryAttractive,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::BelowAverage,
        Tier::Average,
        Tier::AboveAverage,
        Tier::Attractive,
        Tier::VeryAttractive,
    ];

    /// Classify a score using fixed breakpoints at 4, 5.5, 7 and 8.5.
    ///
    /// Scores outside 1-10 land in the nearest bucket; NaN is treated as
    /// the lowest tier.
    pub fn from_score(score: f64) -> Self {
        if score.is_nan() || score < 4.0 {
            Tier::BelowAverage
        } else if score < 5.5 {
            Tier::Average
        } else if score < 7.0 {
            Tier::AboveAverage
        } else if score < 8.5 {
            Tier::Attractive
        } else {
            Tier::VeryAttractive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::BelowAverage => "BELOW AVERAGE",
            Tier::Average => "AVERAGE",
            Tier::AboveAverage => "ABOVE AVERAGE",
            Tier::Attractive => "ATTRACTIVE",
            Tier::VeryAttractive => "VERY ATTRACTIVE",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    /// Case-insensitive; surrounding whitespace and `_` separators are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', " ").to_uppercase();
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == normalized)
            .ok_or_else(|| format!("Unknown tier '{}'", s))
    }
}
