//! Data models and structures
//!
//! Defines the JSON schema shared by the analysis client and the proxy:
//! the outbound request with its two photographs, the scored metrics and
//! the normalized analysis response.

use crate::tier::Tier;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    /// Anything other than the two supported values; rendered as unspecified.
    Unspecified,
}

impl<'de> Deserialize<'de> for Gender {
    /// Case-insensitive; unknown values become `Unspecified`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.trim().to_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Unspecified,
        })
    }
}

/// `null` decodes like a missing field.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Gender {
    pub fn as_prompt_value(&self) -> Option<&'static str> {
        match self {
            Gender::Male => Some("male"),
            Gender::Female => Some("female"),
            Gender::Unspecified => None,
        }
    }
}

/// Advisory context injected into the instruction prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_areas: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Data-URI (or bare base64) front photograph.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub front_image: String,
    /// Data-URI (or bare base64) side profile photograph.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub side_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserData>,
}

impl AnalysisRequest {
    pub const MISSING_IMAGES: &'static str = "Both front and side images are required";

    pub fn new(front_image: String, side_image: String) -> Self {
        Self {
            front_image,
            side_image,
            user_data: None,
        }
    }

    pub fn with_user_data(mut self, user_data: UserData) -> Self {
        self.user_data = Some(user_data);
        self
    }

    /// Both photographs must be present; user context never fails a request.
    pub fn validate(&self) -> Result<()> {
        if self.front_image.trim().is_empty() || self.side_image.trim().is_empty() {
            return Err(Error::InvalidInput(Self::MISSING_IMAGES.to_string()));
        }
        Ok(())
    }
}

/// The six canonical dimensions, in the order the model is asked to report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricCategory {
    Jawline,
    Eyes,
    Skin,
    FacialHarmony,
    Midface,
    OverallImpression,
}

impl MetricCategory {
    pub const ALL: [MetricCategory; 6] = [
        MetricCategory::Jawline,
        MetricCategory::Eyes,
        MetricCategory::Skin,
        MetricCategory::FacialHarmony,
        MetricCategory::Midface,
        MetricCategory::OverallImpression,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            MetricCategory::Jawline => "jawline",
            MetricCategory::Eyes => "eyes",
            MetricCategory::Skin => "skin",
            MetricCategory::FacialHarmony => "facial_harmony",
            MetricCategory::Midface => "midface",
            MetricCategory::OverallImpression => "overall_impression",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricCategory::Jawline => "Jawline & Lower Third",
            MetricCategory::Eyes => "Eye Area",
            MetricCategory::Skin => "Skin Quality",
            MetricCategory::FacialHarmony => "Facial Harmony & Symmetry",
            MetricCategory::Midface => "Midface & Cheekbones",
            MetricCategory::OverallImpression => "Overall Impression",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.id() == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacialMetric {
    pub id: String,
    pub label: String,
    pub score: f64,
    /// Expected to be at least `score`, but never enforced.
    pub potential: f64,
    #[serde(default)]
    pub insights: String,
    #[serde(default)]
    pub improvements: Vec<String>,
}

/// Normalized analysis outcome, identical on both sides of the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub success: bool,
    pub current_score: f64,
    pub potential_score: f64,
    pub current_tier: Tier,
    pub potential_tier: Tier,
    #[serde(default)]
    pub metrics: Vec<FacialMetric>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub priority_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of every failed proxy response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}
