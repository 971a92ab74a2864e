//! The structured report contract.
//!
//! These types mirror the JSON document the model is instructed to
//! produce. Enumerated fields are typed enums, so deserialization alone
//! rejects undeclared symbolic values; numeric range and view-partition
//! checks live in the validator.

use serde::{Deserialize, Serialize};

use crate::views::View;

/// Shoe category guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShoeCategory {
    Road,
    Trail,
    Hybrid,
    Unknown,
}

/// Verdict traffic-light status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
    Gray,
}

impl StatusColor {
    pub fn label(&self) -> &'static str {
        match self {
            StatusColor::Green => "GREEN",
            StatusColor::Yellow => "YELLOW",
            StatusColor::Red => "RED",
            StatusColor::Gray => "GRAY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrikePattern {
    Heel,
    Midfoot,
    Forefoot,
    Undetermined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Pronation {
    Neutral,
    Overpronation,
    Supination,
    Undetermined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WearPattern {
    HeelStrike,
    Midfoot,
    Forefoot,
    Uneven,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompressionStatus {
    Healthy,
    SurfaceWrinkles,
    DeepCompression,
    Collapsed,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MidsoleVariance {
    Balanced,
    MedialCollapse,
    LateralCollapse,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpperStatus {
    Good,
    TearsDetected,
    HolesDetected,
    Unknown,
}

/// What the model was given to work with, in its own words.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisAudit {
    pub is_complete_scan: bool,
    pub received_views: Vec<View>,
    pub missing_views: Vec<View>,
    /// Explanation of limitations due to missing data.
    pub limitations_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoeInfo {
    pub detected_brand_model: Option<String>,
    pub category: ShoeCategory,
    /// Identification confidence, 0–100.
    pub confidence_score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutsoleHealth {
    /// Remaining condition, 0–100.
    pub condition_score: f32,
    pub wear_pattern: WearPattern,
    pub technical_observation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidsoleHealth {
    /// Remaining cushioning life, 0–100.
    pub life_remaining_percentage: f32,
    pub compression_status: CompressionStatus,
    pub medial_vs_lateral_variance: MidsoleVariance,
    pub technical_observation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpperHealth {
    pub status: UpperStatus,
    pub observation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub outsole: OutsoleHealth,
    pub midsole: MidsoleHealth,
    pub upper: UpperHealth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Biomechanics {
    pub foot_strike_detected: StrikePattern,
    pub pronation_assessment: Pronation,
    pub injury_risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub status_code: StatusColor,
    pub display_title: String,
    /// Free text, e.g. "200-350 km".
    pub estimated_km_left: String,
    pub final_prescription: String,
}

/// The complete validated report. Immutable once constructed — a report
/// either passes the whole contract or the run fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForensicReport {
    pub analysis_audit: AnalysisAudit,
    pub shoe_info: ShoeInfo,
    pub component_health: ComponentHealth,
    pub biomechanics: Biomechanics,
    pub verdict: Verdict,
}
