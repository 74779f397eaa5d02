use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Classification of a course within a degree plan.
///
/// Labels that are not recognised are kept verbatim in `Other` so that
/// imported data round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CourseCategory {
    #[default]
    Required,
    Elective,
    FreeElective,
    Other(String),
}

impl CourseCategory {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "必修" => Self::Required,
            "选修" => Self::Elective,
            "任选" => Self::FreeElective,
            other => match other.to_ascii_lowercase().replace('_', "-").as_str() {
                "required" | "compulsory" => Self::Required,
                "elective" => Self::Elective,
                "free-elective" | "optional" => Self::FreeElective,
                _ => Self::Other(other.to_string()),
            },
        }
    }

    /// Label written to JSON backups, matching the labels the tracker's
    /// backups have always carried.
    pub fn backup_label(&self) -> &str {
        match self {
            Self::Required => "必修",
            Self::Elective => "选修",
            Self::FreeElective => "任选",
            Self::Other(label) => label,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Elective => "elective",
            Self::FreeElective => "free-elective",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for CourseCategory {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<CourseCategory> for String {
    fn from(value: CourseCategory) -> Self {
        value.backup_label().to_string()
    }
}

impl fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentage-to-grade-point conversion formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GradingMethod {
    /// `(score - 50) / 10`, 5.0 ceiling.
    #[default]
    Subtractive,
    /// `score / 20`, 5.0 ceiling.
    Linear,
    /// WES-style 5.0 steps.
    Wes,
    /// Standard 4.0 steps.
    Standard4,
    /// Quadratic 4.0 curve.
    Formula4,
    /// Subtractive scaled down to a 4.5 ceiling.
    Scale45,
}

impl GradingMethod {
    pub const ALL: [GradingMethod; 6] = [
        Self::Subtractive,
        Self::Linear,
        Self::Wes,
        Self::Standard4,
        Self::Formula4,
        Self::Scale45,
    ];

    /// Looks a method up by name. Unknown names yield `None`.
    pub fn from_name(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let method = match normalized.as_str() {
            "subtractive" | "subtractive-5.0" | "subtractive-5-0" => Self::Subtractive,
            "linear" | "linear-5.0" | "linear-5-0" => Self::Linear,
            "wes" | "wes-5.0" | "wes-5-0" => Self::Wes,
            "std-4.0" | "std-4-0" | "standard" | "standard-4.0" | "standard-4-0" => {
                Self::Standard4
            }
            "formula-4.0" | "formula-4-0" | "formula" | "pku-4-0" | "pku-4.0" => Self::Formula4,
            "scale-4.5" | "scale-4-5" => Self::Scale45,
            _ => return None,
        };
        Some(method)
    }

    /// Looks a method up by name, falling back to the subtractive scale.
    pub fn from_name_or_default(value: &str) -> Self {
        Self::from_name(value).unwrap_or_else(|| {
            tracing::warn!(method = value, "unknown grading method, using subtractive scale");
            Self::Subtractive
        })
    }

    /// Identifier used in JSON backups.
    pub fn id(self) -> &'static str {
        match self {
            Self::Subtractive => "SUBTRACTIVE",
            Self::Linear => "LINEAR",
            Self::Wes => "WES",
            Self::Standard4 => "STD_4_0",
            Self::Formula4 => "PKU_4_0",
            Self::Scale45 => "SCALE_4_5",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Subtractive => "Subtractive 5.0",
            Self::Linear => "Linear 5.0",
            Self::Wes => "WES 5.0",
            Self::Standard4 => "Standard 4.0",
            Self::Formula4 => "Formula 4.0",
            Self::Scale45 => "Scale 4.5",
        }
    }

    pub fn max_points(self) -> f64 {
        match self {
            Self::Subtractive | Self::Linear | Self::Wes => 5.0,
            Self::Standard4 | Self::Formula4 => 4.0,
            Self::Scale45 => 4.5,
        }
    }
}

impl From<String> for GradingMethod {
    fn from(value: String) -> Self {
        Self::from_name_or_default(&value)
    }
}

impl From<GradingMethod> for String {
    fn from(value: GradingMethod) -> Self {
        value.id().to_string()
    }
}

impl fmt::Display for GradingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single logged course. `grade_points` is filled in by the converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    #[serde(default = "Uuid::new_v4", deserialize_with = "lenient_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub credits: f64,
    pub score: f64,
    #[serde(rename = "gpa", default)]
    pub grade_points: f64,
    #[serde(rename = "isActive", default = "default_active")]
    pub active: bool,
    #[serde(default = "default_semester")]
    pub semester: String,
    #[serde(rename = "type", default)]
    pub category: CourseCategory,
    #[serde(rename = "isCore", default)]
    pub core: bool,
}

pub const UNKNOWN_SEMESTER: &str = "Unknown";

/// Backups carry ids like `"1712345678901"`, `""` or bare numbers; anything
/// that is not a UUID gets a fresh one.
fn lenient_id<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match &raw {
        Some(serde_json::Value::String(text)) => Uuid::parse_str(text.trim()).ok(),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(|| {
        tracing::debug!(id = ?raw, "replacing non-UUID course id");
        Uuid::new_v4()
    }))
}

fn default_active() -> bool {
    true
}

fn default_semester() -> String {
    UNKNOWN_SEMESTER.to_string()
}

/// Editable fields of a course, as entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDraft {
    pub name: String,
    pub credits: f64,
    pub score: f64,
    pub semester: String,
    pub category: CourseCategory,
}

/// Fixed score bands used for the distribution histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Pass,
    Fail,
}

impl ScoreBand {
    pub const ALL: [ScoreBand; 5] = [
        Self::Excellent,
        Self::Good,
        Self::Fair,
        Self::Pass,
        Self::Fail,
    ];

    pub fn of(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Self::Excellent,
            s if s >= 80.0 => Self::Good,
            s if s >= 70.0 => Self::Fair,
            s if s >= 60.0 => Self::Pass,
            _ => Self::Fail,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "90-100",
            Self::Good => "80-89",
            Self::Fair => "70-79",
            Self::Pass => "60-69",
            Self::Fail => "<60",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCount {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortStats {
    pub total_credits: f64,
    pub weighted_gpa: f64,
    pub weighted_average_score: f64,
    pub course_count: usize,
    pub score_distribution: Vec<BandCount>,
    pub compulsory_credits: f64,
    pub compulsory_weighted_gpa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterTrendPoint {
    pub semester: String,
    pub gpa: f64,
    pub credits: f64,
}
