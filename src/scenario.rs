//! What-if statistics for graduate-school and study-abroad applications,
//! where admissions often ignore PE, ideology, or free-elective courses.

use serde::Serialize;

use crate::grading;
use crate::models::{CohortStats, CourseCategory, CourseRecord, GradingMethod};
use crate::stats;

pub const PHYSICAL_EDUCATION_KEYWORDS: &[&str] = &["体育", "Physical Education"];

pub const POLITICS_KEYWORDS: &[&str] = &[
    "思想",
    "毛泽东",
    "马克思",
    "中国近现代",
    "形势与政策",
    "军事",
    "习近平",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScenarioOptions {
    pub exclude_physical_education: bool,
    pub exclude_politics: bool,
    pub exclude_free_electives: bool,
    pub core_only: bool,
    /// Re-grade every included course on the WES scale.
    pub wes_override: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub included: usize,
    pub excluded: usize,
    pub scenario: CohortStats,
    pub baseline: CohortStats,
    pub gpa_delta: f64,
}

fn mentions_any(name: &str, keywords: &[&str]) -> bool {
    let lowered = name.to_lowercase();
    keywords
        .iter()
        .any(|keyword| lowered.contains(&keyword.to_lowercase()))
}

impl ScenarioOptions {
    pub fn includes(&self, record: &CourseRecord) -> bool {
        if self.exclude_physical_education && mentions_any(&record.name, PHYSICAL_EDUCATION_KEYWORDS) {
            return false;
        }
        if self.exclude_politics && mentions_any(&record.name, POLITICS_KEYWORDS) {
            return false;
        }
        if self.exclude_free_electives && record.category == CourseCategory::FreeElective {
            return false;
        }
        if self.core_only && !record.core {
            return false;
        }
        true
    }
}

/// Compares filtered (and optionally WES re-graded) stats against the
/// plain stats of every active course.
pub fn evaluate(records: &[CourseRecord], options: &ScenarioOptions) -> ScenarioOutcome {
    let active: Vec<CourseRecord> = records.iter().filter(|record| record.active).cloned().collect();

    let selected: Vec<CourseRecord> = active
        .iter()
        .filter(|record| options.includes(record))
        .map(|record| {
            let mut record = record.clone();
            if options.wes_override {
                record.grade_points = grading::convert(record.score, GradingMethod::Wes);
            }
            record
        })
        .collect();

    let baseline = stats::aggregate(&active);
    let scenario = stats::aggregate(&selected);

    ScenarioOutcome {
        included: selected.len(),
        excluded: active.len() - selected.len(),
        gpa_delta: grading::round_to(scenario.weighted_gpa - baseline.weighted_gpa, 3),
        scenario,
        baseline,
    }
}
