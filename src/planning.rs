use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{CourseCategory, CourseRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    /// Needs better results than the current average but stays under 100.
    Possible,
    /// Would need a score above 100.
    Impossible,
    /// Current performance is already enough.
    Easy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPlan {
    pub required_gpa: f64,
    pub required_score: f64,
    pub status: TargetStatus,
}

/// Grade points needed across the remaining credits to land on `target_gpa`.
///
/// The score estimate inverts the subtractive scale. Returns `None` when
/// there are no remaining credits or an input is not a finite number.
pub fn plan_target(
    current_gpa: f64,
    current_credits: f64,
    target_gpa: f64,
    remaining_credits: f64,
) -> Option<TargetPlan> {
    let inputs = [current_gpa, current_credits, target_gpa, remaining_credits];
    if inputs.iter().any(|value| !value.is_finite()) || remaining_credits <= 0.0 {
        return None;
    }

    let total_credits = current_credits + remaining_credits;
    let required_points = target_gpa * total_credits - current_gpa * current_credits;
    let required_gpa = required_points / remaining_credits;
    let required_score = subtractive_score(required_gpa);

    let status = if required_score > 100.0 {
        TargetStatus::Impossible
    } else if required_score <= subtractive_score(current_gpa) {
        TargetStatus::Easy
    } else {
        TargetStatus::Possible
    };

    Some(TargetPlan {
        required_gpa,
        required_score,
        status,
    })
}

fn subtractive_score(gpa: f64) -> f64 {
    gpa * 10.0 + 50.0
}

/// Credits a degree demands, overall and per category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraduationRequirements {
    pub total: f64,
    #[serde(alias = "required")]
    pub compulsory: f64,
    pub elective: f64,
    #[serde(alias = "freeElective")]
    pub optional: f64,
}

impl Default for GraduationRequirements {
    fn default() -> Self {
        Self {
            total: 160.0,
            compulsory: 100.0,
            elective: 30.0,
            optional: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProgress {
    pub earned: f64,
    pub required: f64,
    pub remaining: f64,
}

impl CategoryProgress {
    fn new(earned: f64, required: f64) -> Self {
        Self {
            earned,
            required,
            remaining: (required - earned).max(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraduationProgress {
    pub total: CategoryProgress,
    pub compulsory: CategoryProgress,
    pub elective: CategoryProgress,
    pub optional: CategoryProgress,
    pub percent_complete: f64,
    pub semesters_seen: usize,
    pub average_credits_per_semester: f64,
    pub semesters_left: u32,
}

/// Credit progress towards graduation over the active courses, plus a
/// naive projection of how many semesters remain at the current pace.
pub fn graduation_progress(
    records: &[CourseRecord],
    requirements: &GraduationRequirements,
) -> GraduationProgress {
    let mut total = 0.0;
    let mut compulsory = 0.0;
    let mut elective = 0.0;
    let mut optional = 0.0;

    for record in records.iter().filter(|record| record.active) {
        total += record.credits;
        match record.category {
            CourseCategory::Required => compulsory += record.credits,
            CourseCategory::Elective => elective += record.credits,
            CourseCategory::FreeElective => optional += record.credits,
            CourseCategory::Other(_) => {}
        }
    }

    let percent_complete = if requirements.total > 0.0 {
        (total / requirements.total * 100.0).min(100.0)
    } else {
        0.0
    };

    let semesters_seen = records
        .iter()
        .map(|record| record.semester.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let (average_credits_per_semester, semesters_left) = if semesters_seen == 0 {
        (0.0, 0)
    } else {
        let average = total / semesters_seen as f64;
        let remaining = (requirements.total - total).max(0.0);
        let left = if average > 0.0 {
            (remaining / average).ceil() as u32
        } else {
            0
        };
        (average, left)
    };

    GraduationProgress {
        total: CategoryProgress::new(total, requirements.total),
        compulsory: CategoryProgress::new(compulsory, requirements.compulsory),
        elective: CategoryProgress::new(elective, requirements.elective),
        optional: CategoryProgress::new(optional, requirements.optional),
        percent_complete,
        semesters_seen,
        average_credits_per_semester,
        semesters_left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn course(credits: f64, semester: &str, category: CourseCategory, active: bool) -> CourseRecord {
        CourseRecord {
            id: Uuid::new_v4(),
            name: "Data Structures".to_string(),
            credits,
            score: 85.0,
            grade_points: 3.5,
            active,
            semester: semester.to_string(),
            category,
            core: false,
        }
    }

    #[test]
    fn target_needs_more_than_current_pace() {
        let plan = plan_target(3.0, 60.0, 3.5, 20.0).expect("plan");
        // (3.5 * 80 - 3.0 * 60) / 20 = 5.0
        assert!((plan.required_gpa - 5.0).abs() < 1e-9);
        assert!((plan.required_score - 100.0).abs() < 1e-9);
        assert_eq!(plan.status, TargetStatus::Possible);
    }

    #[test]
    fn target_above_scale_is_impossible() {
        let plan = plan_target(3.0, 60.0, 4.0, 20.0).expect("plan");
        assert_eq!(plan.status, TargetStatus::Impossible);
    }

    #[test]
    fn target_below_current_is_easy() {
        let plan = plan_target(3.5, 60.0, 3.2, 20.0).expect("plan");
        assert_eq!(plan.status, TargetStatus::Easy);
        assert!(plan.required_gpa < 3.5);
    }

    #[test]
    fn target_requires_remaining_credits() {
        assert!(plan_target(3.0, 60.0, 3.5, 0.0).is_none());
        assert!(plan_target(3.0, 60.0, 3.5, -5.0).is_none());
        assert!(plan_target(f64::NAN, 60.0, 3.5, 20.0).is_none());
    }

    #[test]
    fn progress_buckets_credits_by_category() {
        let records = vec![
            course(40.0, "2022-2023-1", CourseCategory::Required, true),
            course(10.0, "2022-2023-2", CourseCategory::Elective, true),
            course(4.0, "2022-2023-2", CourseCategory::FreeElective, true),
            course(6.0, "2022-2023-2", CourseCategory::Other("lab".to_string()), true),
            course(30.0, "2023-2024-1", CourseCategory::Required, false),
        ];
        let progress = graduation_progress(&records, &GraduationRequirements::default());

        assert_eq!(progress.total.earned, 60.0);
        assert_eq!(progress.total.remaining, 100.0);
        assert_eq!(progress.compulsory.earned, 40.0);
        assert_eq!(progress.elective.earned, 10.0);
        assert_eq!(progress.optional.earned, 4.0);
        assert_eq!(progress.optional.remaining, 6.0);
        assert_eq!(progress.percent_complete, 37.5);
        // inactive courses still count as a semester seen
        assert_eq!(progress.semesters_seen, 3);
        assert_eq!(progress.average_credits_per_semester, 20.0);
        assert_eq!(progress.semesters_left, 5);
    }

    #[test]
    fn progress_caps_at_one_hundred_percent() {
        let records = vec![course(200.0, "2022-2023-1", CourseCategory::Required, true)];
        let progress = graduation_progress(&records, &GraduationRequirements::default());
        assert_eq!(progress.percent_complete, 100.0);
        assert_eq!(progress.total.remaining, 0.0);
        assert_eq!(progress.semesters_left, 0);
    }

    #[test]
    fn progress_without_courses_predicts_nothing() {
        let progress = graduation_progress(&[], &GraduationRequirements::default());
        assert_eq!(progress.semesters_seen, 0);
        assert_eq!(progress.semesters_left, 0);
        assert_eq!(progress.percent_complete, 0.0);
    }

    #[test]
    fn requirements_parse_from_json() {
        let parsed: GraduationRequirements =
            serde_json::from_str(r#"{"total":150,"compulsory":90,"elective":40,"optional":8}"#)
                .expect("valid json");
        assert_eq!(parsed.total, 150.0);
        assert_eq!(parsed.optional, 8.0);
    }
}
