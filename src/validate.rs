use std::fmt;

use uuid::Uuid;

use crate::models::{CourseCategory, CourseRecord};

/// Advisory findings about a course record. Aggregation never consults these.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    ScoreOutOfRange { id: Uuid, name: String, score: f64 },
    InvalidCredits { id: Uuid, name: String, credits: f64 },
    BlankSemester { id: Uuid, name: String },
    UnknownCategory { id: Uuid, name: String, label: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::ScoreOutOfRange { name, score, .. } => {
                write!(f, "{name}: score {score} is outside 0-100")
            }
            ValidationIssue::InvalidCredits { name, credits, .. } => {
                write!(f, "{name}: credits {credits} is not a non-negative number")
            }
            ValidationIssue::BlankSemester { name, .. } => write!(f, "{name}: semester is blank"),
            ValidationIssue::UnknownCategory { name, label, .. } => {
                write!(f, "{name}: unrecognised category '{label}'")
            }
        }
    }
}

pub fn validate(records: &[CourseRecord]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for record in records {
        if !(0.0..=100.0).contains(&record.score) {
            issues.push(ValidationIssue::ScoreOutOfRange {
                id: record.id,
                name: record.name.clone(),
                score: record.score,
            });
        }
        if !record.credits.is_finite() || record.credits < 0.0 {
            issues.push(ValidationIssue::InvalidCredits {
                id: record.id,
                name: record.name.clone(),
                credits: record.credits,
            });
        }
        if record.semester.trim().is_empty() {
            issues.push(ValidationIssue::BlankSemester {
                id: record.id,
                name: record.name.clone(),
            });
        }
        if let CourseCategory::Other(label) = &record.category {
            issues.push(ValidationIssue::UnknownCategory {
                id: record.id,
                name: record.name.clone(),
                label: label.clone(),
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: f64, credits: f64) -> CourseRecord {
        CourseRecord {
            id: Uuid::new_v4(),
            name: "Physics".to_string(),
            credits,
            score,
            grade_points: 0.0,
            active: true,
            semester: "2023-2024-1".to_string(),
            category: CourseCategory::Required,
            core: false,
        }
    }

    #[test]
    fn clean_records_have_no_issues() {
        assert!(validate(&[record(0.0, 0.0), record(100.0, 4.0)]).is_empty());
    }

    #[test]
    fn flags_each_problem_separately() {
        let mut odd = record(130.0, -1.0);
        odd.semester = "  ".to_string();
        odd.category = CourseCategory::Other("seminar".to_string());

        let issues = validate(&[odd]);
        assert_eq!(issues.len(), 4);
        assert!(matches!(issues[0], ValidationIssue::ScoreOutOfRange { score, .. } if score == 130.0));
        assert!(matches!(issues[1], ValidationIssue::InvalidCredits { .. }));
        assert!(matches!(issues[2], ValidationIssue::BlankSemester { .. }));
        assert_eq!(issues[3].to_string(), "Physics: unrecognised category 'seminar'");
    }

    #[test]
    fn nan_credits_are_flagged() {
        let issues = validate(&[record(80.0, f64::NAN)]);
        assert_eq!(issues.len(), 1);
    }
}
