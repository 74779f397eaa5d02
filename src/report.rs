use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{CourseRecord, GradingMethod};
use crate::stats;

/// Courses with the most grade points, ties broken by credits then name.
pub fn top_courses(records: &[CourseRecord], limit: usize) -> Vec<&CourseRecord> {
    let mut ranked: Vec<&CourseRecord> = records.iter().collect();
    ranked.sort_by(|a, b| {
        b.grade_points
            .partial_cmp(&a.grade_points)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.credits
                    .partial_cmp(&a.credits)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}

/// Renders a markdown transcript summary. `active` is the cohort the stats
/// cover; `all` feeds the semester trend, which applies its own filter.
pub fn build_report(
    scope: Option<&str>,
    method: GradingMethod,
    generated_on: NaiveDate,
    active: &[CourseRecord],
    all: &[CourseRecord],
) -> String {
    let summary = stats::aggregate(active);
    let trend = stats::trend(all);

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all semesters");

    let _ = writeln!(output, "# GPA Report");
    let _ = writeln!(
        output,
        "Generated on {} for {} using the {} scale",
        generated_on,
        scope_label,
        method.label()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Weighted GPA: {:.3}", summary.weighted_gpa);
    let _ = writeln!(
        output,
        "- Required-course GPA: {:.3} over {} credits",
        summary.compulsory_weighted_gpa, summary.compulsory_credits
    );
    let _ = writeln!(
        output,
        "- Weighted average score: {:.2}",
        summary.weighted_average_score
    );
    let _ = writeln!(
        output,
        "- {} courses, {} credits",
        summary.course_count, summary.total_credits
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Score Distribution");
    let _ = writeln!(output, "| Band | Courses |");
    let _ = writeln!(output, "|------|---------|");
    for band in summary.score_distribution.iter() {
        let _ = writeln!(output, "| {} | {} |", band.name, band.value);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Semester Trend");

    if trend.is_empty() {
        let _ = writeln!(output, "No active courses recorded.");
    } else {
        for point in trend.iter() {
            let _ = writeln!(
                output,
                "- {}: GPA {:.3} across {} credits",
                point.semester, point.gpa, point.credits
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Strongest Courses");

    let best = top_courses(active, 5);
    if best.is_empty() {
        let _ = writeln!(output, "No active courses recorded.");
    } else {
        for course in best {
            let _ = writeln!(
                output,
                "- {} ({}, {}): score {} / {:.2} points, {} credits",
                course.name,
                course.semester,
                course.category,
                course.score,
                course.grade_points,
                course.credits
            );
        }
    }

    output
}
