use std::collections::BTreeMap;

use crate::grading::round_to;
use crate::models::{
    BandCount, CohortStats, CourseCategory, CourseRecord, ScoreBand, SemesterTrendPoint,
};

/// Credit total and weighted grade-point average of a set of records.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Weighted {
    pub credits: f64,
    pub gpa: f64,
}

pub fn weighted<'a, I>(records: I) -> Weighted
where
    I: IntoIterator<Item = &'a CourseRecord>,
{
    let (credits, points) = records
        .into_iter()
        .fold((0.0, 0.0), |(credits, points), record| {
            (credits + record.credits, points + record.grade_points * record.credits)
        });

    Weighted {
        credits,
        gpa: weighted_mean(points, credits, 3),
    }
}

fn weighted_mean(total: f64, credits: f64, places: i32) -> f64 {
    if credits > 0.0 {
        round_to(total / credits, places)
    } else {
        0.0
    }
}

/// Summarises a cohort. The caller decides which records belong to it;
/// no activity filtering happens here.
pub fn aggregate(records: &[CourseRecord]) -> CohortStats {
    let overall = weighted(records);
    let compulsory = weighted(
        records
            .iter()
            .filter(|record| record.category == CourseCategory::Required),
    );

    let score_points: f64 = records
        .iter()
        .map(|record| record.score * record.credits)
        .sum();

    CohortStats {
        total_credits: overall.credits,
        weighted_gpa: overall.gpa,
        weighted_average_score: weighted_mean(score_points, overall.credits, 2),
        course_count: records.len(),
        score_distribution: distribution(records),
        compulsory_credits: compulsory.credits,
        compulsory_weighted_gpa: compulsory.gpa,
    }
}

/// Counts records per score band, always emitting all five bands in order.
pub fn distribution(records: &[CourseRecord]) -> Vec<BandCount> {
    let mut counts = [0usize; 5];
    for record in records {
        counts[ScoreBand::of(record.score) as usize] += 1;
    }

    ScoreBand::ALL
        .iter()
        .zip(counts)
        .map(|(band, value)| BandCount {
            name: band.label().to_string(),
            value,
        })
        .collect()
}

/// Per-semester weighted GPA over active records, ordered by semester label.
pub fn trend(records: &[CourseRecord]) -> Vec<SemesterTrendPoint> {
    let mut grouped: BTreeMap<&str, Vec<&CourseRecord>> = BTreeMap::new();

    for record in records.iter().filter(|record| record.active) {
        grouped.entry(record.semester.as_str()).or_default().push(record);
    }

    grouped
        .into_iter()
        .map(|(semester, group)| {
            let summary = weighted(group);
            SemesterTrendPoint {
                semester: semester.to_string(),
                gpa: summary.gpa,
                credits: summary.credits,
            }
        })
        .collect()
}
