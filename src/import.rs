use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{CourseCategory, CourseRecord, UNKNOWN_SEMESTER};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("backup must be a JSON array of courses")]
    NotAnArray,
    #[error("course #{index} is missing a name or numeric score")]
    InvalidRecord { index: usize },
    #[error("unsupported file extension for {0} (expected .csv or .json)")]
    UnsupportedFormat(String),
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    credits: f64,
    score: f64,
    semester: Option<String>,
    category: Option<String>,
    active: Option<bool>,
    core: Option<bool>,
}

impl From<CsvRow> for CourseRecord {
    fn from(row: CsvRow) -> Self {
        let semester = row
            .semester
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| UNKNOWN_SEMESTER.to_string());

        CourseRecord {
            id: Uuid::new_v4(),
            name: row.name.trim().to_string(),
            credits: row.credits,
            score: row.score,
            grade_points: 0.0,
            active: row.active.unwrap_or(true),
            semester,
            category: row
                .category
                .map(|value| CourseCategory::parse(&value))
                .unwrap_or_default(),
            core: row.core.unwrap_or(false),
        }
    }
}

/// Reads courses from CSV with a `name,credits,score,...` header.
/// Grade points are left at zero for the course book to fill in.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<CourseRecord>, ImportError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut courses = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        courses.push(CourseRecord::from(result?));
    }

    debug!(count = courses.len(), "parsed csv courses");
    Ok(courses)
}

/// Reads a JSON backup: an array of course objects.
pub fn parse_json(input: &str) -> Result<Vec<CourseRecord>, ImportError> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    let items = value.as_array().ok_or(ImportError::NotAnArray)?;

    let mut courses = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let has_name = item
            .get("name")
            .and_then(|name| name.as_str())
            .is_some_and(|name| !name.is_empty());
        let has_score = item.get("score").is_some_and(|score| score.is_number());
        if !has_name || !has_score {
            return Err(ImportError::InvalidRecord { index });
        }
        courses.push(serde_json::from_value::<CourseRecord>(item.clone())?);
    }

    debug!(count = courses.len(), "parsed json backup");
    Ok(courses)
}

/// Loads courses from a `.csv` or `.json` file.
pub fn load_courses(path: &Path) -> Result<Vec<CourseRecord>, ImportError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let io_error = |source: std::io::Error| ImportError::Io {
        path: path.display().to_string(),
        source,
    };

    let courses = match extension.as_deref() {
        Some("csv") => parse_csv(std::fs::File::open(path).map_err(io_error)?)?,
        Some("json") => parse_json(&std::fs::read_to_string(path).map_err(io_error)?)?,
        _ => return Err(ImportError::UnsupportedFormat(path.display().to_string())),
    };

    info!(path = %path.display(), count = courses.len(), "loaded courses");
    Ok(courses)
}

/// Serialises courses into the pretty-printed JSON backup format.
pub fn export_json(courses: &[CourseRecord]) -> Result<String, ImportError> {
    Ok(serde_json::to_string_pretty(courses)?)
}

/// Demo transcript used by `gpa-tracker sample`.
pub fn sample_courses() -> Vec<CourseRecord> {
    let rows = [
        ("Advanced Mathematics A1", 5.5, 92.0, "2023-2024-1", CourseCategory::Required),
        ("Linear Algebra", 3.0, 88.0, "2023-2024-1", CourseCategory::Required),
        ("College English 1", 2.0, 81.0, "2023-2024-1", CourseCategory::Required),
        ("Physical Education 1", 1.0, 76.0, "2023-2024-1", CourseCategory::Required),
        ("Advanced Mathematics A2", 5.5, 85.0, "2023-2024-2", CourseCategory::Required),
        ("University Physics", 4.0, 79.0, "2023-2024-2", CourseCategory::Required),
        ("Introduction to Programming", 3.0, 95.0, "2023-2024-2", CourseCategory::Elective),
        ("Film Appreciation", 1.0, 90.0, "2023-2024-2", CourseCategory::FreeElective),
    ];

    rows.into_iter()
        .map(|(name, credits, score, semester, category)| CourseRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            credits,
            score,
            grade_points: 0.0,
            active: true,
            semester: semester.to_string(),
            category,
            core: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn csv_rows_fill_defaults() {
        let input = "name,credits,score,semester,category,active,core\n\
                     Calculus,5,91,2023-2024-1,必修,true,true\n\
                     Film Appreciation,1,88,,free-elective,,\n";
        let courses = parse_csv(input.as_bytes()).expect("valid csv");
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].category, CourseCategory::Required);
        assert!(courses[0].core);
        assert_eq!(courses[1].semester, UNKNOWN_SEMESTER);
        assert_eq!(courses[1].category, CourseCategory::FreeElective);
        assert!(courses[1].active);
        assert!(!courses[1].core);
    }

    #[test]
    fn csv_without_optional_columns_parses() {
        let input = "name,credits,score\nPhysics,4,77.5\n";
        let courses = parse_csv(input.as_bytes()).expect("valid csv");
        assert_eq!(courses[0].score, 77.5);
        assert_eq!(courses[0].category, CourseCategory::Required);
    }

    #[test]
    fn csv_with_bad_number_fails() {
        let input = "name,credits,score\nPhysics,four,77\n";
        assert!(matches!(parse_csv(input.as_bytes()), Err(ImportError::Csv(_))));
    }

    #[test]
    fn json_backup_accepts_original_field_names() {
        let input = r#"[
            {"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","name":"Calculus","credits":5,
             "score":91,"gpa":4.1,"isActive":false,"semester":"2023-2024-1","type":"选修"},
            {"name":"Physics","score":80}
        ]"#;
        let courses = parse_json(input).expect("valid backup");
        assert_eq!(courses.len(), 2);
        assert!(!courses[0].active);
        assert_eq!(courses[0].category, CourseCategory::Elective);
        assert_eq!(
            courses[0].id,
            Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").expect("uuid")
        );
        assert!(courses[1].active);
        assert_eq!(courses[1].semester, UNKNOWN_SEMESTER);
        assert_eq!(courses[1].credits, 0.0);
    }

    #[test]
    fn json_backup_replaces_legacy_ids() {
        let input = r#"[
            {"id":"1712345678901","name":"高等数学","credits":5,"score":91,"gpa":4.1,
             "isActive":true,"semester":"2023-2024-1","type":"必修"},
            {"id":"","name":"大学物理","credits":4,"score":79},
            {"id":1712345678902,"name":"线性代数","credits":3,"score":88},
            {"id":null,"name":"体育(1)","credits":1,"score":76}
        ]"#;
        let courses = parse_json(input).expect("legacy backup loads");
        assert_eq!(courses.len(), 4);
        assert_eq!(courses[0].category, CourseCategory::Required);
        assert_eq!(courses[0].credits, 5.0);
        let ids: std::collections::HashSet<Uuid> = courses.iter().map(|course| course.id).collect();
        assert_eq!(ids.len(), 4);
        assert!(courses.iter().all(|course| !course.id.is_nil()));
    }

    #[test]
    fn json_backup_must_be_an_array() {
        assert!(matches!(parse_json(r#"{"name":"x"}"#), Err(ImportError::NotAnArray)));
        assert!(matches!(parse_json("not json"), Err(ImportError::Json(_))));
    }

    #[test]
    fn json_backup_rejects_records_without_score() {
        let input = r#"[{"name":"Calculus","score":90},{"name":"Physics","score":"high"}]"#;
        assert!(matches!(
            parse_json(input),
            Err(ImportError::InvalidRecord { index: 1 })
        ));
        assert!(matches!(
            parse_json(r#"[{"name":"","score":90}]"#),
            Err(ImportError::InvalidRecord { index: 0 })
        ));
    }

    #[test]
    fn export_then_load_from_disk() {
        let courses = sample_courses();
        let json = export_json(&courses).expect("serialises");
        assert!(json.contains("\"isActive\": true"));
        assert!(json.contains("\"type\": \"任选\""));
        assert!(json.contains("\"type\": \"必修\""));

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("backup.json");
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(json.as_bytes()).expect("write");

        let loaded = load_courses(&path).expect("loads");
        assert_eq!(loaded, courses);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let path = Path::new("courses.xlsx");
        assert!(matches!(
            load_courses(path),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_courses(Path::new("/nonexistent/courses.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/courses.csv"));
    }
}
