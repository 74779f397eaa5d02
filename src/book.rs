use std::collections::{BTreeSet, HashSet};

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::grading;
use crate::models::{CohortStats, CourseDraft, CourseRecord, GradingMethod, SemesterTrendPoint};
use crate::stats;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookError {
    #[error("no course with id {0}")]
    NotFound(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Replace,
    Merge,
}

/// Which courses are visible: semester membership and a name search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub semesters: BTreeSet<String>,
    pub search: String,
}

impl ViewFilter {
    pub fn is_empty(&self) -> bool {
        self.semesters.is_empty() && self.search.trim().is_empty()
    }

    pub fn matches(&self, record: &CourseRecord) -> bool {
        let semester_ok = self.semesters.is_empty() || self.semesters.contains(&record.semester);
        let needle = self.search.trim().to_lowercase();
        let search_ok = needle.is_empty() || record.name.to_lowercase().contains(&needle);
        semester_ok && search_ok
    }
}

/// Owned list of courses plus the grading method their points were computed with.
#[derive(Debug, Clone, Default)]
pub struct CourseBook {
    method: GradingMethod,
    courses: Vec<CourseRecord>,
}

impl CourseBook {
    pub fn new(method: GradingMethod) -> Self {
        Self {
            method,
            courses: Vec::new(),
        }
    }

    pub fn with_courses(method: GradingMethod, courses: Vec<CourseRecord>) -> Self {
        let mut book = Self::new(method);
        book.import(courses, ImportMode::Replace);
        book
    }

    pub fn method(&self) -> GradingMethod {
        self.method
    }

    pub fn courses(&self) -> &[CourseRecord] {
        &self.courses
    }

    pub fn get(&self, id: Uuid) -> Option<&CourseRecord> {
        self.courses.iter().find(|course| course.id == id)
    }

    pub fn add(&mut self, draft: CourseDraft) -> Uuid {
        let id = Uuid::new_v4();
        let grade_points = grading::convert(draft.score, self.method);
        debug!(%id, name = %draft.name, grade_points, "adding course");
        self.courses.push(CourseRecord {
            id,
            name: draft.name,
            credits: draft.credits,
            score: draft.score,
            grade_points,
            active: true,
            semester: draft.semester,
            category: draft.category,
            core: false,
        });
        id
    }

    pub fn update(&mut self, id: Uuid, draft: CourseDraft) -> Result<(), BookError> {
        let method = self.method;
        let course = self.find_mut(id)?;
        course.grade_points = grading::convert(draft.score, method);
        course.name = draft.name;
        course.credits = draft.credits;
        course.score = draft.score;
        course.semester = draft.semester;
        course.category = draft.category;
        Ok(())
    }

    pub fn remove(&mut self, id: Uuid) -> Result<CourseRecord, BookError> {
        let index = self
            .courses
            .iter()
            .position(|course| course.id == id)
            .ok_or(BookError::NotFound(id))?;
        Ok(self.courses.remove(index))
    }

    /// Flips a course's active flag and returns the new value.
    pub fn toggle(&mut self, id: Uuid) -> Result<bool, BookError> {
        let course = self.find_mut(id)?;
        course.active = !course.active;
        Ok(course.active)
    }

    pub fn set_core(&mut self, id: Uuid, core: bool) -> Result<(), BookError> {
        self.find_mut(id)?.core = core;
        Ok(())
    }

    /// Activates or deactivates every visible course; with an empty filter
    /// that is every course in the book.
    pub fn set_all_active(&mut self, filter: &ViewFilter, active: bool) -> usize {
        let mut changed = 0;
        for course in self.courses.iter_mut() {
            if filter.is_empty() || filter.matches(course) {
                course.active = active;
                changed += 1;
            }
        }
        changed
    }

    /// Switches grading method, recomputing grade points for every course.
    pub fn set_method(&mut self, method: GradingMethod) {
        if method != self.method {
            info!(from = %self.method, to = %method, "switching grading method");
        }
        self.method = method;
        for course in self.courses.iter_mut() {
            course.grade_points = grading::convert(course.score, method);
        }
    }

    pub fn import(&mut self, records: Vec<CourseRecord>, mode: ImportMode) -> usize {
        let method = self.method;
        let mut seen: HashSet<Uuid> = HashSet::new();

        let incoming: Vec<CourseRecord> = records
            .into_iter()
            .map(|mut record| {
                record.grade_points = grading::convert(record.score, method);
                if mode == ImportMode::Merge || !seen.insert(record.id) {
                    record.id = Uuid::new_v4();
                }
                record
            })
            .collect();

        let count = incoming.len();
        match mode {
            ImportMode::Replace => self.courses = incoming,
            ImportMode::Merge => self.courses.extend(incoming),
        }
        info!(count, ?mode, total = self.courses.len(), "imported courses");
        count
    }

    /// Distinct semester labels in lexicographic order.
    pub fn semesters(&self) -> Vec<String> {
        self.courses
            .iter()
            .map(|course| course.semester.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn visible(&self, filter: &ViewFilter) -> Vec<CourseRecord> {
        self.courses
            .iter()
            .filter(|course| filter.matches(course))
            .cloned()
            .collect()
    }

    pub fn active_visible(&self, filter: &ViewFilter) -> Vec<CourseRecord> {
        self.courses
            .iter()
            .filter(|course| course.active && filter.matches(course))
            .cloned()
            .collect()
    }

    pub fn stats(&self, filter: &ViewFilter) -> CohortStats {
        stats::aggregate(&self.active_visible(filter))
    }

    pub fn trend(&self, filter: &ViewFilter) -> Vec<SemesterTrendPoint> {
        stats::trend(&self.visible(filter))
    }

    fn find_mut(&mut self, id: Uuid) -> Result<&mut CourseRecord, BookError> {
        self.courses
            .iter_mut()
            .find(|course| course.id == id)
            .ok_or(BookError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseCategory;

    fn draft(name: &str, score: f64, credits: f64, semester: &str) -> CourseDraft {
        CourseDraft {
            name: name.to_string(),
            credits,
            score,
            semester: semester.to_string(),
            category: CourseCategory::Required,
        }
    }

    fn sample_book() -> (CourseBook, Uuid, Uuid) {
        let mut book = CourseBook::new(GradingMethod::Subtractive);
        let calculus = book.add(draft("Calculus", 90.0, 5.0, "2023-2024-1"));
        let english = book.add(draft("College English", 80.0, 2.0, "2023-2024-2"));
        (book, calculus, english)
    }

    #[test]
    fn add_converts_score_and_activates() {
        let (book, calculus, _) = sample_book();
        let course = book.get(calculus).expect("course exists");
        assert_eq!(course.grade_points, 4.0);
        assert!(course.active);
    }

    #[test]
    fn update_recomputes_grade_points() {
        let (mut book, calculus, _) = sample_book();
        book.update(calculus, draft("Calculus I", 70.0, 5.0, "2023-2024-1"))
            .expect("update succeeds");
        let course = book.get(calculus).expect("course exists");
        assert_eq!(course.name, "Calculus I");
        assert_eq!(course.grade_points, 2.0);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let (mut book, _, _) = sample_book();
        let missing = Uuid::new_v4();
        assert_eq!(book.toggle(missing), Err(BookError::NotFound(missing)));
        assert_eq!(book.remove(missing).unwrap_err(), BookError::NotFound(missing));
    }

    #[test]
    fn switching_method_recomputes_everything() {
        let (mut book, calculus, english) = sample_book();
        book.set_method(GradingMethod::Wes);
        assert_eq!(book.get(calculus).map(|c| c.grade_points), Some(5.0));
        assert_eq!(book.get(english).map(|c| c.grade_points), Some(4.0));
        assert_eq!(book.method(), GradingMethod::Wes);
    }

    #[test]
    fn stats_only_cover_active_visible_courses() {
        let (mut book, _, english) = sample_book();
        book.toggle(english).expect("toggle succeeds");
        let stats = book.stats(&ViewFilter::default());
        assert_eq!(stats.course_count, 1);
        assert_eq!(stats.weighted_gpa, 4.0);

        let filter = ViewFilter {
            semesters: BTreeSet::from(["2023-2024-2".to_string()]),
            search: String::new(),
        };
        assert_eq!(book.stats(&filter).course_count, 0);
        assert_eq!(book.visible(&filter).len(), 1);
    }

    #[test]
    fn search_is_case_insensitive() {
        let (book, _, _) = sample_book();
        let filter = ViewFilter {
            semesters: BTreeSet::new(),
            search: "  ENGLISH ".to_string(),
        };
        let visible = book.visible(&filter);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "College English");
    }

    #[test]
    fn bulk_toggle_respects_filter() {
        let (mut book, calculus, english) = sample_book();
        let filter = ViewFilter {
            semesters: BTreeSet::new(),
            search: "calc".to_string(),
        };
        assert_eq!(book.set_all_active(&filter, false), 1);
        assert_eq!(book.get(calculus).map(|c| c.active), Some(false));
        assert_eq!(book.get(english).map(|c| c.active), Some(true));

        assert_eq!(book.set_all_active(&ViewFilter::default(), false), 2);
        assert!(book.courses().iter().all(|c| !c.active));
    }

    #[test]
    fn merge_import_assigns_fresh_ids() {
        let (mut book, calculus, _) = sample_book();
        let duplicate = book.get(calculus).cloned().expect("course exists");
        let mut rescored = duplicate.clone();
        rescored.grade_points = 0.0;

        assert_eq!(book.import(vec![rescored], ImportMode::Merge), 1);
        assert_eq!(book.courses().len(), 3);
        let imported = &book.courses()[2];
        assert_ne!(imported.id, duplicate.id);
        assert_eq!(imported.grade_points, 4.0);
    }

    #[test]
    fn replace_import_swaps_the_list() {
        let (mut book, calculus, _) = sample_book();
        let kept = book.get(calculus).cloned().expect("course exists");
        assert_eq!(book.import(vec![kept.clone(), kept.clone()], ImportMode::Replace), 2);
        assert_eq!(book.courses().len(), 2);
        assert_eq!(book.courses()[0].id, kept.id);
        assert_ne!(book.courses()[1].id, kept.id);
    }

    #[test]
    fn core_flag_survives_method_switch() {
        let (mut book, calculus, _) = sample_book();
        book.set_core(calculus, true).expect("flag set");
        book.set_method(GradingMethod::Formula4);
        assert_eq!(book.get(calculus).map(|c| c.core), Some(true));
    }

    #[test]
    fn semesters_are_distinct_and_sorted() {
        let (mut book, _, _) = sample_book();
        book.add(draft("Physics", 85.0, 3.0, "2023-2024-1"));
        assert_eq!(book.semesters(), vec!["2023-2024-1", "2023-2024-2"]);
    }

    #[test]
    fn trend_uses_visible_courses() {
        let (mut book, _, english) = sample_book();
        book.toggle(english).expect("toggle succeeds");
        let points = book.trend(&ViewFilter::default());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].semester, "2023-2024-1");
    }
}
