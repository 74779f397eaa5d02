//! Course-record GPA tracking: grade-point conversion under several grading
//! scales, credit-weighted cohort statistics, and the host-side tooling
//! (course book, planners, import/export, reports) built around them.

pub mod book;
pub mod grading;
pub mod import;
pub mod models;
pub mod planning;
pub mod report;
pub mod scenario;
pub mod stats;
pub mod telemetry;
pub mod validate;

pub use grading::convert;
pub use models::{CohortStats, CourseCategory, CourseRecord, GradingMethod, SemesterTrendPoint};
pub use stats::{aggregate, trend};
