use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};

use gpa_tracker::book::{CourseBook, ViewFilter};
use gpa_tracker::models::GradingMethod;
use gpa_tracker::planning::{self, GraduationRequirements};
use gpa_tracker::scenario::{self, ScenarioOptions};
use gpa_tracker::{grading, import, report, telemetry, validate};

#[derive(Parser)]
#[command(name = "gpa-tracker")]
#[command(about = "Track course results and compute weighted GPA statistics", long_about = None)]
struct Cli {
    /// Grading scale: subtractive, linear, wes, std-4.0, formula-4.0, scale-4.5
    #[arg(long, global = true, env = "GPA_METHOD", default_value = "subtractive")]
    method: String,
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, env = "GPA_LOG_LEVEL", default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Course file (.csv or .json backup)
    #[arg(long)]
    input: PathBuf,
    /// Only include these semesters (repeatable)
    #[arg(long = "semester")]
    semesters: Vec<String>,
    /// Only include courses whose name contains this text
    #[arg(long)]
    search: Option<String>,
}

impl InputArgs {
    fn filter(&self) -> ViewFilter {
        ViewFilter {
            semesters: self.semesters.iter().cloned().collect::<BTreeSet<_>>(),
            search: self.search.clone().unwrap_or_default(),
        }
    }

    fn scope(&self) -> Option<String> {
        if self.semesters.is_empty() {
            None
        } else {
            Some(self.semesters.join(", "))
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single score to grade points
    Convert {
        #[arg(long, allow_hyphen_values = true)]
        score: f64,
        /// Show the result under every grading scale
        #[arg(long)]
        all: bool,
    },
    /// Write a demo transcript as a JSON backup
    Sample {
        #[arg(long, default_value = "courses.json")]
        out: PathBuf,
    },
    /// Weighted GPA, average score and score distribution
    Stats {
        #[command(flatten)]
        input: InputArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Per-semester GPA trend
    Trend {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        json: bool,
    },
    /// GPA needed over the remaining credits to reach a target
    Target {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        target: f64,
        #[arg(long, default_value_t = 20.0)]
        remaining: f64,
    },
    /// Credit progress towards graduation
    Progress {
        #[command(flatten)]
        input: InputArgs,
        /// JSON file with total/compulsory/elective/optional credit requirements
        #[arg(long)]
        requirements: Option<PathBuf>,
    },
    /// Statistics for an application scenario
    Scenario {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        exclude_pe: bool,
        #[arg(long)]
        exclude_politics: bool,
        #[arg(long)]
        exclude_free_electives: bool,
        #[arg(long)]
        core_only: bool,
        /// Re-grade included courses on the WES scale
        #[arg(long)]
        wes: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export courses as a JSON backup
    Export {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "backup.json")]
        out: PathBuf,
    },
}

fn load_book(path: &Path, method: GradingMethod) -> anyhow::Result<CourseBook> {
    let courses = import::load_courses(path)
        .with_context(|| format!("failed to load courses from {}", path.display()))?;

    for issue in validate::validate(&courses) {
        warn!(%issue, "suspicious course record");
    }

    Ok(CourseBook::with_courses(method, courses))
}

fn load_requirements(path: Option<&Path>) -> anyhow::Result<GraduationRequirements> {
    let Some(path) = path else {
        return Ok(GraduationRequirements::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read requirements from {}", path.display()))?;
    serde_json::from_str(&raw).context("requirements must be a JSON object of credit counts")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level).context("failed to initialise logging")?;
    let method = GradingMethod::from_name_or_default(&cli.method);
    debug!(%method, "resolved grading method");

    match cli.command {
        Commands::Convert { score, all } => {
            let methods: Vec<GradingMethod> = if all {
                GradingMethod::ALL.to_vec()
            } else {
                vec![method]
            };
            for method in methods {
                println!("{}: {:.2}", method.label(), grading::convert(score, method));
            }
        }
        Commands::Sample { out } => {
            let courses = import::sample_courses();
            std::fs::write(&out, import::export_json(&courses)?)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Wrote {} sample courses to {}.", courses.len(), out.display());
        }
        Commands::Stats { input, json } => {
            let book = load_book(&input.input, method)?;
            let stats = book.stats(&input.filter());

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }

            println!("Grading scale: {}", method.label());
            println!(
                "Weighted GPA {:.3} across {} courses ({} credits)",
                stats.weighted_gpa, stats.course_count, stats.total_credits
            );
            println!(
                "Required-course GPA {:.3} ({} credits)",
                stats.compulsory_weighted_gpa, stats.compulsory_credits
            );
            println!("Weighted average score {:.2}", stats.weighted_average_score);
            for band in stats.score_distribution.iter() {
                println!("- {}: {}", band.name, band.value);
            }
        }
        Commands::Trend { input, json } => {
            let book = load_book(&input.input, method)?;
            let points = book.trend(&input.filter());

            if json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else if points.is_empty() {
                println!("No active courses found.");
            } else {
                for point in points.iter() {
                    println!(
                        "- {}: GPA {:.3} across {} credits",
                        point.semester, point.gpa, point.credits
                    );
                }
            }
        }
        Commands::Target {
            input,
            target,
            remaining,
        } => {
            let book = load_book(&input.input, method)?;
            let stats = book.stats(&input.filter());
            match planning::plan_target(stats.weighted_gpa, stats.total_credits, target, remaining) {
                Some(plan) => println!(
                    "Need GPA {:.3} (about {:.1} per course) over {} credits: {:?}",
                    plan.required_gpa, plan.required_score, remaining, plan.status
                ),
                None => println!("Remaining credits must be a positive number."),
            }
        }
        Commands::Progress {
            input,
            requirements,
        } => {
            let requirements = load_requirements(requirements.as_deref())?;
            let book = load_book(&input.input, method)?;
            let progress = planning::graduation_progress(&book.visible(&input.filter()), &requirements);

            println!(
                "{:.1}% complete: {} of {} credits",
                progress.percent_complete, progress.total.earned, progress.total.required
            );
            for (label, bucket) in [
                ("required", progress.compulsory),
                ("elective", progress.elective),
                ("free-elective", progress.optional),
            ] {
                println!(
                    "- {}: {} of {} ({} remaining)",
                    label, bucket.earned, bucket.required, bucket.remaining
                );
            }
            println!(
                "Averaging {:.1} credits per semester, about {} semesters left",
                progress.average_credits_per_semester, progress.semesters_left
            );
        }
        Commands::Scenario {
            input,
            exclude_pe,
            exclude_politics,
            exclude_free_electives,
            core_only,
            wes,
        } => {
            let book = load_book(&input.input, method)?;
            let options = ScenarioOptions {
                exclude_physical_education: exclude_pe,
                exclude_politics,
                exclude_free_electives,
                core_only,
                wes_override: wes,
            };
            let outcome = scenario::evaluate(&book.visible(&input.filter()), &options);
            println!(
                "Scenario GPA {:.3} over {} courses ({} excluded)",
                outcome.scenario.weighted_gpa, outcome.included, outcome.excluded
            );
            println!(
                "Baseline GPA {:.3}, change {:+.3}",
                outcome.baseline.weighted_gpa, outcome.gpa_delta
            );
        }
        Commands::Report { input, out } => {
            let book = load_book(&input.input, method)?;
            let filter = input.filter();
            let report = report::build_report(
                input.scope().as_deref(),
                method,
                chrono::Local::now().date_naive(),
                &book.active_visible(&filter),
                &book.visible(&filter),
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { input, out } => {
            let book = load_book(&input.input, method)?;
            let courses = book.visible(&input.filter());
            std::fs::write(&out, import::export_json(&courses)?)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Exported {} courses to {}.", courses.len(), out.display());
        }
    }

    Ok(())
}
