//! storyscore CLI
//!
//! Command-line interface for backlog quality scoring.
//!
//! ## Usage
//!
//! ```bash
//! # Score an exported backlog
//! storyscore evaluate --issues issues.json
//!
//! # With a project roster and per-issue observations
//! storyscore evaluate --issues issues.yaml --config storyscore.yaml --explain
//!
//! # JSON report, reproducible timestamp, quality gate
//! storyscore evaluate --issues issues.json --format json \
//!     --generated-at 2025-01-31T00:00:00Z --fail-below adecuado
//!
//! # Check a single description from stdin
//! echo "Como cliente quiero pagar en línea para ahorrar tiempo" | storyscore inspect --field description
//!
//! # Print the rubric and classification bands
//! storyscore rubric
//! ```
//!
//! ## Exit Codes
//!
//! - 0: OK
//! - 1: A project is below the quality gate
//! - 3: Error

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use storyscore_core::criteria::RubricEvaluator;
use storyscore_core::explainer::{criteria_reasons, description_reasons, join_reasons};
use storyscore_core::{
    load_issues_file, BacklogReport, Classification, Criterion, FeatureExtractor, RunConfig,
    StoryScorer, CLASSIFICATION_BANDS, CRITERIA_TABLE,
};

/// storyscore: quality scoring for agile backlogs
#[derive(Parser)]
#[command(name = "storyscore")]
#[command(version)]
#[command(about = "Score user stories against a fixed rubric and roll them up per project", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a batch of issues and aggregate per project
    Evaluate {
        /// Path to the exported issues (JSON or YAML)
        #[arg(short, long)]
        issues: PathBuf,

        /// Path to the run configuration (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Show per-issue scores and observations
        #[arg(long)]
        explain: bool,

        /// Score with whitelists only, without part-of-speech tagging
        #[arg(long)]
        no_tagger: bool,

        /// Explicit timestamp for a reproducible report (ISO 8601 / RFC 3339).
        /// Example: --generated-at 2025-01-31T00:00:00Z
        #[arg(long, value_parser = parse_datetime)]
        generated_at: Option<DateTime<Utc>>,

        /// Exit with code 1 if any project is classified below this band
        #[arg(long, value_parser = parse_classification)]
        fail_below: Option<Classification>,
    },

    /// Print the rubric and the classification bands
    Rubric {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Score and explain a single text field
    Inspect {
        /// Which rubric field the text is
        #[arg(long)]
        field: Field,

        /// File containing the text (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Score with whitelists only, without part-of-speech tagging
        #[arg(long)]
        no_tagger: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Field {
    Description,
    Criteria,
}

/// Parse ISO 8601 / RFC 3339 datetime string to DateTime<Utc>.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid datetime format: {}. Expected ISO 8601/RFC 3339 (e.g., 2025-01-31T00:00:00Z)", e))
}

fn parse_classification(s: &str) -> Result<Classification, String> {
    s.parse()
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(3)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            issues,
            config,
            format,
            explain,
            no_tagger,
            generated_at,
            fail_below,
        } => evaluate_command(issues, config, format, explain, no_tagger, generated_at, fail_below),

        Commands::Rubric { format } => rubric_command(format),

        Commands::Inspect {
            field,
            input,
            no_tagger,
        } => inspect_command(field, input, no_tagger),
    }
}

fn evaluate_command(
    issues_path: PathBuf,
    config_path: Option<PathBuf>,
    format: OutputFormat,
    explain: bool,
    no_tagger: bool,
    generated_at: Option<DateTime<Utc>>,
    fail_below: Option<Classification>,
) -> Result<ExitCode> {
    let mut config = match &config_path {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => RunConfig::default(),
    };
    if no_tagger {
        config.tagger.enabled = false;
    }

    let issues = load_issues_file(&issues_path)
        .with_context(|| format!("Failed to load issues from {:?}", issues_path))?;

    let scorer = StoryScorer::from_config(&config);
    let report = match generated_at {
        Some(timestamp) => scorer.evaluate_backlog_at(&issues, &config.projects, timestamp),
        None => scorer.evaluate_backlog(&issues, &config.projects),
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            print_text_report(&report, explain);
        }
    }

    // The flag overrides the configured gate
    let Some(threshold) = fail_below.or(config.fail_below) else {
        return Ok(ExitCode::from(0));
    };

    let below = report.below(threshold);
    if below.is_empty() {
        return Ok(ExitCode::from(0));
    }

    for summary in below {
        eprintln!(
            "{} is {} ({:.1}), below {}",
            summary.project_key, summary.classification, summary.total, threshold
        );
    }
    Ok(ExitCode::from(1))
}

fn print_text_report(report: &BacklogReport, explain: bool) {
    println!("BACKLOG QUALITY REPORT");
    println!("Generated: {}", report.generated_at.to_rfc3339());
    println!();

    if report.summaries.is_empty() {
        println!("No issues analyzed.");
    } else {
        println!(
            "{:<12} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>4} {:>7}  {}",
            "Project", "Issues", "C1", "C2", "C3", "C4", "C5", "C6", "Total", "Classification"
        );
        for s in &report.summaries {
            println!(
                "{:<12} {:>6} {:>6.1} {:>6.1} {:>6.1} {:>6.1} {:>6.1} {:>4} {:>7.1}  {}",
                s.project_key,
                s.issues_analyzed,
                s.means.description,
                s.means.acceptance_criteria,
                s.means.assignee,
                s.means.subtasks,
                s.means.epic,
                s.backlog_priority,
                s.total,
                s.classification
            );
        }
    }

    if !report.idle_projects.is_empty() {
        println!();
        for idle in &report.idle_projects {
            println!("{}: {}", idle.project.key, idle.message);
        }
    }

    if explain {
        println!();
        println!("--- Issue Scores ---");
        println!();

        for record in &report.records {
            println!(
                "{} [{}]: C1={} C2={} C3={} C4={} C5={} ({})",
                record.issue_key,
                record.project_key,
                record.description,
                record.acceptance_criteria,
                record.assignee,
                record.subtasks,
                record.epic,
                record.subtotal()
            );
            println!("  Descripción: {}", record.description_observation);
            println!("  Criterios: {}", record.criteria_observation);
        }
    }
}

fn rubric_command(format: OutputFormat) -> Result<ExitCode> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "criteria": CRITERIA_TABLE,
                "classification_bands": CLASSIFICATION_BANDS,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Criteria:");
            for row in &CRITERIA_TABLE {
                println!("  {}  {:<12} {:<28} {:>3}", row.code, row.label, row.description, row.weight);
            }
            println!();
            println!("Classification:");
            for band in &CLASSIFICATION_BANDS {
                println!("  {:<7} {:<12} {}", band.range, band.label, band.description);
            }
        }
    }

    Ok(ExitCode::from(0))
}

fn inspect_command(field: Field, input: Option<PathBuf>, no_tagger: bool) -> Result<ExitCode> {
    let text = match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input from {:?}", path))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        }
    };

    let features = if no_tagger {
        FeatureExtractor::without_tagger()
    } else {
        FeatureExtractor::heuristic()
    };
    let rubric = RubricEvaluator::new(features);

    let (criterion, score, observation) = match field {
        Field::Description => {
            let signals = rubric.description_signals(Some(text.as_str()));
            let score = signals.score();
            println!("Words: {}", signals.word_count);
            let reasons = description_reasons(&signals, score);
            (Criterion::Description, score, join_reasons(reasons))
        }
        Field::Criteria => {
            let signals = rubric.criteria_signals(Some(text.as_str()));
            let score = signals.score();
            println!(
                "List items: {}, paragraphs: {}, lines: {}",
                signals.list_items, signals.paragraphs, signals.plain_lines
            );
            let reasons = criteria_reasons(&signals, score);
            (Criterion::AcceptanceCriteria, score, join_reasons(reasons))
        }
    };

    println!("{} {}: {}/{}", criterion.code(), criterion.label(), score, criterion.weight());
    println!("Observation: {}", observation);

    Ok(ExitCode::from(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime() {
        let dt = parse_datetime("2025-01-31T12:00:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-31T10:00:00+00:00");
        assert!(parse_datetime("31/01/2025").is_err());
    }

    #[test]
    fn test_parse_classification() {
        assert_eq!(parse_classification("adecuado"), Ok(Classification::Adecuado));
        assert_eq!(parse_classification("por_mejorar"), Ok(Classification::PorMejorar));
        assert!(parse_classification("bueno").is_err());
    }

    #[test]
    fn test_cli_parses_evaluate() {
        let cli = Cli::try_parse_from([
            "storyscore",
            "evaluate",
            "--issues",
            "issues.json",
            "--format",
            "json",
            "--fail-below",
            "incompleto",
        ])
        .unwrap();

        match cli.command {
            Commands::Evaluate {
                issues, fail_below, ..
            } => {
                assert_eq!(issues, PathBuf::from("issues.json"));
                assert_eq!(fail_below, Some(Classification::Incompleto));
            }
            _ => panic!("expected evaluate"),
        }
    }
}
