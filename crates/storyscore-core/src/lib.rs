//! # storyscore-core
//!
//! Deterministic quality scoring for agile backlogs.
//!
//! Every issue is scored against a fixed six-criterion rubric, and the scores
//! are rolled up into one quality profile per project:
//! - Is the story written as a story, with real content?
//! - Are the acceptance criteria a verifiable list?
//! - Is the work owned, split, and attached to an epic?
//! - Does the project keep a prioritized backlog?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same issues always produce the same report
//! 2. **Total**: Scoring never fails; bad input scores 0 with an observation
//! 3. **Explained**: Every description and criteria score carries its reasons
//! 4. **Parallel-safe**: Issues are scored independently
//!
//! ## Example
//!
//! ```rust,ignore
//! use storyscore_core::{load_issues_file, RunConfig, StoryScorer};
//!
//! let config = RunConfig::from_file("storyscore.yaml")?;
//! let issues = load_issues_file("issues.json")?;
//! let report = StoryScorer::from_config(&config).evaluate_backlog(&issues, &config.projects);
//!
//! for summary in &report.summaries {
//!     println!("{}: {:.1} ({})", summary.project_key, summary.total, summary.classification);
//! }
//! ```

pub mod aggregator;
pub mod config;
pub mod criteria;
pub mod engine;
pub mod explainer;
pub mod intake;
pub mod linguistic;
pub mod text;
pub mod types;

// Re-export main types at crate root
pub use aggregator::{
    Aggregation, Classification, ClassificationBand, ProjectAggregator, CLASSIFICATION_BANDS,
};
pub use config::{ConfigError, RunConfig, TaggerConfig};
pub use criteria::{
    AcceptanceCriteriaEvaluator, Criterion, CriterionInfo, DescriptionEvaluator, Evaluator,
    RubricEvaluator, CRITERIA_TABLE,
};
pub use engine::{BacklogReport, StoryScorer};
pub use explainer::ObservationExplainer;
pub use intake::{load_issues_file, load_issues_json, load_issues_yaml, IntakeError, RawIssue};
pub use linguistic::{FeatureExtractor, HeuristicTagger, PartOfSpeech, PosTagger, TaggerError};
pub use types::{
    CriterionMeans, IdleProject, Issue, IssueError, ProjectRef, ProjectSummary, ScoreRecord,
};

use chrono::{DateTime, Utc};

/// Score and aggregate issues with the default scorer.
///
/// This uses the current system time for `generated_at`. For reproducible
/// reports use [`evaluate_backlog_at`].
pub fn evaluate_backlog(issues: &[Issue], roster: &[ProjectRef]) -> BacklogReport {
    StoryScorer::default().evaluate_backlog(issues, roster)
}

/// Score and aggregate issues with an explicit timestamp.
///
/// Fully deterministic: same inputs always produce the same report.
pub fn evaluate_backlog_at(
    issues: &[Issue],
    roster: &[ProjectRef],
    generated_at: DateTime<Utc>,
) -> BacklogReport {
    StoryScorer::default().evaluate_backlog_at(issues, roster, generated_at)
}
