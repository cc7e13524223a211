//! Engine: scores a batch of issues and rolls them up per project.
//!
//! ```text
//! issues ──► score_issue (per issue, parallel) ──► ScoreRecord*
//!                                                     │
//!                                   barrier ◄─────────┘
//!                                      │
//!                          ProjectAggregator ──► ProjectSummary*
//! ```

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::aggregator::{
    Classification, ClassificationBand, ProjectAggregator, CLASSIFICATION_BANDS,
};
use crate::config::RunConfig;
use crate::criteria::{
    score_assignee, score_epic, score_subtasks, CriterionInfo, RubricEvaluator, CRITERIA_TABLE,
};
use crate::explainer::{criteria_reasons, description_reasons, join_reasons};
use crate::linguistic::FeatureExtractor;
use crate::types::{IdleProject, Issue, ProjectRef, ProjectSummary, ScoreRecord};

/// Everything a report writer needs from one run.
#[derive(Debug, Clone, Serialize)]
pub struct BacklogReport {
    pub generated_at: DateTime<Utc>,

    /// One record per input issue, in input order
    pub records: Vec<ScoreRecord>,

    /// One summary per project, ordered by project key
    pub summaries: Vec<ProjectSummary>,

    pub idle_projects: Vec<IdleProject>,

    pub classification_bands: &'static [ClassificationBand],

    pub criteria: &'static [CriterionInfo],
}

impl BacklogReport {
    /// Summaries classified below `threshold`.
    pub fn below(&self, threshold: Classification) -> Vec<&ProjectSummary> {
        self.summaries
            .iter()
            .filter(|s| !s.classification.at_least(threshold))
            .collect()
    }

    /// Whether every project reached `threshold`.
    pub fn meets(&self, threshold: Classification) -> bool {
        self.below(threshold).is_empty()
    }
}

/// Scores issues against the rubric and aggregates the results.
#[derive(Debug, Clone)]
pub struct StoryScorer {
    rubric: RubricEvaluator,
    aggregator: ProjectAggregator,
    parallel: bool,
}

impl StoryScorer {
    pub fn new(features: FeatureExtractor) -> Self {
        Self {
            rubric: RubricEvaluator::new(features),
            aggregator: ProjectAggregator::new(),
            parallel: true,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.feature_extractor()).with_parallel(config.parallel)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn rubric(&self) -> &RubricEvaluator {
        &self.rubric
    }

    /// Score C1..C5 for one issue and explain C1 and C2.
    ///
    /// Each text field is analyzed once; the score and the observation are
    /// both derived from that single analysis.
    pub fn score_issue(&self, issue: &Issue) -> ScoreRecord {
        let description = self
            .rubric
            .description_signals(issue.description.as_deref());
        let criteria = self
            .rubric
            .criteria_signals(issue.acceptance_criteria.as_deref());

        let description_score = description.score();
        let criteria_score = criteria.score();

        let record = ScoreRecord {
            project_key: issue.project_key().to_string(),
            issue_key: issue.key.clone(),
            description: description_score,
            acceptance_criteria: criteria_score,
            assignee: score_assignee(issue.assignee.as_deref()),
            subtasks: score_subtasks(issue.subtask_count),
            epic: score_epic(issue.epic_summary.as_deref()),
            description_observation: join_reasons(description_reasons(
                &description,
                description_score,
            )),
            criteria_observation: join_reasons(criteria_reasons(&criteria, criteria_score)),
        };

        tracing::debug!(
            issue = %record.issue_key,
            subtotal = record.subtotal(),
            "scored issue"
        );
        record
    }

    /// Score every issue. Records come back in input order.
    pub fn score_batch(&self, issues: &[Issue]) -> Vec<ScoreRecord> {
        if self.parallel {
            issues.par_iter().map(|i| self.score_issue(i)).collect()
        } else {
            issues.iter().map(|i| self.score_issue(i)).collect()
        }
    }

    /// Score and aggregate a batch, stamped with the current time.
    ///
    /// For reproducible reports use [`StoryScorer::evaluate_backlog_at`].
    pub fn evaluate_backlog(&self, issues: &[Issue], roster: &[ProjectRef]) -> BacklogReport {
        self.evaluate_backlog_at(issues, roster, Utc::now())
    }

    /// Score and aggregate a batch with an explicit timestamp.
    ///
    /// Fully deterministic: same inputs always produce the same report.
    pub fn evaluate_backlog_at(
        &self,
        issues: &[Issue],
        roster: &[ProjectRef],
        generated_at: DateTime<Utc>,
    ) -> BacklogReport {
        let records = self.score_batch(issues);
        let aggregation = self.aggregator.aggregate(issues.iter().zip(&records), roster);

        BacklogReport {
            generated_at,
            records,
            summaries: aggregation.summaries,
            idle_projects: aggregation.idle_projects,
            classification_bands: &CLASSIFICATION_BANDS,
            criteria: &CRITERIA_TABLE,
        }
    }
}

impl Default for StoryScorer {
    fn default() -> Self {
        Self::new(FeatureExtractor::default())
    }
}
