//! Core data model: issues in, score records and project summaries out.
//!
//! Issues are normalized at the intake boundary and never mutated during a
//! run. Score records and summaries are derived values with no identity of
//! their own; recomputing them from the same issues yields the same values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregator::Classification;
use crate::criteria::Criterion;

/// Errors raised when building an [`Issue`] by hand.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssueError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Project identity as reported by the tracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProjectRef {
    /// Tracker project key (e.g. "TBVNS")
    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub category: String,

    /// Project lead display name, given as a name or a user object
    #[serde(default, alias = "lead", deserialize_with = "crate::intake::person_name")]
    pub owner: String,
}

impl ProjectRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }
}

/// One backlog item under evaluation.
///
/// Deserialization goes through [`crate::intake::RawIssue`], so tracker shape
/// variance (object vs. string assignee, list vs. count subtasks, ...) is
/// resolved before an `Issue` exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "crate::intake::RawIssue")]
pub struct Issue {
    pub project: ProjectRef,

    /// Issue key (e.g. "TBVNS-42")
    pub key: String,

    pub summary: String,

    /// Point-in-time status label
    pub status: String,

    pub description: Option<String>,

    pub acceptance_criteria: Option<String>,

    /// Summary of the parent epic
    pub epic_summary: Option<String>,

    /// Assignee display name
    pub assignee: Option<String>,

    pub subtask_count: u32,
}

impl Issue {
    /// Create an issue with only the identifying fields set.
    ///
    /// Fails when the project key or the issue key is blank.
    pub fn new(
        project: ProjectRef,
        key: impl Into<String>,
        summary: impl Into<String>,
        status: impl Into<String>,
    ) -> Result<Self, IssueError> {
        if project.key.trim().is_empty() {
            return Err(IssueError::MissingField("project.key"));
        }
        let key = key.into();
        if key.trim().is_empty() {
            return Err(IssueError::MissingField("key"));
        }

        Ok(Self {
            project,
            key,
            summary: summary.into(),
            status: status.into(),
            description: None,
            acceptance_criteria: None,
            epic_summary: None,
            assignee: None,
            subtask_count: 0,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_acceptance_criteria(mut self, criteria: impl Into<String>) -> Self {
        self.acceptance_criteria = Some(criteria.into());
        self
    }

    pub fn with_epic(mut self, epic_summary: impl Into<String>) -> Self {
        self.epic_summary = Some(epic_summary.into());
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_subtasks(mut self, count: u32) -> Self {
        self.subtask_count = count;
        self
    }

    pub fn project_key(&self) -> &str {
        &self.project.key
    }
}

/// Scoring result for one issue.
///
/// Every score is either 0 or the criterion weight. C6 is project-level and
/// has no per-issue score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreRecord {
    pub project_key: String,
    pub issue_key: String,

    /// C1
    pub description: u32,

    /// C2
    pub acceptance_criteria: u32,

    /// C3
    pub assignee: u32,

    /// C4
    pub subtasks: u32,

    /// C5
    pub epic: u32,

    /// Why C1 scored what it scored
    pub description_observation: String,

    /// Why C2 scored what it scored
    pub criteria_observation: String,
}

impl ScoreRecord {
    /// Per-issue score for a criterion. `None` for the project-level C6.
    pub fn score(&self, criterion: Criterion) -> Option<u32> {
        match criterion {
            Criterion::Description => Some(self.description),
            Criterion::AcceptanceCriteria => Some(self.acceptance_criteria),
            Criterion::Assignee => Some(self.assignee),
            Criterion::Subtasks => Some(self.subtasks),
            Criterion::Epic => Some(self.epic),
            Criterion::BacklogPriority => None,
        }
    }

    /// Sum of C1..C5.
    pub fn subtotal(&self) -> u32 {
        self.description + self.acceptance_criteria + self.assignee + self.subtasks + self.epic
    }
}

/// Mean of each per-issue criterion across a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct CriterionMeans {
    pub description: f64,
    pub acceptance_criteria: f64,
    pub assignee: f64,
    pub subtasks: f64,
    pub epic: f64,
}

impl CriterionMeans {
    pub fn sum(&self) -> f64 {
        self.description + self.acceptance_criteria + self.assignee + self.subtasks + self.epic
    }
}

/// Aggregate quality profile for one project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectSummary {
    pub project_key: String,
    pub project_name: String,
    pub project_owner: String,

    /// Issues that contributed to the means
    pub issues_analyzed: usize,

    /// C1..C5 means
    pub means: CriterionMeans,

    /// C6: the full weight or 0, never averaged
    pub backlog_priority: u32,

    /// Sum of the five means plus C6, in [0, 100]
    pub total: f64,

    pub classification: Classification,
}

/// A project from the roster that had no issues in the analyzed batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdleProject {
    pub project: ProjectRef,
    pub message: String,
}
