//! Input boundary: tracker exports in, typed [`Issue`]s out.
//!
//! Trackers disagree on field shapes. Assignees come as a name or as a user
//! object, epics as a summary or a parent issue, subtasks as a count or as
//! the list itself. [`RawIssue`] accepts all of them and [`Issue::try_from`]
//! flattens them into plain values, so no evaluator ever sees tracker schema.
//!
//! Accepted layouts, in JSON or YAML:
//!
//! ```text
//! [ {issue}, ... ]
//! { "issues": [ {issue}, ... ] }
//! {issue} = { "key": ..., "project": {...}, ... }
//!         | { "key": ..., "fields": { "project": {...}, ... } }
//! ```

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::types::{Issue, IssueError, ProjectRef};

/// Errors that can occur when loading issues.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Failed to read issues file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Issue #{index}: missing required field: {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("Issue #{index}: {message}")]
    InvalidIssue { index: usize, message: String },

    #[error("Expected a list of issues or an object with an \"issues\" list")]
    UnexpectedLayout,

    #[error("Unsupported issues file format: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
}

/// A name, or a user object carrying one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PersonField {
    Name(String),
    User {
        #[serde(default, rename = "displayName", alias = "display_name", alias = "name")]
        display_name: Option<String>,
    },
}

impl PersonField {
    fn into_name(self) -> Option<String> {
        match self {
            PersonField::Name(name) => Some(name),
            PersonField::User { display_name } => display_name,
        }
    }
}

/// Read a [`PersonField`] as a plain name. Null or a nameless object gives "".
pub(crate) fn person_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let person = Option::<PersonField>::deserialize(deserializer)?;
    Ok(person.and_then(PersonField::into_name).unwrap_or_default())
}

/// A status label, or a status object carrying one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatusField {
    Name(String),
    Status {
        #[serde(default)]
        name: Option<String>,
    },
}

impl StatusField {
    fn into_name(self) -> Option<String> {
        match self {
            StatusField::Name(name) => Some(name),
            StatusField::Status { name } => name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParentFields {
    #[serde(default)]
    pub summary: Option<String>,
}

/// An epic summary, or the parent issue it comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EpicField {
    Summary(String),
    Parent {
        #[serde(default)]
        summary: Option<String>,
        #[serde(default)]
        fields: Option<ParentFields>,
    },
}

impl EpicField {
    fn into_summary(self) -> Option<String> {
        match self {
            EpicField::Summary(summary) => Some(summary),
            EpicField::Parent { summary, fields } => {
                summary.or_else(|| fields.and_then(|f| f.summary))
            }
        }
    }
}

/// Free text, or a list of lines.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextField {
    Text(String),
    Lines(Vec<String>),
}

impl TextField {
    fn into_text(self) -> String {
        match self {
            TextField::Text(text) => text,
            TextField::Lines(lines) => lines.join("\n"),
        }
    }
}

/// A subtask count, its string form, or the subtask list itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubtaskField {
    Count(i64),
    Fractional(f64),
    Text(String),
    List(Vec<IgnoredAny>),
}

impl SubtaskField {
    /// Normalize to a count. Anything that is not a whole number counts as 0.
    fn into_count(self, issue_key: &str) -> u32 {
        match self {
            SubtaskField::Count(n) => clamp_count(n),
            SubtaskField::Fractional(f) if f.fract() == 0.0 && f.is_finite() => {
                clamp_count(f as i64)
            }
            SubtaskField::Fractional(f) => {
                tracing::warn!(issue = issue_key, value = f, "non-integer subtask count, using 0");
                0
            }
            SubtaskField::Text(raw) => match raw.trim().parse::<i64>() {
                Ok(n) => clamp_count(n),
                Err(_) => {
                    tracing::warn!(issue = issue_key, value = %raw, "unparsable subtask count, using 0");
                    0
                }
            },
            SubtaskField::List(items) => u32::try_from(items.len()).unwrap_or(u32::MAX),
        }
    }
}

fn clamp_count(n: i64) -> u32 {
    u32::try_from(n.max(0)).unwrap_or(u32::MAX)
}

/// One issue as a tracker exports it.
///
/// Every field except `key` and `project.key` is optional. Fields may also
/// sit under a nested `fields` object, REST-style; top-level values win.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIssue {
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub project: Option<ProjectRef>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub status: Option<StatusField>,

    #[serde(default)]
    pub description: Option<TextField>,

    #[serde(
        default,
        alias = "acceptanceCriteria",
        alias = "criteria",
        alias = "criterios"
    )]
    pub acceptance_criteria: Option<TextField>,

    #[serde(default, alias = "epic_summary", alias = "parent")]
    pub epic: Option<EpicField>,

    #[serde(default)]
    pub assignee: Option<PersonField>,

    #[serde(
        default,
        alias = "subtask_count",
        alias = "subtaskCount",
        alias = "subtareas"
    )]
    pub subtasks: Option<SubtaskField>,

    #[serde(default)]
    pub fields: Option<Box<RawIssue>>,
}

impl RawIssue {
    /// Pull values up from a nested `fields` object where the top level has none.
    fn flatten(mut self) -> Self {
        if let Some(nested) = self.fields.take() {
            let nested = nested.flatten();
            self.key = self.key.or(nested.key);
            self.project = self.project.or(nested.project);
            self.summary = self.summary.or(nested.summary);
            self.status = self.status.or(nested.status);
            self.description = self.description.or(nested.description);
            self.acceptance_criteria = self.acceptance_criteria.or(nested.acceptance_criteria);
            self.epic = self.epic.or(nested.epic);
            self.assignee = self.assignee.or(nested.assignee);
            self.subtasks = self.subtasks.or(nested.subtasks);
        }
        self
    }
}

impl TryFrom<RawIssue> for Issue {
    type Error = IssueError;

    fn try_from(raw: RawIssue) -> Result<Self, Self::Error> {
        let raw = raw.flatten();
        let key = raw.key.unwrap_or_default();
        let subtask_count = raw
            .subtasks
            .map(|s| s.into_count(&key))
            .unwrap_or_default();

        let mut issue = Issue::new(
            raw.project.unwrap_or_default(),
            key,
            raw.summary.unwrap_or_default(),
            raw.status.and_then(StatusField::into_name).unwrap_or_default(),
        )?;

        issue.description = raw.description.map(TextField::into_text);
        issue.acceptance_criteria = raw.acceptance_criteria.map(TextField::into_text);
        issue.epic_summary = raw.epic.and_then(EpicField::into_summary);
        issue.assignee = raw.assignee.and_then(PersonField::into_name);
        issue.subtask_count = subtask_count;
        Ok(issue)
    }
}

fn into_issues(raws: Vec<RawIssue>) -> Result<Vec<Issue>, IntakeError> {
    let issues = raws
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            Issue::try_from(raw).map_err(|e| match e {
                IssueError::MissingField(field) => IntakeError::MissingField { index, field },
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(count = issues.len(), "loaded issues");
    Ok(issues)
}

/// Load issues from a JSON document.
///
/// Records are decoded one by one so a bad field is reported with its
/// issue index and the underlying serde message.
pub fn load_issues_json(json: &str) -> Result<Vec<Issue>, IntakeError> {
    let records = match serde_json::from_str::<serde_json::Value>(json)? {
        serde_json::Value::Array(records) => records,
        serde_json::Value::Object(mut map) => match map.remove("issues") {
            Some(serde_json::Value::Array(records)) => records,
            _ => return Err(IntakeError::UnexpectedLayout),
        },
        _ => return Err(IntakeError::UnexpectedLayout),
    };

    let raws = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value::<RawIssue>(record).map_err(|e| IntakeError::InvalidIssue {
                index,
                message: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    into_issues(raws)
}

/// Load issues from a YAML document.
pub fn load_issues_yaml(yaml: &str) -> Result<Vec<Issue>, IntakeError> {
    let records = match serde_yaml::from_str::<serde_yaml::Value>(yaml)? {
        serde_yaml::Value::Sequence(records) => records,
        serde_yaml::Value::Mapping(mut map) => match map.remove("issues") {
            Some(serde_yaml::Value::Sequence(records)) => records,
            _ => return Err(IntakeError::UnexpectedLayout),
        },
        _ => return Err(IntakeError::UnexpectedLayout),
    };

    let raws = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_yaml::from_value::<RawIssue>(record).map_err(|e| IntakeError::InvalidIssue {
                index,
                message: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    into_issues(raws)
}

/// Load issues from a file, choosing the format by extension.
pub fn load_issues_file(path: impl AsRef<Path>) -> Result<Vec<Issue>, IntakeError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => load_issues_json(&fs::read_to_string(path)?),
        "yaml" | "yml" => load_issues_yaml(&fs::read_to_string(path)?),
        _ => Err(IntakeError::UnsupportedFormat(path.display().to_string())),
    }
}
