//! C3, C4 and C5: presence checks on plain fields.

use crate::types::Issue;

use super::{Criterion, Evaluator};

/// C3: full weight for any non-blank assignee name.
pub fn score_assignee<'a>(name: impl Into<Option<&'a str>>) -> u32 {
    Criterion::Assignee.award(is_present(name.into()))
}

/// C4: full weight when the story is split into more than one subtask.
pub fn score_subtasks(count: u32) -> u32 {
    Criterion::Subtasks.award(count > 1)
}

/// C4 for an untyped count as some trackers export it.
///
/// Anything that does not parse as an integer scores 0.
pub fn score_subtasks_raw(raw: &str) -> u32 {
    match raw.trim().parse::<i64>() {
        Ok(count) => Criterion::Subtasks.award(count > 1),
        Err(e) => {
            tracing::debug!(raw, error = %e, "unparsable subtask count");
            0
        }
    }
}

/// C5: full weight when the story hangs from an epic.
pub fn score_epic<'a>(parent_summary: impl Into<Option<&'a str>>) -> u32 {
    Criterion::Epic.award(is_present(parent_summary.into()))
}

fn is_present(value: Option<&str>) -> bool {
    value.map(|v| !v.trim().is_empty()).unwrap_or(false)
}

/// The C3 evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssigneeEvaluator;

impl Evaluator for AssigneeEvaluator {
    fn criterion(&self) -> Criterion {
        Criterion::Assignee
    }

    fn score(&self, issue: &Issue) -> u32 {
        score_assignee(issue.assignee.as_deref())
    }
}

/// The C4 evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubtasksEvaluator;

impl Evaluator for SubtasksEvaluator {
    fn criterion(&self) -> Criterion {
        Criterion::Subtasks
    }

    fn score(&self, issue: &Issue) -> u32 {
        score_subtasks(issue.subtask_count)
    }
}

/// The C5 evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpicEvaluator;

impl Evaluator for EpicEvaluator {
    fn criterion(&self) -> Criterion {
        Criterion::Epic
    }

    fn score(&self, issue: &Issue) -> u32 {
        score_epic(issue.epic_summary.as_deref())
    }
}
