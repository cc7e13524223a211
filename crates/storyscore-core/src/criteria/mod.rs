//! The six rubric criteria and their evaluators.
//!
//! Each evaluator scores one issue field independently and returns either 0
//! or the full criterion weight. No partial credit, no shared state.
//!
//! | Code | Criterion | Weight | Scope |
//! |------|-----------|--------|-------|
//! | C1 | Descripción | 20 | issue |
//! | C2 | Criterios de aceptación | 20 | issue |
//! | C3 | Asignatario | 15 | issue |
//! | C4 | Subtareas | 20 | issue |
//! | C5 | Épica | 10 | issue |
//! | C6 | Backlog priorizado | 15 | project (see [`crate::aggregator`]) |

mod acceptance;
mod description;
mod fields;
mod rubric;

pub use acceptance::{AcceptanceCriteriaEvaluator, CriteriaSignals};
pub use description::{DescriptionEvaluator, DescriptionSignals};
pub use fields::{
    score_assignee, score_epic, score_subtasks, score_subtasks_raw, AssigneeEvaluator,
    EpicEvaluator, SubtasksEvaluator,
};
pub use rubric::RubricEvaluator;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::Issue;

lazy_static! {
    /// Bullet and emphasis markers stripped before word counting and tagging.
    pub(crate) static ref BULLET_MARKERS: Regex = Regex::new(r"[*\-•]").unwrap();
}

/// A rubric criterion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Description,
    AcceptanceCriteria,
    Assignee,
    Subtasks,
    Epic,
    BacklogPriority,
}

impl Criterion {
    /// All criteria in rubric order.
    pub const ALL: [Criterion; 6] = [
        Criterion::Description,
        Criterion::AcceptanceCriteria,
        Criterion::Assignee,
        Criterion::Subtasks,
        Criterion::Epic,
        Criterion::BacklogPriority,
    ];

    pub const fn code(&self) -> &'static str {
        match self {
            Criterion::Description => "C1",
            Criterion::AcceptanceCriteria => "C2",
            Criterion::Assignee => "C3",
            Criterion::Subtasks => "C4",
            Criterion::Epic => "C5",
            Criterion::BacklogPriority => "C6",
        }
    }

    /// Column label used in reports.
    pub const fn label(&self) -> &'static str {
        match self {
            Criterion::Description => "Descripción",
            Criterion::AcceptanceCriteria => "Criterios",
            Criterion::Assignee => "Asignatario",
            Criterion::Subtasks => "Subtareas",
            Criterion::Epic => "Épica",
            Criterion::BacklogPriority => "Backlog",
        }
    }

    /// What the criterion checks.
    pub const fn description(&self) -> &'static str {
        match self {
            Criterion::Description => "Estructura+Verbo+Longitud",
            Criterion::AcceptanceCriteria => "Lista+Acción",
            Criterion::Assignee => "Asignatario",
            Criterion::Subtasks => "Subtareas",
            Criterion::Epic => "Épica",
            Criterion::BacklogPriority => "Backlog Priorizado",
        }
    }

    pub const fn weight(&self) -> u32 {
        match self {
            Criterion::Description => 20,
            Criterion::AcceptanceCriteria => 20,
            Criterion::Assignee => 15,
            Criterion::Subtasks => 20,
            Criterion::Epic => 10,
            Criterion::BacklogPriority => 15,
        }
    }

    /// Whether the criterion is scored per issue (C1..C5) or per project (C6).
    pub const fn is_project_level(&self) -> bool {
        matches!(self, Criterion::BacklogPriority)
    }

    /// 0 or the full weight.
    pub(crate) const fn award(&self, passed: bool) -> u32 {
        if passed {
            self.weight()
        } else {
            0
        }
    }
}

/// One row of the criterion-weight reference table.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CriterionInfo {
    pub code: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub weight: u32,
}

impl CriterionInfo {
    const fn of(criterion: Criterion) -> Self {
        Self {
            code: criterion.code(),
            label: criterion.label(),
            description: criterion.description(),
            weight: criterion.weight(),
        }
    }
}

/// Criterion-weight lookup for report writers.
pub const CRITERIA_TABLE: [CriterionInfo; 6] = [
    CriterionInfo::of(Criterion::Description),
    CriterionInfo::of(Criterion::AcceptanceCriteria),
    CriterionInfo::of(Criterion::Assignee),
    CriterionInfo::of(Criterion::Subtasks),
    CriterionInfo::of(Criterion::Epic),
    CriterionInfo::of(Criterion::BacklogPriority),
];

/// Trait implemented by every per-issue evaluator.
pub trait Evaluator: Send + Sync {
    /// The criterion this evaluator scores.
    fn criterion(&self) -> Criterion;

    fn weight(&self) -> u32 {
        self.criterion().weight()
    }

    /// Score one issue: 0 or [`Evaluator::weight`]. Never fails.
    fn score(&self, issue: &Issue) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one_hundred() {
        let total: u32 = Criterion::ALL.iter().map(|c| c.weight()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_table_matches_enum() {
        for (row, criterion) in CRITERIA_TABLE.iter().zip(Criterion::ALL) {
            assert_eq!(row.code, criterion.code());
            assert_eq!(row.weight, criterion.weight());
        }
        assert_eq!(CRITERIA_TABLE[5].description, "Backlog Priorizado");
    }

    #[test]
    fn test_only_backlog_is_project_level() {
        let project_level: Vec<_> = Criterion::ALL
            .iter()
            .filter(|c| c.is_project_level())
            .collect();
        assert_eq!(project_level, vec![&Criterion::BacklogPriority]);
    }

    #[test]
    fn test_award_is_all_or_nothing() {
        assert_eq!(Criterion::Epic.award(true), 10);
        assert_eq!(Criterion::Epic.award(false), 0);
    }
}
