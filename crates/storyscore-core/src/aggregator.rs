//! Aggregator: folds per-issue score records into project summaries.
//!
//! For each project:
//! 1. C1..C5 are averaged over every issue of the project (zeros included)
//! 2. C6 is the full weight if any issue is in the "backlog priorizado" status
//! 3. Total = sum of the five means + C6
//! 4. The total maps to exactly one classification band
//!
//! The fold is a barrier: it only runs once every issue has been scored.
//! Groups are kept in a `BTreeMap`, so summaries come out ordered by project
//! key regardless of input order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::criteria::Criterion;
use crate::types::{CriterionMeans, IdleProject, Issue, ProjectRef, ProjectSummary, ScoreRecord};

/// Status label that earns C6, compared case-insensitively.
pub const BACKLOG_PRIORITY_STATUS: &str = "backlog priorizado";

/// Message attached to roster projects with no issues in the batch.
pub const NO_ISSUES_MESSAGE: &str = "Proyecto no tiene historias actualizadas en este periodo.";

/// Quality tier of a project total.
///
/// Serializes as its label; deserializes through [`FromStr`], so any case works.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String")]
pub enum Classification {
    Excelente,
    Adecuado,
    #[serde(rename = "Por mejorar")]
    PorMejorar,
    Incompleto,
    Desastre,
}

impl Classification {
    /// All classifications, best first.
    pub const ALL: [Classification; 5] = [
        Classification::Excelente,
        Classification::Adecuado,
        Classification::PorMejorar,
        Classification::Incompleto,
        Classification::Desastre,
    ];

    /// Map a total in [0, 100] to its band. Lower bounds are inclusive.
    pub fn from_total(total: f64) -> Self {
        if total >= 90.0 {
            Classification::Excelente
        } else if total >= 80.0 {
            Classification::Adecuado
        } else if total >= 65.0 {
            Classification::PorMejorar
        } else if total >= 50.0 {
            Classification::Incompleto
        } else {
            Classification::Desastre
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Classification::Excelente => "Excelente",
            Classification::Adecuado => "Adecuado",
            Classification::PorMejorar => "Por mejorar",
            Classification::Incompleto => "Incompleto",
            Classification::Desastre => "Desastre",
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Classification::Excelente => "Totalmente clara y estructurada",
            Classification::Adecuado => "Aceptable pero con oportunidad de mejora",
            Classification::PorMejorar => "Le falta información importante",
            Classification::Incompleto => "Le falta información importante",
            Classification::Desastre => "Necesita ser reformulada completamente",
        }
    }

    /// Inclusive lower bound of the band.
    pub const fn min_total(&self) -> u32 {
        match self {
            Classification::Excelente => 90,
            Classification::Adecuado => 80,
            Classification::PorMejorar => 65,
            Classification::Incompleto => 50,
            Classification::Desastre => 0,
        }
    }

    /// Whether this band is at least as good as `other`.
    pub fn at_least(&self, other: Classification) -> bool {
        self <= &other
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Classification {
    type Err = String;

    /// Accepts the label in any case, with a space, hyphen or underscore in
    /// "por mejorar".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        Classification::ALL
            .into_iter()
            .find(|c| c.label().to_lowercase() == normalized)
            .ok_or_else(|| {
                format!(
                    "Unknown classification '{}'. Expected one of: {}",
                    s,
                    Classification::ALL.map(|c| c.label()).join(", ")
                )
            })
    }
}

impl TryFrom<String> for Classification {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One row of the classification-band reference table.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ClassificationBand {
    /// Display range, e.g. "80-89"
    pub range: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

impl ClassificationBand {
    const fn of(range: &'static str, classification: Classification) -> Self {
        Self {
            range,
            label: classification.label(),
            description: classification.description(),
        }
    }
}

/// Band → label → description lookup for report writers.
pub const CLASSIFICATION_BANDS: [ClassificationBand; 5] = [
    ClassificationBand::of("90-100", Classification::Excelente),
    ClassificationBand::of("80-89", Classification::Adecuado),
    ClassificationBand::of("65-79", Classification::PorMejorar),
    ClassificationBand::of("50-64", Classification::Incompleto),
    ClassificationBand::of("0-49", Classification::Desastre),
];

/// Whether a status label marks a prioritized backlog.
pub fn is_backlog_priority_status(status: &str) -> bool {
    status.trim().to_lowercase() == BACKLOG_PRIORITY_STATUS
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Aggregation {
    /// One summary per project with at least one issue, ordered by key
    pub summaries: Vec<ProjectSummary>,

    /// Roster projects with no issues, in roster order
    pub idle_projects: Vec<IdleProject>,
}

#[derive(Default)]
struct ProjectAccumulator<'a> {
    project: Option<&'a ProjectRef>,
    issues: usize,
    sums: [u32; 5],
    backlog_flag: bool,
}

impl<'a> ProjectAccumulator<'a> {
    fn add(&mut self, issue: &'a Issue, record: &ScoreRecord) {
        if self.project.is_none() {
            self.project = Some(&issue.project);
        }
        self.issues += 1;

        let scores = [
            record.description,
            record.acceptance_criteria,
            record.assignee,
            record.subtasks,
            record.epic,
        ];
        for (sum, score) in self.sums.iter_mut().zip(scores) {
            *sum += score;
        }

        self.backlog_flag |= is_backlog_priority_status(&issue.status);
    }

    fn finish(self, project_key: String) -> ProjectSummary {
        let n = self.issues.max(1) as f64;
        let mean = |i: usize| self.sums[i] as f64 / n;
        let means = CriterionMeans {
            description: mean(0),
            acceptance_criteria: mean(1),
            assignee: mean(2),
            subtasks: mean(3),
            epic: mean(4),
        };

        let backlog_priority = Criterion::BacklogPriority.award(self.backlog_flag);
        let total = means.sum() + backlog_priority as f64;
        let (project_name, project_owner) = self
            .project
            .map(|p| (p.name.clone(), p.owner.clone()))
            .unwrap_or_default();

        ProjectSummary {
            project_key,
            project_name,
            project_owner,
            issues_analyzed: self.issues,
            means,
            backlog_priority,
            total,
            classification: Classification::from_total(total),
        }
    }
}

/// Folds (issue, score record) pairs into per-project summaries.
///
/// Stateless: aggregating the same pairs twice yields identical summaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectAggregator;

impl ProjectAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate scored issues by project.
    ///
    /// `roster` lists the projects expected in the period. Roster entries
    /// that received no issues are returned as [`IdleProject`]s; issues from
    /// projects outside the roster are still summarized.
    pub fn aggregate<'a, I>(&self, pairs: I, roster: &[ProjectRef]) -> Aggregation
    where
        I: IntoIterator<Item = (&'a Issue, &'a ScoreRecord)>,
    {
        let mut groups: BTreeMap<String, ProjectAccumulator<'a>> = BTreeMap::new();
        for (issue, record) in pairs {
            groups
                .entry(issue.project_key().to_string())
                .or_default()
                .add(issue, record);
        }

        let idle_projects: Vec<IdleProject> = roster
            .iter()
            .filter(|p| !groups.contains_key(&p.key))
            .map(|p| IdleProject {
                project: p.clone(),
                message: NO_ISSUES_MESSAGE.to_string(),
            })
            .collect();

        let summaries: Vec<ProjectSummary> = groups
            .into_iter()
            .map(|(key, acc)| acc.finish(key))
            .collect();

        tracing::info!(
            projects = summaries.len(),
            idle = idle_projects.len(),
            "aggregated backlog"
        );

        Aggregation {
            summaries,
            idle_projects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(project: &str, key: &str, status: &str) -> Issue {
        Issue::new(
            ProjectRef::new(project).with_name("Banca Digital").with_owner("Luis Gómez"),
            key,
            "Historia",
            status,
        )
        .unwrap()
    }

    fn record(issue: &Issue, scores: [u32; 5]) -> ScoreRecord {
        ScoreRecord {
            project_key: issue.project_key().to_string(),
            issue_key: issue.key.clone(),
            description: scores[0],
            acceptance_criteria: scores[1],
            assignee: scores[2],
            subtasks: scores[3],
            epic: scores[4],
            description_observation: String::new(),
            criteria_observation: String::new(),
        }
    }

    #[test]
    fn test_half_complete_project_is_incompleto() {
        let full = issue("TBVNS", "TBVNS-1", "Backlog Priorizado");
        let empty = issue("TBVNS", "TBVNS-2", "En curso");
        let records = [record(&full, [20, 20, 15, 20, 10]), record(&empty, [0; 5])];

        let aggregation = ProjectAggregator::new().aggregate(
            [(&full, &records[0]), (&empty, &records[1])],
            &[],
        );

        assert_eq!(aggregation.summaries.len(), 1);
        let summary = &aggregation.summaries[0];
        assert_eq!(
            summary.means,
            CriterionMeans {
                description: 10.0,
                acceptance_criteria: 10.0,
                assignee: 7.5,
                subtasks: 10.0,
                epic: 5.0,
            }
        );
        assert_eq!(summary.backlog_priority, 15);
        assert_eq!(summary.total, 57.5);
        assert_eq!(summary.classification, Classification::Incompleto);
        assert_eq!(summary.issues_analyzed, 2);
        assert_eq!(summary.project_name, "Banca Digital");
        assert_eq!(summary.project_owner, "Luis Gómez");
    }

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(Classification::from_total(100.0), Classification::Excelente);
        assert_eq!(Classification::from_total(90.0), Classification::Excelente);
        assert_eq!(Classification::from_total(89.999), Classification::Adecuado);
        assert_eq!(Classification::from_total(80.0), Classification::Adecuado);
        assert_eq!(Classification::from_total(79.999), Classification::PorMejorar);
        assert_eq!(Classification::from_total(65.0), Classification::PorMejorar);
        assert_eq!(Classification::from_total(64.999), Classification::Incompleto);
        assert_eq!(Classification::from_total(50.0), Classification::Incompleto);
        assert_eq!(Classification::from_total(49.999), Classification::Desastre);
        assert_eq!(Classification::from_total(0.0), Classification::Desastre);
    }

    #[test]
    fn test_bands_agree_with_from_total() {
        for (band, classification) in CLASSIFICATION_BANDS.iter().zip(Classification::ALL) {
            assert_eq!(band.label, classification.label());
            assert_eq!(
                Classification::from_total(classification.min_total() as f64),
                classification
            );
        }
    }

    #[test]
    fn test_backlog_status_is_case_insensitive_exact() {
        assert!(is_backlog_priority_status("BACKLOG PRIORIZADO"));
        assert!(is_backlog_priority_status("backlog priorizado"));
        assert!(!is_backlog_priority_status("Backlog"));
        assert!(!is_backlog_priority_status("Backlog priorizado 2"));
    }

    #[test]
    fn test_backlog_flag_is_not_averaged() {
        let a = issue("TBVNS", "TBVNS-1", "backlog priorizado");
        let b = issue("TBVNS", "TBVNS-2", "Done");
        let c = issue("TBVNS", "TBVNS-3", "Done");
        let records = [record(&a, [0; 5]), record(&b, [0; 5]), record(&c, [0; 5])];

        let aggregation = ProjectAggregator::new()
            .aggregate([&a, &b, &c].into_iter().zip(records.iter()), &[]);

        assert_eq!(aggregation.summaries[0].backlog_priority, 15);
        assert_eq!(aggregation.summaries[0].total, 15.0);
        assert_eq!(aggregation.summaries[0].classification, Classification::Desastre);
    }

    #[test]
    fn test_summaries_ordered_by_project_key() {
        let z = issue("ZETA", "ZETA-1", "Done");
        let a = issue("ALFA", "ALFA-1", "Done");
        let records = [record(&z, [20; 5]), record(&a, [0; 5])];

        let aggregation =
            ProjectAggregator::new().aggregate([(&z, &records[0]), (&a, &records[1])], &[]);

        let keys: Vec<_> = aggregation
            .summaries
            .iter()
            .map(|s| s.project_key.as_str())
            .collect();
        assert_eq!(keys, vec!["ALFA", "ZETA"]);
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let a = issue("TBVNS", "TBVNS-1", "Backlog Priorizado");
        let b = issue("OPS", "OPS-1", "Done");
        let records = [record(&a, [20, 0, 15, 0, 10]), record(&b, [0, 20, 0, 20, 0])];
        let pairs = [(&a, &records[0]), (&b, &records[1])];

        let aggregator = ProjectAggregator::new();
        assert_eq!(aggregator.aggregate(pairs, &[]), aggregator.aggregate(pairs, &[]));
    }

    #[test]
    fn test_roster_projects_without_issues_are_idle() {
        let a = issue("TBVNS", "TBVNS-1", "Done");
        let records = [record(&a, [20; 5])];
        let roster = [
            ProjectRef::new("TBVNS"),
            ProjectRef::new("OPS").with_name("Operaciones"),
        ];

        let aggregation = ProjectAggregator::new().aggregate([(&a, &records[0])], &roster);

        assert_eq!(aggregation.summaries.len(), 1);
        assert_eq!(aggregation.idle_projects.len(), 1);
        assert_eq!(aggregation.idle_projects[0].project.key, "OPS");
        assert_eq!(aggregation.idle_projects[0].message, NO_ISSUES_MESSAGE);
    }

    #[test]
    fn test_classification_from_str() {
        assert_eq!("excelente".parse::<Classification>(), Ok(Classification::Excelente));
        assert_eq!("Por mejorar".parse::<Classification>(), Ok(Classification::PorMejorar));
        assert_eq!("por-mejorar".parse::<Classification>(), Ok(Classification::PorMejorar));
        assert!("regular".parse::<Classification>().is_err());
    }

    #[test]
    fn test_classification_serde_uses_label() {
        let json = serde_json::to_string(&Classification::PorMejorar).unwrap();
        assert_eq!(json, r#""Por mejorar""#);

        let parsed: Classification = serde_json::from_str(r#""POR_MEJORAR""#).unwrap();
        assert_eq!(parsed, Classification::PorMejorar);
        assert!(serde_json::from_str::<Classification>(r#""regular""#).is_err());
    }

    #[test]
    fn test_at_least_orders_best_first() {
        assert!(Classification::Excelente.at_least(Classification::Adecuado));
        assert!(Classification::Incompleto.at_least(Classification::Incompleto));
        assert!(!Classification::Desastre.at_least(Classification::Incompleto));
    }
}
