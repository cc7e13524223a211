//! The per-issue half of the rubric as one unit.

use crate::linguistic::FeatureExtractor;
use crate::types::Issue;

use super::{
    AcceptanceCriteriaEvaluator, AssigneeEvaluator, CriteriaSignals, Criterion,
    DescriptionEvaluator, DescriptionSignals, EpicEvaluator, Evaluator, SubtasksEvaluator,
};

/// C1..C5 evaluators sharing one [`FeatureExtractor`].
///
/// Evaluators run independently; none sees another's result.
#[derive(Debug, Clone)]
pub struct RubricEvaluator {
    description: DescriptionEvaluator,
    criteria: AcceptanceCriteriaEvaluator,
    assignee: AssigneeEvaluator,
    subtasks: SubtasksEvaluator,
    epic: EpicEvaluator,
}

impl RubricEvaluator {
    pub fn new(features: FeatureExtractor) -> Self {
        Self {
            description: DescriptionEvaluator::new(features.clone()),
            criteria: AcceptanceCriteriaEvaluator::new(features),
            assignee: AssigneeEvaluator,
            subtasks: SubtasksEvaluator,
            epic: EpicEvaluator,
        }
    }

    pub fn description_signals(&self, text: Option<&str>) -> DescriptionSignals {
        self.description.signals(text)
    }

    pub fn score_description(&self, text: Option<&str>) -> u32 {
        self.description.score_text(text)
    }

    pub fn criteria_signals(&self, text: Option<&str>) -> CriteriaSignals {
        self.criteria.signals(text)
    }

    pub fn score_criteria(&self, text: Option<&str>) -> u32 {
        self.criteria.score_text(text)
    }

    /// The per-issue evaluators in rubric order.
    pub fn evaluators(&self) -> [&dyn Evaluator; 5] {
        [
            &self.description,
            &self.criteria,
            &self.assignee,
            &self.subtasks,
            &self.epic,
        ]
    }

    /// Score one criterion. `None` for the project-level C6.
    pub fn score(&self, criterion: Criterion, issue: &Issue) -> Option<u32> {
        self.evaluators()
            .into_iter()
            .find(|e| e.criterion() == criterion)
            .map(|e| e.score(issue))
    }
}

impl Default for RubricEvaluator {
    fn default() -> Self {
        Self::new(FeatureExtractor::default())
    }
}
