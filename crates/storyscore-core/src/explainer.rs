//! Per-issue observations: why C1 and C2 scored what they scored.
//!
//! The explainer reads the same [`DescriptionSignals`] / [`CriteriaSignals`]
//! the evaluators score from, so an observation can never disagree with
//! its score.
//!
//! | Score | Output |
//! |-------|--------|
//! | > 0 | positive signals, e.g. `Estructura; Verbo NLP; Longitud OK` |
//! | 0 | concrete deficiencies, e.g. `Menos de 15 palabras; Sin verbo válido` |

use crate::criteria::{
    AcceptanceCriteriaEvaluator, CriteriaSignals, DescriptionEvaluator, DescriptionSignals,
};
use crate::linguistic::FeatureExtractor;
use crate::types::Issue;

/// Separator between reasons.
pub const REASON_SEPARATOR: &str = "; ";

/// A single observation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    // Positive signals
    Structure,
    TaggedVerb,
    WhitelistVerb,
    Noun,
    LengthOk,
    ListOk,

    // Deficiencies
    InvalidText,
    TooShort,
    NoStructure,
    NoVerb,
    NoList,
    NoAction,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Structure => "Estructura",
            Reason::TaggedVerb => "Verbo NLP",
            Reason::WhitelistVerb => "Verbo blanco",
            Reason::Noun => "Sustantivo",
            Reason::LengthOk => "Longitud OK",
            Reason::ListOk => "Lista OK",
            Reason::InvalidText => "Texto vacío o inválido",
            Reason::TooShort => "Menos de 15 palabras",
            Reason::NoStructure => "Sin estructura Como-Quiero-Para",
            Reason::NoVerb => "Sin verbo válido",
            Reason::NoList => "Sin lista válida",
            Reason::NoAction => "Sin verbo/acción clara",
        }
    }
}

/// Join reasons with `"; "`, dropping repeats and keeping first-seen order.
pub fn join_reasons(reasons: impl IntoIterator<Item = Reason>) -> String {
    let mut seen: Vec<Reason> = Vec::new();
    for reason in reasons {
        if !seen.contains(&reason) {
            seen.push(reason);
        }
    }
    seen.iter()
        .map(Reason::as_str)
        .collect::<Vec<_>>()
        .join(REASON_SEPARATOR)
}

/// Reasons behind a C1 score.
pub fn description_reasons(signals: &DescriptionSignals, score: u32) -> Vec<Reason> {
    let mut reasons = Vec::new();

    if score > 0 {
        if signals.structure {
            reasons.push(Reason::Structure);
        }
        if signals.tagged && signals.verb {
            reasons.push(Reason::TaggedVerb);
        }
        if signals.whitelist_verb {
            reasons.push(Reason::WhitelistVerb);
        }
        if signals.noun || signals.whitelist_noun {
            reasons.push(Reason::Noun);
        }
        if signals.length_ok() {
            reasons.push(Reason::LengthOk);
        }
        return reasons;
    }

    if !signals.valid {
        return vec![Reason::InvalidText];
    }
    if !signals.length_ok() {
        reasons.push(Reason::TooShort);
    }
    if !signals.structure {
        reasons.push(Reason::NoStructure);
    }
    if !signals.verb && !signals.whitelist_verb {
        reasons.push(Reason::NoVerb);
    }
    reasons
}

/// Reasons behind a C2 score.
///
/// A zero score reports only the first failing check, in order:
/// validity, list shape, action.
pub fn criteria_reasons(signals: &CriteriaSignals, score: u32) -> Vec<Reason> {
    if score > 0 {
        let mut reasons = Vec::new();
        if signals.list_like() {
            reasons.push(Reason::ListOk);
        }
        if signals.tagged && signals.verb {
            reasons.push(Reason::TaggedVerb);
        }
        if signals.whitelist_verb {
            reasons.push(Reason::WhitelistVerb);
        }
        if signals.whitelist_noun {
            reasons.push(Reason::Noun);
        }
        return reasons;
    }

    if !signals.valid {
        vec![Reason::InvalidText]
    } else if !signals.list_like() {
        vec![Reason::NoList]
    } else if !signals.action_like() {
        vec![Reason::NoAction]
    } else {
        Vec::new()
    }
}

/// Builds observation strings for issues.
#[derive(Debug, Clone)]
pub struct ObservationExplainer {
    description: DescriptionEvaluator,
    criteria: AcceptanceCriteriaEvaluator,
}

impl ObservationExplainer {
    pub fn new(features: FeatureExtractor) -> Self {
        Self {
            description: DescriptionEvaluator::new(features.clone()),
            criteria: AcceptanceCriteriaEvaluator::new(features),
        }
    }

    /// Explain the C1 `score` of `issue`.
    pub fn explain_description(&self, issue: &Issue, score: u32) -> String {
        let signals = self.description.signals(issue.description.as_deref());
        join_reasons(description_reasons(&signals, score))
    }

    /// Explain the C2 `score` of `issue`.
    pub fn explain_criteria(&self, issue: &Issue, score: u32) -> String {
        let signals = self.criteria.signals(issue.acceptance_criteria.as_deref());
        join_reasons(criteria_reasons(&signals, score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Evaluator;
    use crate::types::ProjectRef;

    fn issue() -> Issue {
        Issue::new(ProjectRef::new("TBVNS"), "TBVNS-7", "Perfil", "En curso").unwrap()
    }

    fn explainer() -> ObservationExplainer {
        ObservationExplainer::new(FeatureExtractor::heuristic())
    }

    #[test]
    fn test_join_reasons_dedups_in_order() {
        let joined = join_reasons([
            Reason::Structure,
            Reason::Noun,
            Reason::Structure,
            Reason::LengthOk,
            Reason::Noun,
        ]);
        assert_eq!(joined, "Estructura; Sustantivo; Longitud OK");
        assert_eq!(join_reasons(Vec::new()), "");
    }

    #[test]
    fn test_positive_description_lists_signals() {
        let issue = issue().with_description("Como usuario quiero ver mi perfil para editarlo");
        let score = DescriptionEvaluator::new(FeatureExtractor::heuristic()).score(&issue);
        assert_eq!(score, 20);

        let observation = explainer().explain_description(&issue, score);
        assert_eq!(observation, "Estructura; Verbo NLP; Sustantivo; Longitud OK");
    }

    #[test]
    fn test_whitelist_verb_reported() {
        let issue = issue().with_description(
            "Como analista quiero generar el reporte de ventas para validar la consistencia mensual",
        );
        let observation = explainer().explain_description(&issue, 20);
        assert!(observation.contains("Verbo blanco"));
        assert!(observation.starts_with("Estructura"));
    }

    #[test]
    fn test_invalid_description() {
        let observation = explainer().explain_description(&issue(), 0);
        assert_eq!(observation, "Texto vacío o inválido");
    }

    #[test]
    fn test_short_description_without_structure() {
        let issue = issue().with_description("Pantalla de perfil");
        let observation = explainer().explain_description(&issue, 0);
        assert_eq!(
            observation,
            "Menos de 15 palabras; Sin estructura Como-Quiero-Para; Sin verbo válido"
        );
    }

    #[test]
    fn test_zero_description_never_blank() {
        let issue = issue().with_description("Revisar");
        let observation = explainer().explain_description(&issue, 0);
        assert!(!observation.is_empty());
        assert!(observation.contains("Menos de 15 palabras"));
    }

    #[test]
    fn test_criteria_failures_in_order() {
        let explainer = explainer();

        assert_eq!(explainer.explain_criteria(&issue(), 0), "Texto vacío o inválido");

        let one_line = issue().with_acceptance_criteria("Validar el pago");
        assert_eq!(explainer.explain_criteria(&one_line, 0), "Sin lista válida");

        let no_action =
            issue().with_acceptance_criteria("- Pantalla principal del módulo\n- Botón azul del formulario");
        assert_eq!(explainer.explain_criteria(&no_action, 0), "Sin verbo/acción clara");
    }

    #[test]
    fn test_positive_criteria() {
        let issue = issue().with_acceptance_criteria(
            "- Listar los pedidos del día\n- Verificar la exactitud del total",
        );
        let score = AcceptanceCriteriaEvaluator::new(FeatureExtractor::heuristic()).score(&issue);
        assert_eq!(score, 20);

        let observation = explainer().explain_criteria(&issue, score);
        assert_eq!(observation, "Lista OK; Verbo NLP; Verbo blanco; Sustantivo");
    }

    #[test]
    fn test_degraded_mode_never_claims_tagger_verb() {
        let explainer = ObservationExplainer::new(FeatureExtractor::without_tagger());
        let issue = issue().with_acceptance_criteria("- Listar pedidos del día\n- Eliminar pedidos viejos");
        let observation = explainer.explain_criteria(&issue, 20);
        assert_eq!(observation, "Lista OK; Verbo blanco");
    }
}
