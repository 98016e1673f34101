// Strategy Selection
// Maps a document descriptor to detector parameters. Only the fields the
// descriptor says something about are overridden; the rest keep the base values.

use crate::models::{
    ClassifierStrategy, DocumentClassification, DocumentStructure, DocumentType, PatternPriority,
};

const HIGH_COMPLEXITY: f64 = 0.7;

#[derive(Debug, Copy, Clone)]
struct TypeProfile {
    confidence_threshold: f64,
    pattern_priority: PatternPriority,
}

fn type_profile(doc_type: DocumentType) -> Option<TypeProfile> {
    match doc_type {
        // In-home assessments follow the training corpus closely.
        DocumentType::InHomeAssessment => Some(TypeProfile {
            confidence_threshold: 0.25,
            pattern_priority: PatternPriority::SectionFirst,
        }),
        DocumentType::Referral => Some(TypeProfile {
            confidence_threshold: 0.35,
            pattern_priority: PatternPriority::ContentFirst,
        }),
        DocumentType::Unknown => None,
    }
}

fn context_weight(structure: DocumentStructure) -> f64 {
    match structure {
        // neighbouring lines carry more signal in tabular layouts
        DocumentStructure::Form => 0.7,
        DocumentStructure::Narrative => 0.3,
    }
}

/// Select a strategy starting from the built-in defaults.
pub fn select_strategy(classification: &DocumentClassification) -> ClassifierStrategy {
    select_strategy_from(ClassifierStrategy::default(), classification)
}

/// Select a strategy starting from caller-supplied base values.
pub fn select_strategy_from(
    base: ClassifierStrategy,
    classification: &DocumentClassification,
) -> ClassifierStrategy {
    let mut strategy = base;

    if let Some(profile) = type_profile(classification.doc_type) {
        strategy.confidence_threshold = profile.confidence_threshold;
        strategy.pattern_priority = profile.pattern_priority;
    }

    strategy.context_weight = context_weight(classification.structure);

    if classification.complexity > HIGH_COMPLEXITY {
        strategy.fallback_enabled = true;
    }

    strategy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(
        doc_type: DocumentType,
        structure: DocumentStructure,
        complexity: f64,
    ) -> DocumentClassification {
        DocumentClassification {
            doc_type,
            type_confidence: if doc_type == DocumentType::Unknown { 0.0 } else { 0.9 },
            structure,
            length: 1000,
            complexity,
        }
    }

    #[test]
    fn test_in_home_assessment_is_permissive() {
        let s = select_strategy(&classification(
            DocumentType::InHomeAssessment,
            DocumentStructure::Form,
            0.1,
        ));
        assert_eq!(s.confidence_threshold, 0.25);
        assert_eq!(s.pattern_priority, PatternPriority::SectionFirst);
        assert_eq!(s.context_weight, 0.7);
        assert!(s.fallback_enabled);
    }

    #[test]
    fn test_referral_is_strict() {
        let s = select_strategy(&classification(
            DocumentType::Referral,
            DocumentStructure::Narrative,
            0.1,
        ));
        assert_eq!(s.confidence_threshold, 0.35);
        assert_eq!(s.pattern_priority, PatternPriority::ContentFirst);
        assert_eq!(s.context_weight, 0.3);
    }

    #[test]
    fn test_unknown_keeps_defaults() {
        let s = select_strategy(&classification(
            DocumentType::Unknown,
            DocumentStructure::Narrative,
            0.1,
        ));
        assert_eq!(s.confidence_threshold, 0.3);
        assert_eq!(s.pattern_priority, PatternPriority::Balanced);
        assert_eq!(s.context_weight, 0.3);
    }

    #[test]
    fn test_threshold_ordering_across_types() {
        let in_home = select_strategy(&classification(DocumentType::InHomeAssessment, DocumentStructure::Form, 0.0));
        let unknown = select_strategy(&classification(DocumentType::Unknown, DocumentStructure::Form, 0.0));
        let referral = select_strategy(&classification(DocumentType::Referral, DocumentStructure::Form, 0.0));
        assert!(in_home.confidence_threshold < unknown.confidence_threshold);
        assert!(unknown.confidence_threshold < referral.confidence_threshold);
    }

    #[test]
    fn test_high_complexity_forces_fallback() {
        let base = ClassifierStrategy {
            fallback_enabled: false,
            ..ClassifierStrategy::default()
        };
        let low = select_strategy_from(
            base.clone(),
            &classification(DocumentType::Unknown, DocumentStructure::Form, 0.5),
        );
        assert!(!low.fallback_enabled);
        let high = select_strategy_from(
            base,
            &classification(DocumentType::Unknown, DocumentStructure::Form, 0.8),
        );
        assert!(high.fallback_enabled);
    }

    #[test]
    fn test_base_values_survive_when_not_overridden() {
        let base = ClassifierStrategy {
            confidence_threshold: 0.42,
            pattern_priority: PatternPriority::SectionFirst,
            context_weight: 0.9,
            fallback_enabled: true,
        };
        let s = select_strategy_from(base, &classification(DocumentType::Unknown, DocumentStructure::Form, 0.0));
        assert_eq!(s.confidence_threshold, 0.42);
        assert_eq!(s.pattern_priority, PatternPriority::SectionFirst);
        assert_eq!(s.context_weight, 0.7);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let c = classification(DocumentType::Referral, DocumentStructure::Form, 0.9);
        assert_eq!(select_strategy(&c), select_strategy(&c));
    }
}
