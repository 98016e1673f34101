// Document Classifier
// Whole-document heuristics: type markers, line-length structure, lexical diversity.

use crate::models::{DocumentClassification, DocumentStructure, DocumentType};
use crate::services::text_processor::{char_len, split_lines, unique_tokens};

/// Marker phrases checked in order; the first present one decides the type.
/// Matching is case-sensitive: these appear as printed form headers.
const TYPE_MARKERS: &[(&str, DocumentType)] = &[
    ("IN-HOME ASSESSMENT", DocumentType::InHomeAssessment),
    ("IN HOME ASSESSMENT", DocumentType::InHomeAssessment),
    ("REFERRAL", DocumentType::Referral),
    ("REFERRER", DocumentType::Referral),
];

const MARKER_CONFIDENCE: f64 = 0.9;
const SHORT_LINE_CHARS: usize = 50;
const FORM_SHORT_LINE_RATIO: f64 = 0.7;
const COMPLEXITY_TOKEN_SCALE: f64 = 5000.0;

pub fn classify(text: &str) -> DocumentClassification {
    let (doc_type, type_confidence) = detect_type(text);
    DocumentClassification {
        doc_type,
        type_confidence,
        structure: detect_structure(text),
        length: char_len(text),
        complexity: complexity(text),
    }
}

fn detect_type(text: &str) -> (DocumentType, f64) {
    TYPE_MARKERS
        .iter()
        .find(|(marker, _)| text.contains(marker))
        .map(|(_, doc_type)| (*doc_type, MARKER_CONFIDENCE))
        .unwrap_or((DocumentType::Unknown, 0.0))
}

/// Dense label/value layouts have mostly short lines; prose does not.
/// A trailing newline terminates the last line and does not add an empty one.
fn detect_structure(text: &str) -> DocumentStructure {
    let lines = split_lines(text);
    if lines.is_empty() {
        return DocumentStructure::Narrative;
    }
    let short = lines
        .iter()
        .filter(|ln| char_len(ln) < SHORT_LINE_CHARS)
        .count();
    if short as f64 / lines.len() as f64 > FORM_SHORT_LINE_RATIO {
        DocumentStructure::Form
    } else {
        DocumentStructure::Narrative
    }
}

fn complexity(text: &str) -> f64 {
    (unique_tokens(text).len() as f64 / COMPLEXITY_TOKEN_SCALE).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_marker() {
        let c = classify("Occupational therapy REFERRAL\nReason: falls");
        assert_eq!(c.doc_type, DocumentType::Referral);
        assert_eq!(c.type_confidence, 0.9);
    }

    #[test]
    fn test_in_home_marker_wins_over_referral() {
        let c = classify("IN-HOME ASSESSMENT\nREFERRER: Dr. Smith");
        assert_eq!(c.doc_type, DocumentType::InHomeAssessment);
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        let c = classify("self referral from family");
        assert_eq!(c.doc_type, DocumentType::Unknown);
        assert_eq!(c.type_confidence, 0.0);
    }

    #[test]
    fn test_mostly_short_lines_is_form() {
        let long = "The client reports persistent lower back pain that worsens when climbing stairs.";
        let mut lines = vec!["Name: Jane Doe"; 8];
        lines.push(long);
        lines.push(long);
        let c = classify(&lines.join("\n"));
        assert_eq!(c.structure, DocumentStructure::Form);
    }

    #[test]
    fn test_exactly_seventy_percent_is_narrative() {
        let long = "x".repeat(60);
        let mut lines: Vec<String> = vec!["short".to_string(); 7];
        lines.extend(std::iter::repeat(long).take(3));
        let c = classify(&lines.join("\n"));
        assert_eq!(c.structure, DocumentStructure::Narrative);
    }

    #[test]
    fn test_empty_document() {
        let c = classify("");
        assert_eq!(c.doc_type, DocumentType::Unknown);
        assert_eq!(c.structure, DocumentStructure::Narrative);
        assert_eq!(c.length, 0);
        assert_eq!(c.complexity, 0.0);
    }

    #[test]
    fn test_complexity_counts_unique_tokens() {
        let c = classify("Pain pain PAIN knee");
        assert!((c.complexity - 2.0 / 5000.0).abs() < 1e-12);

        let many: Vec<String> = (0..6000).map(|i| format!("w{}", i)).collect();
        assert_eq!(classify(&many.join(" ")).complexity, 1.0);
    }

    #[test]
    fn test_length_counts_chars() {
        assert_eq!(classify("née").length, 3);
    }

    #[test]
    fn test_trailing_newline_adds_no_line() {
        let long = "The client reports difficulty with stairs and bathing at home.";
        let text = format!("{}\n{l}\n{l}\n{l}\n", vec!["Name: Jane"; 7].join("\n"), l = long);
        // 7 of 10 lines are short, not above the 0.7 ratio
        assert_eq!(classify(&text).structure, DocumentStructure::Narrative);
        assert_eq!(classify(&format!("Age: 80\n{}", text)).structure, DocumentStructure::Form);
    }
}
