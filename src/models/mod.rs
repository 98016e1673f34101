// Section Scan Data Models
// Shared by the corpus loader, the detector and the CLI output

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============ Corpus ============

/// A direct line pattern drawn from training data (1-3 token n-gram).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPattern {
    pub text: String,
    pub confidence: f64,
    pub frequency: u32,
}

/// Aggregate confidence statistics for one category, computed offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionStats {
    #[serde(default)]
    pub category_id: String,
    pub sum: f64,
    pub count: u32,
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

impl SectionStats {
    pub fn new(category_id: &str, min: f64, max: f64, average: f64) -> Self {
        Self {
            category_id: category_id.to_string(),
            sum: average,
            count: 1,
            min,
            max,
            average,
        }
    }

    /// Stats for a category that observed a single confidence value.
    pub fn degenerate(category_id: &str, value: f64) -> Self {
        Self::new(category_id, value, value, value)
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextPosition {
    /// Pattern appears on the line immediately before the boundary.
    Before,
    /// Pattern appears on the line immediately after the boundary.
    After,
}

impl ContextPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextPosition::Before => "before",
            ContextPosition::After => "after",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextualPattern {
    pub text: String,
    pub confidence: f64,
    pub frequency: u32,
    pub position: ContextPosition,
}

// ============ Detection Output ============

/// Which matcher produced a boundary.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchKind {
    Exact,
    Prefix,
    NumberedHeading,
    Contextual,
}

impl MatchKind {
    pub fn is_direct(self) -> bool {
        !matches!(self, MatchKind::Contextual)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedSection {
    pub category: String,
    pub title: String,
    pub content: String,
    pub confidence: f64,
    pub matched_pattern: String,
    pub match_kind: MatchKind,
    /// 0-based index of the boundary line in the scanned document.
    pub start_line: usize,
}

/// Counters collected during one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub total_lines: usize,
    pub direct_boundaries: usize,
    pub contextual_boundaries: usize,
    pub below_threshold: usize,
    pub discarded_lines: usize,
}

// ============ Document Classification ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    InHomeAssessment,
    Referral,
    Unknown,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStructure {
    Form,
    Narrative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentClassification {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub type_confidence: f64,
    pub structure: DocumentStructure,
    /// Document length in characters.
    pub length: usize,
    pub complexity: f64,
}

// ============ Strategy ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternPriority {
    SectionFirst,
    ContentFirst,
    #[default]
    Balanced,
}

impl PatternPriority {
    pub fn from_str(val: &str) -> Option<Self> {
        match val.trim().to_lowercase().replace('-', "_").as_str() {
            "section_first" => Some(Self::SectionFirst),
            "content_first" => Some(Self::ContentFirst),
            "balanced" => Some(Self::Balanced),
            _ => None,
        }
    }
}

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;
pub const DEFAULT_CONTEXT_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierStrategy {
    pub confidence_threshold: f64,
    pub pattern_priority: PatternPriority,
    pub context_weight: f64,
    pub fallback_enabled: bool,
}

impl Default for ClassifierStrategy {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            pattern_priority: PatternPriority::Balanced,
            context_weight: DEFAULT_CONTEXT_WEIGHT,
            fallback_enabled: true,
        }
    }
}

// ============ Run Output ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRun {
    pub run_id: Uuid,
    pub classification: DocumentClassification,
    pub strategy: ClassifierStrategy,
    /// True when the configured strategy bypassed automatic selection.
    pub strategy_pinned: bool,
    pub sections: Vec<DetectedSection>,
    pub summary: ScanSummary,
}
