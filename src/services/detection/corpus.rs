// Pattern Corpus
// Read-only table of per-category direct patterns, contextual patterns and stats.
// Produced offline; loaded once and shared across classification runs.

use crate::models::{ContextPosition, ContextualPattern, SectionPattern, SectionStats};
use super::matchers::numbered_heading_regex;
use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

const STATS_EPSILON: f64 = 1e-9;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("failed to read corpus: {0}")]
    Io(#[from] std::io::Error),
    #[error("corpus parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("category id must not be empty")]
    EmptyCategoryId,
    #[error("duplicate category: {0}")]
    DuplicateCategory(String),
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("invalid stats for {category}: {reason}")]
    InvalidStats { category: String, reason: String },
    #[error("invalid pattern {text:?} in {category}: {reason}")]
    InvalidPattern {
        category: String,
        text: String,
        reason: String,
    },
    #[error("pattern regex error: {0}")]
    Regex(#[from] regex::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CorpusFile {
    #[serde(default)]
    version: String,
    #[serde(default)]
    section_order: Vec<String>,
    categories: Vec<CategoryFile>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryFile {
    id: String,
    #[serde(default)]
    patterns: Vec<SectionPattern>,
    #[serde(default)]
    contextual: Vec<ContextualPattern>,
    stats: SectionStats,
}

/// A direct pattern with its numbered-heading regex compiled at load time.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub pattern: SectionPattern,
    numbered: Regex,
}

impl CompiledPattern {
    pub fn text(&self) -> &str {
        &self.pattern.text
    }

    pub fn numbered_heading(&self) -> &Regex {
        &self.numbered
    }
}

#[derive(Debug, Clone)]
pub struct CategoryPatterns {
    pub id: String,
    pub patterns: Vec<CompiledPattern>,
    pub contextual: Vec<ContextualPattern>,
    pub stats: SectionStats,
}

#[derive(Debug, Clone)]
pub struct PatternCorpus {
    version: String,
    categories: Vec<CategoryPatterns>,
    index: HashMap<String, usize>,
    /// Category indices in section-hierarchy order, then the remaining ones in asset order.
    hierarchy: Vec<usize>,
}

impl PatternCorpus {
    pub fn builder() -> CorpusBuilder {
        CorpusBuilder::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CorpusError> {
        let parsed: CorpusFile = serde_json::from_str(raw)?;
        Self::from_file(parsed)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CorpusError> {
        let parsed: CorpusFile = serde_json::from_reader(reader)?;
        Self::from_file(parsed)
    }

    pub fn from_path(path: &Path) -> Result<Self, CorpusError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    fn from_file(file: CorpusFile) -> Result<Self, CorpusError> {
        let mut categories = Vec::with_capacity(file.categories.len());
        let mut index = HashMap::new();

        for entry in file.categories {
            let category = compile_category(entry)?;
            if index.contains_key(&category.id) {
                return Err(CorpusError::DuplicateCategory(category.id));
            }
            index.insert(category.id.clone(), categories.len());
            categories.push(category);
        }

        let mut hierarchy = Vec::with_capacity(categories.len());
        let mut seen = HashSet::new();
        for id in &file.section_order {
            match index.get(id.trim()) {
                Some(&idx) => {
                    if seen.insert(idx) {
                        hierarchy.push(idx);
                    }
                }
                None => warn!(category = %id, "corpus.section_order.unknown_category"),
            }
        }
        for idx in 0..categories.len() {
            if seen.insert(idx) {
                hierarchy.push(idx);
            }
        }

        let corpus = Self {
            version: file.version,
            categories,
            index,
            hierarchy,
        };
        info!(
            version = %corpus.version,
            categories = corpus.categories.len(),
            patterns = corpus.pattern_count(),
            "corpus.loaded"
        );
        Ok(corpus)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Categories in asset order.
    pub fn categories(&self) -> &[CategoryPatterns] {
        &self.categories
    }

    /// Categories in section-hierarchy order.
    pub fn hierarchy(&self) -> impl Iterator<Item = &CategoryPatterns> {
        self.hierarchy.iter().map(move |&idx| &self.categories[idx])
    }

    pub fn get(&self, id: &str) -> Option<&CategoryPatterns> {
        self.index.get(id).map(|&idx| &self.categories[idx])
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn pattern_count(&self) -> usize {
        self.categories
            .iter()
            .map(|c| c.patterns.len() + c.contextual.len())
            .sum()
    }
}

fn compile_category(entry: CategoryFile) -> Result<CategoryPatterns, CorpusError> {
    let id = entry.id.trim().to_string();
    if id.is_empty() {
        return Err(CorpusError::EmptyCategoryId);
    }

    let mut stats = entry.stats;
    if stats.category_id.trim().is_empty() {
        stats.category_id = id.clone();
    } else if stats.category_id.trim() != id {
        return Err(CorpusError::InvalidStats {
            category: id,
            reason: format!("stats belong to {}", stats.category_id),
        });
    }
    validate_stats(&id, &stats)?;

    let mut patterns = Vec::with_capacity(entry.patterns.len());
    for mut pattern in entry.patterns {
        pattern.text = pattern.text.trim().to_lowercase();
        if pattern.text.is_empty() {
            return Err(invalid_pattern(&id, &pattern.text, "empty text"));
        }
        if !(pattern.confidence > 0.0 && pattern.confidence <= 1.0) {
            return Err(invalid_pattern(&id, &pattern.text, "confidence outside (0, 1]"));
        }
        let numbered = numbered_heading_regex(&pattern.text)?;
        patterns.push(CompiledPattern { pattern, numbered });
    }

    let mut contextual = Vec::with_capacity(entry.contextual.len());
    for mut pattern in entry.contextual {
        pattern.text = pattern.text.trim().to_lowercase();
        if pattern.text.is_empty() {
            return Err(invalid_pattern(&id, &pattern.text, "empty text"));
        }
        if !(0.0..=1.0).contains(&pattern.confidence) {
            return Err(invalid_pattern(&id, &pattern.text, "confidence outside [0, 1]"));
        }
        contextual.push(pattern);
    }

    Ok(CategoryPatterns {
        id,
        patterns,
        contextual,
        stats,
    })
}

fn validate_stats(category: &str, stats: &SectionStats) -> Result<(), CorpusError> {
    let invalid = |reason: &str| CorpusError::InvalidStats {
        category: category.to_string(),
        reason: reason.to_string(),
    };
    if !(stats.min.is_finite() && stats.max.is_finite() && stats.average.is_finite()) {
        return Err(invalid("non-finite value"));
    }
    if stats.min > stats.max {
        return Err(invalid("min exceeds max"));
    }
    if stats.average < stats.min - STATS_EPSILON || stats.average > stats.max + STATS_EPSILON {
        return Err(invalid("average outside [min, max]"));
    }
    Ok(())
}

fn invalid_pattern(category: &str, text: &str, reason: &str) -> CorpusError {
    CorpusError::InvalidPattern {
        category: category.to_string(),
        text: text.to_string(),
        reason: reason.to_string(),
    }
}

/// In-code corpus construction, mostly for tests and embedding callers.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    version: String,
    section_order: Vec<String>,
    categories: Vec<CategoryFile>,
    error: Option<CorpusError>,
}

impl CorpusBuilder {
    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn section_order(mut self, order: &[&str]) -> Self {
        self.section_order = order.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn category(mut self, id: &str, stats: SectionStats) -> Self {
        self.categories.push(CategoryFile {
            id: id.to_string(),
            patterns: Vec::new(),
            contextual: Vec::new(),
            stats,
        });
        self
    }

    pub fn pattern(mut self, category: &str, text: &str, confidence: f64, frequency: u32) -> Self {
        let pattern = SectionPattern {
            text: text.to_string(),
            confidence,
            frequency,
        };
        match self.categories.iter_mut().find(|c| c.id == category) {
            Some(entry) => entry.patterns.push(pattern),
            None => self.fail(category),
        }
        self
    }

    pub fn contextual(
        mut self,
        category: &str,
        text: &str,
        confidence: f64,
        frequency: u32,
        position: ContextPosition,
    ) -> Self {
        let pattern = ContextualPattern {
            text: text.to_string(),
            confidence,
            frequency,
            position,
        };
        match self.categories.iter_mut().find(|c| c.id == category) {
            Some(entry) => entry.contextual.push(pattern),
            None => self.fail(category),
        }
        self
    }

    fn fail(&mut self, category: &str) {
        if self.error.is_none() {
            self.error = Some(CorpusError::UnknownCategory(category.to_string()));
        }
    }

    pub fn build(self) -> Result<PatternCorpus, CorpusError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        PatternCorpus::from_file(CorpusFile {
            version: self.version,
            section_order: self.section_order,
            categories: self.categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": "test-1",
        "sectionOrder": ["SYMPTOMS", "NOT_A_CATEGORY"],
        "categories": [
            {
                "id": "DEMOGRAPHICS",
                "patterns": [{"text": "  Demographics ", "confidence": 0.5, "frequency": 20}],
                "stats": {"sum": 0.5, "count": 1, "min": 0.5, "max": 0.5, "average": 0.5}
            },
            {
                "id": "SYMPTOMS",
                "patterns": [{"text": "symptoms", "confidence": 0.8, "frequency": 60}],
                "contextual": [{"text": "chief complaint", "confidence": 0.6, "frequency": 4, "position": "BEFORE"}],
                "stats": {"categoryId": "SYMPTOMS", "sum": 1.3, "count": 2, "min": 0.5, "max": 0.8, "average": 0.65}
            }
        ]
    }"#;

    #[test]
    fn test_load_from_json() {
        let corpus = PatternCorpus::from_json_str(SAMPLE).unwrap();
        assert_eq!(corpus.version(), "test-1");
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.pattern_count(), 3);

        let demo = corpus.get("DEMOGRAPHICS").unwrap();
        assert_eq!(demo.patterns[0].text(), "demographics");
        assert_eq!(demo.stats.category_id, "DEMOGRAPHICS");
    }

    #[test]
    fn test_hierarchy_puts_section_order_first() {
        let corpus = PatternCorpus::from_json_str(SAMPLE).unwrap();
        let order: Vec<&str> = corpus.hierarchy().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["SYMPTOMS", "DEMOGRAPHICS"]);
        let asset: Vec<&str> = corpus.categories().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(asset, vec!["DEMOGRAPHICS", "SYMPTOMS"]);
    }

    #[test]
    fn test_rejects_inverted_stats() {
        let result = PatternCorpus::builder()
            .category("SYMPTOMS", SectionStats::new("SYMPTOMS", 0.9, 0.1, 0.5))
            .build();
        assert!(matches!(result, Err(CorpusError::InvalidStats { .. })));
    }

    #[test]
    fn test_rejects_average_outside_band() {
        let result = PatternCorpus::builder()
            .category("SYMPTOMS", SectionStats::new("SYMPTOMS", 0.2, 0.4, 0.6))
            .build();
        assert!(matches!(result, Err(CorpusError::InvalidStats { .. })));
    }

    #[test]
    fn test_rejects_duplicate_category() {
        let stats = SectionStats::degenerate("", 0.5);
        let result = PatternCorpus::builder()
            .category("SYMPTOMS", stats.clone())
            .category("SYMPTOMS", stats)
            .build();
        assert!(matches!(result, Err(CorpusError::DuplicateCategory(id)) if id == "SYMPTOMS"));
    }

    #[test]
    fn test_rejects_bad_pattern_confidence() {
        let result = PatternCorpus::builder()
            .category("SYMPTOMS", SectionStats::degenerate("SYMPTOMS", 0.5))
            .pattern("SYMPTOMS", "symptoms", 0.0, 3)
            .build();
        assert!(matches!(result, Err(CorpusError::InvalidPattern { .. })));
    }

    #[test]
    fn test_builder_unknown_category() {
        let result = PatternCorpus::builder()
            .pattern("MISSING", "whatever", 0.5, 1)
            .build();
        assert!(matches!(result, Err(CorpusError::UnknownCategory(id)) if id == "MISSING"));
    }

    #[test]
    fn test_parse_error_surfaces() {
        let result = PatternCorpus::from_json_str("{not json");
        assert!(matches!(result, Err(CorpusError::Parse(_))));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let corpus = PatternCorpus::from_path(&path).unwrap();
        assert!(corpus.get("SYMPTOMS").is_some());
        assert!(matches!(
            PatternCorpus::from_path(&dir.path().join("missing.json")),
            Err(CorpusError::Io(_))
        ));
    }

    #[test]
    fn test_bundled_sample_corpus_loads() {
        let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample_corpus.json"));
        let corpus = PatternCorpus::from_json_str(raw).unwrap();
        assert!(!corpus.is_empty());
        assert!(corpus.get("MEDICAL_HISTORY").is_some());
    }
}
