// Section Classifier
// One run: classify the document, select a strategy (unless pinned), scan lines.

use crate::models::{
    ClassificationRun, ClassifierStrategy, DetectedSection, DEFAULT_CONFIDENCE_THRESHOLD,
    DEFAULT_CONTEXT_WEIGHT,
};
use crate::services::config_store::ClassifierConfig;
use crate::services::text_processor::split_lines;
use super::boundary_detector::detect_sections_with_summary;
use super::corpus::PatternCorpus;
use super::diagnostics::{DiagnosticSink, TracingSink};
use super::document_classifier::classify;
use super::strategy::select_strategy_from;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn, Level};
use uuid::Uuid;

/// Shares one read-only corpus across any number of runs and threads.
#[derive(Clone)]
pub struct SectionClassifier {
    corpus: Arc<PatternCorpus>,
    config: ClassifierConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl SectionClassifier {
    pub fn new(corpus: Arc<PatternCorpus>, config: Option<ClassifierConfig>) -> Self {
        let mut config = config.unwrap_or_default();
        if let Err(e) = config.validate() {
            warn!(error = %e, "classifier.config.clamped");
            config.confidence_threshold =
                unit_or_default(config.confidence_threshold, DEFAULT_CONFIDENCE_THRESHOLD);
            config.context_weight = unit_or_default(config.context_weight, DEFAULT_CONTEXT_WEIGHT);
        }
        Self {
            corpus,
            config,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn corpus(&self) -> &PatternCorpus {
        &self.corpus
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify and segment one document.
    pub fn classify(&self, text: &str) -> ClassificationRun {
        if self.config.auto_strategy {
            self.run(text, None)
        } else {
            self.run(text, Some(self.config.strategy()))
        }
    }

    /// Segment with an explicit strategy, bypassing automatic selection.
    pub fn classify_with_strategy(&self, text: &str, strategy: &ClassifierStrategy) -> ClassificationRun {
        self.run(text, Some(sanitize_strategy(strategy)))
    }

    pub fn detect_sections(&self, text: &str) -> Vec<DetectedSection> {
        self.classify(text).sections
    }

    /// Entry point for untyped input (e.g. a JSON request body). Anything that is
    /// not a string is logged once at error level and yields no sections.
    pub fn detect_value(&self, input: &Value) -> Vec<DetectedSection> {
        match input {
            Value::String(text) => self.detect_sections(text),
            other => {
                self.sink.log(
                    Level::ERROR,
                    &format!("invalid input: expected document text, got {}", value_kind(other)),
                );
                Vec::new()
            }
        }
    }

    fn run(&self, text: &str, pinned: Option<ClassifierStrategy>) -> ClassificationRun {
        let started = Instant::now();
        let run_id = Uuid::new_v4();

        let classification = classify(text);
        let strategy_pinned = pinned.is_some();
        let strategy = match pinned {
            Some(strategy) => strategy,
            None => select_strategy_from(self.config.strategy(), &classification),
        };

        let lines = split_lines(text);
        let (sections, summary) = detect_sections_with_summary(&lines, &self.corpus, &strategy);

        info!(
            run_id = %run_id,
            doc_type = ?classification.doc_type,
            structure = ?classification.structure,
            threshold = strategy.confidence_threshold,
            priority = ?strategy.pattern_priority,
            context_weight = strategy.context_weight,
            pinned = strategy_pinned,
            lines = summary.total_lines,
            sections = sections.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "classifier.run"
        );

        ClassificationRun {
            run_id,
            classification,
            strategy,
            strategy_pinned,
            sections,
            summary,
        }
    }
}

/// Non-finite values fall back to `default`; finite ones are clamped to [0, 1].
fn unit_or_default(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        default
    }
}

fn sanitize_strategy(strategy: &ClassifierStrategy) -> ClassifierStrategy {
    let sanitized = ClassifierStrategy {
        confidence_threshold: unit_or_default(
            strategy.confidence_threshold,
            DEFAULT_CONFIDENCE_THRESHOLD,
        ),
        context_weight: unit_or_default(strategy.context_weight, DEFAULT_CONTEXT_WEIGHT),
        ..strategy.clone()
    };
    if sanitized != *strategy {
        warn!(
            threshold = strategy.confidence_threshold,
            context_weight = strategy.context_weight,
            "classifier.strategy.clamped"
        );
    }
    sanitized
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
