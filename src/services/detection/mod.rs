// Detection Module
// Section segmentation core organized into specialized submodules:
// - corpus: read-only pattern corpus and its loader
// - normalizer: per-category confidence normalization
// - matchers: exact / prefix / numbered-heading matching and contextual guards
// - boundary_detector: single-pass section boundary scan
// - document_classifier: document type, structure and complexity
// - strategy: maps a document descriptor to detector parameters
// - classifier: run facade combining the above

pub mod corpus;
pub mod normalizer;
pub mod matchers;
pub mod boundary_detector;
pub mod document_classifier;
pub mod strategy;
pub mod diagnostics;
pub mod classifier;

// Re-export commonly used items
pub use corpus::{CategoryPatterns, CompiledPattern, CorpusBuilder, CorpusError, PatternCorpus};
pub use normalizer::normalize;
pub use matchers::{match_direct, DirectMatcher};
pub use boundary_detector::{detect_sections, detect_sections_with_summary};
pub use document_classifier::classify;
pub use strategy::{select_strategy, select_strategy_from};
pub use diagnostics::{DiagnosticSink, MemorySink, TracingSink};
pub use classifier::SectionClassifier;
