// Section Scan Services

pub mod text_processor;
pub mod config_store;
pub mod detection;

pub use config_store::*;

// Re-export detection module items
pub use detection::{
    classify,
    detect_sections,
    detect_sections_with_summary,
    normalize,
    select_strategy,
    select_strategy_from,
    CorpusError,
    DiagnosticSink,
    MemorySink,
    PatternCorpus,
    SectionClassifier,
    TracingSink,
};
