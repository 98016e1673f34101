// Section Boundary Detector
// Single forward pass over document lines. Each line is tested against direct
// patterns, then (when enabled) contextual patterns on its neighbours; accepted
// boundaries open a new section and every other line accumulates into the open one.

use crate::models::{
    ClassifierStrategy, ContextPosition, DetectedSection, MatchKind, PatternPriority, ScanSummary,
};
use crate::services::text_processor::normalize_line;
use super::corpus::{CategoryPatterns, PatternCorpus};
use super::matchers::{
    context_matches, contextual_confidence, direct_confidence, is_contextual_candidate, match_direct,
};
use tracing::{debug, trace};

/// A scored boundary candidate for one line.
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    category: String,
    confidence: f64,
    matched_pattern: String,
    kind: MatchKind,
}

struct OpenSection {
    candidate: Candidate,
    title: String,
    start_line: usize,
    content: String,
}

impl OpenSection {
    fn close(self) -> DetectedSection {
        DetectedSection {
            category: self.candidate.category,
            title: self.title,
            content: self.content.trim().to_string(),
            confidence: self.candidate.confidence,
            matched_pattern: self.candidate.matched_pattern,
            match_kind: self.candidate.kind,
            start_line: self.start_line,
        }
    }
}

/// Detect labeled sections in document order.
pub fn detect_sections<S: AsRef<str>>(
    lines: &[S],
    corpus: &PatternCorpus,
    strategy: &ClassifierStrategy,
) -> Vec<DetectedSection> {
    detect_sections_with_summary(lines, corpus, strategy).0
}

/// Same scan as [`detect_sections`], also returning per-scan counters.
pub fn detect_sections_with_summary<S: AsRef<str>>(
    lines: &[S],
    corpus: &PatternCorpus,
    strategy: &ClassifierStrategy,
) -> (Vec<DetectedSection>, ScanSummary) {
    let mut summary = ScanSummary {
        total_lines: lines.len(),
        ..ScanSummary::default()
    };
    let mut sections: Vec<DetectedSection> = Vec::new();
    let mut open: Option<OpenSection> = None;

    for (idx, raw) in lines.iter().enumerate() {
        let line = raw.as_ref();
        let normalized = normalize_line(line);

        let candidate = if normalized.is_empty() {
            None
        } else {
            find_direct(&normalized, corpus, strategy.pattern_priority).or_else(|| {
                if strategy.context_weight > 0.0 {
                    find_contextual(idx, lines, corpus, strategy)
                } else {
                    None
                }
            })
        };

        let accepted = match candidate {
            Some(c) if c.confidence >= strategy.confidence_threshold => Some(c),
            Some(c) => {
                summary.below_threshold += 1;
                trace!(
                    line = idx,
                    category = %c.category,
                    confidence = c.confidence,
                    threshold = strategy.confidence_threshold,
                    "boundary.below_threshold"
                );
                None
            }
            None => None,
        };

        match accepted {
            Some(c) => {
                if c.kind.is_direct() {
                    summary.direct_boundaries += 1;
                } else {
                    summary.contextual_boundaries += 1;
                }
                debug!(
                    line = idx,
                    category = %c.category,
                    confidence = c.confidence,
                    pattern = %c.matched_pattern,
                    kind = ?c.kind,
                    "boundary.detected"
                );
                if let Some(prev) = open.take() {
                    sections.push(prev.close());
                }
                open = Some(OpenSection {
                    candidate: c,
                    title: line.trim().to_string(),
                    start_line: idx,
                    content: String::new(),
                });
            }
            None => match open.as_mut() {
                Some(section) => {
                    section.content.push_str(line);
                    section.content.push('\n');
                }
                None => summary.discarded_lines += 1,
            },
        }
    }

    if let Some(last) = open.take() {
        sections.push(last.close());
    }

    (sections, summary)
}

/// Categories in the order the priority mode inspects them.
fn ordered_categories<'a>(
    corpus: &'a PatternCorpus,
    priority: PatternPriority,
) -> Box<dyn Iterator<Item = &'a CategoryPatterns> + 'a> {
    match priority {
        PatternPriority::SectionFirst => Box::new(corpus.hierarchy()),
        PatternPriority::ContentFirst | PatternPriority::Balanced => {
            Box::new(corpus.categories().iter())
        }
    }
}

/// Keep the first candidate under `SectionFirst`, otherwise the highest scoring
/// one (ties keep the earlier candidate).
fn pick(priority: PatternPriority, mut candidates: impl Iterator<Item = Candidate>) -> Option<Candidate> {
    match priority {
        PatternPriority::SectionFirst => candidates.next(),
        PatternPriority::ContentFirst | PatternPriority::Balanced => {
            candidates.fold(None, |best: Option<Candidate>, c| match best {
                Some(b) if b.confidence >= c.confidence => Some(b),
                _ => Some(c),
            })
        }
    }
}

fn find_direct(line: &str, corpus: &PatternCorpus, priority: PatternPriority) -> Option<Candidate> {
    let candidates = ordered_categories(corpus, priority).flat_map(move |category| {
        category.patterns.iter().filter_map(move |pattern| {
            match_direct(line, pattern).map(|kind| Candidate {
                category: category.id.clone(),
                confidence: direct_confidence(pattern, &category.stats),
                matched_pattern: pattern.text().to_string(),
                kind,
            })
        })
    });
    pick(priority, candidates)
}

fn find_contextual<S: AsRef<str>>(
    idx: usize,
    lines: &[S],
    corpus: &PatternCorpus,
    strategy: &ClassifierStrategy,
) -> Option<Candidate> {
    if !is_contextual_candidate(lines[idx].as_ref()) {
        return None;
    }
    let before_line = idx.checked_sub(1).map(|i| normalize_line(lines[i].as_ref()));
    let after_line = lines.get(idx + 1).map(|l| normalize_line(l.as_ref()));
    let before = before_line.as_deref();
    let after = after_line.as_deref();
    let weight = strategy.context_weight;

    let candidates = ordered_categories(corpus, strategy.pattern_priority).flat_map(move |category| {
        category.contextual.iter().filter_map(move |pattern| {
            let neighbor = match pattern.position {
                ContextPosition::Before => before,
                ContextPosition::After => after,
            }?;
            if !context_matches(neighbor, pattern) {
                return None;
            }
            Some(Candidate {
                category: category.id.clone(),
                confidence: contextual_confidence(pattern, weight),
                matched_pattern: format!("{}:{}", pattern.position.as_str(), pattern.text),
                kind: MatchKind::Contextual,
            })
        })
    });
    pick(strategy.pattern_priority, candidates)
}
