// Line Matchers
// Named matching modes for direct heading patterns, plus the contextual guards.

use crate::models::{ContextualPattern, MatchKind, SectionStats};
use crate::services::text_processor::{char_len, is_page_marker, is_purely_numeric};
use super::corpus::CompiledPattern;
use super::normalizer::normalize;
use regex::Regex;

/// Frequency at which a pattern earns the full frequency boost.
const FULL_BOOST_FREQUENCY: f64 = 50.0;
/// Lines at or above this length are never contextual boundaries.
const CONTEXT_MAX_LINE_CHARS: usize = 100;

/// Build the `^\d+\.?\s*<text>` matcher for a lower-cased pattern text.
pub fn numbered_heading_regex(text: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)^\d+\.?\s*{}", regex::escape(text)))
}

/// Direct matching modes, evaluated in declaration order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DirectMatcher {
    /// Line equals the pattern text.
    Exact,
    /// Line starts with `text:`, `text-` or `text -`.
    Prefix,
    /// Line is a numbered heading such as `3. symptoms` or `12 symptoms`.
    NumberedHeading,
}

impl DirectMatcher {
    pub const ORDER: [DirectMatcher; 3] = [
        DirectMatcher::Exact,
        DirectMatcher::Prefix,
        DirectMatcher::NumberedHeading,
    ];

    pub fn kind(self) -> MatchKind {
        match self {
            DirectMatcher::Exact => MatchKind::Exact,
            DirectMatcher::Prefix => MatchKind::Prefix,
            DirectMatcher::NumberedHeading => MatchKind::NumberedHeading,
        }
    }

    /// `line` must already be trimmed and lower-cased.
    pub fn matches(self, line: &str, pattern: &CompiledPattern) -> bool {
        let text = pattern.text();
        match self {
            DirectMatcher::Exact => line == text,
            DirectMatcher::Prefix => line
                .strip_prefix(text)
                .map(|rest| rest.starts_with(':') || rest.starts_with('-') || rest.starts_with(" -"))
                .unwrap_or(false),
            DirectMatcher::NumberedHeading => pattern.numbered_heading().is_match(line),
        }
    }
}

/// First matcher that accepts the line, if any.
pub fn match_direct(line: &str, pattern: &CompiledPattern) -> Option<MatchKind> {
    DirectMatcher::ORDER
        .iter()
        .find(|m| m.matches(line, pattern))
        .map(|m| m.kind())
}

pub fn frequency_factor(frequency: u32) -> f64 {
    (frequency as f64 / FULL_BOOST_FREQUENCY).min(1.0)
}

/// Normalized confidence of a direct match with the frequency boost applied.
pub fn direct_confidence(pattern: &CompiledPattern, stats: &SectionStats) -> f64 {
    let match_confidence = normalize(pattern.pattern.confidence, stats);
    match_confidence * (0.7 + 0.3 * frequency_factor(pattern.pattern.frequency))
}

/// Whether a line may become a contextual boundary at all.
/// Contextual matching misfires on short noise lines; these guards filter them.
pub fn is_contextual_candidate(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && char_len(trimmed) < CONTEXT_MAX_LINE_CHARS
        && !is_purely_numeric(trimmed)
        && !is_page_marker(trimmed)
}

/// `neighbor` must already be trimmed and lower-cased.
pub fn context_matches(neighbor: &str, pattern: &ContextualPattern) -> bool {
    neighbor.contains(pattern.text.as_str())
}

pub fn contextual_confidence(pattern: &ContextualPattern, context_weight: f64) -> f64 {
    pattern.confidence * context_weight
}
