// Text Processing Service
// Line handling shared by the document classifier and the boundary detector

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Normalize line endings (`\r\n` and bare `\r` become `\n`).
/// Scanned exports mix both; everything downstream splits on `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Split a document into lines after line-ending normalization.
pub fn split_lines(text: &str) -> Vec<String> {
    normalize_line_endings(text)
        .lines()
        .map(|ln| ln.to_string())
        .collect()
}

/// Lower-case and trim a line for pattern comparison.
pub fn normalize_line(line: &str) -> String {
    line.trim().to_lowercase()
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Unique lower-cased whitespace-separated tokens.
pub fn unique_tokens(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}

fn numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("numeric regex"))
}

fn page_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^page\s+\d+").expect("page marker regex"))
}

/// True when the trimmed line is nothing but digits.
pub fn is_purely_numeric(line: &str) -> bool {
    numeric_re().is_match(line.trim())
}

/// True for page-number markers such as "Page 3" or "page 3 of 12".
pub fn is_page_marker(line: &str) -> bool {
    page_marker_re().is_match(line.trim())
}
