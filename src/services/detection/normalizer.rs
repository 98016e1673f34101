// Confidence Normalizer
// Rescales a raw pattern confidence into the category's observed band,
// then blends toward the category average to damp sample noise.

use crate::models::SectionStats;

const SCALED_WEIGHT: f64 = 0.7;
const AVERAGE_WEIGHT: f64 = 0.3;

/// Normalize a raw confidence in [0, 1] against the category statistics.
///
/// Degenerate stats (`min == max`) return the category average unchanged.
pub fn normalize(raw_confidence: f64, stats: &SectionStats) -> f64 {
    if stats.is_degenerate() {
        return stats.average;
    }
    let scaled = stats.min + raw_confidence * (stats.max - stats.min);
    SCALED_WEIGHT * scaled + AVERAGE_WEIGHT * stats.average
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> SectionStats {
        SectionStats::new("SYMPTOMS", 0.2, 0.8, 0.5)
    }

    #[test]
    fn test_extremes_map_to_band_edges() {
        let s = stats();
        assert!((normalize(0.0, &s) - (0.7 * 0.2 + 0.3 * 0.5)).abs() < 1e-12);
        assert!((normalize(1.0, &s) - (0.7 * 0.8 + 0.3 * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_output_stays_within_band() {
        let s = stats();
        for i in 0..=10 {
            let v = normalize(i as f64 / 10.0, &s);
            assert!(v >= s.min && v <= s.max, "{} outside band", v);
        }
    }

    #[test]
    fn test_degenerate_returns_average() {
        let s = SectionStats::degenerate("DEMOGRAPHICS", 0.5);
        assert_eq!(normalize(0.0, &s), 0.5);
        assert_eq!(normalize(0.93, &s), 0.5);
        assert_eq!(normalize(1.0, &s), 0.5);
    }

    #[test]
    fn test_monotonic_in_raw_confidence() {
        let s = stats();
        assert!(normalize(0.9, &s) > normalize(0.4, &s));
    }
}
