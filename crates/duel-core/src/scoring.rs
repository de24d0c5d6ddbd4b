use std::collections::HashSet;

/// Upper bound for any score.
pub const MAX_SCORE: f64 = 100.0;

/// Built-in fallback scorer: rewards vocabulary richness and length, capped
/// at [`MAX_SCORE`] and rounded to two decimals. Deterministic, which the
/// integration tests rely on.
pub fn heuristic_score(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let unique_words: HashSet<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let raw = unique_words.len() as f64 * 3.0 + text.chars().count() as f64 * 0.05;
    round2(raw.min(MAX_SCORE))
}

/// Clamp an externally-reported score into the valid range.
pub fn clamp_score(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    round2(value.clamp(0.0, MAX_SCORE))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
