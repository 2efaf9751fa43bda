// File: src/heuristics.rs
//! Rule-based post-processing. Both functions are pure and never look at
//! the trained model.
use crate::core::types::{Confidence, DecisionScores, Level, Priority};

pub const HIGH_PRIORITY_KEYWORDS: [&str; 5] = ["urgent", "critical", "blocking", "down", "fail"];
pub const MEDIUM_PRIORITY_KEYWORDS: [&str; 4] = ["slow", "warn", "error", "bug"];

/// Scores strictly above this are `High`.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 1.0;
/// Scores strictly above this (and not above the high threshold) are `Medium`.
pub const MEDIUM_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Case-insensitive substring match, high keywords first.
/// "failed" and "downtime" count as matches.
pub fn priority(text: &str) -> Priority {
    let lowered = text.to_lowercase();
    if HIGH_PRIORITY_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Level::High
    } else if MEDIUM_PRIORITY_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Level::Medium
    } else {
        Level::Low
    }
}

/// Maps a single decision score to a confidence label.
pub fn confidence_from_score(max_score: f64) -> Confidence {
    if max_score > HIGH_CONFIDENCE_THRESHOLD {
        Level::High
    } else if max_score > MEDIUM_CONFIDENCE_THRESHOLD {
        Level::Medium
    } else {
        Level::Low
    }
}

/// Confidence of the best class. An empty score vector is `Low`.
pub fn confidence(scores: &DecisionScores) -> Confidence {
    scores.max_score().map_or(Level::Low, confidence_from_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Category;

    #[test]
    fn priority_is_case_insensitive() {
        assert_eq!(priority("URGENT issue"), Level::High);
        assert_eq!(priority("urgent issue"), Level::High);
    }

    #[test]
    fn high_keywords_win_over_medium() {
        assert_eq!(priority("urgent slow response"), Level::High);
        assert_eq!(priority("slow response"), Level::Medium);
        assert_eq!(priority("Printer jamming"), Level::Low);
    }

    #[test]
    fn substring_matches_count() {
        assert_eq!(priority("Upload failed"), Level::High);
        assert_eq!(priority("OS activated warning"), Level::Medium);
        assert_eq!(priority("debugging"), Level::Medium);
    }

    #[test]
    fn confidence_thresholds_are_exclusive() {
        assert_eq!(confidence_from_score(1.0), Level::Medium);
        assert_eq!(confidence_from_score(1.01), Level::High);
        assert_eq!(confidence_from_score(0.5), Level::Low);
        assert_eq!(confidence_from_score(0.51), Level::Medium);
        assert_eq!(confidence_from_score(-2.0), Level::Low);
    }

    #[test]
    fn confidence_uses_the_maximum_score() {
        let scores = DecisionScores(vec![
            (Category::Hardware, -0.9),
            (Category::Network, 1.2),
            (Category::Software, 0.7),
        ]);
        assert_eq!(confidence(&scores), Level::High);
        assert_eq!(confidence(&DecisionScores(vec![])), Level::Low);
    }
}
