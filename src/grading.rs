//! Heuristic auto-grading of free-text task answers.
//!
//! The grade is a suggestion for the reviewer, built from two signals: how
//! close the answer comes to the expected length, and how many expected
//! keywords it mentions. Integer arithmetic only.

use crate::models::{GradeReport, GradingCriteria};

/// Default score needed for a passing suggestion.
pub const DEFAULT_PASS_SCORE: u8 = 70;

/// Weight of the length signal when keywords are configured. The rest goes to keywords.
const LENGTH_WEIGHT: u32 = 40;

#[derive(Debug, Clone, Copy)]
pub struct AutoGrader {
    pass_score: u8,
}

impl Default for AutoGrader {
    fn default() -> Self {
        Self::new(DEFAULT_PASS_SCORE)
    }
}

impl AutoGrader {
    pub fn new(pass_score: u8) -> Self {
        Self {
            pass_score: pass_score.min(100),
        }
    }

    pub fn pass_score(&self) -> u8 {
        self.pass_score
    }

    pub fn grade(&self, answer: &str, criteria: &GradingCriteria) -> GradeReport {
        let word_count = count_words(answer);
        let lowered = answer.to_lowercase();

        let (matched_keywords, missing_keywords): (Vec<String>, Vec<String>) = criteria
            .keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .cloned()
            .partition(|k| lowered.contains(&k.trim().to_lowercase()));

        let length_part = if criteria.min_words == 0 {
            100
        } else {
            word_count.min(criteria.min_words) * 100 / criteria.min_words
        };

        let keyword_total = (matched_keywords.len() + missing_keywords.len()) as u32;
        let score = if word_count == 0 {
            0
        } else if keyword_total == 0 {
            length_part
        } else {
            let matched = matched_keywords.len() as u32;
            (length_part * LENGTH_WEIGHT * keyword_total + matched * (100 - LENGTH_WEIGHT) * 100)
                / (100 * keyword_total)
        };
        let score = score.min(100) as u8;

        GradeReport {
            score,
            passed: score >= self.pass_score,
            word_count,
            matched_keywords,
            missing_keywords,
        }
    }
}

/// Whitespace-separated tokens with at least one letter or digit.
fn count_words(text: &str) -> u32 {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(min_words: u32, keywords: &[&str]) -> GradingCriteria {
        GradingCriteria {
            min_words,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn punctuation_is_not_a_word() {
        assert_eq!(count_words("one — two , three"), 3);
        assert_eq!(count_words("   "), 0);
    }

    #[test]
    fn empty_answer_scores_zero() {
        let report = AutoGrader::default().grade("", &criteria(0, &[]));
        assert_eq!(report.score, 0);
        assert!(!report.passed);
    }

    #[test]
    fn length_only_scores_proportionally() {
        let report = AutoGrader::default().grade("one two three four five", &criteria(10, &[]));
        assert_eq!(report.word_count, 5);
        assert_eq!(report.score, 50);
        assert!(!report.passed);
    }

    #[test]
    fn long_answer_caps_length_signal() {
        let answer = "word ".repeat(50);
        let report = AutoGrader::default().grade(&answer, &criteria(10, &[]));
        assert_eq!(report.score, 100);
        assert!(report.passed);
    }

    #[test]
    fn keywords_match_case_insensitively() {
        let report = AutoGrader::default().grade(
            "The Customer asked for a REFUND yesterday",
            &criteria(0, &["customer", "refund", "invoice"]),
        );
        assert_eq!(report.matched_keywords, vec!["customer", "refund"]);
        assert_eq!(report.missing_keywords, vec!["invoice"]);
        // 40 for length + 60 * 2/3 for keywords
        assert_eq!(report.score, 80);
        assert!(report.passed);
    }

    #[test]
    fn pass_score_is_configurable() {
        let grader = AutoGrader::new(90);
        let report = grader.grade("a b c d e f g h", &criteria(10, &[]));
        assert_eq!(report.score, 80);
        assert!(!report.passed);
    }

    #[test]
    fn blank_keywords_are_ignored() {
        let report = AutoGrader::default().grade("hello there", &criteria(2, &["", "  "]));
        assert!(report.matched_keywords.is_empty());
        assert!(report.missing_keywords.is_empty());
        assert_eq!(report.score, 100);
    }
}
