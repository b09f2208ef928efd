//! Dialect-quality scoring for a single block of text.

use serde::Serialize;

use crate::patterns::{GRAMMAR_MARKERS, MANDATORY_EXPRESSIONS, PATTERNS, find_in};

pub const PASS_THRESHOLD: i32 = 70;

const MANDATORY_MIN: usize = 3;
const MANDATORY_POINTS: i32 = 40;
const GRAMMAR_MIN: usize = 2;
const GRAMMAR_POINTS: i32 = 30;
const FORBIDDEN_POINTS: i32 = 30;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QualityVerdict {
    /// Unclamped: a text with forbidden phrasing and nothing else scores -30.
    pub score: i32,
    pub passed: bool,
    pub found_essential_count: usize,
    pub found_grammar_count: usize,
    pub forbidden_found: Vec<&'static str>,
    pub issues: Vec<String>,
}

impl QualityVerdict {
    fn empty_input() -> Self {
        Self {
            score: 0,
            passed: false,
            found_essential_count: 0,
            found_grammar_count: 0,
            forbidden_found: Vec::new(),
            issues: vec!["No text to score".to_string()],
        }
    }
}

/// Scores `text` against the pattern table.
///
/// - at least 3 of the 7 mandatory expressions: +40
/// - at least 2 of the 6 grammar markers: +30
/// - no forbidden phrase: +30, otherwise -30
///
/// The verdict passes at 70 or more.
pub fn score(text: &str) -> QualityVerdict {
    if text.is_empty() {
        return QualityVerdict::empty_input();
    }

    let mut score = 0;
    let mut issues = Vec::new();

    let found_essential = find_in(text, &MANDATORY_EXPRESSIONS);
    if found_essential.len() >= MANDATORY_MIN {
        score += MANDATORY_POINTS;
    } else {
        issues.push(format!(
            "Only {}/{} mandatory Darija expressions found",
            found_essential.len(),
            MANDATORY_EXPRESSIONS.len()
        ));
    }

    let found_grammar = find_in(text, &GRAMMAR_MARKERS);
    if found_grammar.len() >= GRAMMAR_MIN {
        score += GRAMMAR_POINTS;
    } else {
        issues.push(format!(
            "Only {} Darija grammar patterns found",
            found_grammar.len()
        ));
    }

    let forbidden_found = find_in(text, PATTERNS.forbidden);
    if forbidden_found.is_empty() {
        score += FORBIDDEN_POINTS;
    } else {
        issues.push(format!(
            "Standard Arabic found: {}",
            forbidden_found.join(", ")
        ));
        score -= FORBIDDEN_POINTS;
    }

    log::debug!("Darija quality score: {score}/100");
    if !issues.is_empty() {
        log::debug!("Issues: {issues:?}");
    }

    QualityVerdict {
        score,
        passed: score >= PASS_THRESHOLD,
        found_essential_count: found_essential.len(),
        found_grammar_count: found_grammar.len(),
        forbidden_found,
        issues,
    }
}

/// Like [`score`], for values that may be missing entirely.
pub fn score_optional(text: Option<&str>) -> QualityVerdict {
    match text {
        Some(text) => score(text),
        None => QualityVerdict::empty_input(),
    }
}
