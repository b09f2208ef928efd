//! Whole-lesson acceptance built on per-chunk quality verdicts.

use serde::Serialize;

use crate::Lesson;
use crate::quality::{self, QualityVerdict};

/// Share of chunks (in percent) that must pass for a lesson to be accepted.
pub const ACCEPTANCE_RATIO: f64 = 75.0;

#[derive(Clone, Debug, Serialize)]
pub struct ChunkReport {
    pub chunk_id: u32,
    pub title: String,
    /// `None` for chunks without dialect text; those are not scored.
    pub verdict: Option<QualityVerdict>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LessonQualityReport {
    pub chunks: Vec<ChunkReport>,
    pub passed_chunks: usize,
    pub total_chunks: usize,
    pub ratio: f64,
    pub accepted: bool,
}

pub fn lesson_report(lesson: &Lesson) -> LessonQualityReport {
    let chunks = lesson
        .chunks
        .iter()
        .map(|chunk| ChunkReport {
            chunk_id: chunk.id,
            title: chunk.title.clone(),
            verdict: (!chunk.dialect_text.is_empty())
                .then(|| quality::score(&chunk.dialect_text)),
        })
        .collect::<Vec<_>>();

    let passed_chunks = chunks
        .iter()
        .filter(|c| c.verdict.as_ref().is_some_and(|v| v.passed))
        .count();
    let total_chunks = lesson.chunks.len();
    let ratio = if passed_chunks > 0 {
        passed_chunks as f64 / total_chunks as f64 * 100.0
    } else {
        0.0
    };

    LessonQualityReport {
        chunks,
        passed_chunks,
        total_chunks,
        ratio,
        accepted: ratio >= ACCEPTANCE_RATIO,
    }
}

/// Accepts a lesson when at least 75% of its chunks pass the quality scorer.
pub fn validate_lesson(lesson: &Lesson) -> bool {
    let report = lesson_report(lesson);
    for chunk in &report.chunks {
        let status = match &chunk.verdict {
            Some(v) if v.passed => "valid",
            Some(_) => "invalid",
            None => "empty",
        };
        log::debug!("Chunk \"{}\": {status} Darija", chunk.title);
    }
    log::info!(
        "Overall Darija quality: {:.0}% ({}/{} chunks valid)",
        report.ratio,
        report.passed_chunks,
        report.total_chunks
    );
    report.accepted
}

/// Validates loosely-typed JSON. Anything that is not a well-formed lesson is rejected.
pub fn validate_lesson_value(value: &serde_json::Value) -> bool {
    match serde_json::from_value::<Lesson>(value.clone()) {
        Ok(lesson) => validate_lesson(&lesson),
        Err(e) => {
            log::warn!("Invalid lesson structure: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LessonChunk;

    const GOOD: &str = "أ صاحبي، باغي نقوليك واش عرفتي هاد الشي مهم ف الدار";
    const BAD: &str = "لديك شيء مهم";

    fn lesson_of(texts: &[&str]) -> Lesson {
        Lesson {
            title: "test".to_string(),
            estimated_time: "10:00".to_string(),
            chunks: texts
                .iter()
                .enumerate()
                .map(|(i, text)| LessonChunk {
                    id: i as u32 + 1,
                    title: format!("chunk {}", i + 1),
                    dialect_text: text.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn test_three_of_four_is_accepted() {
        assert!(validate_lesson(&lesson_of(&[GOOD, GOOD, GOOD, BAD])));
    }

    #[test]
    fn test_two_of_four_is_rejected() {
        let report = lesson_report(&lesson_of(&[GOOD, BAD, GOOD, BAD]));
        assert_eq!(report.passed_chunks, 2);
        assert_eq!(report.ratio, 50.0);
        assert!(!report.accepted);
    }

    #[test]
    fn test_empty_chunks_count_against_the_lesson() {
        let report = lesson_report(&lesson_of(&[GOOD, GOOD, GOOD, ""]));
        assert_eq!(report.total_chunks, 4);
        assert!(report.chunks[3].verdict.is_none());
        assert!(report.accepted);

        let report = lesson_report(&lesson_of(&[GOOD, GOOD, "", ""]));
        assert!(!report.accepted);
    }

    #[test]
    fn test_no_chunks_is_rejected() {
        let report = lesson_report(&lesson_of(&[]));
        assert_eq!(report.ratio, 0.0);
        assert!(!report.accepted);
    }

    #[test]
    fn test_malformed_value_is_rejected() {
        assert!(!validate_lesson_value(&serde_json::json!({"title": "x"})));
        assert!(!validate_lesson_value(&serde_json::json!(null)));
        assert!(!validate_lesson_value(&serde_json::json!({"chunks": "nope"})));
    }

    #[test]
    fn test_value_with_prompt_field_names() {
        let value = serde_json::json!({
            "title": "x",
            "chunks": [
                {"id": 1, "arabicText": GOOD},
                {"id": 2, "arabicText": GOOD},
                {"id": 3, "arabicText": GOOD},
                {"id": 4, "arabicText": GOOD}
            ]
        });
        assert!(validate_lesson_value(&value));
    }
}
