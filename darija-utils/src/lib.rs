pub mod gamification;
pub mod patterns;
pub mod playback;
pub mod quality;
pub mod quiz;
pub mod text_cleanup;
pub mod validation;

use serde::{Deserialize, Serialize};

/// One timed segment of a lesson. Each chunk is narrated as one audio file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LessonChunk {
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub time_start: String,
    #[serde(default)]
    pub time_end: String,
    // models often answer with `arabicText`/`englishSummary`
    #[serde(default, alias = "arabicText")]
    pub dialect_text: String,
    #[serde(default, alias = "englishSummary")]
    pub summary: String,
    /// Advisory only, never checked against the text.
    #[serde(default)]
    pub word_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub estimated_time: String,
    pub chunks: Vec<LessonChunk>,
}

impl Lesson {
    /// Applies `f` to the dialect text of every chunk, in order.
    pub fn map_dialect_text(mut self, f: impl Fn(&str) -> String) -> Self {
        for chunk in &mut self.chunks {
            chunk.dialect_text = f(&chunk.dialect_text);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_accepts_prompt_field_names() {
        let json = r#"{
            "id": 1,
            "title": "شنو هو البحث؟",
            "timeStart": "0:00",
            "timeEnd": "2:30",
            "arabicText": "أ صاحبي، واش عرفتي",
            "englishSummary": "What search is",
            "wordCount": 350
        }"#;
        let chunk: LessonChunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.dialect_text, "أ صاحبي، واش عرفتي");
        assert_eq!(chunk.summary, "What search is");
        assert_eq!(chunk.word_count, 350);
    }

    #[test]
    fn test_lesson_serializes_camel_case() {
        let lesson = Lesson {
            title: "t".to_string(),
            estimated_time: "10:00".to_string(),
            chunks: vec![LessonChunk {
                id: 1,
                dialect_text: "x".to_string(),
                ..Default::default()
            }],
        };
        let value = serde_json::to_value(&lesson).unwrap();
        assert_eq!(value["estimatedTime"], "10:00");
        assert_eq!(value["chunks"][0]["dialectText"], "x");
    }

    #[test]
    fn test_lesson_without_chunks_is_rejected() {
        assert!(serde_json::from_str::<Lesson>(r#"{"title": "t"}"#).is_err());
    }
}
