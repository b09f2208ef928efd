use std::time::Duration;

use darija_utils::{Lesson, text_cleanup};
use serde::{Deserialize, Serialize};

/// Pause between synthesis requests.
pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("ElevenLabs API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Response is not MP3 audio ({0} bytes)")]
    InvalidAudio(usize),
}

#[allow(async_fn_in_trait)]
pub trait SpeechSynthesizer {
    /// Synthesizes already-prepared speech text into MP3 bytes.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AudioError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFile {
    pub chunk_id: u32,
    pub filename: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Filenames follow the chunk's position in the lesson, not its id.
pub fn audio_filename(index: usize) -> String {
    format!("lesson1_chunk{}.mp3", index + 1)
}

pub fn is_valid_mp3_data(bytes: &[u8]) -> bool {
    if bytes.len() < 2 {
        return false;
    }

    // ID3 tag or MPEG frame sync
    bytes.starts_with(b"ID3") || (bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0)
}

/// Prepares `text` for speech and synthesizes it. Failures are logged and yield `None`.
pub async fn generate_audio<S: SpeechSynthesizer>(
    synthesizer: &S,
    text: &str,
    filename: &str,
) -> Option<Vec<u8>> {
    log::info!("Generating audio for: {filename}");
    let prepared = text_cleanup::prepare_for_speech(text);

    match synthesizer.synthesize(&prepared).await {
        Ok(bytes) if is_valid_mp3_data(&bytes) => {
            log::info!(
                "Audio generated successfully for: {filename} ({} bytes)",
                bytes.len()
            );
            Some(bytes)
        }
        Ok(bytes) => {
            log::warn!("{}", AudioError::InvalidAudio(bytes.len()));
            None
        }
        Err(e) => {
            log::error!("Error generating audio for {filename}: {e}");
            None
        }
    }
}

/// Synthesizes every chunk in order, one request at a time.
///
/// `on_chunk(index, total)` is called before each chunk. Chunks whose audio
/// fails are skipped, so the result can be shorter than the lesson.
pub async fn generate_lesson_audio<S: SpeechSynthesizer>(
    synthesizer: &S,
    lesson: &Lesson,
    rate_limit: Duration,
    mut on_chunk: impl FnMut(usize, usize),
) -> Vec<AudioFile> {
    let total = lesson.chunks.len();
    let mut files = Vec::with_capacity(total);

    for (i, chunk) in lesson.chunks.iter().enumerate() {
        log::info!("Processing audio {}/{total}...", i + 1);
        on_chunk(i, total);

        let filename = audio_filename(i);
        match generate_audio(synthesizer, &chunk.dialect_text, &filename).await {
            Some(data) => files.push(AudioFile {
                chunk_id: chunk.id,
                filename,
                data,
            }),
            None => log::warn!("Failed to generate audio for chunk {}", i + 1),
        }

        if !rate_limit.is_zero() {
            tokio::time::sleep(rate_limit).await;
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use darija_utils::LessonChunk;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubSynthesizer {
        requests: Mutex<Vec<String>>,
    }

    impl SpeechSynthesizer for StubSynthesizer {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AudioError> {
            self.requests.lock().unwrap().push(text.to_string());
            if text.contains("فشل") {
                Err(AudioError::Api {
                    status: 500,
                    message: "boom".to_string(),
                })
            } else if text.contains("فارغ") {
                Ok(b"<html>".to_vec())
            } else {
                Ok(b"ID3\x04rest-of-mp3".to_vec())
            }
        }
    }

    fn lesson(texts: &[&str]) -> Lesson {
        Lesson {
            title: "test".to_string(),
            estimated_time: "10:00".to_string(),
            chunks: texts
                .iter()
                .enumerate()
                .map(|(i, text)| LessonChunk {
                    id: 10 + i as u32,
                    dialect_text: text.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_failed_chunks_leave_gaps() {
        let synthesizer = StubSynthesizer::default();
        let lesson = lesson(&["واش عرفتي.", "فشل", "فارغ", "بصح"]);
        let mut progress = Vec::new();

        let files = generate_lesson_audio(&synthesizer, &lesson, Duration::ZERO, |i, total| {
            progress.push((i, total))
        })
        .await;

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].chunk_id, 10);
        assert_eq!(files[0].filename, "lesson1_chunk1.mp3");
        assert_eq!(files[1].chunk_id, 13);
        assert_eq!(files[1].filename, "lesson1_chunk4.mp3");
        assert_eq!(progress, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
    }

    #[tokio::test]
    async fn test_text_is_prepared_for_speech() {
        let synthesizer = StubSynthesizer::default();
        generate_audio(&synthesizer, "واش عرفتي.", "x.mp3").await.unwrap();
        let requests = synthesizer.requests.lock().unwrap();
        assert!(requests[0].contains(r#"<break time="0.7s"/>"#));
    }

    #[test]
    fn test_mp3_detection() {
        assert!(is_valid_mp3_data(b"ID3\x03"));
        assert!(is_valid_mp3_data(&[0xFF, 0xFB, 0x90]));
        assert!(!is_valid_mp3_data(b"{\"detail\":\"quota\"}"));
        assert!(!is_valid_mp3_data(&[0xFF]));
    }
}
