use std::time::Duration;

use chrono::Utc;

use crate::audio::{self, SpeechSynthesizer};
use crate::orchestrator::{Backoff, GenerationError, LessonSource, Orchestrator};
use crate::storage::{self, CompleteLesson, KeyValueStore, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Generates lesson text, narrates each chunk and saves the result.
///
/// Pass `None` as `synthesizer` to save the lesson without audio. `progress`
/// receives a status message and a percentage.
pub async fn generate_complete_lesson<S, B, T, K>(
    orchestrator: &Orchestrator<S, B>,
    synthesizer: Option<&T>,
    store: &mut K,
    rate_limit: Duration,
    progress: &mut dyn FnMut(&str, f32),
) -> Result<CompleteLesson, PipelineError>
where
    S: LessonSource,
    B: Backoff,
    T: SpeechSynthesizer,
    K: KeyValueStore,
{
    log::info!("Starting Darija lesson generation...");
    progress("Generating authentic Darija content...", 10.0);

    let lesson = match orchestrator.generate_lesson().await {
        Ok(lesson) => lesson,
        Err(e) => {
            progress(&format!("Error: {e}"), 0.0);
            return Err(e.into());
        }
    };
    log::info!("Lesson content generated successfully");

    let audio = match synthesizer {
        Some(synthesizer) => {
            progress("Generating Darija audio...", 40.0);
            audio::generate_lesson_audio(synthesizer, &lesson, rate_limit, |i, total| {
                let percent = 40.0 + (i as f32 / total as f32) * 50.0;
                progress(&format!("Generating audio {}/{total}...", i + 1), percent);
            })
            .await
        }
        None => {
            log::info!("Skipping audio generation");
            Vec::new()
        }
    };

    progress("Saving lesson...", 95.0);
    let complete = CompleteLesson::new(lesson, audio, Utc::now());
    storage::save_content(store, &complete)?;

    progress("Darija lesson generated successfully!", 100.0);
    Ok(complete)
}

/// Returns the saved lesson if it has text and audio, otherwise generates a new one.
pub async fn load_or_generate<S, B, T, K>(
    orchestrator: &Orchestrator<S, B>,
    synthesizer: Option<&T>,
    store: &mut K,
    rate_limit: Duration,
    progress: &mut dyn FnMut(&str, f32),
) -> Result<CompleteLesson, PipelineError>
where
    S: LessonSource,
    B: Backoff,
    T: SpeechSynthesizer,
    K: KeyValueStore,
{
    match storage::load_playable(store) {
        Ok(Some(saved)) => {
            log::info!("Loaded lesson from storage");
            return Ok(saved);
        }
        Ok(None) => log::info!("No saved lesson with audio, generating"),
        Err(e) => log::warn!("Saved lesson unreadable, regenerating: {e}"),
    }
    generate_complete_lesson(orchestrator, synthesizer, store, rate_limit, progress).await
}
