//! Named-slot persistence for lessons, audio and learner progress.
//!
//! Every value is a string stored under a fixed key. Audio is stored as
//! base64 in positional slots `lesson1_audio_chunk1`, `lesson1_audio_chunk2`,
//! ... and read back until the first missing slot.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::Engine;
use chrono::{DateTime, Utc};
use darija_utils::Lesson;
use darija_utils::gamification::UserData;
use darija_utils::quiz::QuizResults;
use serde::{Deserialize, Serialize};

use crate::audio::{AudioFile, audio_filename};

pub const LESSON_TEXT_KEY: &str = "lesson1_text";
pub const LESSON_COMPLETE_KEY: &str = "lesson1_complete";
pub const USER_DATA_KEY: &str = "alfoxai_user_data";
pub const TOTAL_SCORE_KEY: &str = "totalScore";
pub const QUIZ_SCORE_KEY: &str = "quiz1Score";
pub const QUIZ_COMPLETED_KEY: &str = "quiz1Completed";
pub const QUIZ_PASSED_KEY: &str = "quiz1Passed";
pub const LESSON_COMPLETED_KEY: &str = "lesson1Completed";

pub const LESSON_FORMAT_VERSION: &str = "2.0";

pub fn audio_key(position: usize) -> String {
    format!("lesson1_audio_chunk{position}")
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to access store: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt value in store: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Corrupt audio in store: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Vec<String>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.slots.keys().cloned().collect()
    }
}

/// A store backed by a single JSON object file, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    slots: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let slots = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, slots })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.slots)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value);
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.slots.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.slots.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLesson {
    pub lesson: Lesson,
    /// Audio metadata; the bytes themselves live in the positional audio slots.
    pub audio: Vec<AudioFile>,
    pub generated_at: DateTime<Utc>,
    pub version: String,
}

impl CompleteLesson {
    pub fn new(lesson: Lesson, audio: Vec<AudioFile>, generated_at: DateTime<Utc>) -> Self {
        Self {
            lesson,
            audio,
            generated_at,
            version: LESSON_FORMAT_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedContent {
    pub lesson: Lesson,
    pub audio: Vec<AudioFile>,
}

/// Saves a lesson, replacing any previously stored one.
pub fn save_content<K: KeyValueStore>(
    store: &mut K,
    complete: &CompleteLesson,
) -> Result<(), StorageError> {
    remove_audio_slots(store)?;

    store.set(LESSON_TEXT_KEY, serde_json::to_string(&complete.lesson)?)?;
    let engine = base64::engine::general_purpose::STANDARD;
    for (i, audio) in complete.audio.iter().enumerate() {
        store.set(&audio_key(i + 1), engine.encode(&audio.data))?;
    }
    store.set(LESSON_COMPLETE_KEY, serde_json::to_string(complete)?)?;

    log::info!(
        "Content saved: text + {} audio files",
        complete.audio.len()
    );
    Ok(())
}

/// Loads the lesson text and its audio. `None` unless both are present.
///
/// Audio chunk ids are the slot positions, not the ids of the lesson chunks.
pub fn load_content<K: KeyValueStore>(store: &K) -> Result<Option<LoadedContent>, StorageError> {
    let engine = base64::engine::general_purpose::STANDARD;
    let mut audio = Vec::new();
    let mut position = 1;
    while let Some(encoded) = store.get(&audio_key(position)) {
        audio.push(AudioFile {
            chunk_id: position as u32,
            filename: audio_filename(position - 1),
            data: engine.decode(encoded)?,
        });
        position += 1;
    }

    let Some(text) = store.get(LESSON_TEXT_KEY) else {
        log::info!("No saved content");
        return Ok(None);
    };
    if audio.is_empty() {
        log::info!("No saved content");
        return Ok(None);
    }

    let lesson = serde_json::from_str(&text)?;
    log::info!("Content loaded: text + audio files");
    Ok(Some(LoadedContent { lesson, audio }))
}

/// The lesson and its metadata, without audio bytes.
pub fn load_lesson<K: KeyValueStore>(store: &K) -> Result<Option<CompleteLesson>, StorageError> {
    store
        .get(LESSON_COMPLETE_KEY)
        .map(|saved| serde_json::from_str(&saved))
        .transpose()
        .map_err(StorageError::from)
}

/// A saved lesson that can be played: text plus at least one audio slot.
///
/// Metadata comes from `lesson1_complete` when present. Audio entries are
/// the positional slots returned by [`load_content`].
pub fn load_playable<K: KeyValueStore>(
    store: &K,
) -> Result<Option<CompleteLesson>, StorageError> {
    let Some(content) = load_content(store)? else {
        return Ok(None);
    };
    let complete = match load_lesson(store)? {
        Some(record) => CompleteLesson {
            lesson: content.lesson,
            audio: content.audio,
            generated_at: record.generated_at,
            version: record.version,
        },
        None => CompleteLesson::new(content.lesson, content.audio, Utc::now()),
    };
    Ok(Some(complete))
}

pub fn clear_lesson_data<K: KeyValueStore>(store: &mut K) -> Result<(), StorageError> {
    store.remove(LESSON_COMPLETE_KEY)?;
    store.remove(LESSON_TEXT_KEY)?;
    remove_audio_slots(store)?;
    log::info!("Lesson data cleared");
    Ok(())
}

fn remove_audio_slots<K: KeyValueStore>(store: &mut K) -> Result<(), StorageError> {
    let mut position = 1;
    while store.get(&audio_key(position)).is_some() {
        store.remove(&audio_key(position))?;
        position += 1;
    }
    Ok(())
}

/// Missing or partial records are filled with defaults.
pub fn load_user_data<K: KeyValueStore>(store: &K) -> Result<UserData, StorageError> {
    match store.get(USER_DATA_KEY) {
        Some(saved) => Ok(serde_json::from_str(&saved)?),
        None => Ok(UserData::default()),
    }
}

pub fn save_user_data<K: KeyValueStore>(
    store: &mut K,
    user: &UserData,
) -> Result<(), StorageError> {
    store.set(USER_DATA_KEY, serde_json::to_string(user)?)
}

pub fn reset_user_data<K: KeyValueStore>(store: &mut K) -> Result<(), StorageError> {
    store.remove(USER_DATA_KEY)
}

fn get_flag<K: KeyValueStore>(store: &K, key: &str) -> bool {
    store.get(key).is_some_and(|v| v == "true")
}

/// Adds the quiz score to the running total and records the quiz flags.
/// Returns the new total.
pub fn record_quiz_result<K: KeyValueStore>(
    store: &mut K,
    results: &QuizResults,
) -> Result<u32, StorageError> {
    let total = store
        .get(TOTAL_SCORE_KEY)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(0)
        + results.score;
    store.set(TOTAL_SCORE_KEY, total.to_string())?;
    store.set(QUIZ_SCORE_KEY, results.score.to_string())?;
    if results.is_perfect() {
        store.set(QUIZ_COMPLETED_KEY, "true".to_string())?;
        store.set(QUIZ_PASSED_KEY, "true".to_string())?;
    }
    Ok(total)
}

pub fn quiz_passed<K: KeyValueStore>(store: &K) -> bool {
    get_flag(store, QUIZ_PASSED_KEY)
}

pub fn mark_lesson_completed<K: KeyValueStore>(store: &mut K) -> Result<(), StorageError> {
    store.set(LESSON_COMPLETED_KEY, "true".to_string())
}

pub fn lesson_completed<K: KeyValueStore>(store: &K) -> bool {
    get_flag(store, LESSON_COMPLETED_KEY)
}
