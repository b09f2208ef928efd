pub mod audio;
pub mod config;
pub mod elevenlabs;
pub mod openai;
pub mod orchestrator;
pub mod pipeline;
pub mod prompt;
pub mod storage;

pub use audio::{AudioError, AudioFile, SpeechSynthesizer};
pub use orchestrator::{GenerationError, LessonSource, Orchestrator};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
