use serde::{Deserialize, Serialize};

/// Position of a learner moving through a lesson's narrated chunks.
///
/// `chunk_count` is the number of chunks that actually have audio, which can
/// be lower than the lesson's chunk count when synthesis failed for some.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub current_chunk: usize,
    pub is_playing: bool,
    pub chunk_count: usize,
}

impl PlaybackState {
    pub fn new(chunk_count: usize) -> Self {
        Self {
            current_chunk: 0,
            is_playing: false,
            chunk_count,
        }
    }

    pub fn toggle(&mut self) {
        if self.chunk_count > 0 {
            self.is_playing = !self.is_playing;
        }
    }

    /// Returns whether the position changed. Playback keeps its play/pause state.
    pub fn next_chunk(&mut self) -> bool {
        if self.current_chunk + 1 < self.chunk_count {
            self.current_chunk += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_chunk(&mut self) -> bool {
        if self.current_chunk > 0 {
            self.current_chunk -= 1;
            true
        } else {
            false
        }
    }

    /// Called when the current chunk's audio finishes: advance, or stop after the last chunk.
    pub fn audio_ended(&mut self) {
        if !self.next_chunk() {
            self.is_playing = false;
        }
    }

    pub fn chunk_indicator(&self) -> String {
        format!("{}/{}", self.current_chunk + 1, self.chunk_count)
    }
}

/// Formats seconds as `m:ss`.
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0) as u64;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
