use serde::Serialize;

use crate::audio::{AudioError, SpeechSynthesizer};
use crate::config::{Config, ConfigError};

pub const MODEL_ID: &str = "eleven_multilingual_v2";

#[derive(Serialize)]
struct ElevenLabsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Serialize, Debug, Clone, Copy)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.8,
            similarity_boost: 0.9,
            style: 0.4,
            use_speaker_boost: true,
        }
    }
}

pub struct ElevenLabsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    voice_id: String,
    voice_settings: VoiceSettings,
}

impl ElevenLabsClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        voice_id: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            voice_id: voice_id.into(),
            voice_settings: VoiceSettings::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.elevenlabs_api_key()?,
            config.elevenlabs_api_url.as_str(),
            config.voice_id.as_str(),
        ))
    }
}

impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AudioError> {
        let request = ElevenLabsRequest {
            text,
            model_id: MODEL_ID,
            voice_settings: self.voice_settings,
        };
        let url = format!("{}/text-to-speech/{}", self.base_url, self.voice_id);

        let response = self
            .client
            .post(&url)
            .header("Accept", "audio/mpeg")
            .header("xi-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AudioError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // `detail` is a string or an object depending on the failure
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| match body.get("detail") {
                    Some(serde_json::Value::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                    None => None,
                })
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(AudioError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AudioError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
