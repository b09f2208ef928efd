use std::path::PathBuf;

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
pub const DEFAULT_ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";
/// Jawad, a Darija-speaking voice.
pub const DEFAULT_VOICE_ID: &str = "PmGnwGtnBs40iau7JfoF";
pub const DEFAULT_STORE_PATH: &str = ".lesson-store.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
}

/// Settings read from the environment (and a `.env` file, if the binary loaded one).
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub openai_model: String,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_api_url: String,
    pub voice_id: String,
    pub store_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_api_url: non_empty("OPENAI_API_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
            openai_model: non_empty("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            elevenlabs_api_key: non_empty("ELEVENLABS_API_KEY"),
            elevenlabs_api_url: non_empty("ELEVENLABS_API_URL")
                .unwrap_or_else(|| DEFAULT_ELEVENLABS_API_URL.to_string()),
            voice_id: non_empty("ELEVENLABS_VOICE_ID")
                .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
            store_path: non_empty("LESSON_STORE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
        }
    }

    pub fn openai_api_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))
    }

    pub fn elevenlabs_api_key(&self) -> Result<&str, ConfigError> {
        self.elevenlabs_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("ELEVENLABS_API_KEY"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.openai_model, "gpt-4");
        assert_eq!(config.voice_id, DEFAULT_VOICE_ID);
        assert_eq!(config.store_path, PathBuf::from(".lesson-store.json"));
        assert_eq!(
            config.openai_api_key().unwrap_err().to_string(),
            "OPENAI_API_KEY not set"
        );
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let env = HashMap::from([
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("ELEVENLABS_API_KEY", "   "),
            ("LESSON_STORE", "/tmp/store.json"),
        ]);
        let config = Config::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.openai_api_key().unwrap(), "sk-test");
        assert_eq!(config.openai_model, "gpt-4o");
        assert!(config.elevenlabs_api_key().is_err());
        assert_eq!(config.store_path, PathBuf::from("/tmp/store.json"));
    }
}
