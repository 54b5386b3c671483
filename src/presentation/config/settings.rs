use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File};
use serde::Deserialize;

use crate::application::ports::DecodeOptions;

use super::environment::Environment;

pub const DEFAULT_PRIMARY_PROMPT: &str = "Two languages coming in, code-switching between english and spanish, transcribe the audio as is, returning spanish when they are speaking spanish and english when they are speaking english";
pub const DEFAULT_LOG_FILTER: &str = "info,switchscribe=debug,tower_http=debug";
pub const DEFAULT_FALLBACK_PROMPT: &str =
    "Two languages coming in, code-switching between english and spanish";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub primary: PrimarySettings,
    pub fallback: FallbackSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
    pub request_timeout_secs: Option<u64>,
}

impl ServerSettings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostedProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Azure,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrimarySettings {
    pub provider: HostedProvider,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub prompt: String,
    pub azure_deployment: Option<String>,
    pub azure_api_version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FallbackSettings {
    pub model_id: String,
    pub chunk_duration_ms: u64,
    pub language: Option<String>,
    pub prompt: String,
    pub preload: bool,
    pub debug_dir: Option<String>,
}

impl FallbackSettings {
    pub fn chunk_duration(&self) -> Duration {
        Duration::from_millis(self.chunk_duration_ms)
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::transcribe(
            self.language.clone().filter(|l| !l.is_empty()),
            self.prompt.clone(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Local,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub scratch_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub json: bool,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Settings {
    /// Defaults, then `appsettings.<env>.*` if present, then `APP__*`
    /// environment variables. `GROQ_API_KEY` fills a missing hosted key.
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        let config = Self::builder()?
            .add_source(File::with_name(&environment.settings_file()).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings = Self::from_config(config)?;
        if settings.primary.api_key.as_deref().is_none_or(str::is_empty) {
            settings.primary.api_key = std::env::var("GROQ_API_KEY").ok();
        }
        Ok(settings)
    }

    /// Builder pre-populated with every default value.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, SettingsError> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.max_upload_mb", 100)?
            .set_default("primary.provider", "openai")?
            .set_default("primary.model", "whisper-large-v3-turbo")?
            .set_default("primary.prompt", DEFAULT_PRIMARY_PROMPT)?
            .set_default("primary.azure_api_version", "2024-06-01")?
            .set_default("fallback.model_id", "openai/whisper-large-v3")?
            .set_default("fallback.chunk_duration_ms", 30_000)?
            .set_default("fallback.prompt", DEFAULT_FALLBACK_PROMPT)?
            .set_default("fallback.preload", false)?
            .set_default("storage.provider", "local")?
            .set_default("storage.scratch_dir", "saved_audio_files")?
            .set_default("logging.json", false)?
            .set_default("logging.filter", DEFAULT_LOG_FILTER)?;
        Ok(builder)
    }

    pub fn from_config(config: Config) -> Result<Self, SettingsError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.fallback.chunk_duration_ms == 0 {
            return Err(SettingsError::Invalid(
                "fallback.chunk_duration_ms must be greater than zero".to_string(),
            ));
        }
        if self.server.max_upload_mb == 0 {
            return Err(SettingsError::Invalid(
                "server.max_upload_mb must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
