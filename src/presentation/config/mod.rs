mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment};
pub use settings::{
    DEFAULT_FALLBACK_PROMPT, DEFAULT_LOG_FILTER, DEFAULT_PRIMARY_PROMPT, FallbackSettings,
    HostedProvider, LoggingSettings, PrimarySettings, ServerSettings, Settings, SettingsError,
    StorageProviderSetting, StorageSettings,
};
