use std::sync::Arc;

use crate::application::ports::{SpeechModelLoader, TranscriptionEngine, TranscriptionError};
use crate::presentation::config::{FallbackSettings, HostedProvider, PrimarySettings};

use super::azure_whisper_engine::AzureWhisperEngine;
use super::candle_whisper_engine::CandleWhisperLoader;
use super::openai_whisper_engine::OpenAiWhisperEngine;

pub struct TranscriptionEngineFactory;

impl TranscriptionEngineFactory {
    pub fn hosted(
        settings: &PrimarySettings,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                TranscriptionError::ModelLoadFailed(
                    "API key required for hosted transcription".to_string(),
                )
            })?;

        match settings.provider {
            HostedProvider::OpenAi => {
                let engine = OpenAiWhisperEngine::new(
                    api_key,
                    settings.base_url.clone(),
                    Some(settings.model.clone()),
                );
                Ok(Arc::new(engine))
            }
            HostedProvider::Azure => {
                let base_url = settings.base_url.as_deref().ok_or_else(|| {
                    TranscriptionError::ModelLoadFailed("azure base_url required".to_string())
                })?;
                let deployment = settings.azure_deployment.as_deref().ok_or_else(|| {
                    TranscriptionError::ModelLoadFailed("azure_deployment required".to_string())
                })?;
                let engine = AzureWhisperEngine::new(
                    base_url,
                    deployment,
                    &api_key,
                    &settings.azure_api_version,
                );
                Ok(Arc::new(engine))
            }
        }
    }

    pub fn local_loader(settings: &FallbackSettings) -> Arc<dyn SpeechModelLoader> {
        Arc::new(CandleWhisperLoader::new(settings.model_id.clone()))
    }
}
