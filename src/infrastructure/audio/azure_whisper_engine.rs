use async_trait::async_trait;
use reqwest::multipart;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::AudioAsset;

use super::openai_whisper_engine::read_transcription_response;

pub struct AzureWhisperEngine {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl AzureWhisperEngine {
    pub fn new(base_url: &str, deployment: &str, api_key: &str, api_version: &str) -> Self {
        let endpoint = format!(
            "{}/openai/deployments/{}/audio/transcriptions?api-version={}",
            base_url.trim_end_matches('/'),
            deployment,
            api_version,
        );
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for AzureWhisperEngine {
    async fn transcribe(
        &self,
        audio: &AudioAsset,
        prompt: &str,
    ) -> Result<String, TranscriptionError> {
        let file_part = multipart::Part::bytes(audio.data.to_vec())
            .file_name(audio.filename.clone())
            .mime_str(audio.format.as_mime())
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("prompt", prompt.to_string())
            .text("response_format", "json");

        tracing::debug!(endpoint = %self.endpoint, "Sending audio to Azure OpenAI Whisper");

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

        let text = read_transcription_response(response).await?;

        tracing::info!(chars = text.len(), "Azure OpenAI Whisper transcription completed");

        Ok(text)
    }
}
