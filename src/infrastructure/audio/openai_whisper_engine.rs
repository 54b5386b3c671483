use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart;
use serde::Deserialize;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::AudioAsset;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "whisper-large-v3-turbo";

/// Client for OpenAI-compatible `/audio/transcriptions` endpoints
/// (OpenAI, Groq).
pub struct OpenAiWhisperEngine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiWhisperEngine {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: Option<String>,
}

#[async_trait]
impl TranscriptionEngine for OpenAiWhisperEngine {
    async fn transcribe(
        &self,
        audio: &AudioAsset,
        prompt: &str,
    ) -> Result<String, TranscriptionError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let file_part = multipart::Part::bytes(audio.data.to_vec())
            .file_name(audio.filename.clone())
            .mime_str(audio.format.as_mime())
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("prompt", prompt.to_string())
            .text("response_format", "json");

        tracing::debug!(model = %self.model, url = %url, "Sending audio to hosted Whisper API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

        let result = read_transcription_response(response).await?;

        tracing::info!(chars = result.len(), "Hosted Whisper transcription completed");

        Ok(result)
    }
}

/// Maps a hosted-engine HTTP response onto the verbatim transcript.
pub(super) async fn read_transcription_response(
    response: reqwest::Response,
) -> Result<String, TranscriptionError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                TranscriptionError::Unauthorized(format!("status {}: {}", status, body))
            }
            _ => TranscriptionError::ApiRequestFailed(format!("status {}: {}", status, body)),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| TranscriptionError::ApiRequestFailed(format!("body: {}", e)))?;

    let parsed: TranscriptionResponse = serde_json::from_str(&body)
        .map_err(|e| TranscriptionError::MalformedResponse(format!("parse response: {}", e)))?;

    Ok(parsed.text.unwrap_or_default())
}
