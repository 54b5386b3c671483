use std::io;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;

use crate::application::ports::StagingStoreError;
use crate::domain::{AudioAsset, PipelineRequest, RequestId, StoragePath};
use crate::presentation::state::AppState;

pub const FILE_FIELD: &str = "file";
pub const TRANSCRIPT_SOURCE_HEADER: &str = "x-transcript-source";

#[derive(Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip_all, fields(request_id = %request_id))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> Response {
    // Caller-supplied request ids may repeat; staging is keyed per upload.
    let upload_id = RequestId::new();
    tracing::info!(upload_id = %upload_id, "Received request to transcribe audio");

    let (filename, path) = loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => {
                tracing::warn!("Transcribe request without an audio file");
                return error_response(StatusCode::BAD_REQUEST, "No audio file provided");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read multipart: {}", e),
                );
            }
        };

        // A `file` part without a filename is a plain form value, not an upload.
        let filename = match (field.name(), field.file_name()) {
            (Some(FILE_FIELD), Some(name)) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        let path = StoragePath::new(&upload_id, &filename);
        let stream = field.map_err(io::Error::other).boxed();

        match state.staging_store.store(&path, stream).await {
            Ok(bytes) => {
                tracing::debug!(filename = %filename, bytes, "Audio file received");
                break (filename, path);
            }
            Err(StagingStoreError::Io(e)) => {
                tracing::error!(error = %e, "Failed to read file bytes");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read file: {}", e),
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to stage upload");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
            }
        }
    };

    let outcome = match state.staging_store.fetch(&path).await {
        Ok(data) => {
            let asset = AudioAsset::new(filename, data).with_location(path.clone());
            let request = PipelineRequest::new(upload_id, asset);
            state
                .orchestrator
                .transcribe(&request)
                .await
                .map_err(|e| e.to_string())
        }
        Err(e) => Err(e.to_string()),
    };

    if let Err(e) = state.staging_store.delete(&path).await {
        tracing::warn!(error = %e, path = %path, "Failed to clean up staged upload");
    }

    match outcome {
        Ok(result) => (
            StatusCode::OK,
            [(TRANSCRIPT_SOURCE_HEADER, result.source.as_str())],
            Json(TranscribeResponse {
                transcript: result.text,
            }),
        )
            .into_response(),
        Err(message) => error_response(StatusCode::INTERNAL_SERVER_ERROR, message),
    }
}
