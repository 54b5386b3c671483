use axum::Router;
use axum::extract::Multipart;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use switchscribe::application::ports::{TranscriptionEngine, TranscriptionError};
use switchscribe::domain::AudioAsset;
use switchscribe::infrastructure::audio::{AzureWhisperEngine, OpenAiWhisperEngine};

async fn serve(app: Router) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, shutdown_tx)
}

async fn start_mock_openai_server(
    response_status: u16,
    response_body: &'static str,
) -> (String, oneshot::Sender<()>) {
    let app = Router::new().route(
        "/v1/audio/transcriptions",
        post(move || async move {
            let status = axum::http::StatusCode::from_u16(response_status).unwrap();
            (status, response_body).into_response()
        }),
    );
    let (base_url, shutdown) = serve(app).await;
    (format!("{}/v1", base_url), shutdown)
}

/// Echoes the received form fields and auth header back as the transcript.
async fn echo_form(headers: HeaderMap, mut multipart: Multipart) -> impl IntoResponse {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.unwrap();
        match file_name {
            Some(file_name) => parts.push(format!(
                "{}={}:{}:{}",
                name,
                file_name,
                content_type.unwrap_or_default(),
                bytes.len()
            )),
            None => parts.push(format!("{}={}", name, String::from_utf8_lossy(&bytes))),
        }
    }
    let auth = headers
        .get("authorization")
        .or_else(|| headers.get("api-key"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    parts.push(format!("auth={}", auth));
    axum::Json(serde_json::json!({ "text": parts.join("|") }))
}

fn clip() -> AudioAsset {
    AudioAsset::new("grabacion.mp3", b"fake audio bytes".to_vec())
}

#[tokio::test]
async fn given_valid_audio_when_openai_transcribes_then_returns_text_verbatim() {
    let (base_url, shutdown_tx) =
        start_mock_openai_server(200, r#"{"text": " hola amigo, what's up? "}"#).await;
    let engine = OpenAiWhisperEngine::new("test-key".to_string(), Some(base_url), None);

    let result = engine.transcribe(&clip(), "prompt").await;

    assert_eq!(result.unwrap(), " hola amigo, what's up? ");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_null_text_when_openai_transcribes_then_returns_empty_string() {
    let (base_url, shutdown_tx) = start_mock_openai_server(200, r#"{"text": null}"#).await;
    let engine = OpenAiWhisperEngine::new("test-key".to_string(), Some(base_url), None);

    let result = engine.transcribe(&clip(), "prompt").await;

    assert_eq!(result.unwrap(), "");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_missing_text_field_when_openai_transcribes_then_returns_empty_string() {
    let (base_url, shutdown_tx) = start_mock_openai_server(200, r#"{"x_groq": {}}"#).await;
    let engine = OpenAiWhisperEngine::new("test-key".to_string(), Some(base_url), None);

    let result = engine.transcribe(&clip(), "prompt").await;

    assert_eq!(result.unwrap(), "");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_invalid_key_when_openai_transcribes_then_returns_unauthorized() {
    let (base_url, shutdown_tx) =
        start_mock_openai_server(401, r#"{"error": {"message": "Invalid API Key"}}"#).await;
    let engine = OpenAiWhisperEngine::new("bad-key".to_string(), Some(base_url), None);

    let result = engine.transcribe(&clip(), "prompt").await;

    assert!(matches!(result, Err(TranscriptionError::Unauthorized(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_server_error_when_openai_transcribes_then_returns_api_error() {
    let (base_url, shutdown_tx) = start_mock_openai_server(503, "upstream unavailable").await;
    let engine = OpenAiWhisperEngine::new("test-key".to_string(), Some(base_url), None);

    let result = engine.transcribe(&clip(), "prompt").await;

    match result {
        Err(TranscriptionError::ApiRequestFailed(message)) => {
            assert!(message.contains("503"));
            assert!(message.contains("upstream unavailable"));
        }
        other => panic!("expected api error, got {:?}", other),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_non_json_body_when_openai_transcribes_then_returns_malformed_response() {
    let (base_url, shutdown_tx) = start_mock_openai_server(200, "hola amigo").await;
    let engine = OpenAiWhisperEngine::new("test-key".to_string(), Some(base_url), None);

    let result = engine.transcribe(&clip(), "prompt").await;

    assert!(matches!(result, Err(TranscriptionError::MalformedResponse(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_unreachable_server_when_openai_transcribes_then_returns_api_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let engine = OpenAiWhisperEngine::new(
        "test-key".to_string(),
        Some(format!("http://{}/v1", addr)),
        None,
    );

    let result = engine.transcribe(&clip(), "prompt").await;

    assert!(matches!(result, Err(TranscriptionError::ApiRequestFailed(_))));
}

#[tokio::test]
async fn given_request_when_openai_transcribes_then_sends_file_model_prompt_and_bearer() {
    let app = Router::new().route("/v1/audio/transcriptions", post(echo_form));
    let (base_url, shutdown_tx) = serve(app).await;
    let engine = OpenAiWhisperEngine::new(
        "test-key".to_string(),
        Some(format!("{}/v1/", base_url)),
        Some("whisper-large-v3-turbo".to_string()),
    );

    let echoed = engine
        .transcribe(&clip(), "english and spanish")
        .await
        .unwrap();

    assert_eq!(
        echoed,
        "file=grabacion.mp3:audio/mpeg:16|model=whisper-large-v3-turbo|prompt=english and spanish|response_format=json|auth=Bearer test-key"
    );
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_request_when_azure_transcribes_then_sends_prompt_and_api_key_header() {
    let app = Router::new().route(
        "/openai/deployments/my-deployment/audio/transcriptions",
        post(echo_form),
    );
    let (base_url, shutdown_tx) = serve(app).await;
    let engine = AzureWhisperEngine::new(&base_url, "my-deployment", "test-key", "2024-06-01");

    let echoed = engine.transcribe(&clip(), "bilingual").await.unwrap();

    assert_eq!(
        echoed,
        "file=grabacion.mp3:audio/mpeg:16|prompt=bilingual|response_format=json|auth=test-key"
    );
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_azure_api_returns_error_status_when_transcribing_then_returns_api_error() {
    let app = Router::new().route(
        "/openai/deployments/my-deployment/audio/transcriptions",
        post(|| async {
            (
                axum::http::StatusCode::BAD_REQUEST,
                r#"{"error": {"code": "InvalidRequest", "message": "bad audio"}}"#,
            )
        }),
    );
    let (base_url, shutdown_tx) = serve(app).await;
    let engine = AzureWhisperEngine::new(&base_url, "my-deployment", "test-key", "2024-06-01");

    let result = engine.transcribe(&clip(), "bilingual").await;

    assert!(matches!(result, Err(TranscriptionError::ApiRequestFailed(_))));
    shutdown_tx.send(()).ok();
}
