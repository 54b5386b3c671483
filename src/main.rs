use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use switchscribe::application::ports::AudioDecoder;
use switchscribe::application::services::{
    AudioSegmenter, FallbackTranscriber, PrimaryTranscriber, SharedSpeechModel,
    TranscriptionOrchestrator,
};
use switchscribe::infrastructure::audio::{SymphoniaAudioDecoder, TranscriptionEngineFactory};
use switchscribe::infrastructure::observability::{TracingConfig, init_tracing};
use switchscribe::infrastructure::storage::{StagingStoreFactory, WavArtifactSink};
use switchscribe::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(
        TracingConfig::new(environment, &settings.logging),
        settings.server.port,
    );

    let engine = TranscriptionEngineFactory::hosted(&settings.primary)
        .context("Failed to configure hosted transcription engine")?;
    let primary = PrimaryTranscriber::new(engine, settings.primary.prompt.clone());

    let decoder: Arc<dyn AudioDecoder> = Arc::new(SymphoniaAudioDecoder);
    let segmenter = Arc::new(AudioSegmenter::new(
        decoder,
        settings.fallback.chunk_duration(),
    ));
    let local_model = Arc::new(SharedSpeechModel::new(
        TranscriptionEngineFactory::local_loader(&settings.fallback),
    ));

    let mut fallback = FallbackTranscriber::new(
        segmenter,
        Arc::clone(&local_model),
        settings.fallback.decode_options(),
    );
    if let Some(dir) = &settings.fallback.debug_dir {
        tracing::info!(dir = %dir, "Writing fallback debug artifacts");
        fallback = fallback.with_artifacts(Arc::new(WavArtifactSink::new(dir)));
    }

    if settings.fallback.preload {
        let model = Arc::clone(&local_model);
        tokio::spawn(async move {
            if let Err(e) = model.get().await {
                tracing::error!(error = %e, "Local model preload failed");
            }
        });
    }

    let mut orchestrator = TranscriptionOrchestrator::new(primary, fallback);
    if let Some(deadline) = settings.server.request_timeout() {
        orchestrator = orchestrator.with_deadline(deadline);
    }

    let staging_store = StagingStoreFactory::create(&settings.storage)
        .context("Failed to initialize staging store")?;

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        staging_store,
        max_upload_bytes: settings.server.max_upload_bytes(),
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
