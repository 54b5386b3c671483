use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::application::ports::{SpeechModel, SpeechModelLoader, TranscriptionError};

/// Process-wide handle to the local model. The first caller loads it,
/// concurrent callers wait on that load, and the model is then kept for
/// the life of the process. A failed load is not cached.
///
/// The load runs on its own task, so a caller that gives up (for example
/// on a request deadline) does not abort it; later callers join the same
/// load instead of starting another one.
pub struct SharedSpeechModel {
    loader: Arc<dyn SpeechModelLoader>,
    model: Arc<OnceCell<Arc<dyn SpeechModel>>>,
}

impl SharedSpeechModel {
    pub fn new(loader: Arc<dyn SpeechModelLoader>) -> Self {
        Self {
            loader,
            model: Arc::new(OnceCell::new()),
        }
    }

    pub async fn get(&self) -> Result<Arc<dyn SpeechModel>, TranscriptionError> {
        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }

        let cell = Arc::clone(&self.model);
        let loader = Arc::clone(&self.loader);

        let init = tokio::spawn(async move {
            cell.get_or_try_init(|| async {
                tracing::info!("Loading local speech model");
                let model = loader.load().await;
                if let Err(e) = &model {
                    tracing::error!(error = %e, "Local speech model failed to load");
                }
                model
            })
            .await
            .map(|model| Arc::clone(model))
        });

        init.await
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("loader task: {}", e)))?
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }
}
