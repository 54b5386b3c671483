mod local_store;
mod mock_store;
mod store_factory;
mod wav_artifact_sink;

pub use local_store::LocalStagingStore;
pub use mock_store::InMemoryStagingStore;
pub use store_factory::StagingStoreFactory;
pub use wav_artifact_sink::{TRANSCRIPT_FILE_NAME, WavArtifactSink};
