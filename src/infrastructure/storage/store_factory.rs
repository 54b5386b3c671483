use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{StagingStore, StagingStoreError};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::local_store::LocalStagingStore;
use super::mock_store::InMemoryStagingStore;

pub struct StagingStoreFactory;

impl StagingStoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn StagingStore>, StagingStoreError> {
        match settings.provider {
            StorageProviderSetting::Local => {
                let path = PathBuf::from(&settings.scratch_dir);
                let store = LocalStagingStore::new(path)?;
                Ok(Arc::new(store))
            }
            StorageProviderSetting::Memory => Ok(Arc::new(InMemoryStagingStore::new())),
        }
    }
}
