use std::sync::Arc;

use gradecard_core::{CardPipeline, Storage};

/// Application state shared across all requests. `Storage` is a pool handle,
/// so cloning is cheap; the pipeline is shared read-only.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub pipeline: Arc<CardPipeline>,
}

impl AppState {
    pub async fn open(db_path: &str) -> anyhow::Result<Self> {
        let storage = Storage::open(db_path).await?;
        Ok(Self::with_storage(storage))
    }

    #[cfg(test)]
    pub async fn open_memory() -> anyhow::Result<Self> {
        let storage = Storage::open_memory().await?;
        Ok(Self::with_storage(storage))
    }

    fn with_storage(storage: Storage) -> Self {
        let pipeline = Arc::new(CardPipeline::new(storage.clone()));
        Self { storage, pipeline }
    }
}
