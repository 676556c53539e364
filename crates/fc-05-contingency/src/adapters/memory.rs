//! In-memory batch repository.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::ContingencyBatch;
use crate::error::{RegularizerError, RegularizerResult};
use crate::ports::outbound::BatchRepository;

/// In-memory repository for unit tests and embedded deployments.
#[derive(Default)]
pub struct InMemoryBatchRepository {
    batches: RwLock<Vec<ContingencyBatch>>,
}

impl InMemoryBatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored batch, open or closed, oldest first.
    pub fn all(&self) -> Vec<ContingencyBatch> {
        self.batches.read().clone()
    }
}

#[async_trait]
impl BatchRepository for InMemoryBatchRepository {
    async fn open_batches(&self) -> RegularizerResult<Vec<ContingencyBatch>> {
        Ok(self
            .batches
            .read()
            .iter()
            .filter(|b| b.is_open())
            .cloned()
            .collect())
    }

    async fn insert(&self, batch: ContingencyBatch) -> RegularizerResult<()> {
        self.batches.write().push(batch);
        Ok(())
    }

    async fn update(&self, batch: ContingencyBatch) -> RegularizerResult<()> {
        let mut batches = self.batches.write();
        match batches.iter_mut().find(|b| b.id == batch.id) {
            Some(slot) => {
                *slot = batch;
                Ok(())
            }
            None => Err(RegularizerError::Repository {
                reason: format!("batch {} not found", batch.id),
            }),
        }
    }
}
