//! Repository selection: in-memory by default, snapshot file when a data
//! directory is configured.

use async_trait::async_trait;
use fc_02_authorization_codes::{
    AuthorizationCode, CodeRepository, CodeStoreResult, InMemoryCodeRepository,
    SnapshotCodeRepository,
};
use shared_types::{CodeKind, SalesPoint, Timestamp};
use uuid::Uuid;

/// Configured code repository backend.
pub enum CodeStore {
    Memory(InMemoryCodeRepository),
    Snapshot(SnapshotCodeRepository),
}

#[async_trait]
impl CodeRepository for CodeStore {
    async fn latest_valid(
        &self,
        sales_point: SalesPoint,
        kind: CodeKind,
        now: Timestamp,
    ) -> CodeStoreResult<Option<AuthorizationCode>> {
        match self {
            CodeStore::Memory(repo) => repo.latest_valid(sales_point, kind, now).await,
            CodeStore::Snapshot(repo) => repo.latest_valid(sales_point, kind, now).await,
        }
    }

    async fn valid_at(
        &self,
        sales_point: SalesPoint,
        kind: CodeKind,
        instant: Timestamp,
    ) -> CodeStoreResult<Option<AuthorizationCode>> {
        match self {
            CodeStore::Memory(repo) => repo.valid_at(sales_point, kind, instant).await,
            CodeStore::Snapshot(repo) => repo.valid_at(sales_point, kind, instant).await,
        }
    }

    async fn latest(
        &self,
        sales_point: SalesPoint,
        kind: CodeKind,
    ) -> CodeStoreResult<Option<AuthorizationCode>> {
        match self {
            CodeStore::Memory(repo) => repo.latest(sales_point, kind).await,
            CodeStore::Snapshot(repo) => repo.latest(sales_point, kind).await,
        }
    }

    async fn insert(&self, code: AuthorizationCode) -> CodeStoreResult<()> {
        match self {
            CodeStore::Memory(repo) => repo.insert(code).await,
            CodeStore::Snapshot(repo) => repo.insert(code).await,
        }
    }

    async fn clip_validity(&self, id: Uuid, new_end: Timestamp) -> CodeStoreResult<()> {
        match self {
            CodeStore::Memory(repo) => repo.clip_validity(id, new_end).await,
            CodeStore::Snapshot(repo) => repo.clip_validity(id, new_end).await,
        }
    }
}
