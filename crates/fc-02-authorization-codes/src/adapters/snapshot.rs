//! File-backed code repository.
//!
//! Persists the full code history as a bincode snapshot, rewritten
//! atomically (temp file + rename) on every mutation. Code volumes are a
//! handful of records per sales point per day, so snapshot-on-write is
//! cheap and keeps recovery trivial.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{CodeKind, SalesPoint, Timestamp};
use uuid::Uuid;

use crate::domain::AuthorizationCode;
use crate::error::{CodeStoreError, CodeStoreResult};
use crate::ports::outbound::CodeRepository;

/// Durable repository storing the code history in a single snapshot file.
pub struct SnapshotCodeRepository {
    codes: RwLock<Vec<AuthorizationCode>>,
    path: PathBuf,
}

impl SnapshotCodeRepository {
    /// Open (or create) the snapshot at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> CodeStoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let codes = match std::fs::read(&path) {
            Ok(bytes) => bincode::deserialize(&bytes).map_err(|e| CodeStoreError::Repository {
                reason: format!("corrupt snapshot {}: {e}", path.display()),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(CodeStoreError::Repository {
                    reason: format!("cannot read snapshot {}: {e}", path.display()),
                })
            }
        };

        tracing::info!(
            path = %path.display(),
            codes = codes.len(),
            "Opened authorization code snapshot"
        );

        Ok(Self {
            codes: RwLock::new(codes),
            path,
        })
    }

    fn persist(&self, codes: &[AuthorizationCode]) -> CodeStoreResult<()> {
        let io_err = |e: std::io::Error| CodeStoreError::Repository {
            reason: format!("snapshot write {}: {e}", self.path.display()),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let bytes = bincode::serialize(codes).map_err(|e| CodeStoreError::Repository {
            reason: format!("snapshot encode: {e}"),
        })?;

        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, &bytes).map_err(io_err)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl CodeRepository for SnapshotCodeRepository {
    async fn latest_valid(
        &self,
        sales_point: SalesPoint,
        kind: CodeKind,
        now: Timestamp,
    ) -> CodeStoreResult<Option<AuthorizationCode>> {
        let codes = self.codes.read();
        Ok(codes
            .iter()
            .filter(|c| c.sales_point == sales_point && c.kind == kind && c.is_valid_at(now))
            .max_by_key(|c| c.issued_at)
            .cloned())
    }

    async fn valid_at(
        &self,
        sales_point: SalesPoint,
        kind: CodeKind,
        instant: Timestamp,
    ) -> CodeStoreResult<Option<AuthorizationCode>> {
        self.latest_valid(sales_point, kind, instant).await
    }

    async fn latest(
        &self,
        sales_point: SalesPoint,
        kind: CodeKind,
    ) -> CodeStoreResult<Option<AuthorizationCode>> {
        let codes = self.codes.read();
        Ok(codes
            .iter()
            .filter(|c| c.sales_point == sales_point && c.kind == kind)
            .max_by_key(|c| c.issued_at)
            .cloned())
    }

    async fn insert(&self, code: AuthorizationCode) -> CodeStoreResult<()> {
        let mut codes = self.codes.write();
        codes.push(code);
        self.persist(&codes)
    }

    async fn clip_validity(&self, id: Uuid, new_end: Timestamp) -> CodeStoreResult<()> {
        let mut codes = self.codes.write();
        if let Some(code) = codes.iter_mut().find(|c| c.id == id) {
            code.valid_until = new_end;
        }
        self.persist(&codes)
    }
}
