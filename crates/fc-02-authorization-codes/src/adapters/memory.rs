//! In-memory code repository.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{CodeKind, SalesPoint, Timestamp};
use uuid::Uuid;

use crate::domain::AuthorizationCode;
use crate::error::CodeStoreResult;
use crate::ports::outbound::CodeRepository;

/// In-memory repository for unit tests and embedded deployments that
/// persist elsewhere. Production uses `SnapshotCodeRepository`.
#[derive(Default)]
pub struct InMemoryCodeRepository {
    codes: RwLock<Vec<AuthorizationCode>>,
}

impl InMemoryCodeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CodeRepository for InMemoryCodeRepository {
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
        self.codes.write().push(code);
        Ok(())
    }

    async fn clip_validity(&self, id: Uuid, new_end: Timestamp) -> CodeStoreResult<()> {
        let mut codes = self.codes.write();
        if let Some(code) = codes.iter_mut().find(|c| c.id == id) {
            code.valid_until = new_end;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn sample(kind: CodeKind, issued_at: Timestamp, hours_valid: i64) -> AuthorizationCode {
        AuthorizationCode {
            id: Uuid::new_v4(),
            kind,
            value: format!("CODE-{issued_at}"),
            control_code: "AB12CD34EF56".to_string(),
            sales_point: SalesPoint::new(0, 0),
            parent: None,
            issued_at,
            valid_until: issued_at + Duration::hours(hours_valid),
            clock_skew_secs: 0,
        }
    }

    #[tokio::test]
    async fn test_latest_valid_prefers_newest() {
        let repo = InMemoryCodeRepository::new();
        let t0 = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let older = sample(CodeKind::Daily, t0, 48);
        let newer = sample(CodeKind::Daily, t0 + Duration::hours(1), 48);
        repo.insert(older).await.unwrap();
        repo.insert(newer.clone()).await.unwrap();

        let found = repo
            .latest_valid(SalesPoint::new(0, 0), CodeKind::Daily, t0 + Duration::hours(2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, newer.id);
    }

    #[tokio::test]
    async fn test_expired_codes_are_not_returned() {
        let repo = InMemoryCodeRepository::new();
        let t0 = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        repo.insert(sample(CodeKind::Software, t0, 1)).await.unwrap();

        let found = repo
            .latest_valid(SalesPoint::new(0, 0), CodeKind::Software, t0 + Duration::hours(2))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_clip_validity_keeps_history_queryable() {
        let repo = InMemoryCodeRepository::new();
        let t0 = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let old = sample(CodeKind::Daily, t0, 48);
        let old_id = old.id;
        repo.insert(old).await.unwrap();
        repo.clip_validity(old_id, t0 + Duration::hours(3)).await.unwrap();

        // superseded but still the answer for instants inside its window
        let at_issue = repo
            .valid_at(SalesPoint::new(0, 0), CodeKind::Daily, t0 + Duration::hours(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(at_issue.id, old_id);
        assert_eq!(at_issue.valid_until, t0 + Duration::hours(3));

        let after_clip = repo
            .valid_at(SalesPoint::new(0, 0), CodeKind::Daily, t0 + Duration::hours(4))
            .await
            .unwrap();
        assert!(after_clip.is_none());
    }
}
