//! Authorization code service - issuance and validity resolution.

use std::sync::Arc;

use dashmap::DashMap;
use shared_types::{CodeKind, SalesPoint, TimeSource, Timestamp};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::AuthorizationCode;
use crate::error::{CodeStoreError, CodeStoreResult};
use crate::ports::outbound::{CodeIssuer, CodeRepository, IssuedCodeFields};

/// Code service configuration.
#[derive(Debug, Clone)]
pub struct CodeServiceConfig {
    /// Maximum tolerated difference between local now and the authority's
    /// declared validity start when a daily code is issued, in seconds.
    /// Drift beyond this fails issuance; it is a configuration fault.
    pub clock_drift_tolerance_secs: i64,
}

impl Default for CodeServiceConfig {
    fn default() -> Self {
        Self {
            clock_drift_tolerance_secs: 300,
        }
    }
}

/// Resolves "current valid code, else fetch a new one" for both code kinds.
///
/// Issuance is serialized per (sales point, kind): the first caller to find
/// the store empty performs the gateway call, everyone else waits on the
/// keyed lock and re-reads the store.
pub struct AuthorizationCodeService<R, I>
where
    R: CodeRepository,
    I: CodeIssuer,
{
    config: CodeServiceConfig,
    repository: Arc<R>,
    issuer: Arc<I>,
    time: Arc<dyn TimeSource>,
    issuance_locks: DashMap<(SalesPoint, CodeKind), Arc<Mutex<()>>>,
}

impl<R, I> AuthorizationCodeService<R, I>
where
    R: CodeRepository,
    I: CodeIssuer,
{
    pub fn new(
        config: CodeServiceConfig,
        repository: Arc<R>,
        issuer: Arc<I>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            repository,
            issuer,
            time,
            issuance_locks: DashMap::new(),
        }
    }

    fn issuance_lock(&self, key: (SalesPoint, CodeKind)) -> Arc<Mutex<()>> {
        self.issuance_locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Latest valid software code for `sales_point`, issuing a fresh one
    /// through the gateway if none is currently valid.
    pub async fn get_valid_software_code(
        &self,
        sales_point: SalesPoint,
    ) -> CodeStoreResult<AuthorizationCode> {
        let now = self.time.now();
        if let Some(code) = self
            .repository
            .latest_valid(sales_point, CodeKind::Software, now)
            .await?
        {
            return Ok(code);
        }

        let lock = self.issuance_lock((sales_point, CodeKind::Software));
        let _guard = lock.lock().await;

        // Double-checked under the lock: a racing caller may have issued
        // while we waited, and its result must be reused.
        let now = self.time.now();
        if let Some(code) = self
            .repository
            .latest_valid(sales_point, CodeKind::Software, now)
            .await?
        {
            return Ok(code);
        }

        self.issue_and_record(CodeKind::Software, sales_point, None)
            .await
    }

    /// Latest valid daily code for `sales_point`, scoped to the current
    /// valid software code. Issues a fresh one if none is valid or the
    /// valid one belongs to a rotated-out software code.
    pub async fn get_valid_daily_code(
        &self,
        sales_point: SalesPoint,
    ) -> CodeStoreResult<AuthorizationCode> {
        let software = self.get_valid_software_code(sales_point).await?;

        let now = self.time.now();
        if let Some(code) = self
            .repository
            .latest_valid(sales_point, CodeKind::Daily, now)
            .await?
        {
            if code.parent == Some(software.id) {
                return Ok(code);
            }
        }

        let lock = self.issuance_lock((sales_point, CodeKind::Daily));
        let _guard = lock.lock().await;

        let now = self.time.now();
        if let Some(code) = self
            .repository
            .latest_valid(sales_point, CodeKind::Daily, now)
            .await?
        {
            if code.parent == Some(software.id) {
                return Ok(code);
            }
        }

        self.issue_and_record(CodeKind::Daily, sales_point, Some(&software))
            .await
    }

    /// Issue a daily code unconditionally, superseding the current one.
    /// Used when the authority invalidates a daily code ahead of schedule.
    pub async fn refresh_daily_code(
        &self,
        sales_point: SalesPoint,
    ) -> CodeStoreResult<AuthorizationCode> {
        let software = self.get_valid_software_code(sales_point).await?;

        let lock = self.issuance_lock((sales_point, CodeKind::Daily));
        let _guard = lock.lock().await;

        self.issue_and_record(CodeKind::Daily, sales_point, Some(&software))
            .await
    }

    /// The code of `kind` that was valid at `instant`: audit lookup for
    /// invoices emitted under superseded codes.
    pub async fn code_valid_at(
        &self,
        sales_point: SalesPoint,
        kind: CodeKind,
        instant: Timestamp,
    ) -> CodeStoreResult<Option<AuthorizationCode>> {
        self.repository.valid_at(sales_point, kind, instant).await
    }

    /// Perform the gateway issuance and persist the result, applying the
    /// supersession rule to any overlapping predecessor.
    ///
    /// Must be called with the (sales point, kind) issuance lock held.
    async fn issue_and_record(
        &self,
        kind: CodeKind,
        sales_point: SalesPoint,
        parent: Option<&AuthorizationCode>,
    ) -> CodeStoreResult<AuthorizationCode> {
        let issued: IssuedCodeFields = self
            .issuer
            .issue_code(kind, sales_point, parent.map(|c| c.value.as_str()))
            .await?;

        let now = self.time.now();
        let skew_secs = (issued.valid_from - now).num_seconds();

        if kind == CodeKind::Daily && skew_secs.abs() > self.config.clock_drift_tolerance_secs {
            warn!(
                %sales_point,
                skew_secs,
                tolerance_secs = self.config.clock_drift_tolerance_secs,
                "Clock drift beyond tolerance, refusing issued daily code"
            );
            return Err(CodeStoreError::ClockDriftExceeded {
                drift_secs: skew_secs,
                tolerance_secs: self.config.clock_drift_tolerance_secs,
            });
        }

        if let Some(prev) = self.repository.latest(sales_point, kind).await? {
            if prev.valid_until > issued.valid_from {
                info!(
                    %sales_point,
                    %kind,
                    superseded = %prev.id,
                    "Clipping superseded code validity to successor start"
                );
                self.repository
                    .clip_validity(prev.id, issued.valid_from)
                    .await?;
            }
        }

        let code = AuthorizationCode {
            id: Uuid::new_v4(),
            kind,
            value: issued.value,
            control_code: issued.control_code,
            sales_point,
            parent: parent.map(|c| c.id),
            issued_at: issued.valid_from,
            valid_until: issued.valid_until,
            clock_skew_secs: if kind == CodeKind::Daily { skew_secs } else { 0 },
        };
        self.repository.insert(code.clone()).await?;

        info!(
            %sales_point,
            %kind,
            code_id = %code.id,
            valid_until = %code.valid_until,
            "Issued and persisted authorization code"
        );
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCodeRepository;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use shared_types::{GatewayFault, ManualTimeSource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingIssuer {
        calls: AtomicUsize,
        clock: Arc<ManualTimeSource>,
        /// Offset applied to valid_from, to simulate authority/local drift.
        skew: chrono::Duration,
        validity: chrono::Duration,
    }

    impl CountingIssuer {
        fn new(clock: Arc<ManualTimeSource>, validity: chrono::Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                clock,
                skew: chrono::Duration::zero(),
                validity,
            }
        }

        fn with_skew(mut self, skew: chrono::Duration) -> Self {
            self.skew = skew;
            self
        }
    }

    #[async_trait]
    impl CodeIssuer for CountingIssuer {
        async fn issue_code(
            &self,
            kind: CodeKind,
            _sales_point: SalesPoint,
            software_code: Option<&str>,
        ) -> Result<IssuedCodeFields, GatewayFault> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            // widen the race window so unserialized callers would collide
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            let valid_from = self.clock.now() + self.skew;
            Ok(IssuedCodeFields {
                value: format!("{kind}-{n}-{}", software_code.unwrap_or("root")),
                control_code: "AB12CD34EF56".to_string(),
                valid_from,
                valid_until: valid_from + self.validity,
            })
        }
    }

    fn start_instant() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap()
    }

    fn service(
        issuer: CountingIssuer,
        clock: Arc<ManualTimeSource>,
    ) -> AuthorizationCodeService<InMemoryCodeRepository, CountingIssuer> {
        AuthorizationCodeService::new(
            CodeServiceConfig::default(),
            Arc::new(InMemoryCodeRepository::new()),
            Arc::new(issuer),
            clock,
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_fetch_issues_exactly_once() {
        let clock = Arc::new(ManualTimeSource::new(start_instant()));
        let issuer = CountingIssuer::new(clock.clone(), Duration::days(365));
        let svc = Arc::new(service(issuer, clock));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.get_valid_software_code(SalesPoint::new(0, 0)).await
            }));
        }

        let mut values = Vec::new();
        for handle in handles {
            values.push(handle.await.unwrap().unwrap().value);
        }

        assert_eq!(svc.issuer.calls.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|v| v == &values[0]));
    }

    #[tokio::test]
    async fn test_valid_code_is_reused_without_gateway_call() {
        let clock = Arc::new(ManualTimeSource::new(start_instant()));
        let issuer = CountingIssuer::new(clock.clone(), Duration::days(365));
        let svc = service(issuer, clock);

        let first = svc.get_valid_software_code(SalesPoint::new(0, 0)).await.unwrap();
        let second = svc.get_valid_software_code(SalesPoint::new(0, 0)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(svc.issuer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_daily_code_is_scoped_under_software_code() {
        let clock = Arc::new(ManualTimeSource::new(start_instant()));
        let issuer = CountingIssuer::new(clock.clone(), Duration::days(1));
        let svc = service(issuer, clock);

        let daily = svc.get_valid_daily_code(SalesPoint::new(0, 0)).await.unwrap();
        assert_eq!(daily.kind, CodeKind::Daily);
        assert!(daily.parent.is_some());

        // one software issuance plus one daily issuance
        assert_eq!(svc.issuer.calls.load(Ordering::SeqCst), 2);

        let software = svc.get_valid_software_code(SalesPoint::new(0, 0)).await.unwrap();
        assert_eq!(daily.parent, Some(software.id));
    }

    #[tokio::test]
    async fn test_expired_daily_code_triggers_reissue() {
        let clock = Arc::new(ManualTimeSource::new(start_instant()));
        let issuer = CountingIssuer::new(clock.clone(), Duration::hours(6));
        let svc = service(issuer, clock.clone());

        let first = svc.get_valid_daily_code(SalesPoint::new(0, 0)).await.unwrap();
        clock.advance(Duration::hours(7));
        // software (6h validity here) also expired, so both are reissued
        let second = svc.get_valid_daily_code(SalesPoint::new(0, 0)).await.unwrap();

        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_clock_drift_beyond_tolerance_is_fatal() {
        let clock = Arc::new(ManualTimeSource::new(start_instant()));
        let issuer =
            CountingIssuer::new(clock.clone(), Duration::days(1)).with_skew(Duration::hours(1));
        let svc = service(issuer, clock);

        let err = svc
            .get_valid_daily_code(SalesPoint::new(0, 0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CodeStoreError::ClockDriftExceeded {
                drift_secs: 3600,
                tolerance_secs: 300
            }
        ));
    }

    #[tokio::test]
    async fn test_software_issuance_tolerates_skewed_window() {
        // the drift guard applies to daily issuance; software codes carry
        // authority-declared windows that may start in the past
        let clock = Arc::new(ManualTimeSource::new(start_instant()));
        let issuer =
            CountingIssuer::new(clock.clone(), Duration::days(365)).with_skew(-Duration::hours(2));
        let svc = service(issuer, clock);

        assert!(svc.get_valid_software_code(SalesPoint::new(0, 0)).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_supersedes_and_keeps_history() {
        let clock = Arc::new(ManualTimeSource::new(start_instant()));
        let issuer = CountingIssuer::new(clock.clone(), Duration::days(1));
        let svc = service(issuer, clock.clone());
        let sp = SalesPoint::new(0, 0);

        let original = svc.get_valid_daily_code(sp).await.unwrap();

        clock.advance(Duration::hours(2));
        let refreshed = svc.refresh_daily_code(sp).await.unwrap();
        assert_ne!(original.id, refreshed.id);

        // the superseded code answers for instants before the rotation,
        // with its window clipped to the successor's start
        let historic = svc
            .code_valid_at(sp, CodeKind::Daily, start_instant() + Duration::hours(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(historic.id, original.id);
        assert_eq!(historic.valid_until, refreshed.issued_at);

        let current = svc
            .code_valid_at(sp, CodeKind::Daily, clock.now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.id, refreshed.id);
    }
}
