//! Wiring of the subsystem crates into the [`FiscalCore`] facade.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use fc_02_authorization_codes::{
    AuthorizationCodeService, CodeServiceConfig, InMemoryCodeRepository, SnapshotCodeRepository,
};
use fc_03_authority_gateway::{AuthorityApi, HttpAuthorityGateway, HttpGatewayConfig};
use fc_04_invoice_lifecycle::{
    EmissionApi, EmissionConfig, EmissionService, FiscalInvoice, InMemoryInvoiceRepository,
    InvoiceRenderer, LifecycleResult, PaymentResolver, TransactionDetails,
};
use fc_05_contingency::{
    spawn_regularizer, InMemoryBatchRepository, RegularizerConfig, RegularizerHandle,
    RegularizerService,
};
use shared_types::{InvoiceRef, SystemTimeSource, TimeSource};

use crate::adapters::code_issuer::GatewayCodeIssuer;
use crate::adapters::code_provider::{ServiceCodeProvider, WiredCodeService};
use crate::adapters::code_store::CodeStore;
use crate::adapters::collaborators::{DirectAmountsOnly, NoopRenderer};
use crate::adapters::contingency::{LateResubmitter, LifecycleResubmitter, RegularizerLog};
use crate::config::RuntimeConfig;

/// Emission service as wired by the runtime.
pub type WiredEmissionService<G> =
    EmissionService<InMemoryInvoiceRepository, G, ServiceCodeProvider<G>>;

/// The fiscal e-invoicing core, fully wired.
///
/// `emit_invoice`, `query_invoice` and `annul_invoice` are the only entry
/// points the surrounding billing application calls; everything else is
/// internal to the subsystem or owned by the background regularizer.
pub struct FiscalCore<G>
where
    G: AuthorityApi + 'static,
{
    config: RuntimeConfig,
    emission: Arc<WiredEmissionService<G>>,
    regularizer: Arc<RegularizerService<InMemoryBatchRepository>>,
}

impl FiscalCore<HttpAuthorityGateway> {
    /// Wire the core against the authority's HTTP service.
    pub fn over_http(config: RuntimeConfig) -> anyhow::Result<Self> {
        let gateway = HttpAuthorityGateway::new(HttpGatewayConfig {
            base_url: config.authority_base_url.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
        .context("building authority HTTP client")?;
        Self::with_gateway(config, Arc::new(gateway))
    }
}

impl<G> FiscalCore<G>
where
    G: AuthorityApi + 'static,
{
    /// Wire the core over any gateway, with the system clock and the
    /// default collaborator stand-ins.
    pub fn with_gateway(config: RuntimeConfig, gateway: Arc<G>) -> anyhow::Result<Self> {
        Self::new(
            config,
            gateway,
            Arc::new(SystemTimeSource),
            Arc::new(DirectAmountsOnly),
            Arc::new(NoopRenderer),
        )
    }

    /// Full wiring with explicit clock and collaborators.
    pub fn new(
        config: RuntimeConfig,
        gateway: Arc<G>,
        time: Arc<dyn TimeSource>,
        payments: Arc<dyn PaymentResolver>,
        renderer: Arc<dyn InvoiceRenderer>,
    ) -> anyhow::Result<Self> {
        let code_repo = match &config.data_dir {
            Some(dir) => CodeStore::Snapshot(
                SnapshotCodeRepository::open(dir.join("authorization-codes.bin"))
                    .context("opening authorization code snapshot")?,
            ),
            None => CodeStore::Memory(InMemoryCodeRepository::new()),
        };

        let issuer = GatewayCodeIssuer::new(
            gateway.clone(),
            config.issuer_tax_id,
            config.system_code.clone(),
            time.clone(),
        );
        let code_service: Arc<WiredCodeService<G>> = Arc::new(AuthorizationCodeService::new(
            CodeServiceConfig {
                clock_drift_tolerance_secs: config.clock_drift_tolerance_secs,
            },
            Arc::new(code_repo),
            Arc::new(issuer),
            time.clone(),
        ));

        let late_resubmitter = Arc::new(LateResubmitter::default());
        let regularizer = Arc::new(RegularizerService::new(
            RegularizerConfig {
                deadline: chrono::Duration::hours(config.contingency_deadline_hours),
                max_attempts: config.retry_attempts,
                retry_backoff: Duration::from_secs(config.retry_backoff_secs),
                ..Default::default()
            },
            Arc::new(InMemoryBatchRepository::new()),
            late_resubmitter.clone(),
            time.clone(),
        ));

        let emission = Arc::new(EmissionService::new(
            EmissionConfig {
                issuer_tax_id: config.issuer_tax_id,
                modality: config.modality,
                document_type: config.document_type,
                sector_document: config.sector_document,
                gateway_deadline: Duration::from_secs(config.request_timeout_secs),
            },
            Arc::new(InMemoryInvoiceRepository::new()),
            gateway,
            Arc::new(ServiceCodeProvider::new(code_service)),
            payments,
            renderer,
            Arc::new(RegularizerLog::new(regularizer.clone())),
            time,
        ));

        late_resubmitter.bind(Arc::new(LifecycleResubmitter::new(emission.clone())));

        Ok(Self {
            config,
            emission,
            regularizer,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Emit an invoice for a transaction.
    pub async fn emit_invoice(
        &self,
        transaction: TransactionDetails,
    ) -> LifecycleResult<FiscalInvoice> {
        self.emission.emit_invoice(transaction).await
    }

    /// Current state of an invoice.
    pub async fn query_invoice(&self, invoice: InvoiceRef) -> LifecycleResult<FiscalInvoice> {
        self.emission.query_invoice(invoice).await
    }

    /// Annul an accepted invoice.
    pub async fn annul_invoice(
        &self,
        invoice: InvoiceRef,
        reason_code: u32,
    ) -> LifecycleResult<FiscalInvoice> {
        self.emission.annul_invoice(invoice, reason_code).await
    }

    /// Start the background regularization sweep and its worker.
    pub fn spawn_regularizer(&self) -> RegularizerHandle {
        spawn_regularizer(
            self.regularizer.clone(),
            Duration::from_secs(self.config.sweep_interval_secs),
        )
    }

    /// The wired regularizer, for schedulers that drive sweeps themselves.
    pub fn regularizer(&self) -> Arc<RegularizerService<InMemoryBatchRepository>> {
        self.regularizer.clone()
    }

    /// The wired lifecycle controller.
    pub fn emission(&self) -> Arc<WiredEmissionService<G>> {
        self.emission.clone()
    }
}
