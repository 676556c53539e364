//! Emission Service - the invoice lifecycle controller.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use fc_01_checksum_codec::{build_unique_code, Modality, UniqueCodeFields};
use fc_03_authority_gateway::{
    AnnulmentRequest, AuthorityApi, AuthorityStatus, InvoiceEnvelope, InvoiceQuery,
};
use shared_types::{
    authority_timestamp, EmissionMode, GatewayFault, InvoiceRef, InvoiceState, TimeSource,
};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::domain::invoice::FiscalInvoice;
use crate::domain::transitions::validate_transition;
use crate::error::{LifecycleError, LifecycleResult};
use crate::ports::inbound::{EmissionApi, TransactionDetails};
use crate::ports::outbound::{
    CodeProvider, ContingencyLog, InvoiceRenderer, InvoiceRepository, PaymentResolver,
    ResolvedPayment,
};

/// Emission configuration.
#[derive(Debug, Clone)]
pub struct EmissionConfig {
    /// Issuer tax identifier (up to 13 digits).
    pub issuer_tax_id: u64,
    /// Declared invoicing modality.
    pub modality: Modality,
    /// Document/adjustment type digit.
    pub document_type: u8,
    /// Sector document type (up to 2 digits).
    pub sector_document: u8,
    /// Deadline applied to every gateway round-trip. On expiry the invoice
    /// stays SUBMITTED and a later query resolves the true outcome.
    pub gateway_deadline: Duration,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            issuer_tax_id: 0,
            modality: Modality::Electronic,
            document_type: 1,
            sector_document: 1,
            gateway_deadline: Duration::from_secs(30),
        }
    }
}

/// Invoice lifecycle controller.
///
/// Owns the state machine: no component below this one turns a gateway
/// fault into a state change.
pub struct EmissionService<R, G, C>
where
    R: InvoiceRepository,
    G: AuthorityApi,
    C: CodeProvider,
{
    config: EmissionConfig,
    repository: Arc<R>,
    gateway: Arc<G>,
    codes: Arc<C>,
    payments: Arc<dyn PaymentResolver>,
    renderer: Arc<dyn InvoiceRenderer>,
    contingency: Arc<dyn ContingencyLog>,
    time: Arc<dyn TimeSource>,
    invoice_locks: DashMap<InvoiceRef, Arc<Mutex<()>>>,
}

impl<R, G, C> EmissionService<R, G, C>
where
    R: InvoiceRepository,
    G: AuthorityApi,
    C: CodeProvider,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: EmissionConfig,
        repository: Arc<R>,
        gateway: Arc<G>,
        codes: Arc<C>,
        payments: Arc<dyn PaymentResolver>,
        renderer: Arc<dyn InvoiceRenderer>,
        contingency: Arc<dyn ContingencyLog>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            repository,
            gateway,
            codes,
            payments,
            renderer,
            contingency,
            time,
            invoice_locks: DashMap::new(),
        }
    }

    fn invoice_lock(&self, key: InvoiceRef) -> Arc<Mutex<()>> {
        self.invoice_locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn envelope(&self, invoice: &FiscalInvoice, daily_code: &str) -> InvoiceEnvelope {
        InvoiceEnvelope {
            issuer_tax_id: self.config.issuer_tax_id,
            branch_code: invoice.sales_point.branch_code,
            pos_code: invoice.sales_point.pos_code,
            sequence: invoice.sequence,
            unique_code: invoice.unique_code.clone(),
            daily_code: daily_code.to_string(),
            issued_at: authority_timestamp(invoice.issued_at),
            amount_cents: invoice.amount_cents,
            customer_tax_id: invoice.customer_tax_id.clone(),
            customer_name: invoice.customer_name.clone(),
            emission_type: invoice.emission_mode.wire_code(),
            modality: self.config.modality.wire_code(),
            document_type: self.config.document_type,
            sector_document: self.config.sector_document,
        }
    }

    fn query_request(&self, invoice: &FiscalInvoice) -> InvoiceQuery {
        InvoiceQuery {
            issuer_tax_id: self.config.issuer_tax_id,
            branch_code: invoice.sales_point.branch_code,
            pos_code: invoice.sales_point.pos_code,
            sequence: invoice.sequence,
            unique_code: invoice.unique_code.clone(),
        }
    }

    /// Create a DRAFT invoice with its unique code, then flip it to
    /// SUBMITTED before any network dispatch, recording intent so a crash
    /// mid-call is recovered by query rather than by re-derivation.
    async fn create_submitted(
        &self,
        transaction: &TransactionDetails,
        payment: &ResolvedPayment,
        emission_mode: EmissionMode,
        control_code: &str,
    ) -> LifecycleResult<FiscalInvoice> {
        let sales_point = transaction.sales_point;
        let issued_at = self.time.now();
        let sequence = self.repository.next_sequence(sales_point).await?;

        let fields = UniqueCodeFields {
            issuer_tax_id: self.config.issuer_tax_id,
            issued_at,
            branch_code: sales_point.branch_code,
            modality: self.config.modality,
            emission_mode,
            document_type: self.config.document_type,
            sector_document: self.config.sector_document,
            sequence,
            pos_code: sales_point.pos_code,
        };
        let unique_code = build_unique_code(&fields, control_code)?;

        let mut invoice = FiscalInvoice {
            sales_point,
            sequence,
            issued_at,
            unique_code,
            reception_code: None,
            amount_cents: payment.amount_cents,
            customer_tax_id: transaction.customer_tax_id.clone(),
            customer_name: transaction.customer_name.clone(),
            emission_mode,
            state: InvoiceState::Draft,
            last_checked_at: None,
            rejection_reasons: Vec::new(),
            regularized_as: None,
        };
        self.repository.insert(invoice.clone()).await?;

        validate_transition(invoice.state, InvoiceState::Submitted)?;
        invoice.state = InvoiceState::Submitted;
        self.repository.update(invoice.clone()).await?;

        info!(
            invoice = %invoice.invoice_ref(),
            unique_code = %invoice.unique_code,
            ?emission_mode,
            "Invoice recorded, dispatching to authority"
        );
        Ok(invoice)
    }

    /// Submit a SUBMITTED invoice and settle its state from the outcome.
    ///
    /// `log_contingency` is false for regularization resubmissions: the
    /// original batch member already tracks the outstanding obligation, and
    /// double-counting the same sale would keep the batch open forever.
    async fn submit_and_settle(
        &self,
        mut invoice: FiscalInvoice,
        daily_code: &str,
        log_contingency: bool,
    ) -> LifecycleResult<FiscalInvoice> {
        let envelope = self.envelope(&invoice, daily_code);
        let dispatch = timeout(
            self.config.gateway_deadline,
            self.gateway.submit_invoice(envelope),
        )
        .await;
        let now = self.time.now();

        let outcome = match dispatch {
            Err(_elapsed) => {
                // Ambiguous: the document may or may not have been
                // received. Never revert to DRAFT and never resubmit the
                // same unique code; a later query resolves it.
                warn!(
                    invoice = %invoice.invoice_ref(),
                    "Submission deadline elapsed, invoice stays SUBMITTED"
                );
                return Ok(invoice);
            }
            Ok(Err(fault @ GatewayFault::UnsupportedStatus { .. })) => {
                // The authority answered with a status this build does not
                // know. The document may well be received; stay SUBMITTED
                // and surface the fault verbatim for operators.
                return Err(LifecycleError::Gateway(fault));
            }
            Ok(Err(fault)) => {
                validate_transition(invoice.state, InvoiceState::Error)?;
                invoice.state = InvoiceState::Error;
                invoice.emission_mode = EmissionMode::Contingency;
                self.repository.update(invoice.clone()).await?;
                if log_contingency {
                    self.contingency
                        .record_offline_emission(invoice.invoice_ref(), now)
                        .await?;
                }
                warn!(
                    invoice = %invoice.invoice_ref(),
                    %fault,
                    "Gateway fault during submission, invoice queued for regularization"
                );
                return Ok(invoice);
            }
            Ok(Ok(outcome)) => outcome,
        };

        invoice.last_checked_at = Some(now);
        match outcome.status {
            AuthorityStatus::Validated => {
                validate_transition(invoice.state, InvoiceState::Accepted)?;
                invoice.state = InvoiceState::Accepted;
                invoice.reception_code = outcome.reception_code;
                self.repository.update(invoice.clone()).await?;
                info!(
                    invoice = %invoice.invoice_ref(),
                    reception_code = invoice.reception_code.as_deref().unwrap_or(""),
                    "Invoice accepted by authority"
                );
                if let Err(render_error) = self.renderer.render_accepted(&invoice).await {
                    warn!(
                        invoice = %invoice.invoice_ref(),
                        %render_error,
                        "Renderer collaborator failed; invoice remains accepted"
                    );
                }
                Ok(invoice)
            }
            AuthorityStatus::Rejected => {
                validate_transition(invoice.state, InvoiceState::Rejected)?;
                invoice.state = InvoiceState::Rejected;
                invoice.rejection_reasons = outcome.rejection_reasons;
                self.repository.update(invoice.clone()).await?;
                warn!(
                    invoice = %invoice.invoice_ref(),
                    reasons = ?invoice.rejection_reasons,
                    "Invoice rejected by authority"
                );
                Ok(invoice)
            }
            AuthorityStatus::PendingValidation => {
                self.repository.update(invoice.clone()).await?;
                Ok(invoice)
            }
            AuthorityStatus::Annulled => Err(LifecycleError::Gateway(
                GatewayFault::ProtocolFault {
                    fault_code: Some(AuthorityStatus::Annulled.code()),
                    message: "annulled status on a fresh submission".to_string(),
                },
            )),
        }
    }
}

#[async_trait::async_trait]
impl<R, G, C> EmissionApi for EmissionService<R, G, C>
where
    R: InvoiceRepository,
    G: AuthorityApi,
    C: CodeProvider,
{
    async fn emit_invoice(&self, transaction: TransactionDetails) -> LifecycleResult<FiscalInvoice> {
        let payment = match transaction.amount_cents {
            Some(amount_cents) => ResolvedPayment {
                amount_cents,
                reference: transaction.payment_reference.clone(),
            },
            None => self.payments.resolve(&transaction).await?,
        };

        let codes = self.codes.emission_codes(transaction.sales_point).await?;
        let invoice = self
            .create_submitted(&transaction, &payment, EmissionMode::Online, &codes.control_code)
            .await?;

        self.submit_and_settle(invoice, &codes.daily_code_value, true)
            .await
    }

    async fn query_invoice(&self, invoice_ref: InvoiceRef) -> LifecycleResult<FiscalInvoice> {
        let lock = self.invoice_lock(invoice_ref);
        let _guard = lock.lock().await;

        let mut invoice = self
            .repository
            .find(invoice_ref)
            .await?
            .ok_or(LifecycleError::NotFound {
                invoice: invoice_ref,
            })?;

        if !invoice.state.needs_refresh() {
            return Ok(invoice);
        }

        let report = match timeout(
            self.config.gateway_deadline,
            self.gateway.query_invoice(self.query_request(&invoice)),
        )
        .await
        {
            Ok(result) => result?,
            Err(_elapsed) => {
                return Err(LifecycleError::Gateway(GatewayFault::ServiceUnavailable {
                    reason: "query deadline elapsed".to_string(),
                }))
            }
        };

        invoice.last_checked_at = Some(self.time.now());
        match report.status {
            AuthorityStatus::Validated => {
                validate_transition(invoice.state, InvoiceState::Accepted)?;
                invoice.state = InvoiceState::Accepted;
                invoice.reception_code = report.reception_code;
            }
            AuthorityStatus::Rejected => {
                validate_transition(invoice.state, InvoiceState::Rejected)?;
                invoice.state = InvoiceState::Rejected;
                invoice.rejection_reasons = report.rejection_reasons;
            }
            AuthorityStatus::PendingValidation => {}
            AuthorityStatus::Annulled => {
                // Annulment can only follow a locally recorded acceptance;
                // a SUBMITTED invoice reported annulled is an inconsistency.
                return Err(LifecycleError::InvalidTransition {
                    from: invoice.state,
                    to: InvoiceState::Annulled,
                });
            }
        }

        self.repository.update(invoice.clone()).await?;
        Ok(invoice)
    }

    async fn annul_invoice(
        &self,
        invoice_ref: InvoiceRef,
        reason_code: u32,
    ) -> LifecycleResult<FiscalInvoice> {
        let lock = self.invoice_lock(invoice_ref);
        let _guard = lock.lock().await;

        let mut invoice = self
            .repository
            .find(invoice_ref)
            .await?
            .ok_or(LifecycleError::NotFound {
                invoice: invoice_ref,
            })?;

        if invoice.state != InvoiceState::Accepted {
            return Err(LifecycleError::AnnulmentNotAllowed {
                invoice: invoice_ref,
                state: invoice.state,
            });
        }

        let request = AnnulmentRequest {
            issuer_tax_id: self.config.issuer_tax_id,
            branch_code: invoice.sales_point.branch_code,
            pos_code: invoice.sales_point.pos_code,
            sequence: invoice.sequence,
            unique_code: invoice.unique_code.clone(),
            reason_code,
        };
        let report = match timeout(
            self.config.gateway_deadline,
            self.gateway.annul_invoice(request),
        )
        .await
        {
            Ok(result) => result?,
            Err(_elapsed) => {
                return Err(LifecycleError::Gateway(GatewayFault::ServiceUnavailable {
                    reason: "annulment deadline elapsed".to_string(),
                }))
            }
        };

        match report.status {
            AuthorityStatus::Annulled => {
                validate_transition(invoice.state, InvoiceState::Annulled)?;
                invoice.state = InvoiceState::Annulled;
                invoice.last_checked_at = Some(self.time.now());
                self.repository.update(invoice.clone()).await?;
                info!(invoice = %invoice.invoice_ref(), reason_code, "Invoice annulled");
                Ok(invoice)
            }
            other => Err(LifecycleError::Gateway(GatewayFault::ProtocolFault {
                fault_code: Some(other.code()),
                message: format!("unexpected annulment outcome {other:?}"),
            })),
        }
    }

    async fn resubmit_contingency(
        &self,
        invoice_ref: InvoiceRef,
    ) -> LifecycleResult<FiscalInvoice> {
        let lock = self.invoice_lock(invoice_ref);
        let _guard = lock.lock().await;

        let mut original =
            self.repository
                .find(invoice_ref)
                .await?
                .ok_or(LifecycleError::NotFound {
                    invoice: invoice_ref,
                })?;

        if original.state != InvoiceState::Error || original.regularized_as.is_some() {
            return Err(LifecycleError::NotRegularizable {
                invoice: invoice_ref,
                state: original.state,
            });
        }

        let codes = self.codes.emission_codes(original.sales_point).await?;
        let transaction = TransactionDetails {
            sales_point: original.sales_point,
            customer_tax_id: original.customer_tax_id.clone(),
            customer_name: original.customer_name.clone(),
            payment_reference: String::new(),
            amount_cents: Some(original.amount_cents),
        };
        let payment = ResolvedPayment {
            amount_cents: original.amount_cents,
            reference: String::new(),
        };

        let replacement = self
            .create_submitted(
                &transaction,
                &payment,
                EmissionMode::Contingency,
                &codes.control_code,
            )
            .await?;

        info!(
            original = %invoice_ref,
            replacement = %replacement.invoice_ref(),
            "Regularizing contingency invoice as a fresh sequence"
        );

        let settled = self
            .submit_and_settle(replacement, &codes.daily_code_value, false)
            .await?;

        if matches!(
            settled.state,
            InvoiceState::Accepted | InvoiceState::Rejected
        ) {
            original.regularized_as = Some(settled.invoice_ref());
            self.repository.update(original).await?;
        }

        Ok(settled)
    }

    async fn expire_contingency(&self, invoice_ref: InvoiceRef) -> LifecycleResult<FiscalInvoice> {
        let lock = self.invoice_lock(invoice_ref);
        let _guard = lock.lock().await;

        let mut invoice = self
            .repository
            .find(invoice_ref)
            .await?
            .ok_or(LifecycleError::NotFound {
                invoice: invoice_ref,
            })?;

        validate_transition(invoice.state, InvoiceState::ExpiredContingency)?;
        invoice.state = InvoiceState::ExpiredContingency;
        self.repository.update(invoice.clone()).await?;

        warn!(
            invoice = %invoice.invoice_ref(),
            "Regularization deadline lapsed; invoice requires manual reconciliation"
        );
        Ok(invoice)
    }
}
