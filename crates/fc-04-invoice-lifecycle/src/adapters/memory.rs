//! In-memory invoice repository.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{InvoiceRef, SalesPoint};

use crate::domain::invoice::FiscalInvoice;
use crate::error::{LifecycleError, LifecycleResult};
use crate::ports::outbound::InvoiceRepository;

/// Width of the sequence field in the unique code.
const MAX_SEQUENCE: u64 = 9_999_999_999;

/// In-memory repository for unit tests and embedded deployments.
#[derive(Default)]
pub struct InMemoryInvoiceRepository {
    invoices: RwLock<HashMap<InvoiceRef, FiscalInvoice>>,
    unique_codes: RwLock<HashSet<String>>,
    sequences: RwLock<HashMap<SalesPoint, u64>>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored invoices.
    pub fn len(&self) -> usize {
        self.invoices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.read().is_empty()
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn next_sequence(&self, sales_point: SalesPoint) -> LifecycleResult<u64> {
        let mut sequences = self.sequences.write();
        let counter = sequences.entry(sales_point).or_insert(0);
        if *counter >= MAX_SEQUENCE {
            return Err(LifecycleError::SequenceExhausted { sales_point });
        }
        *counter += 1;
        Ok(*counter)
    }

    async fn insert(&self, invoice: FiscalInvoice) -> LifecycleResult<()> {
        let mut invoices = self.invoices.write();
        let mut unique_codes = self.unique_codes.write();

        let key = invoice.invoice_ref();
        if invoices.contains_key(&key) {
            return Err(LifecycleError::Repository {
                reason: format!("invoice {key} already exists"),
            });
        }
        if !unique_codes.insert(invoice.unique_code.clone()) {
            return Err(LifecycleError::DuplicateUniqueCode {
                unique_code: invoice.unique_code,
            });
        }
        invoices.insert(key, invoice);
        Ok(())
    }

    async fn find(&self, invoice: InvoiceRef) -> LifecycleResult<Option<FiscalInvoice>> {
        Ok(self.invoices.read().get(&invoice).cloned())
    }

    async fn update(&self, invoice: FiscalInvoice) -> LifecycleResult<()> {
        let mut invoices = self.invoices.write();
        let key = invoice.invoice_ref();
        match invoices.get_mut(&key) {
            Some(slot) => {
                *slot = invoice;
                Ok(())
            }
            None => Err(LifecycleError::NotFound { invoice: key }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared_types::{EmissionMode, InvoiceState};

    fn sample(sequence: u64, unique_code: &str) -> FiscalInvoice {
        FiscalInvoice {
            sales_point: SalesPoint::new(0, 0),
            sequence,
            issued_at: Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap(),
            unique_code: unique_code.to_string(),
            reception_code: None,
            amount_cents: 100,
            customer_tax_id: "987654321".to_string(),
            customer_name: "ACME".to_string(),
            emission_mode: EmissionMode::Online,
            state: InvoiceState::Draft,
            last_checked_at: None,
            rejection_reasons: Vec::new(),
            regularized_as: None,
        }
    }

    #[tokio::test]
    async fn test_sequences_are_monotonic_per_sales_point() {
        let repo = InMemoryInvoiceRepository::new();
        let a = SalesPoint::new(0, 0);
        let b = SalesPoint::new(1, 0);

        assert_eq!(repo.next_sequence(a).await.unwrap(), 1);
        assert_eq!(repo.next_sequence(a).await.unwrap(), 2);
        assert_eq!(repo.next_sequence(b).await.unwrap(), 1);
        assert_eq!(repo.next_sequence(a).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_unique_code_rejected() {
        let repo = InMemoryInvoiceRepository::new();
        repo.insert(sample(1, "CODE-A")).await.unwrap();

        let err = repo.insert(sample(2, "CODE-A")).await.unwrap_err();
        assert!(matches!(err, LifecycleError::DuplicateUniqueCode { .. }));
    }

    #[tokio::test]
    async fn test_update_requires_existing_record() {
        let repo = InMemoryInvoiceRepository::new();
        let err = repo.update(sample(1, "CODE-A")).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
    }
}
