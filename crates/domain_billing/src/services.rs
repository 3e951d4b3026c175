//! Billing application service
//!
//! Orchestrates the invoice lifecycle over the storage ports: validation
//! before anything is written, number assignment with collision retry, and
//! customer removal under the configured deletion policy.

use std::sync::Arc;

use tracing::{debug, info, warn};

use core_kernel::{CustomerId, InvoiceId, PortError};
use domain_party::{CustomerDeletionPolicy, CustomerPort};

use crate::error::BillingError;
use crate::invoice::{contains_ignore_case, Invoice, InvoiceDraft, InvoiceQuery};
use crate::numbering::InvoiceNumbering;
use crate::ports::{CustomerRemoval, InvoicePort, INVOICE_NUMBER_FIELD};
use crate::totals::InvoiceTotals;

/// Invoice lifecycle operations
#[derive(Clone)]
pub struct BillingService {
    invoices: Arc<dyn InvoicePort>,
    customers: Arc<dyn CustomerPort>,
    numbering: InvoiceNumbering,
    deletion_policy: CustomerDeletionPolicy,
}

impl BillingService {
    /// Creates a service with default numbering and the cascade policy
    pub fn new(invoices: Arc<dyn InvoicePort>, customers: Arc<dyn CustomerPort>) -> Self {
        Self {
            invoices,
            customers,
            numbering: InvoiceNumbering::default(),
            deletion_policy: CustomerDeletionPolicy::default(),
        }
    }

    /// Overrides the numbering settings
    pub fn with_numbering(mut self, numbering: InvoiceNumbering) -> Self {
        self.numbering = numbering;
        self
    }

    /// Overrides the customer deletion policy
    pub fn with_deletion_policy(mut self, policy: CustomerDeletionPolicy) -> Self {
        self.deletion_policy = policy;
        self
    }

    pub fn invoice_port(&self) -> &Arc<dyn InvoicePort> {
        &self.invoices
    }

    pub fn customer_port(&self) -> &Arc<dyn CustomerPort> {
        &self.customers
    }

    pub fn deletion_policy(&self) -> CustomerDeletionPolicy {
        self.deletion_policy
    }

    /// Validates and stores a new invoice
    ///
    /// A supplied number is used as is and rejected with
    /// `DuplicateInvoiceNumber` if taken. Otherwise numbers are generated
    /// until one is free, up to the configured number of attempts.
    pub async fn create_invoice(&self, draft: InvoiceDraft) -> Result<Invoice, BillingError> {
        draft.validate()?;
        self.ensure_customer(draft.customer_id).await?;

        let invoice = match draft.invoice_number.clone() {
            Some(number) => {
                let invoice = Invoice::from_draft(number.clone(), draft);
                self.invoices
                    .insert_invoice(invoice)
                    .await
                    .map_err(|e| match e {
                        e if e.is_conflict_on(INVOICE_NUMBER_FIELD) => {
                            BillingError::DuplicateInvoiceNumber(number.to_string())
                        }
                        e => BillingError::Port(e),
                    })?
            }
            None => self.insert_with_generated_number(draft).await?,
        };

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            customer_id = %invoice.customer_id,
            items = invoice.items.len(),
            "Invoice created"
        );
        Ok(invoice)
    }

    async fn insert_with_generated_number(&self, draft: InvoiceDraft) -> Result<Invoice, BillingError> {
        let attempts = self.numbering.max_attempts();
        for attempt in 1..=attempts {
            let candidate = self.numbering.next_candidate();
            match self
                .invoices
                .insert_invoice(Invoice::from_draft(candidate.clone(), draft.clone()))
                .await
            {
                Ok(invoice) => return Ok(invoice),
                Err(e) if e.is_conflict_on(INVOICE_NUMBER_FIELD) => {
                    warn!(%candidate, attempt, "Generated invoice number collided, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(BillingError::NumberingExhausted { attempts })
    }

    /// Replaces the editable fields and the full item set of an invoice
    pub async fn update_invoice(
        &self,
        id: InvoiceId,
        draft: InvoiceDraft,
    ) -> Result<Invoice, BillingError> {
        draft.validate()?;
        let mut invoice = self.get_invoice(id).await?;

        if let Some(number) = &draft.invoice_number {
            if *number != invoice.invoice_number {
                return Err(BillingError::InvoiceNumberImmutable(
                    invoice.invoice_number.to_string(),
                ));
            }
        }
        if draft.customer_id != invoice.customer_id {
            self.ensure_customer(draft.customer_id).await?;
        }

        invoice.apply_changes(draft);
        let invoice = self
            .invoices
            .replace_invoice(invoice)
            .await
            .map_err(|e| invoice_error(e, id))?;

        info!(invoice_id = %invoice.id, items = invoice.items.len(), "Invoice updated");
        Ok(invoice)
    }

    /// Retrieves an invoice
    pub async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, BillingError> {
        self.invoices
            .get_invoice(id)
            .await
            .map_err(|e| invoice_error(e, id))
    }

    /// Lists invoices matching the query, newest first
    ///
    /// A search term is resolved against customer names here, so storage
    /// only sees the matching customer ids.
    pub async fn list_invoices(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>, BillingError> {
        let mut query = query.clone();
        if let Some(term) = query.search_term() {
            query.search_customers = self
                .customers
                .list_customers()
                .await?
                .into_iter()
                .filter(|c| contains_ignore_case(&c.name, term))
                .map(|c| c.id)
                .collect();
        }

        let invoices = self.invoices.find_invoices(&query).await?;
        debug!(count = invoices.len(), search = ?query.search, "Listed invoices");
        Ok(invoices)
    }

    /// Deletes an invoice with its items
    pub async fn delete_invoice(&self, id: InvoiceId) -> Result<(), BillingError> {
        self.invoices
            .delete_invoice(id)
            .await
            .map_err(|e| invoice_error(e, id))?;
        info!(invoice_id = %id, "Invoice deleted");
        Ok(())
    }

    /// Retrieves an invoice together with its derived totals
    pub async fn invoice_with_totals(
        &self,
        id: InvoiceId,
    ) -> Result<(Invoice, InvoiceTotals), BillingError> {
        let invoice = self.get_invoice(id).await?;
        let totals = invoice.totals()?;
        Ok((invoice, totals))
    }

    /// Removes a customer, handling their invoices per the deletion policy
    ///
    /// The policy is applied by storage in one unit. Returns the number of
    /// invoices removed along with the customer.
    pub async fn remove_customer(&self, id: CustomerId) -> Result<usize, BillingError> {
        let outcome = self
            .invoices
            .remove_customer(id, self.deletion_policy)
            .await
            .map_err(|e| customer_error(e, id))?;

        match outcome {
            CustomerRemoval::Refused { invoices } => Err(BillingError::CustomerHasInvoices {
                customer: id.to_string(),
                invoices,
            }),
            CustomerRemoval::Removed { invoices } => {
                info!(
                    customer_id = %id,
                    invoices_removed = invoices,
                    policy = %self.deletion_policy,
                    "Customer removed"
                );
                Ok(invoices)
            }
        }
    }

    async fn ensure_customer(&self, id: CustomerId) -> Result<(), BillingError> {
        if self.customers.exists(id).await? {
            Ok(())
        } else {
            Err(BillingError::CustomerNotFound(id.to_string()))
        }
    }
}

fn invoice_error(error: PortError, id: InvoiceId) -> BillingError {
    if error.is_not_found() {
        BillingError::InvoiceNotFound(id.to_string())
    } else {
        BillingError::Port(error)
    }
}

fn customer_error(error: PortError, id: CustomerId) -> BillingError {
    if error.is_not_found() {
        BillingError::CustomerNotFound(id.to_string())
    } else {
        BillingError::Port(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbering::InvoiceNumber;
    use crate::ports::mock::MockInvoicePort;
    use chrono::NaiveDate;
    use core_kernel::{Money, Percentage};
    use domain_party::{MockCustomerPort, NewCustomer};
    use rust_decimal_macros::dec;

    struct Harness {
        service: BillingService,
        invoices: MockInvoicePort,
        customers: MockCustomerPort,
        customer_id: CustomerId,
    }

    async fn harness() -> Harness {
        let customers = MockCustomerPort::new();
        let invoices = MockInvoicePort::linked(customers.clone());
        let customer = customers
            .create_customer(NewCustomer::named("Farah Khan"))
            .await
            .unwrap();
        let service = BillingService::new(Arc::new(invoices.clone()), Arc::new(customers.clone()));
        Harness {
            service,
            invoices,
            customers,
            customer_id: customer.id,
        }
    }

    fn draft(customer_id: CustomerId) -> InvoiceDraft {
        let day = NaiveDate::from_ymd_opt(2024, 11, 5).unwrap();
        InvoiceDraft::new(customer_id, day, day)
            .item("Bridal makeup", 2, Money::new(dec!(50.00)))
            .item("Hair styling", 1, Money::new(dec!(25.00)))
            .tax(Percentage::new(dec!(18)))
            .advance(Money::new(dec!(50.00)))
    }

    #[tokio::test]
    async fn test_create_assigns_number_and_computes_totals() {
        let h = harness().await;
        let invoice = h.service.create_invoice(draft(h.customer_id)).await.unwrap();

        assert!(invoice.invoice_number.as_str().starts_with("INV-"));
        let (_, totals) = h.service.invoice_with_totals(invoice.id).await.unwrap();
        assert_eq!(totals.total.amount(), dec!(147.50));
        assert_eq!(totals.due.amount(), dec!(97.50));
    }

    #[tokio::test]
    async fn test_empty_invoice_leaves_no_record() {
        let h = harness().await;
        let day = NaiveDate::from_ymd_opt(2024, 11, 5).unwrap();
        let empty = InvoiceDraft::new(h.customer_id, day, day);

        let err = h.service.create_invoice(empty).await.unwrap_err();
        assert!(matches!(err, BillingError::EmptyInvoice));
        assert!(h.invoices.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_item_leaves_no_record() {
        let h = harness().await;
        let bad = draft(h.customer_id).item("Travel", 1, Money::zero());

        let err = h.service.create_invoice(bad).await.unwrap_err();
        assert_eq!(err.field_name().as_deref(), Some("items[2].unit_price"));
        assert!(h.invoices.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_customer_rejected() {
        let h = harness().await;
        let err = h.service.create_invoice(draft(CustomerId::new_v7())).await.unwrap_err();
        assert!(matches!(err, BillingError::CustomerNotFound(_)));
    }

    #[tokio::test]
    async fn test_supplied_duplicate_number_rejected() {
        let h = harness().await;
        let number = InvoiceNumber::parse("GLAM-2024-001").unwrap();
        h.service
            .create_invoice(draft(h.customer_id).numbered(number.clone()))
            .await
            .unwrap();

        let err = h
            .service
            .create_invoice(draft(h.customer_id).numbered(number))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::DuplicateInvoiceNumber(ref n) if n == "GLAM-2024-001"));
        assert_eq!(h.invoices.len().await, 1);
    }

    #[tokio::test]
    async fn test_generated_collision_is_retried() {
        let h = harness().await;
        h.invoices.force_number_conflicts(2);

        let invoice = h.service.create_invoice(draft(h.customer_id)).await.unwrap();
        assert!(h.invoices.number_exists(&invoice.invoice_number).await.unwrap());
    }

    #[tokio::test]
    async fn test_numbering_gives_up_after_max_attempts() {
        let h = harness().await;
        let service = h
            .service
            .clone()
            .with_numbering(InvoiceNumbering::new("INV", 3).unwrap());
        h.invoices.force_number_conflicts(3);

        let err = service.create_invoice(draft(h.customer_id)).await.unwrap_err();
        assert!(matches!(err, BillingError::NumberingExhausted { attempts: 3 }));
        assert!(h.invoices.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_replaces_items_and_keeps_number() {
        let h = harness().await;
        let created = h.service.create_invoice(draft(h.customer_id)).await.unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 11, 5).unwrap();
        let edit = InvoiceDraft::new(h.customer_id, day, day)
            .item("Engagement look", 1, Money::new(dec!(120.00)));
        let updated = h.service.update_invoice(created.id, edit).await.unwrap();

        assert_eq!(updated.invoice_number, created.invoice_number);
        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.totals().unwrap().total.amount(), dec!(120.00));
    }

    #[tokio::test]
    async fn test_update_cannot_change_number() {
        let h = harness().await;
        let created = h.service.create_invoice(draft(h.customer_id)).await.unwrap();

        let edit = draft(h.customer_id).numbered(InvoiceNumber::parse("INV-00000001").unwrap());
        let err = h.service.update_invoice(created.id, edit).await.unwrap_err();
        assert!(matches!(err, BillingError::InvoiceNumberImmutable(_)));
    }

    #[tokio::test]
    async fn test_update_missing_invoice() {
        let h = harness().await;
        let err = h
            .service
            .update_invoice(InvoiceId::new_v7(), draft(h.customer_id))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::InvoiceNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_invoice() {
        let h = harness().await;
        let created = h.service.create_invoice(draft(h.customer_id)).await.unwrap();
        h.service.delete_invoice(created.id).await.unwrap();
        assert!(matches!(
            h.service.get_invoice(created.id).await,
            Err(BillingError::InvoiceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_customer_cascades() {
        let h = harness().await;
        h.service.create_invoice(draft(h.customer_id)).await.unwrap();
        h.service.create_invoice(draft(h.customer_id)).await.unwrap();

        let removed = h.service.remove_customer(h.customer_id).await.unwrap();
        assert_eq!(removed, 2);
        assert!(h.invoices.is_empty().await);
        assert!(!h.customers.exists(h.customer_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_customer_restricted() {
        let h = harness().await;
        h.service.create_invoice(draft(h.customer_id)).await.unwrap();
        let service = h
            .service
            .clone()
            .with_deletion_policy(CustomerDeletionPolicy::Restrict);

        let err = service.remove_customer(h.customer_id).await.unwrap_err();
        assert!(matches!(err, BillingError::CustomerHasInvoices { invoices: 1, .. }));
        assert!(h.customers.exists(h.customer_id).await.unwrap());
        assert_eq!(h.invoices.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_customer() {
        let h = harness().await;
        let err = h.service.remove_customer(CustomerId::new_v7()).await.unwrap_err();
        assert!(matches!(err, BillingError::CustomerNotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_customer_without_invoices_under_restrict() {
        let h = harness().await;
        let service = h
            .service
            .clone()
            .with_deletion_policy(CustomerDeletionPolicy::Restrict);

        assert_eq!(service.remove_customer(h.customer_id).await.unwrap(), 0);
        assert!(!h.customers.exists(h.customer_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_searches_number_and_customer_name() {
        let h = harness().await;
        let other = h
            .customers
            .create_customer(NewCustomer::named("Zoya Ali"))
            .await
            .unwrap();
        let glam = h
            .service
            .create_invoice(
                draft(other.id).numbered(InvoiceNumber::parse("GLAM-2024-009").unwrap()),
            )
            .await
            .unwrap();
        let farah = h.service.create_invoice(draft(h.customer_id)).await.unwrap();

        let by_name = h.service.list_invoices(&InvoiceQuery::searching("KHAN")).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, farah.id);

        let by_number = h.service.list_invoices(&InvoiceQuery::searching("glam")).await.unwrap();
        assert_eq!(by_number.len(), 1);
        assert_eq!(by_number[0].id, glam.id);

        let none = h.service.list_invoices(&InvoiceQuery::searching("nobody")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_by_customer() {
        let h = harness().await;
        let other = h
            .customers
            .create_customer(NewCustomer::named("Zoya"))
            .await
            .unwrap();
        h.service.create_invoice(draft(h.customer_id)).await.unwrap();
        h.service.create_invoice(draft(other.id)).await.unwrap();

        let mine = h
            .service
            .list_invoices(&InvoiceQuery::for_customer(h.customer_id))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].customer_id, h.customer_id);
    }
}
