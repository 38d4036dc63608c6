use crate::{
    common::{checked_sum, out_of_range, round_money},
    errors::ServiceError,
    events::{Event, EventSender},
    filter::ListFilter,
    models::{Invoice, InvoiceDraft, InvoiceStatus, LineItemDraft},
    store::EntityStore,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Fixed sales tax (IVA) rate applied to every invoice subtotal.
pub const TAX_RATE: Decimal = dec!(0.16);

/// Subtotal, tax and total of a set of line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// `quantity * unit_price`, or a validation error if it does not fit.
pub fn line_subtotal(quantity: u32, unit_price: Decimal) -> Result<Decimal, ServiceError> {
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .ok_or_else(|| out_of_range("items"))
}

/// Computes invoice totals from `(quantity, unit_price)` lines.
///
/// The subtotal is summed left to right with exact decimal arithmetic, tax is
/// rounded to cents and the total is `subtotal + tax`. Nothing is cached.
/// Amounts past the `Decimal` range are rejected rather than wrapped.
pub fn calculate_totals<I>(lines: I) -> Result<InvoiceTotals, ServiceError>
where
    I: IntoIterator<Item = (u32, Decimal)>,
{
    let subtotal = lines
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, (quantity, unit_price)| {
            sum.checked_add(line_subtotal(quantity, unit_price)?)
                .ok_or_else(|| out_of_range("items"))
        })?;
    let tax = subtotal
        .checked_mul(TAX_RATE)
        .map(round_money)
        .ok_or_else(|| out_of_range("tax"))?;
    let total = subtotal
        .checked_add(tax)
        .ok_or_else(|| out_of_range("total"))?;

    Ok(InvoiceTotals {
        subtotal,
        tax,
        total,
    })
}

/// Service owning invoices and their status lifecycle
pub struct InvoicingService {
    store: EntityStore<Invoice>,
    event_sender: EventSender,
}

impl InvoicingService {
    pub fn new(event_sender: EventSender) -> Self {
        Self {
            store: EntityStore::new(),
            event_sender,
        }
    }

    /// Totals for a form that has not been submitted yet.
    pub fn quote(&self, items: &[LineItemDraft]) -> Result<InvoiceTotals, ServiceError> {
        for item in items {
            validator::Validate::validate(item)?;
        }
        calculate_totals(items.iter().map(|item| (item.quantity, item.unit_price)))
    }

    /// Creates a pending invoice with totals computed from its lines.
    #[instrument(skip(self, draft), fields(number = %draft.number))]
    pub fn create_invoice(&mut self, draft: InvoiceDraft) -> Result<Invoice, ServiceError> {
        draft.check()?;
        let id = self.store.create(Invoice::from_draft(draft)?)?;
        let invoice = self.store.require(&id)?.clone();

        self.event_sender.send_or_log(Event::InvoiceCreated {
            invoice_id: id.clone(),
            number: invoice.number.clone(),
            total: invoice.total,
        });
        info!(invoice_id = %id, total = %invoice.total, "invoice created");
        Ok(invoice)
    }

    /// Stores an existing invoice as-is, e.g. when loading sample data.
    /// Its totals must already agree with its lines.
    pub fn import_invoice(&mut self, invoice: Invoice) -> Result<Invoice, ServiceError> {
        let id = self.store.create(invoice)?;
        Ok(self.store.require(&id)?.clone())
    }

    /// Replaces header and lines; totals are recomputed and status kept.
    #[instrument(skip(self, draft))]
    pub fn update_invoice(&mut self, id: &str, draft: InvoiceDraft) -> Result<Invoice, ServiceError> {
        draft.check()?;
        let mut invoice = self.store.require(id)?.clone();
        invoice.number = draft.number;
        invoice.client = draft.client;
        invoice.date = draft.date;
        invoice.replace_items(draft.items)?;

        self.store.update(id, invoice)?;
        let updated = self.store.require(id)?.clone();

        self.event_sender.send_or_log(Event::InvoiceUpdated {
            invoice_id: updated.id.clone(),
            number: updated.number.clone(),
        });
        info!(invoice_id = %id, total = %updated.total, "invoice updated");
        Ok(updated)
    }

    pub fn mark_paid(&mut self, id: &str) -> Result<Invoice, ServiceError> {
        self.set_status(id, InvoiceStatus::Paid)
    }

    pub fn void_invoice(&mut self, id: &str) -> Result<Invoice, ServiceError> {
        self.set_status(id, InvoiceStatus::Voided)
    }

    /// Moves an invoice to `status` if the lifecycle allows it.
    #[instrument(skip(self))]
    pub fn set_status(&mut self, id: &str, status: InvoiceStatus) -> Result<Invoice, ServiceError> {
        let mut invoice = self.store.require(id)?.clone();
        let current = invoice.status;

        if !current.can_transition_to(status) {
            warn!(invoice_id = %id, from = %current, to = %status, "rejected status transition");
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot transition invoice {} from '{}' to '{}'",
                invoice.number, current, status
            )));
        }
        if current == status {
            return Ok(invoice);
        }

        invoice.status = status;
        self.store.update(id, invoice)?;
        let updated = self.store.require(id)?.clone();

        let event = match status {
            InvoiceStatus::Paid => Event::InvoicePaid {
                invoice_id: updated.id.clone(),
                number: updated.number.clone(),
                total: updated.total,
            },
            InvoiceStatus::Voided => Event::InvoiceVoided {
                invoice_id: updated.id.clone(),
                number: updated.number.clone(),
            },
            InvoiceStatus::Pending => Event::InvoiceUpdated {
                invoice_id: updated.id.clone(),
                number: updated.number.clone(),
            },
        };
        self.event_sender.send_or_log(event);

        info!(invoice_id = %id, from = %current, to = %status, "invoice status changed");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub fn delete(&mut self, id: &str) -> Result<Invoice, ServiceError> {
        let removed = self.store.delete(id)?;
        self.event_sender.send_or_log(Event::RecordDeleted {
            kind: "Invoice".into(),
            id: id.to_string(),
        });
        info!(invoice_id = %id, "invoice deleted");
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Invoice> {
        self.store.get(id)
    }

    pub fn list(&self) -> Vec<&Invoice> {
        self.store.list()
    }

    /// Number/client search narrowed by exact status.
    pub fn search(&self, filter: &ListFilter) -> Vec<&Invoice> {
        filter.apply(self.store.iter())
    }

    pub fn count_by_status(&self, status: InvoiceStatus) -> usize {
        self.store
            .iter()
            .filter(|invoice| invoice.status == status)
            .count()
    }

    pub fn total_by_status(&self, status: InvoiceStatus) -> Result<Decimal, ServiceError> {
        checked_sum(
            self.store
                .iter()
                .filter(|invoice| invoice.status == status)
                .map(|invoice| invoice.total),
            "total",
        )
    }

    /// Amount still to be collected from pending invoices.
    pub fn outstanding_total(&self) -> Result<Decimal, ServiceError> {
        self.total_by_status(InvoiceStatus::Pending)
    }

    /// Amount collected from paid invoices.
    pub fn collected_total(&self) -> Result<Decimal, ServiceError> {
        self.total_by_status(InvoiceStatus::Paid)
    }

    /// Total billed across every invoice that was not voided. A voided
    /// invoice was cancelled and never billed.
    pub fn invoiced_total(&self) -> Result<Decimal, ServiceError> {
        checked_sum(
            self.store
                .iter()
                .filter(|invoice| invoice.status != InvoiceStatus::Voided)
                .map(|invoice| invoice.total),
            "total",
        )
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
