use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use validator::Validate;

use super::validate_non_negative;
use crate::errors::{field_error, ServiceError};
use crate::filter::Searchable;
use crate::services::invoicing::{calculate_totals, line_subtotal, InvoiceTotals};
use crate::store::Record;

/// Invoice lifecycle state.
///
/// `pending` is the only non-terminal state: it moves to `paid` or `voided`
/// and nothing leaves `paid` or `voided`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
    Voided,
}

impl InvoiceStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Voided)
    }

    /// Staying in the same state is always allowed.
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        match (self, next) {
            (from, to) if from == to => true,
            (InvoiceStatus::Pending, InvoiceStatus::Paid) => true,
            (InvoiceStatus::Pending, InvoiceStatus::Voided) => true,
            _ => false,
        }
    }
}

/// Line item as entered on the invoice form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LineItemDraft {
    #[validate(length(min = 1, message = "line description is required"))]
    pub description: String,

    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,

    #[validate(custom = "validate_non_negative")]
    pub unit_price: Decimal,
}

impl LineItemDraft {
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }
}

/// Stored line item with its computed subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LineItem {
    #[serde(default)]
    pub id: String,

    #[validate(length(min = 1, message = "line description is required"))]
    pub description: String,

    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,

    #[validate(custom = "validate_non_negative")]
    pub unit_price: Decimal,

    pub subtotal: Decimal,
}

impl LineItem {
    pub fn line_subtotal(&self) -> Result<Decimal, ServiceError> {
        line_subtotal(self.quantity, self.unit_price)
    }
}

/// Invoice header and lines as entered on the form; totals are never supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InvoiceDraft {
    #[validate(length(min = 1, message = "invoice number is required"))]
    pub number: String,

    #[validate(length(min = 1, message = "client is required"))]
    pub client: String,

    pub date: NaiveDate,

    pub items: Vec<LineItemDraft>,
}

impl InvoiceDraft {
    pub fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        check_has_items(self.items.len())?;
        for item in &self.items {
            item.validate()?;
        }
        self.totals()?;
        Ok(())
    }

    pub fn totals(&self) -> Result<InvoiceTotals, ServiceError> {
        calculate_totals(self.items.iter().map(|item| (item.quantity, item.unit_price)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Invoice {
    #[serde(default)]
    pub id: String,

    #[validate(length(min = 1, message = "invoice number is required"))]
    pub number: String,

    #[validate(length(min = 1, message = "client is required"))]
    pub client: String,

    pub date: NaiveDate,

    pub subtotal: Decimal,

    pub tax: Decimal,

    pub total: Decimal,

    #[serde(default)]
    pub status: InvoiceStatus,

    pub items: Vec<LineItem>,
}

impl Invoice {
    /// Builds a pending invoice from a draft with freshly computed totals.
    pub fn from_draft(draft: InvoiceDraft) -> Result<Self, ServiceError> {
        let mut invoice = Self {
            id: String::new(),
            number: draft.number,
            client: draft.client,
            date: draft.date,
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            status: InvoiceStatus::Pending,
            items: Vec::new(),
        };
        invoice.replace_items(draft.items)?;
        Ok(invoice)
    }

    /// Replaces every line and recomputes all totals from scratch.
    /// Lines are numbered `1..n` in order.
    /// On error the invoice is left unchanged.
    pub fn replace_items(&mut self, items: Vec<LineItemDraft>) -> Result<(), ServiceError> {
        let mut replaced = self.clone();
        replaced.items = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| LineItem {
                id: (index + 1).to_string(),
                subtotal: Decimal::ZERO,
                description: item.description,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();
        replaced.recompute()?;
        *self = replaced;
        Ok(())
    }

    /// Recomputes line subtotals and invoice totals. On error nothing is
    /// written.
    pub fn recompute(&mut self) -> Result<(), ServiceError> {
        let subtotals = self
            .items
            .iter()
            .map(LineItem::line_subtotal)
            .collect::<Result<Vec<_>, _>>()?;
        let totals = self.computed_totals()?;

        for (item, subtotal) in self.items.iter_mut().zip(subtotals) {
            item.subtotal = subtotal;
        }
        self.subtotal = totals.subtotal;
        self.tax = totals.tax;
        self.total = totals.total;
        Ok(())
    }

    pub fn computed_totals(&self) -> Result<InvoiceTotals, ServiceError> {
        calculate_totals(self.items.iter().map(|item| (item.quantity, item.unit_price)))
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: self.subtotal,
            tax: self.tax,
            total: self.total,
        }
    }

    /// Form view of the stored lines.
    pub fn to_draft(&self) -> InvoiceDraft {
        InvoiceDraft {
            number: self.number.clone(),
            client: self.client.clone(),
            date: self.date,
            items: self
                .items
                .iter()
                .map(|item| LineItemDraft::new(item.description.clone(), item.quantity, item.unit_price))
                .collect(),
        }
    }
}

impl Record for Invoice {
    const KIND: &'static str = "Invoice";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        check_has_items(self.items.len())?;
        for item in &self.items {
            item.validate()?;
            if item.subtotal != item.line_subtotal()? {
                return Err(field_error(
                    "items",
                    "line_subtotal",
                    format!(
                        "line '{}' subtotal {} does not equal quantity x unit price",
                        item.description, item.subtotal
                    ),
                ));
            }
        }
        if self.totals() != self.computed_totals()? {
            return Err(field_error(
                "total",
                "totals",
                format!("invoice {} totals do not match its line items", self.number),
            ));
        }
        Ok(())
    }
}

impl Searchable for Invoice {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.number.as_str(), self.client.as_str()]
    }

    fn category(&self) -> &str {
        self.status.as_ref()
    }
}

fn check_has_items(count: usize) -> Result<(), ServiceError> {
    if count == 0 {
        return Err(field_error(
            "items",
            "length",
            "an invoice needs at least one line item".to_string(),
        ));
    }
    Ok(())
}
