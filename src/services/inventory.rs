use crate::{
    common::checked_sum,
    errors::ServiceError,
    events::{Event, EventSender},
    filter::ListFilter,
    models::{Chemical, StockStatus},
    store::EntityStore,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Width of the medium tier above the minimum, as a fraction of the minimum.
/// Stock up to 1.5x the minimum is medium.
pub const MEDIUM_STOCK_MARGIN: Decimal = dec!(0.5);

/// Maps stock against minimum stock to a tier.
///
/// With `minimum == 0` the medium tier is empty: zero stock is low and any
/// positive stock is normal. The medium bound is compared as a margin over
/// the minimum so no intermediate value leaves the `Decimal` range.
pub fn classify(stock: Decimal, minimum: Decimal) -> StockStatus {
    if stock <= minimum {
        return StockStatus::LowStock;
    }
    let within_margin = stock
        .checked_sub(minimum)
        .map_or(false, |excess| excess <= minimum * MEDIUM_STOCK_MARGIN);
    if within_margin {
        StockStatus::MediumStock
    } else {
        StockStatus::NormalStock
    }
}

/// Counts of chemicals per stock tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockTierCounts {
    pub low: usize,
    pub medium: usize,
    pub normal: usize,
}

/// Service for managing the chemical inventory
pub struct InventoryService {
    store: EntityStore<Chemical>,
    event_sender: EventSender,
}

impl InventoryService {
    /// Creates a new inventory service instance
    pub fn new(event_sender: EventSender) -> Self {
        Self {
            store: EntityStore::new(),
            event_sender,
        }
    }

    /// Adds a chemical to the inventory
    #[instrument(skip(self, chemical), fields(code = %chemical.code))]
    pub fn create(&mut self, chemical: Chemical) -> Result<Chemical, ServiceError> {
        let id = self.store.create(chemical)?;
        let created = self.store.require(&id)?.clone();

        self.event_sender.send_or_log(Event::ChemicalAdded {
            chemical_id: id.clone(),
            name: created.name.clone(),
        });
        self.alert_if_low(&created);

        info!(chemical_id = %id, "chemical added");
        Ok(created)
    }

    /// Replaces a chemical record
    #[instrument(skip(self, chemical))]
    pub fn update(&mut self, id: &str, chemical: Chemical) -> Result<Chemical, ServiceError> {
        let previous = self.store.require(id)?.clone();
        self.store.update(id, chemical)?;
        let updated = self.store.require(id)?.clone();

        if updated.stock > previous.stock {
            self.event_sender.send_or_log(Event::ChemicalRestocked {
                chemical_id: updated.id.clone(),
                name: updated.name.clone(),
                old_stock: previous.stock,
                new_stock: updated.stock,
                unit: updated.unit.clone(),
            });
        } else {
            self.event_sender.send_or_log(Event::RecordUpdated {
                kind: "Chemical".into(),
                id: updated.id.clone(),
            });
        }
        if previous.stock_status() != StockStatus::LowStock {
            self.alert_if_low(&updated);
        }

        info!(chemical_id = %id, status = %updated.stock_status(), "chemical updated");
        Ok(updated)
    }

    /// Removes a chemical from the inventory
    #[instrument(skip(self))]
    pub fn delete(&mut self, id: &str) -> Result<Chemical, ServiceError> {
        let removed = self.store.delete(id)?;
        self.event_sender.send_or_log(Event::RecordDeleted {
            kind: "Chemical".into(),
            id: id.to_string(),
        });
        info!(chemical_id = %id, "chemical deleted");
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Chemical> {
        self.store.get(id)
    }

    pub fn list(&self) -> Vec<&Chemical> {
        self.store.list()
    }

    /// Name/code/supplier search narrowed by exact category.
    pub fn search(&self, filter: &ListFilter) -> Vec<&Chemical> {
        filter.apply(self.store.iter())
    }

    pub fn stock_status(&self, id: &str) -> Result<StockStatus, ServiceError> {
        Ok(self.store.require(id)?.stock_status())
    }

    /// Chemicals at or below their minimum stock, in insertion order.
    pub fn low_stock(&self) -> Vec<&Chemical> {
        self.store
            .iter()
            .filter(|chemical| chemical.stock_status() == StockStatus::LowStock)
            .collect()
    }

    pub fn tier_counts(&self) -> StockTierCounts {
        self.store
            .iter()
            .fold(StockTierCounts::default(), |mut counts, chemical| {
                match chemical.stock_status() {
                    StockStatus::LowStock => counts.low += 1,
                    StockStatus::MediumStock => counts.medium += 1,
                    StockStatus::NormalStock => counts.normal += 1,
                }
                counts
            })
    }

    /// Total stock valued at unit price.
    pub fn inventory_value(&self) -> Result<Decimal, ServiceError> {
        let values = self
            .store
            .iter()
            .map(Chemical::stock_value)
            .collect::<Result<Vec<_>, _>>()?;
        checked_sum(values, "inventory_value")
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for chemical in self.store.iter() {
            if !categories.contains(&chemical.category.as_str()) {
                categories.push(&chemical.category);
            }
        }
        categories
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn alert_if_low(&self, chemical: &Chemical) {
        if chemical.stock_status() == StockStatus::LowStock {
            warn!(chemical_id = %chemical.id, stock = %chemical.stock, "stock at or below minimum");
            self.event_sender.send_or_log(Event::StockLow {
                chemical_id: chemical.id.clone(),
                name: chemical.name.clone(),
                stock: chemical.stock,
                minimum_stock: chemical.minimum_stock,
                unit: chemical.unit.clone(),
            });
        }
    }
}
