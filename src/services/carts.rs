use crate::{
    common::SharedClock,
    errors::ServiceError,
    events::{Event, EventSender},
    filter::ListFilter,
    models::{Cart, CartStatus},
    store::EntityStore,
};
use serde::Serialize;
use tracing::{info, instrument};

/// Fleet counts by status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub active: usize,
    pub maintenance: usize,
    pub out_of_service: usize,
    /// Share of active carts, rounded to a whole percent.
    pub operational_percent: u32,
}

/// Service for managing the haul cart fleet
pub struct CartService {
    store: EntityStore<Cart>,
    event_sender: EventSender,
    clock: SharedClock,
}

impl CartService {
    pub fn new(event_sender: EventSender, clock: SharedClock) -> Self {
        Self {
            store: EntityStore::new(),
            event_sender,
            clock,
        }
    }

    /// Registers a cart, stamping today's date when none is given.
    #[instrument(skip(self, cart), fields(code = %cart.code))]
    pub fn create(&mut self, mut cart: Cart) -> Result<Cart, ServiceError> {
        if cart.registration_date.is_none() {
            cart.registration_date = Some(self.clock.today());
        }

        let id = self.store.create(cart)?;
        let created = self.store.require(&id)?.clone();

        self.event_sender.send_or_log(Event::CartRegistered {
            cart_id: id.clone(),
            code: created.code.clone(),
        });
        info!(cart_id = %id, status = %created.status, "cart registered");
        Ok(created)
    }

    /// Replaces a cart; the registration date on file is kept.
    #[instrument(skip(self, cart))]
    pub fn update(&mut self, id: &str, mut cart: Cart) -> Result<Cart, ServiceError> {
        let existing = self.store.require(id)?;
        if existing.registration_date.is_some() {
            cart.registration_date = existing.registration_date;
        }

        self.store.update(id, cart)?;
        let updated = self.store.require(id)?.clone();

        self.event_sender.send_or_log(Event::CartUpdated {
            cart_id: updated.id.clone(),
            code: updated.code.clone(),
        });
        info!(cart_id = %id, status = %updated.status, "cart updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub fn delete(&mut self, id: &str) -> Result<Cart, ServiceError> {
        let removed = self.store.delete(id)?;
        self.event_sender.send_or_log(Event::RecordDeleted {
            kind: "Cart".into(),
            id: id.to_string(),
        });
        info!(cart_id = %id, "cart deleted");
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Cart> {
        self.store.get(id)
    }

    pub fn list(&self) -> Vec<&Cart> {
        self.store.list()
    }

    /// Code/location search narrowed by exact status.
    pub fn search(&self, filter: &ListFilter) -> Vec<&Cart> {
        filter.apply(self.store.iter())
    }

    pub fn in_status(&self, status: CartStatus) -> Vec<&Cart> {
        self.store
            .iter()
            .filter(|cart| cart.status == status)
            .collect()
    }

    pub fn fleet_summary(&self) -> FleetSummary {
        let mut summary = self
            .store
            .iter()
            .fold(FleetSummary::default(), |mut summary, cart| {
                summary.total += 1;
                match cart.status {
                    CartStatus::Active => summary.active += 1,
                    CartStatus::Maintenance => summary.maintenance += 1,
                    CartStatus::OutOfService => summary.out_of_service += 1,
                }
                summary
            });

        if summary.total > 0 {
            let percent = (summary.active as f64 / summary.total as f64) * 100.0;
            summary.operational_percent = percent.round() as u32;
        }
        summary
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
