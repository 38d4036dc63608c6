use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::warn;

use crate::common::SharedClock;
use crate::models::AttendanceStatus;

/// Handle services use to publish activity. Holds the feed weakly, so it
/// stops delivering once the [`ActivityLog`] is dropped.
#[derive(Clone)]
pub struct EventSender {
    feed: Weak<Mutex<Feed>>,
    clock: SharedClock,
}

impl fmt::Debug for EventSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSender")
            .field("connected", &(self.feed.strong_count() > 0))
            .finish()
    }
}

impl EventSender {
    /// Stamps an event with the current time and pushes it onto the feed
    pub fn send(&self, event: Event) -> Result<(), String> {
        let feed = self
            .feed
            .upgrade()
            .ok_or_else(|| "Failed to send event: activity log is closed".to_string())?;
        let entry = ActivityEntry {
            at: self.clock.now(),
            event,
        };
        lock(&feed).push(entry);
        Ok(())
    }

    /// Sends an event, logging instead of failing when the log is gone.
    pub fn send_or_log(&self, event: Event) {
        if let Err(err) = self.send(event) {
            warn!(error = %err, "activity event dropped");
        }
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Cart events
    CartRegistered { cart_id: String, code: String },
    CartUpdated { cart_id: String, code: String },

    // Inventory events
    ChemicalAdded { chemical_id: String, name: String },
    ChemicalRestocked {
        chemical_id: String,
        name: String,
        old_stock: Decimal,
        new_stock: Decimal,
        unit: String,
    },
    StockLow {
        chemical_id: String,
        name: String,
        stock: Decimal,
        minimum_stock: Decimal,
        unit: String,
    },

    // Workforce events
    WorkerHired { worker_id: String, name: String },
    AttendanceMarked {
        worker_id: String,
        date: NaiveDate,
        status: AttendanceStatus,
    },

    // Invoice events
    InvoiceCreated {
        invoice_id: String,
        number: String,
        total: Decimal,
    },
    InvoiceUpdated { invoice_id: String, number: String },
    InvoicePaid {
        invoice_id: String,
        number: String,
        total: Decimal,
    },
    InvoiceVoided { invoice_id: String, number: String },

    // Generic record events
    RecordUpdated { kind: String, id: String },
    RecordDeleted { kind: String, id: String },
}

impl Event {
    /// One-line description for the recent-activity feed.
    pub fn describe(&self) -> String {
        match self {
            Event::CartRegistered { code, .. } => format!("Cart {} registered", code),
            Event::CartUpdated { code, .. } => format!("Cart {} updated", code),
            Event::ChemicalAdded { name, .. } => format!("Chemical {} added to inventory", name),
            Event::ChemicalRestocked {
                name,
                old_stock,
                new_stock,
                unit,
                ..
            } => format!(
                "Inventory intake: {} {} of {} (was {})",
                new_stock.saturating_sub(*old_stock),
                unit,
                name,
                old_stock
            ),
            Event::StockLow {
                name, stock, unit, ..
            } => format!("Low stock: {} ({} {} left)", name, stock, unit),
            Event::WorkerHired { name, .. } => format!("Worker {} registered", name),
            Event::AttendanceMarked {
                worker_id,
                date,
                status,
            } => format!("Attendance {} for worker {} on {}", status, worker_id, date),
            Event::InvoiceCreated { number, total, .. } => {
                format!("New invoice {} for {}", number, total)
            }
            Event::InvoiceUpdated { number, .. } => format!("Invoice {} updated", number),
            Event::InvoicePaid { number, total, .. } => {
                format!("Invoice {} paid ({})", number, total)
            }
            Event::InvoiceVoided { number, .. } => format!("Invoice {} voided", number),
            Event::RecordUpdated { kind, id } => format!("{} {} updated", kind, id),
            Event::RecordDeleted { kind, id } => format!("{} {} deleted", kind, id),
        }
    }
}

/// An event stamped with the local time it was collected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub at: NaiveDateTime,
    pub event: Event,
}

impl ActivityEntry {
    pub fn summary(&self) -> String {
        self.event.describe()
    }
}

/// Newest-first ring of entries. Never holds more than `capacity`.
#[derive(Debug)]
struct Feed {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
}

impl Feed {
    fn push(&mut self, entry: ActivityEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }
}

fn lock(feed: &Mutex<Feed>) -> MutexGuard<'_, Feed> {
    feed.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Bounded, most-recent-first feed fed by [`EventSender`]s. The oldest
/// entry is evicted as soon as a send would exceed capacity, whether or not
/// the feed is ever read.
pub struct ActivityLog {
    feed: Arc<Mutex<Feed>>,
}

impl ActivityLog {
    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ActivityEntry> {
        lock(&self.feed).entries.iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.feed).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Creates a connected sender/log pair holding at most `capacity` entries.
pub fn activity_channel(capacity: usize, clock: SharedClock) -> (EventSender, ActivityLog) {
    let capacity = capacity.max(1);
    let feed = Arc::new(Mutex::new(Feed {
        entries: VecDeque::with_capacity(capacity),
        capacity,
    }));
    let sender = EventSender {
        feed: Arc::downgrade(&feed),
        clock,
    };
    (sender, ActivityLog { feed })
}
