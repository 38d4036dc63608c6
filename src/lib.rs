//! Mine Ops Library
//!
//! Core of the mining operations dashboard: haul carts, chemical inventory,
//! workers and attendance, invoicing, and the summary report built on them.
//! Everything lives in memory for the lifetime of the process.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod common;
pub mod config;
pub mod errors;
pub mod events;
pub mod filter;
pub mod models;
pub mod seed;
pub mod services;
pub mod store;

use chrono::NaiveDate;
use tracing::info;

use crate::auth::{Credentials, Session};
use crate::common::SharedClock;
use crate::errors::ServiceError;
use crate::events::{activity_channel, ActivityEntry, ActivityLog};
use crate::services::{
    carts::CartService,
    inventory::InventoryService,
    invoicing::InvoicingService,
    reports::{Alert, ReportService, SummaryReport},
    workforce::WorkforceService,
};

// App state definition
pub struct AppState {
    pub config: config::AppConfig,
    pub clock: SharedClock,
    pub session: Session,
    pub carts: CartService,
    pub inventory: InventoryService,
    pub workforce: WorkforceService,
    pub invoicing: InvoicingService,
    pub activity: ActivityLog,
}

impl AppState {
    /// Builds empty stores wired to a shared activity feed.
    pub fn new(config: config::AppConfig, clock: SharedClock) -> Self {
        let (event_sender, activity) =
            activity_channel(config.activity_log_capacity, clock.clone());

        Self {
            session: Session::new(Credentials::from_config(&config)),
            carts: CartService::new(event_sender.clone(), clock.clone()),
            inventory: InventoryService::new(event_sender.clone()),
            workforce: WorkforceService::new(event_sender.clone(), clock.clone()),
            invoicing: InvoicingService::new(event_sender),
            activity,
            config,
            clock,
        }
    }

    /// Like [`AppState::new`], loading the sample records when the
    /// configuration asks for them.
    pub fn bootstrap(config: config::AppConfig, clock: SharedClock) -> Result<Self, ServiceError> {
        let seed = config.seed_sample_data;
        let mut state = Self::new(config, clock);
        if seed {
            seed::load_sample_data(&mut state)?;
        }
        info!(
            carts = state.carts.len(),
            chemicals = state.inventory.len(),
            workers = state.workforce.len(),
            invoices = state.invoicing.len(),
            "application state ready"
        );
        Ok(state)
    }

    pub fn reports(&self) -> ReportService<'_> {
        ReportService::new(
            &self.carts,
            &self.inventory,
            &self.workforce,
            &self.invoicing,
            &self.config.currency_symbol,
        )
    }

    pub fn summary_report(&self, date: NaiveDate) -> Result<SummaryReport, ServiceError> {
        self.reports().summary(date)
    }

    /// Summary report for the clock's current day.
    pub fn todays_report(&self) -> Result<SummaryReport, ServiceError> {
        self.summary_report(self.clock.today())
    }

    pub fn alerts(&self) -> Result<Vec<Alert>, ServiceError> {
        self.reports().alerts()
    }

    pub fn recent_activity(&self, limit: usize) -> Vec<ActivityEntry> {
        self.activity.recent(limit)
    }
}
