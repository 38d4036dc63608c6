#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use mine_ops::{
    common::{FixedClock, SharedClock},
    config::AppConfig,
    models::{Chemical, InvoiceDraft, LineItemDraft},
    seed, AppState,
};
use rust_decimal::Decimal;

/// Day the sample attendance was recorded.
pub fn sample_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 13).unwrap()
}

pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    sample_day().and_hms_opt(hour, minute, 0).unwrap()
}

pub fn clock_at(hour: u32, minute: u32) -> SharedClock {
    Arc::new(FixedClock(at(hour, minute)))
}

/// Empty state with default configuration and a clock pinned to the sample day.
pub fn empty_state() -> AppState {
    AppState::new(AppConfig::default(), clock_at(9, 0))
}

/// State loaded with the bundled sample records and logged in.
pub fn seeded_state() -> AppState {
    let mut state = empty_state();
    seed::load_sample_data(&mut state).expect("sample data loads");
    state
        .session
        .login("admin", "admin123")
        .expect("default credentials");
    state
}

pub fn invoice_draft(number: &str, lines: &[(u32, Decimal)]) -> InvoiceDraft {
    InvoiceDraft {
        number: number.to_string(),
        client: "Procesadora de Minerales S.A.".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 12, 10).unwrap(),
        items: lines
            .iter()
            .enumerate()
            .map(|(i, (quantity, price))| {
                LineItemDraft::new(format!("Concentrado {}", i + 1), *quantity, *price)
            })
            .collect(),
    }
}

pub fn chemical(name: &str, stock: Decimal, minimum: Decimal) -> Chemical {
    Chemical {
        id: String::new(),
        name: name.to_string(),
        code: "IQ-900".to_string(),
        category: "Reactivos".to_string(),
        stock,
        minimum_stock: minimum,
        unit: "kg".to_string(),
        unit_price: Decimal::ONE,
        supplier: "QuimiCorp".to_string(),
        expiration_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        storage_location: "A-1-01".to_string(),
    }
}
