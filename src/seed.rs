//! Sample records loaded into a fresh state
//!
//! This creates:
//! - 3 haul carts (one in maintenance)
//! - 3 chemicals (Cal Viva below its minimum stock)
//! - 3 workers, one per shift
//! - attendance for 2024-12-13
//! - 2 invoices, one paid and one pending

use chrono::{NaiveDate, NaiveTime};
use rust_decimal_macros::dec;
use tracing::info;

use crate::errors::ServiceError;
use crate::models::{
    AttendanceMark, AttendanceStatus, Cart, CartStatus, Chemical, Invoice, InvoiceDraft,
    InvoiceStatus, LineItemDraft, Shift, Worker, WorkerStatus,
};
use crate::AppState;

/// Date the sample attendance was taken.
pub const SAMPLE_ATTENDANCE_DATE: (i32, u32, u32) = (2024, 12, 13);

pub fn load_sample_data(state: &mut AppState) -> Result<(), ServiceError> {
    info!("Loading sample data...");

    for cart in sample_carts()? {
        state.carts.create(cart)?;
    }
    for chemical in sample_chemicals()? {
        state.inventory.create(chemical)?;
    }
    for worker in sample_workers()? {
        state.workforce.hire(worker)?;
    }
    for mark in sample_attendance()? {
        state.workforce.import_mark(mark)?;
    }
    for invoice in sample_invoices()? {
        state.invoicing.import_invoice(invoice)?;
    }

    info!(
        carts = state.carts.len(),
        chemicals = state.inventory.len(),
        workers = state.workforce.len(),
        invoices = state.invoicing.len(),
        "sample data loaded"
    );
    Ok(())
}

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate, ServiceError> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| ServiceError::ValidationError(format!("invalid date {}-{}-{}", y, m, d)))
}

fn time(h: u32, m: u32) -> Result<NaiveTime, ServiceError> {
    NaiveTime::from_hms_opt(h, m, 0)
        .ok_or_else(|| ServiceError::ValidationError(format!("invalid time {}:{}", h, m)))
}

pub fn sample_attendance_date() -> Result<NaiveDate, ServiceError> {
    let (y, m, d) = SAMPLE_ATTENDANCE_DATE;
    date(y, m, d)
}

fn sample_carts() -> Result<Vec<Cart>, ServiceError> {
    let rows = [
        ("1", "CC-001", dec!(50), CartStatus::Active, "Sector A", (2024, 1, 15), (2024, 12, 1)),
        ("2", "CC-002", dec!(75), CartStatus::Maintenance, "Sector B", (2024, 2, 10), (2024, 11, 15)),
        ("3", "CC-003", dec!(60), CartStatus::Active, "Sector C", (2024, 3, 5), (2024, 12, 10)),
    ];

    rows.into_iter()
        .map(|(id, code, capacity, status, location, registered, serviced)| {
            let mut cart = Cart::new(code, capacity, location).with_status(status);
            cart.id = id.to_string();
            cart.registration_date = Some(date(registered.0, registered.1, registered.2)?);
            cart.last_maintenance = Some(date(serviced.0, serviced.1, serviced.2)?);
            Ok(cart)
        })
        .collect()
}

fn sample_chemicals() -> Result<Vec<Chemical>, ServiceError> {
    Ok(vec![
        Chemical {
            id: "1".into(),
            name: "Cianuro de Sodio".into(),
            code: "IQ-001".into(),
            category: "Reactivos".into(),
            stock: dec!(500),
            minimum_stock: dec!(100),
            unit: "kg".into(),
            unit_price: dec!(2500),
            supplier: "QuimiCorp".into(),
            expiration_date: date(2025, 6, 15)?,
            storage_location: "A-1-01".into(),
        },
        Chemical {
            id: "2".into(),
            name: "Cal Viva".into(),
            code: "IQ-002".into(),
            category: "Alcalinizantes".into(),
            stock: dec!(50),
            minimum_stock: dec!(200),
            unit: "ton".into(),
            unit_price: dec!(150),
            supplier: "CalMinerals".into(),
            expiration_date: date(2025, 12, 31)?,
            storage_location: "B-2-05".into(),
        },
        Chemical {
            id: "3".into(),
            name: "Xantato de Potasio".into(),
            code: "IQ-003".into(),
            category: "Colectores".into(),
            stock: dec!(300),
            minimum_stock: dec!(150),
            unit: "kg".into(),
            unit_price: dec!(1800),
            supplier: "FlotaQuim".into(),
            expiration_date: date(2025, 3, 20)?,
            storage_location: "A-2-03".into(),
        },
    ])
}

fn sample_workers() -> Result<Vec<Worker>, ServiceError> {
    let rows = [
        (
            "1",
            "Juan Carlos Pérez",
            "12345678",
            "Operador de Planta",
            Shift::Morning,
            "555-0101",
            "juan.perez@canoncolorado.com",
            (2023, 1, 15),
        ),
        (
            "2",
            "María Elena García",
            "87654321",
            "Supervisora de Turno",
            Shift::Afternoon,
            "555-0102",
            "maria.garcia@canoncolorado.com",
            (2022, 6, 10),
        ),
        (
            "3",
            "Carlos Alberto Ruiz",
            "11223344",
            "Técnico de Mantenimiento",
            Shift::Night,
            "555-0103",
            "carlos.ruiz@canoncolorado.com",
            (2023, 3, 22),
        ),
    ];

    rows.into_iter()
        .map(|(id, name, national_id, position, shift, phone, email, hired)| {
            Ok(Worker {
                id: id.into(),
                name: name.into(),
                national_id: national_id.into(),
                position: position.into(),
                shift,
                phone: phone.into(),
                email: email.into(),
                hire_date: date(hired.0, hired.1, hired.2)?,
                status: WorkerStatus::Active,
            })
        })
        .collect()
}

fn sample_attendance() -> Result<Vec<AttendanceMark>, ServiceError> {
    let day = sample_attendance_date()?;
    Ok(vec![
        AttendanceMark {
            id: "1".into(),
            worker_id: "1".into(),
            date: day,
            entry_time: time(7, 0)?,
            exit_time: Some(time(15, 0)?),
            status: AttendanceStatus::Present,
            notes: None,
        },
        AttendanceMark {
            id: "2".into(),
            worker_id: "2".into(),
            date: day,
            entry_time: time(15, 0)?,
            exit_time: Some(time(23, 0)?),
            status: AttendanceStatus::Present,
            notes: None,
        },
        AttendanceMark {
            id: "3".into(),
            worker_id: "3".into(),
            date: day,
            entry_time: time(23, 10)?,
            exit_time: None,
            status: AttendanceStatus::Late,
            notes: Some("Llegó 10 minutos tarde".into()),
        },
    ])
}

fn sample_invoices() -> Result<Vec<Invoice>, ServiceError> {
    let rows = [
        (
            "1",
            "F-2024-001",
            "Procesadora de Minerales S.A.",
            (2024, 12, 10),
            "Concentrado de Oro - 50kg",
            dec!(15000),
            InvoiceStatus::Paid,
        ),
        (
            "2",
            "F-2024-002",
            "Refinería Nacional",
            (2024, 12, 12),
            "Concentrado de Plata - 100kg",
            dec!(25000),
            InvoiceStatus::Pending,
        ),
    ];

    rows.into_iter()
        .map(|(id, number, client, issued, description, price, status)| {
            let mut invoice = Invoice::from_draft(InvoiceDraft {
                number: number.into(),
                client: client.into(),
                date: date(issued.0, issued.1, issued.2)?,
                items: vec![LineItemDraft::new(description, 1, price)],
            })?;
            invoice.id = id.into();
            invoice.status = status;
            Ok(invoice)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::FixedClock;
    use crate::config::AppConfig;
    use crate::models::StockStatus;
    use std::sync::Arc;

    fn seeded() -> AppState {
        let clock = Arc::new(FixedClock(
            sample_attendance_date().unwrap().and_hms_opt(12, 0, 0).unwrap(),
        ));
        let mut state = AppState::new(AppConfig::default(), clock);
        load_sample_data(&mut state).unwrap();
        state
    }

    #[test]
    fn test_sample_counts() {
        let state = seeded();
        assert_eq!(state.carts.len(), 3);
        assert_eq!(state.inventory.len(), 3);
        assert_eq!(state.workforce.len(), 3);
        assert_eq!(state.workforce.marks().len(), 3);
        assert_eq!(state.invoicing.len(), 2);
    }

    #[test]
    fn test_sample_invoice_totals() {
        let state = seeded();
        let paid = state.invoicing.get("1").unwrap();
        assert_eq!(paid.number, "F-2024-001");
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert_eq!(paid.tax, dec!(2400));
        assert_eq!(paid.total, dec!(17400));
        assert_eq!(state.invoicing.get("2").unwrap().total, dec!(29000));
    }

    #[test]
    fn test_cal_viva_is_low_stock() {
        let state = seeded();
        assert_eq!(
            state.inventory.stock_status("2").unwrap(),
            StockStatus::LowStock
        );
        assert_eq!(
            state.inventory.stock_status("3").unwrap(),
            StockStatus::NormalStock
        );
    }

    #[test]
    fn test_loading_twice_fails_on_duplicate_ids() {
        let mut state = seeded();
        assert!(matches!(
            load_sample_data(&mut state),
            Err(ServiceError::DuplicateId(_))
        ));
    }
}
