use crate::{
    common::{format_money, SharedClock},
    errors::ServiceError,
    models::{AttendanceStatus, CartStatus, InvoiceStatus},
    services::{
        carts::{CartService, FleetSummary},
        inventory::InventoryService,
        invoicing::InvoicingService,
        workforce::WorkforceService,
    },
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::{info, instrument};

/// Inventory section of the summary report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryReport {
    pub total_items: usize,
    pub low_stock_items: usize,
    pub inventory_value: Decimal,
}

/// Sales section of the summary report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    /// Sum of totals over every invoice that was not voided.
    pub total_invoiced: Decimal,
    pub pending_invoices: usize,
    pub paid_invoices: usize,
    pub outstanding: Decimal,
    pub collected: Decimal,
}

/// Personnel section of the summary report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonnelReport {
    pub total_workers: usize,
    pub active_workers: usize,
    /// Workers marked present on the report date. Late marks are counted
    /// separately.
    pub present_today: usize,
    pub late_today: usize,
    /// Names of the workers marked absent on the report date.
    pub absentees: Vec<String>,
}

/// Dashboard summary across every area
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub date: NaiveDate,
    pub fleet: FleetSummary,
    pub inventory: InventoryReport,
    pub sales: SalesReport,
    pub personnel: PersonnelReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertSeverity {
    Urgent,
    Info,
    Attention,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub title: String,
    pub detail: String,
}

/// Read-only view over the domain services producing reports and alerts
pub struct ReportService<'a> {
    carts: &'a CartService,
    inventory: &'a InventoryService,
    workforce: &'a WorkforceService,
    invoicing: &'a InvoicingService,
    currency_symbol: &'a str,
}

impl<'a> ReportService<'a> {
    pub fn new(
        carts: &'a CartService,
        inventory: &'a InventoryService,
        workforce: &'a WorkforceService,
        invoicing: &'a InvoicingService,
        currency_symbol: &'a str,
    ) -> Self {
        Self {
            carts,
            inventory,
            workforce,
            invoicing,
            currency_symbol,
        }
    }

    /// Generates the summary report as of `date`
    #[instrument(skip(self))]
    pub fn summary(&self, date: NaiveDate) -> Result<SummaryReport, ServiceError> {
        let attendance = self.workforce.daily_summary(date);
        let workforce = self.workforce.workforce_summary();

        let report = SummaryReport {
            date,
            fleet: self.carts.fleet_summary(),
            inventory: InventoryReport {
                total_items: self.inventory.len(),
                low_stock_items: self.inventory.low_stock().len(),
                inventory_value: self.inventory.inventory_value()?,
            },
            sales: SalesReport {
                total_invoiced: self.invoicing.invoiced_total()?,
                pending_invoices: self.invoicing.count_by_status(InvoiceStatus::Pending),
                paid_invoices: self.invoicing.count_by_status(InvoiceStatus::Paid),
                outstanding: self.invoicing.outstanding_total()?,
                collected: self.invoicing.collected_total()?,
            },
            personnel: PersonnelReport {
                total_workers: workforce.total,
                active_workers: workforce.active,
                present_today: attendance.present,
                late_today: attendance.late,
                absentees: self.absentees(date),
            },
        };

        info!(
            carts = report.fleet.total,
            chemicals = report.inventory.total_items,
            workers = report.personnel.total_workers,
            "summary report generated"
        );
        Ok(report)
    }

    /// Dashboard alerts: low stock first, then carts in maintenance, then
    /// a single line for pending invoices.
    pub fn alerts(&self) -> Result<Vec<Alert>, ServiceError> {
        let mut alerts: Vec<Alert> = self
            .inventory
            .low_stock()
            .into_iter()
            .map(|chemical| Alert {
                severity: AlertSeverity::Urgent,
                title: format!("Low stock: {}", chemical.name),
                detail: format!("Only {} {} left in inventory", chemical.stock, chemical.unit),
            })
            .collect();

        alerts.extend(
            self.carts
                .in_status(CartStatus::Maintenance)
                .into_iter()
                .map(|cart| Alert {
                    severity: AlertSeverity::Info,
                    title: format!("Cart {} in maintenance", cart.code),
                    detail: format!("Located at {}", cart.location),
                }),
        );

        let pending = self.invoicing.count_by_status(InvoiceStatus::Pending);
        if pending > 0 {
            let outstanding = self.invoicing.outstanding_total()?;
            alerts.push(Alert {
                severity: AlertSeverity::Attention,
                title: format!(
                    "{} pending invoice{}",
                    pending,
                    if pending == 1 { "" } else { "s" }
                ),
                detail: format!(
                    "Total: {} to collect",
                    format_money(self.currency_symbol, outstanding)
                ),
            });
        }
        Ok(alerts)
    }

    /// Names of the workers marked absent on `date`.
    pub fn absentees(&self, date: NaiveDate) -> Vec<String> {
        self.workforce
            .marks_for_date(date)
            .into_iter()
            .filter(|mark| mark.status == AttendanceStatus::Absent)
            .map(|mark| {
                self.workforce
                    .worker(&mark.worker_id)
                    .map(|worker| worker.name.clone())
                    .unwrap_or_else(|| mark.worker_id.clone())
            })
            .collect()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ExportFormat {
    Pdf,
    Excel,
}

impl ExportFormat {
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Excel => "Excel",
        }
    }
}

/// Outcome of an export request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReceipt {
    pub format: ExportFormat,
    pub message: String,
    pub exported_at: NaiveDateTime,
}

/// Collaborator that turns a summary report into a document.
pub trait ReportExporter {
    fn export(
        &self,
        report: &SummaryReport,
        format: ExportFormat,
    ) -> Result<ExportReceipt, ServiceError>;
}

/// Exporter that reports success without producing a file.
pub struct SimulatedExporter {
    clock: SharedClock,
}

impl SimulatedExporter {
    pub fn new(clock: SharedClock) -> Self {
        Self { clock }
    }
}

impl ReportExporter for SimulatedExporter {
    #[instrument(skip(self, report), fields(date = %report.date))]
    fn export(
        &self,
        report: &SummaryReport,
        format: ExportFormat,
    ) -> Result<ExportReceipt, ServiceError> {
        info!(%format, "simulated report export");
        Ok(ExportReceipt {
            format,
            message: format!("{} report exported successfully (simulated)", format.label()),
            exported_at: self.clock.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::FixedClock;
    use crate::events::activity_channel;
    use crate::models::{Cart, Chemical, InvoiceDraft, LineItemDraft, Worker};
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use std::str::FromStr;
    use std::sync::Arc;

    struct Fixture {
        carts: CartService,
        inventory: InventoryService,
        workforce: WorkforceService,
        invoicing: InvoicingService,
    }

    fn clock() -> SharedClock {
        Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2024, 12, 13)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        ))
    }

    fn fixture() -> Fixture {
        let (sender, _log) = activity_channel(10, clock());
        Fixture {
            carts: CartService::new(sender.clone(), clock()),
            inventory: InventoryService::new(sender.clone()),
            workforce: WorkforceService::new(sender.clone(), clock()),
            invoicing: InvoicingService::new(sender),
        }
    }

    fn chemical(name: &str, stock: Decimal, minimum: Decimal) -> Chemical {
        Chemical {
            id: String::new(),
            name: name.into(),
            code: "IQ-1".into(),
            category: "Reactivos".into(),
            stock,
            minimum_stock: minimum,
            unit: "ton".into(),
            unit_price: dec!(2),
            supplier: "CalMinerals".into(),
            expiration_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            storage_location: "B-2-05".into(),
        }
    }

    fn worker(name: &str) -> Worker {
        Worker {
            id: String::new(),
            name: name.into(),
            national_id: format!("ID-{}", name),
            position: "Operador".into(),
            shift: crate::models::Shift::Morning,
            phone: "555-0101".into(),
            email: String::new(),
            hire_date: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            status: Default::default(),
        }
    }

    fn invoice(number: &str, price: Decimal) -> InvoiceDraft {
        InvoiceDraft {
            number: number.into(),
            client: "Refinería Nacional".into(),
            date: NaiveDate::from_ymd_opt(2024, 12, 12).unwrap(),
            items: vec![LineItemDraft::new("Concentrado", 1, price)],
        }
    }

    #[test]
    fn test_alerts() {
        let mut f = fixture();
        f.inventory
            .create(chemical("Cal Viva", dec!(50), dec!(200)))
            .unwrap();
        f.inventory
            .create(chemical("Cianuro", dec!(500), dec!(100)))
            .unwrap();
        f.carts
            .create(Cart::new("CC-002", dec!(75), "Sector B").with_status(CartStatus::Maintenance))
            .unwrap();
        f.invoicing.create_invoice(invoice("F-1", dec!(25000))).unwrap();

        let reports = ReportService::new(&f.carts, &f.inventory, &f.workforce, &f.invoicing, "$");
        let alerts = reports.alerts().unwrap();

        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].severity, AlertSeverity::Urgent);
        assert_eq!(alerts[0].title, "Low stock: Cal Viva");
        assert_eq!(alerts[0].detail, "Only 50 ton left in inventory");
        assert_eq!(alerts[1].title, "Cart CC-002 in maintenance");
        assert_eq!(alerts[2].severity, AlertSeverity::Attention);
        assert_eq!(alerts[2].title, "1 pending invoice");
        assert_eq!(alerts[2].detail, "Total: $29,000.00 to collect");
    }

    #[test]
    fn test_no_alerts_when_quiet() {
        let f = fixture();
        let reports = ReportService::new(&f.carts, &f.inventory, &f.workforce, &f.invoicing, "$");
        assert!(reports.alerts().unwrap().is_empty());
    }

    #[test]
    fn test_summary_excludes_voided_from_total_invoiced() {
        let mut f = fixture();
        let paid = f.invoicing.create_invoice(invoice("F-1", dec!(15000))).unwrap();
        f.invoicing.create_invoice(invoice("F-2", dec!(25000))).unwrap();
        let voided = f.invoicing.create_invoice(invoice("F-3", dec!(1000))).unwrap();
        f.invoicing.mark_paid(&paid.id).unwrap();
        f.invoicing.void_invoice(&voided.id).unwrap();

        let reports = ReportService::new(&f.carts, &f.inventory, &f.workforce, &f.invoicing, "$");
        let report = reports
            .summary(NaiveDate::from_ymd_opt(2024, 12, 13).unwrap())
            .unwrap();

        assert_eq!(report.sales.total_invoiced, dec!(46400));
        assert_eq!(report.sales.pending_invoices, 1);
        assert_eq!(report.sales.paid_invoices, 1);
        assert_eq!(report.sales.collected, dec!(17400));
        assert_eq!(report.sales.outstanding, dec!(29000));
        assert_eq!(report.fleet.total, 0);
    }

    #[test]
    fn test_personnel_counts_present_apart_from_late() {
        let mut f = fixture();
        let day = NaiveDate::from_ymd_opt(2024, 12, 13).unwrap();
        let statuses = [
            ("Carlos", AttendanceStatus::Present),
            ("María", AttendanceStatus::Late),
            ("José", AttendanceStatus::Absent),
            ("Ana", AttendanceStatus::Present),
        ];
        for (name, status) in statuses {
            let worker = f.workforce.hire(worker(name)).unwrap();
            f.workforce.mark_attendance(&worker.id, day, status).unwrap();
        }

        let reports = ReportService::new(&f.carts, &f.inventory, &f.workforce, &f.invoicing, "$");
        let personnel = reports.summary(day).unwrap().personnel;

        assert_eq!(personnel.total_workers, 4);
        assert_eq!(personnel.present_today, 2);
        assert_eq!(personnel.late_today, 1);
        assert_eq!(personnel.absentees, vec!["José".to_string()]);
    }

    #[test]
    fn test_summary_fails_instead_of_overflowing() {
        let mut f = fixture();
        for name in ["Cianuro", "Xantato"] {
            f.inventory
                .create(chemical(name, dec!(30000000000000000000000000000), dec!(100)))
                .unwrap();
        }

        let reports = ReportService::new(&f.carts, &f.inventory, &f.workforce, &f.invoicing, "$");
        assert_matches!(
            reports.summary(NaiveDate::from_ymd_opt(2024, 12, 13).unwrap()),
            Err(ServiceError::ValidationError(_))
        );
        // Alerts do not depend on the inventory value
        assert!(reports.alerts().unwrap().is_empty());
    }

    #[test]
    fn test_simulated_export() {
        let f = fixture();
        let reports = ReportService::new(&f.carts, &f.inventory, &f.workforce, &f.invoicing, "$");
        let report = reports
            .summary(NaiveDate::from_ymd_opt(2024, 12, 13).unwrap())
            .unwrap();

        let receipt = SimulatedExporter::new(clock())
            .export(&report, ExportFormat::Excel)
            .unwrap();
        assert_eq!(receipt.message, "Excel report exported successfully (simulated)");
        assert_eq!(receipt.format, ExportFormat::Excel);
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!(ExportFormat::from_str("pdf").unwrap(), ExportFormat::Pdf);
        assert_eq!(ExportFormat::from_str("EXCEL").unwrap(), ExportFormat::Excel);
        assert_matches!(ExportFormat::from_str("csv"), Err(_));
    }
}
